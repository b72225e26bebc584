pub mod logging;

pub mod ai;
pub mod auth;
pub mod billing;
pub mod core;
pub mod error;
pub mod preview;
pub mod resumes;
pub mod subscription;
pub mod types;
pub mod validation;
pub mod web;

pub use error::{AppError, ValidationError};
pub use web::start_web_server;
