// src/core/mod.rs
//! Configuration and storage shared by the services

pub mod config_manager;
pub mod database;

pub use config_manager::ConfigManager;
pub use database::{Database, ResumeRepository, SqliteSubscriptionStore, StoredResume};
