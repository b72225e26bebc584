pub mod ai_handlers;
pub mod billing_handlers;
pub mod preview_handlers;
pub mod resume_handlers;
pub mod system_handlers;

pub use ai_handlers::*;
pub use billing_handlers::*;
pub use preview_handlers::*;
pub use resume_handlers::*;
pub use system_handlers::*;
