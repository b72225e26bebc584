// src/logging.rs
//! Tracing setup and the `app_log!` / `app_span!` macros used across the crate

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

pub const DEFAULT_FILTER: &str = "resume_builder=info,rocket::server=off";

/// Log through `tracing` at the given level: `app_log!(info, "saved {}", id)`
#[macro_export]
macro_rules! app_log {
    ($level:ident, $($arg:tt)+) => {
        ::tracing::$level!($($arg)+)
    };
}

/// Open an info-level span: `app_span!("ai_generation", user = %id)`
#[macro_export]
macro_rules! app_span {
    ($name:expr) => {
        ::tracing::info_span!($name)
    };
    ($name:expr, $($fields:tt)+) => {
        ::tracing::info_span!($name, $($fields)+)
    };
}

/// Install the global subscriber.
///
/// With a log file the output is JSON lines (the file is truncated on startup),
/// otherwise human readable output goes to stdout. The filter comes from
/// `RUST_LOG` and falls back to [`DEFAULT_FILTER`].
pub fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;

            Registry::default()
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(Mutex::new(file))
                        .with_current_span(false)
                        .with_span_list(false),
                )
                .with(filter)
                .try_init()
                .context("Failed to install tracing subscriber")?;
        }
        None => {
            Registry::default()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .context("Failed to install tracing subscriber")?;
        }
    }

    Ok(())
}
