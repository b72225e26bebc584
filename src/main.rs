use anyhow::Result;
use clap::Parser;
use resume_builder::app_log;
use resume_builder::logging::init_tracing;
use resume_builder::{core::ConfigManager, start_web_server};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "resume-studio")]
#[command(about = "Resume builder API: AI generation, live preview and billing")]
struct Cli {
    /// Environment config file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Overrides ROCKET_PORT
    #[arg(short, long)]
    port: Option<u16>,

    /// JSON log output file (stdout when absent)
    #[arg(long, env = "LOG_FILE")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigManager::load_with(&cli.config, |key| std::env::var(key).ok())?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    let log_file = cli.log_file.or_else(|| config.environment.log_file.clone());
    init_tracing(log_file.as_deref())?;

    app_log!(info, "Starting Resume Studio API Server");
    config.log_summary();
    app_log!(info, "Server: http://0.0.0.0:{}", config.port);

    start_web_server(config).await
}
