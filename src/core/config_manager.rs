// src/core/config_manager.rs
//! Configuration: paths from `config.yaml` (per environment), services from env vars

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::ai::DEFAULT_MODEL;
use crate::subscription::PlanPrices;

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_PORT: u16 = 4002;
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com";
const DEFAULT_RETURN_URL: &str = "http://localhost:3000/billing";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// `ENVIRONMENT`, `local` when unset
    pub env_name: String,
    pub environment: EnvironmentConfig,
    pub port: u16,
    pub ai: AiSettings,
    pub billing: BillingSettings,
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnvironmentConfig {
    pub database_path: PathBuf,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: EnvironmentConfig,
    production: EnvironmentConfig,
}

#[derive(Debug, Clone)]
pub struct AiSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct BillingSettings {
    pub secret_key: String,
    pub api_url: String,
    pub return_url: String,
    pub prices: PlanPrices,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub project_id: String,
}

impl ConfigManager {
    /// Load from the process environment and `config.yaml` in the working directory
    pub fn load() -> Result<Self> {
        Self::load_with(Path::new(DEFAULT_CONFIG_FILE), |key| std::env::var(key).ok())
    }

    pub fn load_with<F>(config_path: &Path, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_name = var("ENVIRONMENT").unwrap_or_else(|| "local".to_string());

        let mut environment = Self::load_environment(config_path, &env_name)?;
        if let Some(log_file) = var("LOG_FILE") {
            environment.log_file = Some(PathBuf::from(log_file));
        }

        let port = match var("ROCKET_PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("Invalid ROCKET_PORT: {}", port))?,
            None => DEFAULT_PORT,
        };

        let ai = AiSettings {
            api_key: var("OPENAI_API_KEY").unwrap_or_default(),
            base_url: var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        };

        let billing = BillingSettings {
            secret_key: var("STRIPE_SECRET_KEY").unwrap_or_default(),
            api_url: var("STRIPE_API_URL").unwrap_or_else(|| DEFAULT_STRIPE_API_URL.to_string()),
            return_url: var("BILLING_RETURN_URL").unwrap_or_else(|| DEFAULT_RETURN_URL.to_string()),
            prices: PlanPrices {
                pro: var("STRIPE_PRICE_ID_PRO").unwrap_or_default(),
                pro_plus: var("STRIPE_PRICE_ID_PRO_PLUS").unwrap_or_default(),
            },
        };

        let auth = AuthSettings {
            project_id: var("AUTH_PROJECT_ID").unwrap_or_default(),
        };

        Ok(Self {
            env_name,
            environment,
            port,
            ai,
            billing,
            auth,
        })
    }

    /// Paths from the config file section for `env_name`, or defaults next to the binary
    fn load_environment(config_path: &Path, env_name: &str) -> Result<EnvironmentConfig> {
        if !config_path.exists() {
            let base_dir = if env_name == "production" {
                PathBuf::from("/app")
            } else {
                std::env::current_dir().context("Failed to get current directory")?
            };
            return Ok(EnvironmentConfig {
                database_path: base_dir.join("resume_studio.db"),
                log_file: None,
            });
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        Self::parse_environment(&content, env_name)
    }

    fn parse_environment(content: &str, env_name: &str) -> Result<EnvironmentConfig> {
        let config_file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config file")?;

        let env_config = match env_name {
            "production" => config_file.production,
            _ => config_file.local,
        };

        Ok(EnvironmentConfig {
            database_path: resolve_path(&env_config.database_path)?,
            log_file: env_config.log_file.as_deref().map(resolve_path).transpose()?,
        })
    }

    /// Loading runs before the subscriber is installed, so this reports afterwards
    pub fn log_summary(&self) {
        info!("Configuration loaded for environment: {}", self.env_name);
        info!("Database: {}", self.environment.database_path.display());
        info!("AI model: {}", self.ai.model);
        if self.ai.api_key.is_empty() {
            warn!("OPENAI_API_KEY is not set; AI generation will fail");
        }
        if self.billing.secret_key.is_empty() {
            warn!("STRIPE_SECRET_KEY is not set; billing portal sessions will fail");
        }
    }

    /// Ensure the database directory exists
    pub async fn ensure_directories(&self) -> Result<()> {
        if let Some(db_parent) = self.environment.database_path.parent() {
            tokio::fs::create_dir_all(db_parent).await.with_context(|| {
                format!("Failed to create database directory: {}", db_parent.display())
            })?;
        }
        Ok(())
    }
}

fn resolve_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(current_dir.join(path))
    }
}
