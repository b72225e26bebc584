// src/billing.rs
//! Customer portal sessions with the billing provider

use crate::auth::Caller;
use crate::error::AppError;
use crate::subscription::SubscriptionStore;
use crate::app_log;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

const PORTAL_SESSIONS_ENDPOINT: &str = "/v1/billing_portal/sessions";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Create a hosted portal session and return its URL
    async fn portal_session_url(&self, customer_id: &str, return_url: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct PortalSession {
    url: String,
}

pub struct StripeBilling {
    client: Client,
    secret_key: String,
    api_url: String,
}

impl StripeBilling {
    pub fn new(secret_key: String, api_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            secret_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl BillingProvider for StripeBilling {
    async fn portal_session_url(&self, customer_id: &str, return_url: &str) -> Result<String> {
        let url = format!("{}{}", self.api_url, PORTAL_SESSIONS_ENDPOINT);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&[("customer", customer_id), ("return_url", return_url)])
            .send()
            .await
            .context("Failed to call billing provider")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            anyhow::bail!("Billing provider returned {}: {}", status, error_text);
        }

        let session: PortalSession = response
            .json()
            .await
            .context("Failed to parse portal session response")?;

        Ok(session.url)
    }
}

pub struct BillingService {
    provider: Arc<dyn BillingProvider>,
    subscriptions: Arc<dyn SubscriptionStore>,
    return_url: String,
}

impl BillingService {
    pub fn new(
        provider: Arc<dyn BillingProvider>,
        subscriptions: Arc<dyn SubscriptionStore>,
        return_url: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            subscriptions,
            return_url: return_url.into(),
        }
    }

    /// Portal URL for the caller's billing customer. Nothing is written locally.
    pub async fn create_customer_portal_session(
        &self,
        caller: Option<&Caller>,
    ) -> Result<String, AppError> {
        let caller = caller.ok_or(AppError::Unauthorized)?;

        let customer_id = self
            .subscriptions
            .billing_customer(&caller.user_id)
            .await?
            .ok_or_else(|| AppError::BillingProvider("Billing customer not found".to_string()))?;

        app_log!(info, "Creating billing portal session for user {}", caller.user_id);

        self.provider
            .portal_session_url(&customer_id, &self.return_url)
            .await
            .map_err(|e| {
                app_log!(error, "Billing portal session failed: {:#}", e);
                AppError::BillingProvider(e.to_string())
            })
    }
}
