// src/subscription.rs
//! Subscription levels, what each level may do, and the per-request context

use crate::error::AppError;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionLevel {
    #[default]
    Free,
    Pro,
    ProPlus,
}

impl SubscriptionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::ProPlus => "pro_plus",
        }
    }
}

pub fn can_use_ai_tools(level: SubscriptionLevel) -> bool {
    level != SubscriptionLevel::Free
}

pub fn can_use_customizations(level: SubscriptionLevel) -> bool {
    level == SubscriptionLevel::ProPlus
}

pub fn can_create_resume(level: SubscriptionLevel, current_count: i64) -> bool {
    match level {
        SubscriptionLevel::Free => current_count < 1,
        SubscriptionLevel::Pro => current_count < 3,
        SubscriptionLevel::ProPlus => true,
    }
}

/// Billing state as mirrored locally from the billing provider's webhooks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SubscriptionRecord {
    pub user_id: String,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub stripe_price_id: Option<String>,
    pub stripe_current_period_end: Option<DateTime<Utc>>,
    pub stripe_cancel_at_period_end: bool,
}

/// Price ids configured for the paid plans
#[derive(Debug, Clone, Default)]
pub struct PlanPrices {
    pub pro: String,
    pub pro_plus: String,
}

/// No record or an elapsed period means free; an unknown price id is an error
pub fn level_from_record(
    record: Option<&SubscriptionRecord>,
    prices: &PlanPrices,
    now: DateTime<Utc>,
) -> Result<SubscriptionLevel> {
    let Some(record) = record else {
        return Ok(SubscriptionLevel::Free);
    };

    let active = record
        .stripe_current_period_end
        .is_some_and(|period_end| period_end >= now);
    if !active {
        return Ok(SubscriptionLevel::Free);
    }

    match record.stripe_price_id.as_deref() {
        Some(price) if !prices.pro.is_empty() && price == prices.pro => Ok(SubscriptionLevel::Pro),
        Some(price) if !prices.pro_plus.is_empty() && price == prices.pro_plus => {
            Ok(SubscriptionLevel::ProPlus)
        }
        other => anyhow::bail!("Invalid subscription price id: {:?}", other),
    }
}

/// Read side of the billing mirror
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn level_for(&self, user_id: &str) -> Result<SubscriptionLevel>;

    async fn billing_customer(&self, user_id: &str) -> Result<Option<String>>;
}

/// The caller's level, resolved once and handed explicitly to whatever needs it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionContext {
    level: SubscriptionLevel,
}

impl SubscriptionContext {
    pub fn new(level: SubscriptionLevel) -> Self {
        Self { level }
    }

    pub fn level(&self) -> SubscriptionLevel {
        self.level
    }

    /// Reading the level where nothing provided it is a wiring mistake
    pub fn require(context: Option<&Self>) -> Result<SubscriptionLevel, AppError> {
        context.map(Self::level).ok_or_else(Self::missing)
    }

    pub fn missing() -> AppError {
        AppError::ContextMissing("SubscriptionContext")
    }
}
