// src/error.rs
//! Domain error taxonomy shared by the gateway, billing and resume services

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// One violated constraint on one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Every violation found by a single schema invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut error = Self::new();
        error.push(field, message);
        error
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Merge violations of a nested schema under `prefix` (e.g. `workExperiences[2]`)
    pub fn absorb(&mut self, prefix: &str, other: ValidationError) {
        for violation in other.violations {
            self.push(format!("{}.{}", prefix, violation.field), violation.message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    /// `Ok(value)` when nothing was violated
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .violations
            .iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Upgrade required: {0}")]
    UpgradeRequired(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("AI generation returned no text")]
    GenerationFailed,

    #[error("AI completion request failed: {0}")]
    CompletionFailed(String),

    #[error("Billing provider error: {0}")]
    BillingProvider(String),

    #[error("{0} read outside of its provider")]
    ContextMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn upgrade(message: impl Into<String>) -> Self {
        Self::UpgradeRequired(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::UpgradeRequired(_) => "UPGRADE_REQUIRED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::GenerationFailed => "GENERATION_FAILED",
            Self::CompletionFailed(_) => "COMPLETION_FAILED",
            Self::BillingProvider(_) => "BILLING_PROVIDER_ERROR",
            Self::ContextMissing(_) => "CONTEXT_MISSING",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::UpgradeRequired(_) => 403,
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::GenerationFailed | Self::CompletionFailed(_) | Self::BillingProvider(_) => 502,
            Self::ContextMissing(_) | Self::Internal(_) => 500,
        }
    }

    /// Message safe to show to the end user; details only go to the logs
    pub fn public_message(&self) -> String {
        match self {
            Self::Unauthorized => "Authentication required".to_string(),
            Self::UpgradeRequired(msg) => msg.clone(),
            Self::Validation(e) => format!("Invalid input: {}", e),
            Self::NotFound(what) => format!("{} not found", what),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }

    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Unauthorized => vec!["Sign in and try again".to_string()],
            Self::UpgradeRequired(_) => {
                vec!["Upgrade your subscription to use this feature".to_string()]
            }
            Self::Validation(_) => vec!["Check the highlighted fields".to_string()],
            Self::GenerationFailed | Self::CompletionFailed(_) => {
                vec!["Try generating again".to_string()]
            }
            Self::BillingProvider(_) => vec!["Try again in a few moments".to_string()],
            Self::NotFound(_) => vec!["Check the identifier".to_string()],
            Self::ContextMissing(_) | Self::Internal(_) => {
                vec!["Contact support if the problem persists".to_string()]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_collects_and_formats() {
        let mut error = ValidationError::new();
        error.push("photo", "Must be an image file.");
        error.push("email", "Invalid");

        assert!(error.has_field("photo"));
        assert!(!error.has_field("city"));
        assert_eq!(error.to_string(), "photo: Must be an image file.; email: Invalid");
        assert!(error.into_result(()).is_err());
    }

    #[test]
    fn test_absorb_prefixes_nested_fields() {
        let mut outer = ValidationError::new();
        outer.absorb("educations[1]", ValidationError::single("degree", "Required"));

        assert!(outer.has_field("educations[1].degree"));
    }

    #[test]
    fn test_status_and_codes() {
        assert_eq!(AppError::Unauthorized.status_code(), 401);
        assert_eq!(AppError::upgrade("x").status_code(), 403);
        assert_eq!(AppError::GenerationFailed.code(), "GENERATION_FAILED");
        assert_eq!(AppError::ContextMissing("SubscriptionContext").status_code(), 500);
        assert_eq!(
            AppError::from(ValidationError::single("a", "b")).code(),
            "VALIDATION_ERROR"
        );
    }

    #[test]
    fn test_internal_details_are_not_public() {
        let error = AppError::CompletionFailed("connection reset by 10.0.0.3".to_string());
        assert!(!error.public_message().contains("10.0.0.3"));
    }
}
