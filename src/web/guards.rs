// src/web/guards.rs
use crate::auth::OptionalAuth;
use crate::error::AppError;
use crate::subscription::{SubscriptionContext, SubscriptionLevel, SubscriptionStore};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use std::sync::Arc;
use tracing::error;

/// Managed state that resolves subscription levels for [`SubscriptionContext`]
pub struct SubscriptionProvider {
    pub store: Arc<dyn SubscriptionStore>,
}

impl SubscriptionProvider {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }
}

/// Anonymous callers get a free-tier context; the services reject them
/// before the level matters.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for SubscriptionContext {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let provider = match req.guard::<&State<SubscriptionProvider>>().await {
            Outcome::Success(provider) => provider,
            _ => {
                error!("SubscriptionContext requested but no SubscriptionProvider is managed");
                return Outcome::Error((
                    Status::InternalServerError,
                    SubscriptionContext::missing(),
                ));
            }
        };

        let auth = match req.guard::<OptionalAuth>().await {
            Outcome::Success(auth) => auth,
            _ => OptionalAuth { user: None },
        };

        let Some(caller) = auth.caller() else {
            return Outcome::Success(SubscriptionContext::new(SubscriptionLevel::Free));
        };

        match provider.store.level_for(&caller.user_id).await {
            Ok(level) => Outcome::Success(SubscriptionContext::new(level)),
            Err(e) => {
                error!("Failed to resolve subscription for {}: {:#}", caller.user_id, e);
                Outcome::Error((Status::InternalServerError, AppError::Internal(e)))
            }
        }
    }
}
