// src/web/handlers/system_handlers.rs
use crate::auth::{AuthenticatedUser, OptionalAuth};
use crate::error::AppError;
use crate::subscription::SubscriptionContext;
use crate::web::types::{ApiError, DataResponse, TextResponse, UserInfo};

use rocket::serde::json::Json;
use tracing::info;

pub async fn get_current_user_handler(
    auth: AuthenticatedUser,
    ctx: Result<SubscriptionContext, AppError>,
) -> Result<Json<DataResponse<UserInfo>>, ApiError> {
    let level = ctx?.level();
    let caller = auth.caller();

    Ok(Json(DataResponse::success(
        "User authenticated".to_string(),
        UserInfo {
            uid: caller.user_id.clone(),
            email: caller.email.clone(),
            name: caller.name.clone(),
            subscription_level: level,
        },
        None,
    )))
}

pub async fn health_handler(auth: OptionalAuth) -> Json<TextResponse> {
    match auth.caller() {
        Some(caller) => info!("Health check by authenticated user: {}", caller.user_id),
        None => info!("Health check by anonymous user"),
    }
    Json(TextResponse::success("OK".to_string(), None))
}
