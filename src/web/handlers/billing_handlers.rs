// src/web/handlers/billing_handlers.rs
use crate::auth::OptionalAuth;
use crate::billing::BillingService;
use crate::web::types::{ApiError, DataResponse, PortalSessionData};

use rocket::serde::json::Json;
use rocket::State;

pub async fn create_portal_session_handler(
    auth: OptionalAuth,
    billing: &State<BillingService>,
) -> Result<Json<DataResponse<PortalSessionData>>, ApiError> {
    let url = billing.create_customer_portal_session(auth.caller()).await?;

    Ok(Json(DataResponse::success(
        "Billing portal session created".to_string(),
        PortalSessionData { url },
        None,
    )))
}
