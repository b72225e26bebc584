// src/web/handlers/resume_handlers.rs
use crate::auth::OptionalAuth;
use crate::error::AppError;
use crate::resumes::ResumeService;
use crate::subscription::SubscriptionContext;
use crate::types::ResumeValues;
use crate::web::types::{
    ActionResponse, ApiError, DataResponse, InConversation, ResumeData, SavedResumeData,
    StandardRequest, WithConversationId,
};

use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

pub async fn list_resumes_handler(
    auth: OptionalAuth,
    resumes: &State<ResumeService>,
) -> Result<Json<DataResponse<Vec<ResumeData>>>, ApiError> {
    let list = resumes.list_resumes(auth.caller()).await?;

    Ok(Json(DataResponse::success(
        format!("{} resume(s)", list.len()),
        list,
        None,
    )))
}

pub async fn get_resume_handler(
    id: &str,
    auth: OptionalAuth,
    resumes: &State<ResumeService>,
) -> Result<Json<DataResponse<ResumeData>>, ApiError> {
    let resume = resumes.get_resume(auth.caller(), id).await?;

    Ok(Json(DataResponse::success(
        "Resume loaded".to_string(),
        resume,
        None,
    )))
}

pub async fn save_resume_handler(
    request: Json<StandardRequest<ResumeValues>>,
    auth: OptionalAuth,
    ctx: Result<SubscriptionContext, AppError>,
    resumes: &State<ResumeService>,
) -> Result<Json<DataResponse<SavedResumeData>>, ApiError> {
    let conversation_id = request.conversation_id();
    let ctx = ctx.in_conversation(&conversation_id)?;
    let values = request.into_inner().data;
    let updating = values.id.is_some();

    let id = resumes
        .save_resume(auth.caller(), &ctx, values)
        .await
        .in_conversation(&conversation_id)?;

    info!(
        "Resume {} {} ({} plan)",
        id,
        if updating { "updated" } else { "created" },
        ctx.level().as_str()
    );

    Ok(Json(DataResponse::success(
        "Resume saved".to_string(),
        SavedResumeData { id },
        conversation_id,
    )))
}

pub async fn delete_resume_handler(
    id: &str,
    auth: OptionalAuth,
    resumes: &State<ResumeService>,
) -> Result<Json<ActionResponse>, ApiError> {
    resumes.delete_resume(auth.caller(), id).await?;

    Ok(Json(ActionResponse::success(
        "Resume deleted".to_string(),
        "deleted".to_string(),
        None,
    )))
}
