// src/web/handlers/ai_handlers.rs
use crate::ai::AiGateway;
use crate::auth::OptionalAuth;
use crate::validation::{GenerateSummaryInput, GenerateWorkExperienceInput};
use crate::web::types::{
    ApiError, DataResponse, InConversation, StandardRequest, SummaryData, WithConversationId,
    WorkExperienceData,
};

use rocket::serde::json::Json;
use rocket::State;

pub async fn generate_summary_handler(
    request: Json<StandardRequest<GenerateSummaryInput>>,
    auth: OptionalAuth,
    gateway: &State<AiGateway>,
) -> Result<Json<DataResponse<SummaryData>>, ApiError> {
    let conversation_id = request.conversation_id();
    let input = request.into_inner().data;

    let summary = gateway
        .generate_summary(auth.caller(), input)
        .await
        .in_conversation(&conversation_id)?;

    Ok(Json(DataResponse::success(
        "Summary generated".to_string(),
        SummaryData { summary },
        conversation_id,
    )))
}

pub async fn generate_work_experience_handler(
    request: Json<StandardRequest<GenerateWorkExperienceInput>>,
    auth: OptionalAuth,
    gateway: &State<AiGateway>,
) -> Result<Json<DataResponse<WorkExperienceData>>, ApiError> {
    let conversation_id = request.conversation_id();
    let input = request.into_inner().data;

    let work_experience = gateway
        .generate_work_experience(auth.caller(), input)
        .await
        .in_conversation(&conversation_id)?;

    Ok(Json(DataResponse::success(
        "Work experience generated".to_string(),
        WorkExperienceData { work_experience },
        conversation_id,
    )))
}
