// src/web/types.rs - response envelope, request payloads and the error responder

use crate::core::StoredResume;
use crate::error::AppError;
use crate::preview::PreviewDocument;
use crate::subscription::SubscriptionLevel;
use crate::types::{ResumeValues, WorkExperience};

use rocket::form::FromForm;
use rocket::fs::TempFile;
use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::{Request, Response};
use tracing::{error, warn};

/// Raw bytes with their content type (preview object URLs)
pub struct BinaryResponse {
    pub content_type: ContentType,
    pub data: Vec<u8>,
}

impl<'r> Responder<'r, 'static> for BinaryResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        Response::build()
            .header(self.content_type)
            .raw_header("Cache-Control", "no-store")
            .sized_body(self.data.len(), std::io::Cursor::new(self.data))
            .ok()
    }
}

// ===== Standard response format =====

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TextResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Data,
    Action,
    Error,
}

// Request types with conversation_id support
#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardRequest<T> {
    #[serde(flatten)]
    pub data: T,
    pub conversation_id: Option<String>,
}

pub trait WithConversationId {
    fn conversation_id(&self) -> Option<String>;
}

impl<T> WithConversationId for StandardRequest<T> {
    fn conversation_id(&self) -> Option<String> {
        self.conversation_id.clone()
    }
}

impl TextResponse {
    pub fn success(message: String, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Text,
            success: true,
            message,
            conversation_id,
        }
    }
}

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
            conversation_id,
        }
    }
}

impl ActionResponse {
    pub fn success(message: String, action: String, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Action,
            success: true,
            message,
            action,
            conversation_id,
        }
    }
}

impl StandardErrorResponse {
    pub fn new(
        error: String,
        error_code: String,
        suggestions: Vec<String>,
        conversation_id: Option<String>,
    ) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
            conversation_id,
        }
    }
}

// ===== Errors =====

/// [`AppError`] on its way out: status from the variant, body in the standard format
#[derive(Debug)]
pub struct ApiError {
    pub error: AppError,
    pub conversation_id: Option<String>,
}

impl ApiError {
    pub fn new(error: AppError, conversation_id: Option<String>) -> Self {
        Self {
            error,
            conversation_id,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self::new(error, None)
    }
}

/// Attach the request's conversation id to a failed result
pub trait InConversation<T> {
    fn in_conversation(self, conversation_id: &Option<String>) -> Result<T, ApiError>;
}

impl<T> InConversation<T> for Result<T, AppError> {
    fn in_conversation(self, conversation_id: &Option<String>) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::new(e, conversation_id.clone()))
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = Status::from_code(self.error.status_code()).unwrap_or(Status::InternalServerError);

        if status.code >= 500 {
            error!("{} {} failed: {}", request.method(), request.uri(), self.error);
        } else {
            warn!("{} {} rejected: {}", request.method(), request.uri(), self.error);
        }

        let body = StandardErrorResponse::new(
            self.error.public_message(),
            self.error.code().to_string(),
            self.error.suggestions(),
            self.conversation_id,
        );

        Response::build_from(Json(body).respond_to(request)?)
            .status(status)
            .ok()
    }
}

// ===== Payloads =====

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct UserInfo {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub subscription_level: SubscriptionLevel,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SummaryData {
    pub summary: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct WorkExperienceData {
    pub work_experience: WorkExperience,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SavedResumeData {
    pub id: String,
}

pub type ResumeData = StoredResume;

#[derive(Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct RenderRequest {
    pub container_width: f64,
    #[serde(default)]
    pub values: ResumeValues,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct PreviewSessionData {
    pub session_id: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct PreviewData {
    pub document: PreviewDocument,
    pub html: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct PhotoData {
    pub photo_src: Option<String>,
}

#[derive(FromForm)]
pub struct PhotoUploadForm<'f> {
    pub photo: TempFile<'f>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct PortalSessionData {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_shape() {
        let body = StandardErrorResponse::new(
            "Authentication required".to_string(),
            "UNAUTHORIZED".to_string(),
            vec!["Sign in and try again".to_string()],
            Some("conv-1".to_string()),
        );
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["type"], "error");
        assert_eq!(json["success"], false);
        assert_eq!(json["error_code"], "UNAUTHORIZED");
        assert_eq!(json["conversation_id"], "conv-1");
    }

    #[test]
    fn test_data_response_omits_missing_conversation() {
        let body = DataResponse::success(
            "ok".to_string(),
            SummaryData {
                summary: "text".to_string(),
            },
            None,
        );
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["type"], "data");
        assert_eq!(json["data"]["summary"], "text");
        assert!(json.get("conversation_id").is_none());
    }

    #[test]
    fn test_standard_request_flattens_payload() {
        let request: StandardRequest<crate::validation::GenerateWorkExperienceInput> =
            serde_json::from_str(r#"{"description":"Ran the ops team","conversation_id":"c"}"#)
                .unwrap();
        assert_eq!(request.data.description.as_deref(), Some("Ran the ops team"));
        assert_eq!(request.conversation_id().as_deref(), Some("c"));
    }
}
