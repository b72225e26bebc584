// src/web/handlers/preview_handlers.rs
use crate::app_log;
use crate::auth::OptionalAuth;
use crate::error::{AppError, ValidationError};
use crate::preview::{html::render_html, render_preview};
use crate::types::{PhotoFile, PhotoValue};
use crate::validation::PhotoValidator;
use crate::web::sessions::PreviewSessions;
use crate::web::types::{
    ActionResponse, ApiError, BinaryResponse, DataResponse, PhotoData, PhotoUploadForm,
    PreviewData, PreviewSessionData, RenderRequest,
};

use anyhow::Context;
use rocket::form::Form;
use rocket::http::ContentType;
use rocket::serde::json::Json;
use rocket::State;
use tokio::io::AsyncReadExt;
use uuid::Uuid;

fn session_not_found() -> AppError {
    AppError::NotFound("Preview session".to_string())
}

fn parse_id(id: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::NotFound(what.to_string()))
}

fn owner(auth: &OptionalAuth) -> Option<&str> {
    auth.caller().map(|caller| caller.user_id.as_str())
}

pub async fn open_session_handler(
    auth: OptionalAuth,
    sessions: &State<PreviewSessions>,
) -> Json<DataResponse<PreviewSessionData>> {
    let id = sessions.open(owner(&auth));
    app_log!(debug, "Opened preview session {}", id);

    Json(DataResponse::success(
        "Preview session opened".to_string(),
        PreviewSessionData {
            session_id: id.to_string(),
        },
        None,
    ))
}

pub async fn close_session_handler(
    id: &str,
    auth: OptionalAuth,
    sessions: &State<PreviewSessions>,
) -> Result<Json<ActionResponse>, ApiError> {
    let session_id = parse_id(id, "Preview session")?;
    if !sessions.close(owner(&auth), &session_id) {
        return Err(session_not_found().into());
    }

    Ok(Json(ActionResponse::success(
        "Preview session closed".to_string(),
        "closed".to_string(),
        None,
    )))
}

pub async fn render_preview_handler(
    id: &str,
    request: Json<RenderRequest>,
    auth: OptionalAuth,
    sessions: &State<PreviewSessions>,
) -> Result<Json<DataResponse<PreviewData>>, ApiError> {
    let session_id = parse_id(id, "Preview session")?;
    let RenderRequest {
        container_width,
        values,
    } = request.into_inner();

    let photo_src = sessions
        .resolve_photo(owner(&auth), &session_id, values.photo.clone())
        .ok_or_else(session_not_found)?;

    let document = render_preview(&values, container_width, photo_src.as_deref());
    let html = render_html(&document);

    Ok(Json(DataResponse::success(
        "Preview rendered".to_string(),
        PreviewData { document, html },
        None,
    )))
}

pub async fn upload_photo_handler(
    id: &str,
    upload: Form<PhotoUploadForm<'_>>,
    auth: OptionalAuth,
    sessions: &State<PreviewSessions>,
) -> Result<Json<DataResponse<PhotoData>>, ApiError> {
    let session_id = parse_id(id, "Preview session")?;

    let mime_type = upload
        .photo
        .content_type()
        .map(|ct| format!("{}/{}", ct.top(), ct.sub()))
        .unwrap_or_default();

    let errors = PhotoValidator::check(&mime_type, upload.photo.len() as usize);
    if !errors.is_empty() {
        let mut violations = ValidationError::new();
        for error in errors {
            violations.push("photo", error.message());
        }
        return Err(AppError::Validation(violations).into());
    }

    let mut bytes = Vec::new();
    let reader = upload
        .photo
        .open()
        .await
        .context("Failed to open uploaded photo")
        .map_err(AppError::Internal)?;
    Box::pin(reader)
        .read_to_end(&mut bytes)
        .await
        .context("Failed to read uploaded photo")
        .map_err(AppError::Internal)?;

    let photo = PhotoValue::File(PhotoFile::new(mime_type, bytes));
    let photo_src = sessions
        .resolve_photo(owner(&auth), &session_id, Some(photo))
        .ok_or_else(session_not_found)?;

    app_log!(info, "Photo attached to preview session {}", session_id);

    Ok(Json(DataResponse::success(
        "Photo attached".to_string(),
        PhotoData { photo_src },
        None,
    )))
}

pub async fn clear_photo_handler(
    id: &str,
    auth: OptionalAuth,
    sessions: &State<PreviewSessions>,
) -> Result<Json<DataResponse<PhotoData>>, ApiError> {
    let session_id = parse_id(id, "Preview session")?;
    let photo_src = sessions
        .resolve_photo(owner(&auth), &session_id, Some(PhotoValue::Cleared))
        .ok_or_else(session_not_found)?;

    Ok(Json(DataResponse::success(
        "Photo removed".to_string(),
        PhotoData { photo_src },
        None,
    )))
}

pub async fn get_object_handler(
    id: &str,
    sessions: &State<PreviewSessions>,
) -> Result<BinaryResponse, ApiError> {
    let object_id = parse_id(id, "Object")?;
    let object = sessions
        .store()
        .get(&object_id)
        .ok_or_else(|| AppError::NotFound("Object".to_string()))?;

    Ok(BinaryResponse {
        content_type: ContentType::parse_flexible(&object.mime_type).unwrap_or(ContentType::Binary),
        data: object.bytes.as_ref().clone(),
    })
}
