// src/web/mod.rs

pub mod cors;
pub mod guards;
pub mod handlers;
pub mod sessions;
pub mod types;

pub use guards::SubscriptionProvider;
pub use handlers::*;
pub use sessions::PreviewSessions;
pub use types::*;

use crate::ai::{AiGateway, OpenAiClient};
use crate::auth::{AuthConfig, AuthenticatedUser, OptionalAuth};
use crate::billing::{BillingService, StripeBilling};
use crate::core::{ConfigManager, Database, SqliteSubscriptionStore};
use crate::error::AppError;
use crate::preview::ObjectUrlStore;
use crate::resumes::ResumeService;
use crate::subscription::{SubscriptionContext, SubscriptionStore};
use crate::types::ResumeValues;
use crate::validation::{GenerateSummaryInput, GenerateWorkExperienceInput, MAX_PHOTO_BYTES};
use anyhow::Result;
use rocket::data::{Limits, ToByteUnit};
use rocket::form::Form;
use rocket::serde::json::Json;
use rocket::{catchers, delete, get, post, put, routes, Build, Rocket, State};
use std::sync::Arc;
use tracing::{error, info};

// ===== AI =====

#[post("/ai/summary", data = "<request>")]
pub async fn generate_summary(
    request: Json<StandardRequest<GenerateSummaryInput>>,
    auth: OptionalAuth,
    gateway: &State<AiGateway>,
) -> Result<Json<DataResponse<SummaryData>>, ApiError> {
    handlers::generate_summary_handler(request, auth, gateway).await
}

#[post("/ai/work-experience", data = "<request>")]
pub async fn generate_work_experience(
    request: Json<StandardRequest<GenerateWorkExperienceInput>>,
    auth: OptionalAuth,
    gateway: &State<AiGateway>,
) -> Result<Json<DataResponse<WorkExperienceData>>, ApiError> {
    handlers::generate_work_experience_handler(request, auth, gateway).await
}

// ===== Resumes =====

#[get("/resumes")]
pub async fn list_resumes(
    auth: OptionalAuth,
    resumes: &State<ResumeService>,
) -> Result<Json<DataResponse<Vec<ResumeData>>>, ApiError> {
    handlers::list_resumes_handler(auth, resumes).await
}

#[get("/resumes/<id>")]
pub async fn get_resume(
    id: &str,
    auth: OptionalAuth,
    resumes: &State<ResumeService>,
) -> Result<Json<DataResponse<ResumeData>>, ApiError> {
    handlers::get_resume_handler(id, auth, resumes).await
}

#[post("/resumes", data = "<request>")]
pub async fn save_resume(
    request: Json<StandardRequest<ResumeValues>>,
    auth: OptionalAuth,
    ctx: Result<SubscriptionContext, AppError>,
    resumes: &State<ResumeService>,
) -> Result<Json<DataResponse<SavedResumeData>>, ApiError> {
    handlers::save_resume_handler(request, auth, ctx, resumes).await
}

#[delete("/resumes/<id>")]
pub async fn delete_resume(
    id: &str,
    auth: OptionalAuth,
    resumes: &State<ResumeService>,
) -> Result<Json<ActionResponse>, ApiError> {
    handlers::delete_resume_handler(id, auth, resumes).await
}

// ===== Preview =====

#[post("/preview/sessions")]
pub async fn open_preview_session(
    auth: OptionalAuth,
    sessions: &State<PreviewSessions>,
) -> Json<DataResponse<PreviewSessionData>> {
    handlers::open_session_handler(auth, sessions).await
}

#[delete("/preview/sessions/<id>")]
pub async fn close_preview_session(
    id: &str,
    auth: OptionalAuth,
    sessions: &State<PreviewSessions>,
) -> Result<Json<ActionResponse>, ApiError> {
    handlers::close_session_handler(id, auth, sessions).await
}

#[post("/preview/sessions/<id>/render", data = "<request>")]
pub async fn render_preview(
    id: &str,
    request: Json<RenderRequest>,
    auth: OptionalAuth,
    sessions: &State<PreviewSessions>,
) -> Result<Json<DataResponse<PreviewData>>, ApiError> {
    handlers::render_preview_handler(id, request, auth, sessions).await
}

#[put("/preview/sessions/<id>/photo", data = "<upload>")]
pub async fn upload_preview_photo(
    id: &str,
    upload: Form<PhotoUploadForm<'_>>,
    auth: OptionalAuth,
    sessions: &State<PreviewSessions>,
) -> Result<Json<DataResponse<PhotoData>>, ApiError> {
    handlers::upload_photo_handler(id, upload, auth, sessions).await
}

#[delete("/preview/sessions/<id>/photo")]
pub async fn clear_preview_photo(
    id: &str,
    auth: OptionalAuth,
    sessions: &State<PreviewSessions>,
) -> Result<Json<DataResponse<PhotoData>>, ApiError> {
    handlers::clear_photo_handler(id, auth, sessions).await
}

#[get("/preview/objects/<id>")]
pub async fn get_preview_object(
    id: &str,
    sessions: &State<PreviewSessions>,
) -> Result<BinaryResponse, ApiError> {
    handlers::get_object_handler(id, sessions).await
}

// ===== Billing =====

#[post("/billing/portal")]
pub async fn create_billing_portal_session(
    auth: OptionalAuth,
    billing: &State<BillingService>,
) -> Result<Json<DataResponse<PortalSessionData>>, ApiError> {
    handlers::create_portal_session_handler(auth, billing).await
}

// ===== System =====

#[get("/me")]
pub async fn get_current_user(
    auth: AuthenticatedUser,
    ctx: Result<SubscriptionContext, AppError>,
) -> Result<Json<DataResponse<UserInfo>>, ApiError> {
    handlers::get_current_user_handler(auth, ctx).await
}

#[get("/health")]
pub async fn health(auth: OptionalAuth) -> Json<TextResponse> {
    handlers::health_handler(auth).await
}

// Error catchers
fn catcher_response(error: &str, code: &str, suggestions: &[&str]) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        error.to_string(),
        code.to_string(),
        suggestions.iter().map(|s| s.to_string()).collect(),
        None,
    ))
}

#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    catcher_response(
        "Invalid request format",
        "BAD_REQUEST",
        &[
            "Check your request JSON format",
            "Verify all required fields are present",
        ],
    )
}

#[rocket::catch(401)]
pub fn unauthorized() -> Json<StandardErrorResponse> {
    catcher_response(
        "Authentication required",
        "UNAUTHORIZED",
        &["Sign in and try again"],
    )
}

#[rocket::catch(404)]
pub fn not_found() -> Json<StandardErrorResponse> {
    catcher_response("Resource not found", "NOT_FOUND", &["Check the request path"])
}

#[rocket::catch(413)]
pub fn payload_too_large() -> Json<StandardErrorResponse> {
    catcher_response(
        "File must be less than 4MB",
        "PAYLOAD_TOO_LARGE",
        &["Upload a smaller image"],
    )
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    catcher_response(
        "Request body could not be parsed",
        "UNPROCESSABLE_ENTITY",
        &["Check the field names and types of your request"],
    )
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    catcher_response(
        "Internal server error",
        "INTERNAL_ERROR",
        &[
            "Try again in a few moments",
            "Contact support if the problem persists",
        ],
    )
}

/// Everything the routes need, already wired
pub struct Services {
    pub auth: AuthConfig,
    pub gateway: AiGateway,
    pub billing: BillingService,
    pub resumes: ResumeService,
    pub subscriptions: Arc<dyn SubscriptionStore>,
    pub objects: Arc<ObjectUrlStore>,
}

pub fn request_limits() -> Limits {
    Limits::default()
        .limit("data-form", 5.mebibytes())
        .limit("file", (MAX_PHOTO_BYTES as u64).bytes())
}

pub fn build_rocket(port: u16, services: Services) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("port", port))
        .merge(("limits", request_limits()));

    rocket::custom(figment)
        .attach(cors::Cors)
        .manage(services.auth)
        .manage(services.gateway)
        .manage(services.billing)
        .manage(services.resumes)
        .manage(SubscriptionProvider::new(services.subscriptions))
        .manage(PreviewSessions::new(services.objects))
        .register(
            "/api",
            catchers![
                bad_request,
                unauthorized,
                not_found,
                payload_too_large,
                unprocessable,
                internal_error
            ],
        )
        .mount(
            "/api",
            routes![
                generate_summary,
                generate_work_experience,
                list_resumes,
                get_resume,
                save_resume,
                delete_resume,
                open_preview_session,
                close_preview_session,
                render_preview,
                upload_preview_photo,
                clear_preview_photo,
                get_preview_object,
                create_billing_portal_session,
                get_current_user,
                health,
                cors::options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(config: ConfigManager) -> Result<()> {
    config.ensure_directories().await?;

    let database = Database::new(&config.environment.database_path).await?;
    let pool = database.pool().clone();

    let mut auth_config = AuthConfig::new(config.auth.project_id.clone());
    if let Err(e) = auth_config.update_public_keys().await {
        error!("Failed to fetch identity provider keys: {}", e);
        return Err(e);
    }

    let subscriptions: Arc<dyn SubscriptionStore> = Arc::new(SqliteSubscriptionStore::new(
        pool.clone(),
        config.billing.prices.clone(),
    ));

    let completion = OpenAiClient::new(config.ai.api_key.clone(), config.ai.base_url.clone())?;
    let gateway = AiGateway::new(
        Arc::new(completion),
        Arc::clone(&subscriptions),
        config.ai.model.clone(),
    );

    let stripe = StripeBilling::new(
        config.billing.secret_key.clone(),
        config.billing.api_url.clone(),
    )?;
    let billing = BillingService::new(
        Arc::new(stripe),
        Arc::clone(&subscriptions),
        config.billing.return_url.clone(),
    );

    let services = Services {
        auth: auth_config,
        gateway,
        billing,
        resumes: ResumeService::new(pool),
        subscriptions,
        objects: ObjectUrlStore::new(),
    };

    info!("Starting resume studio API server on port {}", config.port);

    build_rocket(config.port, services).launch().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{CompletionClient, CompletionRequest};
    use crate::billing::BillingProvider;
    use crate::subscription::SubscriptionLevel;
    use async_trait::async_trait;
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingCompletion {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionClient for CountingCompletion {
        async fn complete(&self, _request: &CompletionRequest) -> anyhow::Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some("A summary".to_string()))
        }
    }

    struct FixedLevel(SubscriptionLevel);

    #[async_trait]
    impl SubscriptionStore for FixedLevel {
        async fn level_for(&self, _user_id: &str) -> anyhow::Result<SubscriptionLevel> {
            Ok(self.0)
        }

        async fn billing_customer(&self, _user_id: &str) -> anyhow::Result<Option<String>> {
            Ok(Some("cus_1".to_string()))
        }
    }

    struct NoBilling;

    #[async_trait]
    impl BillingProvider for NoBilling {
        async fn portal_session_url(&self, _customer: &str, _return_url: &str) -> anyhow::Result<String> {
            anyhow::bail!("not used")
        }
    }

    async fn client_with(completion: Arc<CountingCompletion>) -> Client {
        let db = Database::in_memory().await.unwrap();
        let subscriptions: Arc<dyn SubscriptionStore> =
            Arc::new(FixedLevel(SubscriptionLevel::ProPlus));

        let services = Services {
            auth: AuthConfig::new("test-project".to_string()),
            gateway: AiGateway::new(completion, Arc::clone(&subscriptions), "gpt-4o-mini"),
            billing: BillingService::new(
                Arc::new(NoBilling),
                Arc::clone(&subscriptions),
                "http://localhost/billing",
            ),
            resumes: ResumeService::new(db.pool().clone()),
            subscriptions,
            objects: ObjectUrlStore::new(),
        };

        Client::tracked(build_rocket(0, services)).await.unwrap()
    }

    async fn client() -> Client {
        client_with(Arc::new(CountingCompletion::default())).await
    }

    async fn open_session(client: &Client) -> String {
        let response = client.post("/api/preview/sessions").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body: serde_json::Value = response.into_json().await.unwrap();
        body["data"]["sessionId"].as_str().unwrap().to_string()
    }

    fn multipart_photo(mime: &str, data: &str) -> (ContentType, String) {
        let boundary = "resume-studio-boundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"photo\"\r\n\
             Content-Type: {mime}\r\n\r\n{data}\r\n--{b}--\r\n",
            b = boundary,
            mime = mime,
            data = data
        );
        let content_type =
            ContentType::new("multipart", "form-data").with_params(("boundary", boundary));
        (content_type, body)
    }

    #[rocket::async_test]
    async fn test_health() {
        let client = client().await;
        let response = client.get("/api/health").dispatch().await;

        assert_eq!(response.status(), Status::Ok);
        let body: serde_json::Value = response.into_json().await.unwrap();
        assert_eq!(body["message"], "OK");
    }

    #[rocket::async_test]
    async fn test_ai_without_identity_is_401_and_makes_no_call() {
        let completion = Arc::new(CountingCompletion::default());
        let client = client_with(completion.clone()).await;

        let response = client
            .post("/api/ai/summary")
            .header(ContentType::JSON)
            .body(r#"{"jobTitle":"Engineer","conversation_id":"c-1"}"#)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Unauthorized);
        let body: serde_json::Value = response.into_json().await.unwrap();
        assert_eq!(body["error_code"], "UNAUTHORIZED");
        assert_eq!(body["conversation_id"], "c-1");
        assert_eq!(completion.calls.load(Ordering::SeqCst), 0);
    }

    #[rocket::async_test]
    async fn test_resumes_need_identity() {
        let client = client().await;
        let response = client.get("/api/resumes").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);

        let response = client.get("/api/me").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[rocket::async_test]
    async fn test_render_preview() {
        let client = client().await;
        let session = open_session(&client).await;

        let response = client
            .post(format!("/api/preview/sessions/{}/render", session))
            .header(ContentType::JSON)
            .body(
                r#"{"containerWidth":397,"values":{"firstName":"Ada","lastName":"<Lovelace>",
                    "summary":"Analyst","workExperiences":[{"position":"Engineer","startDate":"2020-01-15"}]}}"#,
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);
        let body: serde_json::Value = response.into_json().await.unwrap();
        let document = &body["data"]["document"];
        assert_eq!(document["page"]["scale"], 0.5);
        assert_eq!(document["visible"], true);
        assert_eq!(
            document["workExperiences"][0]["dateRange"],
            "01/2020 - Present"
        );
        let html = body["data"]["html"].as_str().unwrap();
        assert!(html.contains("&lt;Lovelace&gt;"));
        assert!(html.contains("Professional Profile"));
    }

    #[rocket::async_test]
    async fn test_anonymous_sessions_are_capped() {
        let client = client().await;
        let first = open_session(&client).await;
        for _ in 0..20 {
            open_session(&client).await;
        }

        let sessions = client.rocket().state::<PreviewSessions>().unwrap();
        assert_eq!(sessions.len(), sessions::MAX_SESSIONS_PER_CALLER);

        let (content_type, body) = multipart_photo("image/png", "PNGDATA");
        let response = client
            .put(format!("/api/preview/sessions/{}/photo", first))
            .header(content_type)
            .body(body)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(sessions.store().live_count(), 0);
    }

    #[rocket::async_test]
    async fn test_unknown_session_is_404() {
        let client = client().await;
        let response = client
            .post(format!("/api/preview/sessions/{}/render", uuid::Uuid::new_v4()))
            .header(ContentType::JSON)
            .body(r#"{"containerWidth":794}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn test_photo_object_url_lifecycle() {
        let client = client().await;
        let session = open_session(&client).await;
        let photo_path = format!("/api/preview/sessions/{}/photo", session);

        let (content_type, body) = multipart_photo("image/png", "PNGDATA");
        let response = client
            .put(photo_path.clone())
            .header(content_type)
            .body(body)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let json: serde_json::Value = response.into_json().await.unwrap();
        let src = json["data"]["photoSrc"].as_str().unwrap().to_string();
        assert!(src.starts_with("/api/preview/objects/"));

        let object = client.get(src.clone()).dispatch().await;
        assert_eq!(object.status(), Status::Ok);
        assert_eq!(object.content_type(), Some(ContentType::PNG));
        assert_eq!(object.into_string().await.unwrap(), "PNGDATA");

        let response = client.delete(photo_path).dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let object = client.get(src).dispatch().await;
        assert_eq!(object.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn test_non_image_upload_is_rejected() {
        let client = client().await;
        let session = open_session(&client).await;

        let (content_type, body) = multipart_photo("text/plain", "hello");
        let response = client
            .put(format!("/api/preview/sessions/{}/photo", session))
            .header(content_type)
            .body(body)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
        let json: serde_json::Value = response.into_json().await.unwrap();
        assert_eq!(json["error_code"], "VALIDATION_ERROR");
    }

    #[rocket::async_test]
    async fn test_closing_session_releases_object_url() {
        let client = client().await;
        let session = open_session(&client).await;

        let (content_type, body) = multipart_photo("image/jpeg", "JPEG");
        let response = client
            .put(format!("/api/preview/sessions/{}/photo", session))
            .header(content_type)
            .body(body)
            .dispatch()
            .await;
        let json: serde_json::Value = response.into_json().await.unwrap();
        let src = json["data"]["photoSrc"].as_str().unwrap().to_string();

        let response = client
            .delete(format!("/api/preview/sessions/{}", session))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(client.get(src).dispatch().await.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn test_context_guard_without_provider_fails_loudly() {
        let db = Database::in_memory().await.unwrap();
        let rocket = rocket::build()
            .manage(AuthConfig::new("test-project".to_string()))
            .manage(ResumeService::new(db.pool().clone()))
            .mount("/api", routes![save_resume]);
        let client = Client::tracked(rocket).await.unwrap();

        let response = client
            .post("/api/resumes")
            .header(ContentType::JSON)
            .body(r#"{"title":"Draft"}"#)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::InternalServerError);
        let body: serde_json::Value = response.into_json().await.unwrap();
        assert_eq!(body["error_code"], "CONTEXT_MISSING");
    }
}
