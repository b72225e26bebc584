// src/ai/gateway.rs
use super::client::{ChatMessage, CompletionClient, CompletionRequest};
use super::{parser, prompts};
use crate::auth::Caller;
use crate::error::AppError;
use crate::subscription::{can_use_ai_tools, SubscriptionStore};
use crate::types::WorkExperience;
use crate::validation::{GenerateSummaryInput, GenerateWorkExperienceInput, Schema};
use crate::{app_log, app_span};
use std::sync::Arc;
use tracing::Instrument;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const UPGRADE_MESSAGE: &str = "Upgrade your subscription to use this feature";

/// Server-side entry point for the AI tools.
///
/// Identity, tier and input are checked before the completion service is
/// contacted; a rejected request never leaves the process.
pub struct AiGateway {
    client: Arc<dyn CompletionClient>,
    subscriptions: Arc<dyn SubscriptionStore>,
    model: String,
}

impl AiGateway {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        subscriptions: Arc<dyn SubscriptionStore>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            subscriptions,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate_summary(
        &self,
        caller: Option<&Caller>,
        input: GenerateSummaryInput,
    ) -> Result<String, AppError> {
        let caller = self.authorize(caller).await?;
        let input = input.validate()?;

        app_log!(info, "Generating summary for user {}", caller.user_id);

        self.complete(
            prompts::SUMMARY_SYSTEM_PROMPT,
            prompts::summary_user_prompt(&input),
        )
        .instrument(app_span!("generate_summary", user_id = %caller.user_id))
        .await
    }

    pub async fn generate_work_experience(
        &self,
        caller: Option<&Caller>,
        input: GenerateWorkExperienceInput,
    ) -> Result<WorkExperience, AppError> {
        let caller = self.authorize(caller).await?;
        let input = input.validate()?;

        app_log!(info, "Generating work experience for user {}", caller.user_id);

        let text = self
            .complete(
                prompts::WORK_EXPERIENCE_SYSTEM_PROMPT,
                prompts::work_experience_user_prompt(&input),
            )
            .instrument(app_span!("generate_work_experience", user_id = %caller.user_id))
            .await?;

        Ok(parser::parse_work_experience(&text))
    }

    async fn authorize<'a>(&self, caller: Option<&'a Caller>) -> Result<&'a Caller, AppError> {
        let caller = caller.ok_or(AppError::Unauthorized)?;

        let level = self.subscriptions.level_for(&caller.user_id).await?;
        if !can_use_ai_tools(level) {
            app_log!(
                info,
                "User {} on {} plan tried to use AI tools",
                caller.user_id,
                level.as_str()
            );
            return Err(AppError::upgrade(UPGRADE_MESSAGE));
        }

        Ok(caller)
    }

    async fn complete(&self, system: &str, user: String) -> Result<String, AppError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
        };

        match self.client.complete(&request).await {
            Ok(Some(text)) => Ok(text),
            Ok(None) => {
                app_log!(warn, "Completion returned no text");
                Err(AppError::GenerationFailed)
            }
            Err(e) => {
                app_log!(error, "Completion request failed: {:#}", e);
                Err(AppError::CompletionFailed(e.to_string()))
            }
        }
    }
}
