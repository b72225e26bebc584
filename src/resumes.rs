// src/resumes.rs
//! Saving and loading resumes on behalf of a caller

use crate::app_log;
use crate::auth::Caller;
use crate::core::database::{ResumeRepository, StoredResume};
use crate::error::AppError;
use crate::subscription::{can_create_resume, can_use_customizations, SubscriptionContext};
use crate::types::ResumeValues;
use crate::validation::Schema;
use sqlx::SqlitePool;

pub struct ResumeService {
    pool: SqlitePool,
}

impl ResumeService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn repo(&self) -> ResumeRepository<'_> {
        ResumeRepository::new(&self.pool)
    }

    /// Validate and persist the whole form; returns the resume id
    pub async fn save_resume(
        &self,
        caller: Option<&Caller>,
        ctx: &SubscriptionContext,
        values: ResumeValues,
    ) -> Result<String, AppError> {
        let caller = caller.ok_or(AppError::Unauthorized)?;
        let values = values.validate()?;
        let level = ctx.level();

        match values.id.as_deref() {
            None => {
                let count = self.repo().count(&caller.user_id).await?;
                if !can_create_resume(level, count) {
                    return Err(AppError::upgrade(
                        "Maximum resume count reached for this subscription level",
                    ));
                }
            }
            Some(id) => {
                if self.repo().get(&caller.user_id, id).await?.is_none() {
                    return Err(AppError::NotFound("Resume".to_string()));
                }
            }
        }

        if values.has_customizations() && !can_use_customizations(level) {
            return Err(AppError::upgrade(
                "Customizations not allowed for this subscription level",
            ));
        }

        match values.id.as_deref() {
            Some(id) => {
                if !self.repo().update(&caller.user_id, id, &values).await? {
                    return Err(AppError::NotFound("Resume".to_string()));
                }
                Ok(id.to_string())
            }
            None => Ok(self.repo().insert(&caller.user_id, &values).await?),
        }
    }

    pub async fn get_resume(&self, caller: Option<&Caller>, id: &str) -> Result<StoredResume, AppError> {
        let caller = caller.ok_or(AppError::Unauthorized)?;
        self.repo()
            .get(&caller.user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Resume".to_string()))
    }

    pub async fn list_resumes(&self, caller: Option<&Caller>) -> Result<Vec<StoredResume>, AppError> {
        let caller = caller.ok_or(AppError::Unauthorized)?;
        Ok(self.repo().list(&caller.user_id).await?)
    }

    pub async fn delete_resume(&self, caller: Option<&Caller>, id: &str) -> Result<(), AppError> {
        let caller = caller.ok_or(AppError::Unauthorized)?;
        if !self.repo().delete(&caller.user_id, id).await? {
            return Err(AppError::NotFound("Resume".to_string()));
        }
        app_log!(info, "User {} deleted resume {}", caller.user_id, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;
    use crate::subscription::SubscriptionLevel;
    use crate::types::{BorderStyle, PhotoFile, PhotoValue};

    async fn service() -> (Database, ResumeService) {
        let db = Database::in_memory().await.unwrap();
        let service = ResumeService::new(db.pool().clone());
        (db, service)
    }

    fn ctx(level: SubscriptionLevel) -> SubscriptionContext {
        SubscriptionContext::new(level)
    }

    fn resume(title: &str) -> ResumeValues {
        ResumeValues {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_free_tier_gets_one_resume() {
        let (_db, service) = service().await;
        let caller = Caller::new("user_1");
        let free = ctx(SubscriptionLevel::Free);

        service
            .save_resume(Some(&caller), &free, resume("First"))
            .await
            .unwrap();
        let err = service
            .save_resume(Some(&caller), &free, resume("Second"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UpgradeRequired(_)));
    }

    #[tokio::test]
    async fn test_updating_does_not_count_against_limit() {
        let (_db, service) = service().await;
        let caller = Caller::new("user_1");
        let free = ctx(SubscriptionLevel::Free);

        let id = service
            .save_resume(Some(&caller), &free, resume("First"))
            .await
            .unwrap();
        let mut edited = resume("Renamed");
        edited.id = Some(id.clone());
        let same = service
            .save_resume(Some(&caller), &free, edited)
            .await
            .unwrap();
        assert_eq!(same, id);

        let stored = service.get_resume(Some(&caller), &id).await.unwrap();
        assert_eq!(stored.values.title.as_deref(), Some("Renamed"));
    }

    #[tokio::test]
    async fn test_customizations_need_pro_plus() {
        let (_db, service) = service().await;
        let caller = Caller::new("user_1");
        let mut values = resume("Styled");
        values.border_style = Some(BorderStyle::Circle);

        let err = service
            .save_resume(Some(&caller), &ctx(SubscriptionLevel::Pro), values.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UpgradeRequired(_)));

        service
            .save_resume(Some(&caller), &ctx(SubscriptionLevel::ProPlus), values)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_values_are_rejected() {
        let (_db, service) = service().await;
        let caller = Caller::new("user_1");
        let mut values = resume("Bad photo");
        values.photo = Some(PhotoValue::File(PhotoFile::new("text/plain", vec![1, 2, 3])));

        let err = service
            .save_resume(Some(&caller), &ctx(SubscriptionLevel::ProPlus), values)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_foreign_resume_is_not_found() {
        let (_db, service) = service().await;
        let owner = Caller::new("owner");
        let other = Caller::new("other");
        let plus = ctx(SubscriptionLevel::ProPlus);

        let id = service
            .save_resume(Some(&owner), &plus, resume("Mine"))
            .await
            .unwrap();

        let mut hijack = resume("Yours now");
        hijack.id = Some(id.clone());
        let err = service
            .save_resume(Some(&other), &plus, hijack)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert!(matches!(
            service.delete_resume(Some(&other), &id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(service.list_resumes(Some(&other)).await.unwrap().is_empty());
        assert_eq!(service.list_resumes(Some(&owner)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_anonymous_caller_is_unauthorized() {
        let (_db, service) = service().await;
        let err = service
            .save_resume(None, &ctx(SubscriptionLevel::ProPlus), resume("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }
}
