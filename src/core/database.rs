// src/core/database.rs
//! SQLite storage for resumes and the local mirror of billing state

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

use crate::app_log;
use crate::subscription::{
    level_from_record, PlanPrices, SubscriptionLevel, SubscriptionRecord, SubscriptionStore,
};
use crate::types::{BorderStyle, Education, PhotoValue, ResumeValues, WorkExperience};

// ===== Core Database Connection Management =====

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database file and run migrations
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", database_path.display()))?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePool::connect_with(options).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        app_log!(
            info,
            "Database connection established: {}",
            database_path.display()
        );

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Private in-memory database, one connection so every query sees the same data
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS resumes (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT,
                description TEXT,
                photo_url TEXT,
                color_hex TEXT NOT NULL DEFAULT '#000000',
                border_style TEXT NOT NULL DEFAULT 'squircle',
                summary TEXT,
                first_name TEXT,
                last_name TEXT,
                job_title TEXT,
                city TEXT,
                country TEXT,
                phone TEXT,
                email TEXT,
                skills TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS work_experiences (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                resume_id TEXT NOT NULL REFERENCES resumes(id) ON DELETE CASCADE,
                sort_order INTEGER NOT NULL,
                position TEXT,
                company TEXT,
                start_date TEXT,
                end_date TEXT,
                description TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS educations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                resume_id TEXT NOT NULL REFERENCES resumes(id) ON DELETE CASCADE,
                sort_order INTEGER NOT NULL,
                degree TEXT,
                school TEXT,
                start_date TEXT,
                end_date TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_subscriptions (
                user_id TEXT PRIMARY KEY,
                stripe_customer_id TEXT UNIQUE,
                stripe_subscription_id TEXT UNIQUE,
                stripe_price_id TEXT,
                stripe_current_period_end TEXT,
                stripe_cancel_at_period_end BOOLEAN NOT NULL DEFAULT FALSE
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_resumes_user_id ON resumes(user_id);")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_work_experiences_resume ON work_experiences(resume_id, sort_order);",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_educations_resume ON educations(resume_id, sort_order);",
        )
        .execute(&self.pool)
        .await?;

        app_log!(info, "Database migrations completed");
        Ok(())
    }
}

// ===== Resume Models =====

#[derive(Debug, sqlx::FromRow)]
struct ResumeRow {
    id: String,
    title: Option<String>,
    description: Option<String>,
    photo_url: Option<String>,
    color_hex: String,
    border_style: String,
    summary: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    job_title: Option<String>,
    city: Option<String>,
    country: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    skills: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

type WorkExperienceRow = (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);
type EducationRow = (Option<String>, Option<String>, Option<String>, Option<String>);

/// A saved resume with its bookkeeping timestamps
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredResume {
    #[serde(flatten)]
    pub values: ResumeValues,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResumeRow {
    fn into_stored(
        self,
        work_experiences: Vec<WorkExperience>,
        educations: Vec<Education>,
    ) -> StoredResume {
        StoredResume {
            values: ResumeValues {
                id: Some(self.id),
                title: self.title,
                description: self.description,
                photo: self.photo_url.map(|url| PhotoValue::Url { url }),
                first_name: self.first_name,
                last_name: self.last_name,
                job_title: self.job_title,
                city: self.city,
                country: self.country,
                phone: self.phone,
                email: self.email,
                summary: self.summary,
                work_experiences,
                educations,
                skills: self.skills,
                color_hex: Some(self.color_hex),
                border_style: Some(BorderStyle::parse(&self.border_style).unwrap_or_default()),
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// How a save affects the stored photo URL
enum PhotoColumn {
    Keep,
    Set(Option<String>),
}

impl PhotoColumn {
    fn from_value(photo: Option<&PhotoValue>) -> Self {
        match photo {
            Some(PhotoValue::Url { url }) => Self::Set(Some(url.clone())),
            Some(PhotoValue::Cleared) => Self::Set(None),
            // in-memory uploads only live in the preview; the stored URL stays
            Some(PhotoValue::File(_)) | None => Self::Keep,
        }
    }
}

const RESUME_COLUMNS: &str = "id, title, description, photo_url, color_hex, border_style, summary, \
     first_name, last_name, job_title, city, country, phone, email, skills, created_at, updated_at";

// ===== Resume Repository =====

pub struct ResumeRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ResumeRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn count(&self, user_id: &str) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM resumes WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Insert a new resume with its entries; returns the generated id
    pub async fn insert(&self, user_id: &str, values: &ResumeValues) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let photo_url = match PhotoColumn::from_value(values.photo.as_ref()) {
            PhotoColumn::Set(url) => url,
            PhotoColumn::Keep => None,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO resumes (id, user_id, title, description, photo_url, color_hex, border_style,
                summary, first_name, last_name, job_title, city, country, phone, email, skills,
                created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&values.title)
        .bind(&values.description)
        .bind(photo_url)
        .bind(color_hex(values))
        .bind(border_style(values))
        .bind(&values.summary)
        .bind(&values.first_name)
        .bind(&values.last_name)
        .bind(&values.job_title)
        .bind(&values.city)
        .bind(&values.country)
        .bind(&values.phone)
        .bind(&values.email)
        .bind(&values.skills)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        replace_entries(&mut tx, &id, values).await?;
        tx.commit().await?;

        app_log!(info, "Created resume {} for user {}", id, user_id);
        Ok(id)
    }

    /// Overwrite a resume owned by `user_id`; `false` when no such resume exists
    pub async fn update(&self, user_id: &str, id: &str, values: &ResumeValues) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<(Option<String>,)> =
            sqlx::query_as("SELECT photo_url FROM resumes WHERE id = ? AND user_id = ?")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((current_photo,)) = existing else {
            tx.rollback().await?;
            return Ok(false);
        };

        let photo_url = match PhotoColumn::from_value(values.photo.as_ref()) {
            PhotoColumn::Set(url) => url,
            PhotoColumn::Keep => current_photo,
        };

        sqlx::query(
            r#"
            UPDATE resumes
            SET title = ?, description = ?, photo_url = ?, color_hex = ?, border_style = ?,
                summary = ?, first_name = ?, last_name = ?, job_title = ?, city = ?, country = ?,
                phone = ?, email = ?, skills = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&values.title)
        .bind(&values.description)
        .bind(photo_url)
        .bind(color_hex(values))
        .bind(border_style(values))
        .bind(&values.summary)
        .bind(&values.first_name)
        .bind(&values.last_name)
        .bind(&values.job_title)
        .bind(&values.city)
        .bind(&values.country)
        .bind(&values.phone)
        .bind(&values.email)
        .bind(&values.skills)
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        replace_entries(&mut tx, id, values).await?;
        tx.commit().await?;

        app_log!(info, "Updated resume {} for user {}", id, user_id);
        Ok(true)
    }

    pub async fn get(&self, user_id: &str, id: &str) -> Result<Option<StoredResume>> {
        let row = sqlx::query_as::<_, ResumeRow>(&format!(
            "SELECT {} FROM resumes WHERE id = ? AND user_id = ?",
            RESUME_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.load_entries(row).await?)),
            None => Ok(None),
        }
    }

    /// Most recently updated first
    pub async fn list(&self, user_id: &str) -> Result<Vec<StoredResume>> {
        let rows = sqlx::query_as::<_, ResumeRow>(&format!(
            "SELECT {} FROM resumes WHERE user_id = ? ORDER BY updated_at DESC, rowid DESC",
            RESUME_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let mut resumes = Vec::with_capacity(rows.len());
        for row in rows {
            resumes.push(self.load_entries(row).await?);
        }
        Ok(resumes)
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM work_experiences WHERE resume_id IN (SELECT id FROM resumes WHERE id = ? AND user_id = ?)",
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "DELETE FROM educations WHERE resume_id IN (SELECT id FROM resumes WHERE id = ? AND user_id = ?)",
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM resumes WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            app_log!(info, "Deleted resume {} for user {}", id, user_id);
        }
        Ok(deleted)
    }

    async fn load_entries(&self, row: ResumeRow) -> Result<StoredResume> {
        let work_experiences = sqlx::query_as::<_, WorkExperienceRow>(
            r#"
            SELECT position, company, start_date, end_date, description
            FROM work_experiences WHERE resume_id = ? ORDER BY sort_order ASC
            "#,
        )
        .bind(&row.id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(
            |(position, company, start_date, end_date, description)| WorkExperience {
                position,
                company,
                start_date,
                end_date,
                description,
            },
        )
        .collect();

        let educations = sqlx::query_as::<_, EducationRow>(
            r#"
            SELECT degree, school, start_date, end_date
            FROM educations WHERE resume_id = ? ORDER BY sort_order ASC
            "#,
        )
        .bind(&row.id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(|(degree, school, start_date, end_date)| Education {
            degree,
            school,
            start_date,
            end_date,
        })
        .collect();

        Ok(row.into_stored(work_experiences, educations))
    }
}

fn color_hex(values: &ResumeValues) -> String {
    values
        .color_hex
        .clone()
        .unwrap_or_else(|| crate::types::DEFAULT_COLOR_HEX.to_string())
}

fn border_style(values: &ResumeValues) -> &'static str {
    values.border_style.unwrap_or_default().as_str()
}

/// Entries are rewritten wholesale; `sort_order` keeps the form's sequence
async fn replace_entries(
    tx: &mut Transaction<'_, Sqlite>,
    resume_id: &str,
    values: &ResumeValues,
) -> Result<()> {
    sqlx::query("DELETE FROM work_experiences WHERE resume_id = ?")
        .bind(resume_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM educations WHERE resume_id = ?")
        .bind(resume_id)
        .execute(&mut **tx)
        .await?;

    for (index, exp) in values.work_experiences.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO work_experiences (resume_id, sort_order, position, company, start_date, end_date, description)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(resume_id)
        .bind(index as i64)
        .bind(&exp.position)
        .bind(&exp.company)
        .bind(&exp.start_date)
        .bind(&exp.end_date)
        .bind(&exp.description)
        .execute(&mut **tx)
        .await?;
    }

    for (index, edu) in values.educations.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO educations (resume_id, sort_order, degree, school, start_date, end_date)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(resume_id)
        .bind(index as i64)
        .bind(&edu.degree)
        .bind(&edu.school)
        .bind(&edu.start_date)
        .bind(&edu.end_date)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

// ===== Subscription Repository =====

pub struct SubscriptionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SubscriptionRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, user_id: &str) -> Result<Option<SubscriptionRecord>> {
        let record = sqlx::query_as::<_, SubscriptionRecord>(
            r#"
            SELECT user_id, stripe_customer_id, stripe_subscription_id, stripe_price_id,
                   stripe_current_period_end, stripe_cancel_at_period_end
            FROM user_subscriptions
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }
}

/// [`SubscriptionStore`] backed by the `user_subscriptions` table
pub struct SqliteSubscriptionStore {
    pool: SqlitePool,
    prices: PlanPrices,
}

impl SqliteSubscriptionStore {
    pub fn new(pool: SqlitePool, prices: PlanPrices) -> Self {
        Self { pool, prices }
    }
}

#[async_trait]
impl SubscriptionStore for SqliteSubscriptionStore {
    async fn level_for(&self, user_id: &str) -> Result<SubscriptionLevel> {
        let record = SubscriptionRepository::new(&self.pool).find(user_id).await?;
        level_from_record(record.as_ref(), &self.prices, Utc::now())
    }

    async fn billing_customer(&self, user_id: &str) -> Result<Option<String>> {
        let record = SubscriptionRepository::new(&self.pool).find(user_id).await?;
        Ok(record.and_then(|r| r.stripe_customer_id))
    }
}
