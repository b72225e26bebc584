// src/types/resume.rs
//! Resume form state as exchanged with the editor and stored in the database

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_COLOR_HEX: &str = "#000000";

/// `Some` and non-empty after trimming
pub fn is_populated(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub title: Option<String>,
    pub description: Option<String>,

    pub photo: Option<PhotoValue>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub job_title: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,

    pub summary: Option<String>,
    #[serde(default)]
    pub work_experiences: Vec<WorkExperience>,
    #[serde(default)]
    pub educations: Vec<Education>,
    pub skills: Option<String>,

    pub color_hex: Option<String>,
    pub border_style: Option<BorderStyle>,
}

impl ResumeValues {
    /// Color or border differ from the defaults every tier gets
    pub fn has_customizations(&self) -> bool {
        let custom_color = self
            .color_hex
            .as_deref()
            .is_some_and(|c| !c.eq_ignore_ascii_case(DEFAULT_COLOR_HEX));
        let custom_border = self
            .border_style
            .is_some_and(|b| b != BorderStyle::default());
        custom_color || custom_border
    }

    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Photo field of the personal-info form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhotoValue {
    /// Previously stored photo
    Url { url: String },
    /// Explicitly removed by the user
    Cleared,
    /// Uploaded but not yet persisted; never travels as JSON
    #[serde(skip)]
    File(PhotoFile),
}

/// An uploaded image held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoFile {
    pub id: Uuid,
    pub mime_type: String,
    pub bytes: Arc<Vec<u8>>,
}

impl PhotoFile {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            mime_type: mime_type.into(),
            bytes: Arc::new(bytes),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    pub position: Option<String>,
    pub company: Option<String>,
    pub start_date: Option<String>,
    /// `None` means the position is current
    pub end_date: Option<String>,
    pub description: Option<String>,
}

impl WorkExperience {
    pub fn is_populated(&self) -> bool {
        [
            &self.position,
            &self.company,
            &self.start_date,
            &self.end_date,
            &self.description,
        ]
        .into_iter()
        .any(is_populated)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub degree: Option<String>,
    pub school: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl Education {
    pub fn is_populated(&self) -> bool {
        [&self.degree, &self.school, &self.start_date, &self.end_date]
            .into_iter()
            .any(is_populated)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    Square,
    Circle,
    #[default]
    Squircle,
}

impl BorderStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Circle => "circle",
            Self::Squircle => "squircle",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "square" => Some(Self::Square),
            "circle" => Some(Self::Circle),
            "squircle" => Some(Self::Squircle),
            _ => None,
        }
    }
}
