// src/validation/mod.rs
//! Form schemas: trim and normalize every section, reject what violates a constraint

pub mod photo;

pub use photo::{PhotoErrorType, PhotoValidator, MAX_PHOTO_BYTES};

use crate::error::ValidationError;
use crate::types::{Education, PhotoValue, ResumeValues, WorkExperience};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const MIN_WORK_DESCRIPTION_CHARS: usize = 20;

static COLOR_HEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid regex"));

/// `#rgb` or `#rrggbb`
pub fn is_hex_color(value: &str) -> bool {
    COLOR_HEX.is_match(value)
}

/// A schema either returns the normalized record or every violation at once
pub trait Schema: Sized {
    type Output;

    fn validate(self) -> Result<Self::Output, ValidationError>;
}

/// Trimmed value, or `None` when nothing is left
pub fn optional_string(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

// ===== Sections =====

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralInfoValues {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl Schema for GeneralInfoValues {
    type Output = Self;

    fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            title: optional_string(self.title),
            description: optional_string(self.description),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonalInfoValues {
    pub photo: Option<PhotoValue>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub job_title: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Schema for PersonalInfoValues {
    type Output = Self;

    fn validate(self) -> Result<Self, ValidationError> {
        let mut errors = ValidationError::new();
        for photo_error in PhotoValidator::validate(self.photo.as_ref()) {
            errors.push("photo", photo_error.message());
        }

        let photo = match self.photo {
            Some(PhotoValue::Url { url }) => match optional_string(Some(url)) {
                Some(url) => Some(PhotoValue::Url { url }),
                None => Some(PhotoValue::Cleared),
            },
            other => other,
        };

        errors.into_result(Self {
            photo,
            first_name: optional_string(self.first_name),
            last_name: optional_string(self.last_name),
            job_title: optional_string(self.job_title),
            city: optional_string(self.city),
            country: optional_string(self.country),
            phone: optional_string(self.phone),
            email: optional_string(self.email),
        })
    }
}

impl Schema for WorkExperience {
    type Output = Self;

    fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            position: optional_string(self.position),
            company: optional_string(self.company),
            start_date: optional_string(self.start_date),
            end_date: optional_string(self.end_date),
            description: optional_string(self.description),
        })
    }
}

impl Schema for Education {
    type Output = Self;

    fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            degree: optional_string(self.degree),
            school: optional_string(self.school),
            start_date: optional_string(self.start_date),
            end_date: optional_string(self.end_date),
        })
    }
}

/// Validate each entry, reporting violations as `<field>[<index>].<entry field>`
fn validate_entries<T: Schema>(
    field: &str,
    entries: Vec<T>,
    errors: &mut ValidationError,
) -> Vec<T::Output> {
    let mut out = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match entry.validate() {
            Ok(entry) => out.push(entry),
            Err(e) => errors.absorb(&format!("{}[{}]", field, index), e),
        }
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperienceSection {
    #[serde(default)]
    pub work_experiences: Vec<WorkExperience>,
}

impl Schema for WorkExperienceSection {
    type Output = Self;

    fn validate(self) -> Result<Self, ValidationError> {
        let mut errors = ValidationError::new();
        let work_experiences =
            validate_entries("workExperiences", self.work_experiences, &mut errors);
        errors.into_result(Self { work_experiences })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationSection {
    #[serde(default)]
    pub educations: Vec<Education>,
}

impl Schema for EducationSection {
    type Output = Self;

    fn validate(self) -> Result<Self, ValidationError> {
        let mut errors = ValidationError::new();
        let educations = validate_entries("educations", self.educations, &mut errors);
        errors.into_result(Self { educations })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillsValues {
    pub skills: Option<String>,
}

impl Schema for SkillsValues {
    type Output = Self;

    fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            skills: optional_string(self.skills),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryValues {
    pub summary: Option<String>,
}

impl Schema for SummaryValues {
    type Output = Self;

    fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            summary: optional_string(self.summary),
        })
    }
}

// ===== Whole resume =====

impl Schema for ResumeValues {
    type Output = Self;

    fn validate(self) -> Result<Self, ValidationError> {
        let mut errors = ValidationError::new();

        let general = GeneralInfoValues {
            title: self.title,
            description: self.description,
        }
        .validate();
        let personal = PersonalInfoValues {
            photo: self.photo,
            first_name: self.first_name,
            last_name: self.last_name,
            job_title: self.job_title,
            city: self.city,
            country: self.country,
            phone: self.phone,
            email: self.email,
        }
        .validate();
        let work = WorkExperienceSection {
            work_experiences: self.work_experiences,
        }
        .validate();
        let education = EducationSection {
            educations: self.educations,
        }
        .validate();
        let skills = SkillsValues {
            skills: self.skills,
        }
        .validate();
        let summary = SummaryValues {
            summary: self.summary,
        }
        .validate();

        let color_hex = optional_string(self.color_hex);
        if let Some(color) = &color_hex {
            if !is_hex_color(color) {
                errors.push("colorHex", "Must be a hex color like #1273de");
            }
        }

        // Collect everything before bailing so the client sees all violations
        let general = general.map_err(|e| errors.violations.extend(e.violations)).ok();
        let personal = personal.map_err(|e| errors.violations.extend(e.violations)).ok();
        let work = work.map_err(|e| errors.violations.extend(e.violations)).ok();
        let education = education.map_err(|e| errors.violations.extend(e.violations)).ok();
        let skills = skills.map_err(|e| errors.violations.extend(e.violations)).ok();
        let summary = summary.map_err(|e| errors.violations.extend(e.violations)).ok();

        match (general, personal, work, education, skills, summary) {
            (Some(general), Some(personal), Some(work), Some(education), Some(skills), Some(summary))
                if errors.is_empty() =>
            {
                Ok(ResumeValues {
                    id: optional_string(self.id),
                    title: general.title,
                    description: general.description,
                    photo: personal.photo,
                    first_name: personal.first_name,
                    last_name: personal.last_name,
                    job_title: personal.job_title,
                    city: personal.city,
                    country: personal.country,
                    phone: personal.phone,
                    email: personal.email,
                    summary: summary.summary,
                    work_experiences: work.work_experiences,
                    educations: education.educations,
                    skills: skills.skills,
                    color_hex,
                    border_style: self.border_style,
                })
            }
            _ => Err(errors),
        }
    }
}

// ===== AI inputs =====

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSummaryInput {
    pub job_title: Option<String>,
    #[serde(default)]
    pub work_experiences: Vec<WorkExperience>,
    #[serde(default)]
    pub educations: Vec<Education>,
    pub skills: Option<String>,
}

impl From<&ResumeValues> for GenerateSummaryInput {
    fn from(values: &ResumeValues) -> Self {
        Self {
            job_title: values.job_title.clone(),
            work_experiences: values.work_experiences.clone(),
            educations: values.educations.clone(),
            skills: values.skills.clone(),
        }
    }
}

impl Schema for GenerateSummaryInput {
    type Output = Self;

    fn validate(self) -> Result<Self, ValidationError> {
        let mut errors = ValidationError::new();
        let work_experiences =
            validate_entries("workExperiences", self.work_experiences, &mut errors);
        let educations = validate_entries("educations", self.educations, &mut errors);

        errors.into_result(Self {
            job_title: optional_string(self.job_title),
            work_experiences,
            educations,
            skills: optional_string(self.skills),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateWorkExperienceInput {
    pub description: Option<String>,
}

/// Validated form of [`GenerateWorkExperienceInput`]
#[derive(Debug, Clone, PartialEq)]
pub struct WorkExperienceDescription {
    pub description: String,
}

impl Schema for GenerateWorkExperienceInput {
    type Output = WorkExperienceDescription;

    fn validate(self) -> Result<WorkExperienceDescription, ValidationError> {
        match optional_string(self.description) {
            None => Err(ValidationError::single("description", "Required")),
            Some(d) if d.chars().count() < MIN_WORK_DESCRIPTION_CHARS => Err(
                ValidationError::single(
                    "description",
                    format!("Must be at least {} characters", MIN_WORK_DESCRIPTION_CHARS),
                ),
            ),
            Some(description) => Ok(WorkExperienceDescription { description }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BorderStyle, PhotoFile};

    fn photo_file(mime: &str, size: usize) -> Option<PhotoValue> {
        Some(PhotoValue::File(PhotoFile::new(mime, vec![0u8; size])))
    }

    #[test]
    fn test_optional_string_trims_and_drops_empty() {
        assert_eq!(optional_string(Some("  Rust  ".to_string())), Some("Rust".to_string()));
        assert_eq!(optional_string(Some("   ".to_string())), None);
        assert_eq!(optional_string(None), None);
    }

    #[test]
    fn test_personal_info_rejects_non_image_photo() {
        let input = PersonalInfoValues {
            photo: photo_file("application/pdf", 100),
            first_name: Some("Ada".to_string()),
            ..Default::default()
        };

        let err = input.validate().unwrap_err();
        assert!(err.has_field("photo"));
        assert_eq!(err.violations[0].message, "Must be an image file.");
    }

    #[test]
    fn test_personal_info_rejects_oversized_photo() {
        let input = PersonalInfoValues {
            photo: photo_file("image/png", MAX_PHOTO_BYTES + 1),
            ..Default::default()
        };

        let err = input.validate().unwrap_err();
        assert_eq!(err.violations[0].message, "File must be less than 4MB");
    }

    #[test]
    fn test_personal_info_accepts_absent_and_small_photo() {
        assert!(PersonalInfoValues::default().validate().is_ok());

        let ok = PersonalInfoValues {
            photo: photo_file("image/jpeg", 2048),
            city: Some(" Berlin ".to_string()),
            phone: Some("".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(ok.city.as_deref(), Some("Berlin"));
        assert_eq!(ok.phone, None);
    }

    #[test]
    fn test_blank_photo_url_becomes_cleared() {
        let ok = PersonalInfoValues {
            photo: Some(PhotoValue::Url { url: "  ".to_string() }),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(ok.photo, Some(PhotoValue::Cleared));
    }

    #[test]
    fn test_resume_validation_is_all_or_nothing() {
        let values = ResumeValues {
            first_name: Some("  Ada ".to_string()),
            photo: photo_file("text/html", 10),
            color_hex: Some("blue".to_string()),
            ..Default::default()
        };

        let err = values.validate().unwrap_err();
        assert!(err.has_field("photo"));
        assert!(err.has_field("colorHex"));
        assert_eq!(err.violations.len(), 2);
    }

    #[test]
    fn test_resume_validation_normalizes_nested_entries() {
        let values = ResumeValues {
            work_experiences: vec![WorkExperience {
                position: Some(" Engineer ".to_string()),
                end_date: Some("".to_string()),
                ..Default::default()
            }],
            educations: vec![Education {
                school: Some("  ".to_string()),
                ..Default::default()
            }],
            color_hex: Some("#1273de".to_string()),
            border_style: Some(BorderStyle::Circle),
            ..Default::default()
        };

        let ok = values.validate().unwrap();
        assert_eq!(ok.work_experiences[0].position.as_deref(), Some("Engineer"));
        assert_eq!(ok.work_experiences[0].end_date, None);
        assert_eq!(ok.educations.len(), 1);
        assert_eq!(ok.educations[0].school, None);
        assert_eq!(ok.border_style, Some(BorderStyle::Circle));
    }

    #[test]
    fn test_work_experience_description_constraints() {
        let missing = GenerateWorkExperienceInput { description: None }.validate();
        assert!(missing.unwrap_err().has_field("description"));

        let short = GenerateWorkExperienceInput {
            description: Some("   too short     ".to_string()),
        }
        .validate();
        assert_eq!(
            short.unwrap_err().violations[0].message,
            "Must be at least 20 characters"
        );

        let ok = GenerateWorkExperienceInput {
            description: Some("  Built payment systems at Acme for five years ".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.description, "Built payment systems at Acme for five years");
    }

    #[test]
    fn test_summary_input_from_resume() {
        let values = ResumeValues {
            job_title: Some("Engineer".to_string()),
            skills: Some(" Rust, SQL ".to_string()),
            ..Default::default()
        };
        let input = GenerateSummaryInput::from(&values).validate().unwrap();
        assert_eq!(input.job_title.as_deref(), Some("Engineer"));
        assert_eq!(input.skills.as_deref(), Some("Rust, SQL"));
    }
}
