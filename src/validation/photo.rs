// src/validation/photo.rs
//! Constraints on uploaded profile photos

use crate::types::{PhotoFile, PhotoValue};

/// 4 MiB
pub const MAX_PHOTO_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoErrorType {
    WrongFormat,
    TooLarge,
}

impl PhotoErrorType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::WrongFormat => "IMAGE_WRONG_FORMAT",
            Self::TooLarge => "IMAGE_TOO_LARGE",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::WrongFormat => "Must be an image file.",
            Self::TooLarge => "File must be less than 4MB",
        }
    }
}

pub struct PhotoValidator;

impl PhotoValidator {
    /// Absent, cleared and already stored photos always pass
    pub fn validate(photo: Option<&PhotoValue>) -> Vec<PhotoErrorType> {
        match photo {
            Some(PhotoValue::File(file)) => Self::validate_file(file),
            _ => Vec::new(),
        }
    }

    pub fn validate_file(file: &PhotoFile) -> Vec<PhotoErrorType> {
        Self::check(&file.mime_type, file.size())
    }

    /// Checks usable before the bytes are read, from the declared type and length
    pub fn check(mime_type: &str, size: usize) -> Vec<PhotoErrorType> {
        let mut errors = Vec::new();

        if !Self::is_image_mime(mime_type) {
            errors.push(PhotoErrorType::WrongFormat);
        }
        if size > MAX_PHOTO_BYTES {
            errors.push(PhotoErrorType::TooLarge);
        }

        errors
    }

    fn is_image_mime(mime_type: &str) -> bool {
        mime_type
            .trim()
            .to_ascii_lowercase()
            .strip_prefix("image/")
            .is_some_and(|subtype| !subtype.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_small_image() {
        let file = PhotoFile::new("image/png", vec![0u8; 1024]);
        assert!(PhotoValidator::validate(Some(&PhotoValue::File(file))).is_empty());
    }

    #[test]
    fn test_accepts_absent_and_stored() {
        assert!(PhotoValidator::validate(None).is_empty());
        assert!(PhotoValidator::validate(Some(&PhotoValue::Cleared)).is_empty());
        let stored = PhotoValue::Url {
            url: "https://cdn.example/p.png".to_string(),
        };
        assert!(PhotoValidator::validate(Some(&stored)).is_empty());
    }

    #[test]
    fn test_rejects_non_image() {
        assert_eq!(
            PhotoValidator::check("application/pdf", 10),
            vec![PhotoErrorType::WrongFormat]
        );
        assert_eq!(
            PhotoValidator::check("image/", 10),
            vec![PhotoErrorType::WrongFormat]
        );
    }

    #[test]
    fn test_size_ceiling_is_inclusive() {
        assert!(PhotoValidator::check("image/jpeg", MAX_PHOTO_BYTES).is_empty());
        assert_eq!(
            PhotoValidator::check("image/jpeg", MAX_PHOTO_BYTES + 1),
            vec![PhotoErrorType::TooLarge]
        );
    }

    #[test]
    fn test_reports_both_violations() {
        let errors = PhotoValidator::check("text/plain", MAX_PHOTO_BYTES * 2);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1].code(), "IMAGE_TOO_LARGE");
    }
}
