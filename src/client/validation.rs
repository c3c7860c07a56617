//! # Field Validators
//!
//! Pure checks for each form field. Every validator returns a
//! [`ValidationResult`] carrying a user-facing message whether or not the value
//! passed, so the form can show feedback either way.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::common::constraints::{
    is_password_special, ALLOWED_IMAGE_TYPES, MAX_IMAGE_BYTES, MIN_NAME_CHARS, MIN_PASSWORD_CHARS,
};
use crate::common::random::ScoreSource;

static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s]+$").expect("name regex is valid"));

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.-]+@[A-Za-z0-9_.-]+\.[A-Za-z]{2,}$").expect("email regex is valid")
});

/// Scores below this are reported as low quality images.
const MIN_QUALITY_SCORE: f64 = 0.1;

/// Scores above this are reported as high quality.
const HIGH_QUALITY_SCORE: f64 = 0.7;

/// Outcome of a single field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: String,
}

impl ValidationResult {
    fn pass(message: &str) -> Self {
        Self {
            valid: true,
            message: message.to_string(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// Name: at least two characters once trimmed, letters and whitespace only.
pub fn validate_name(name: &str) -> ValidationResult {
    if name.trim().chars().count() < MIN_NAME_CHARS {
        return ValidationResult::fail("Name must be at least 2 characters");
    }

    if !NAME_REGEX.is_match(name) {
        return ValidationResult::fail("Name can only contain letters and spaces");
    }

    ValidationResult::pass("Name is valid")
}

/// Email, client rule: a `local@domain.tld` shape with an alphabetic TLD of at
/// least two letters, and none of `..`, `@@`, or a leading/trailing dot.
pub fn validate_email(email: &str) -> ValidationResult {
    if !EMAIL_REGEX.is_match(email) {
        return ValidationResult::fail("Invalid email format");
    }

    let suspicious = email.contains("..")
        || email.contains("@@")
        || email.starts_with('.')
        || email.ends_with('.');

    if suspicious {
        return ValidationResult::fail("Email appears to be invalid or suspicious");
    }

    ValidationResult::pass("Email is valid")
}

/// Password: length and four character classes. A failure message lists every
/// missing requirement in a fixed order.
pub fn validate_password(password: &str) -> ValidationResult {
    let checks = [
        (
            password.chars().count() >= MIN_PASSWORD_CHARS,
            "at least 8 characters",
        ),
        (
            password.chars().any(|c| c.is_ascii_uppercase()),
            "uppercase letter",
        ),
        (
            password.chars().any(|c| c.is_ascii_lowercase()),
            "lowercase letter",
        ),
        (password.chars().any(|c| c.is_ascii_digit()), "number"),
        (
            password.chars().any(is_password_special),
            "special character",
        ),
    ];

    let missing: Vec<&str> = checks
        .iter()
        .filter(|(ok, _)| !ok)
        .map(|(_, label)| *label)
        .collect();

    if !missing.is_empty() {
        return ValidationResult::fail(format!("Password must contain: {}", missing.join(", ")));
    }

    ValidationResult::pass("Password is strong")
}

/// A file picked in the image input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    High,
    Medium,
}

/// Details reported for an image that passed the simulated quality check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub quality: ImageQuality,
    pub estimated_size: u64,
    pub format: String,
}

/// Result of [`validate_image`]: the field verdict plus metadata on success.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageValidation {
    #[serde(flatten)]
    pub result: ValidationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_metadata: Option<ImageMetadata>,
}

impl ImageValidation {
    pub fn is_valid(&self) -> bool {
        self.result.valid
    }

    fn rejected(message: &str) -> Self {
        Self {
            result: ValidationResult::fail(message),
            ai_metadata: None,
        }
    }
}

/// Image: MIME whitelist, then the size limit, then a simulated quality score.
///
/// The score is drawn from `scores` only once the first two checks pass; about
/// one in ten otherwise valid images is rejected when the source is random.
pub fn validate_image(file: &ImageFile, scores: &dyn ScoreSource) -> ImageValidation {
    if !ALLOWED_IMAGE_TYPES.contains(&file.mime_type.as_str()) {
        return ImageValidation::rejected("Only JPG, PNG, and WebP images are allowed");
    }

    if file.size() > MAX_IMAGE_BYTES {
        return ImageValidation::rejected("Image must be less than 5MB");
    }

    let score = scores.next_score();
    if score < MIN_QUALITY_SCORE {
        return ImageValidation::rejected("Image quality is too low");
    }

    ImageValidation {
        result: ValidationResult::pass("Image is valid"),
        ai_metadata: Some(ImageMetadata {
            quality: if score > HIGH_QUALITY_SCORE {
                ImageQuality::High
            } else {
                ImageQuality::Medium
            },
            estimated_size: file.size(),
            format: file.mime_type.clone(),
        }),
    }
}
