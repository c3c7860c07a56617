//! # Endpoint Handlers
//!
//! `POST /api/submit-form` re-validates the submission with the server's own
//! copy of the rules and echoes it back; `GET /api/health` reports liveness.

use anyhow::Context;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use log::info;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::common::constraints::{MIN_PASSWORD_CHARS, SERVER_PASSWORD_SPECIALS};
use crate::server::error::ApiError;
use crate::server::state::AppState;
use crate::server::upload::{StoredFile, UploadedForm};

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub data: SubmissionEcho,
}

/// The submission as the server saw it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionEcho {
    pub name: String,
    pub email: String,
    pub category: String,
    pub preferences: Value,
    pub image_validation: Option<ImageReport>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReport {
    pub filename: String,
    pub size: u64,
    pub mimetype: String,
    pub ai_validation: AiValidation,
}

/// Simulated detection results. Only `contains_face` varies.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiValidation {
    pub format: &'static str,
    pub quality: &'static str,
    pub contains_face: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

/// Server email rule: a bare `local@domain.tld` shape with no whitespace and a
/// single `@`. Unlike the client rule, doubled dots pass.
pub fn email_format_ok(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Server password rule: at least eight characters drawn only from ASCII
/// letters, digits and `@$!%*?&`, with a lowercase letter, an uppercase
/// letter, a digit and one of those specials.
pub fn password_format_ok(password: &str) -> bool {
    let is_special = |c: char| SERVER_PASSWORD_SPECIALS.contains(c);

    password.chars().count() >= MIN_PASSWORD_CHARS
        && password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || is_special(c))
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(is_special)
}

/// `preferences` arrives JSON-encoded and is echoed as whatever value it
/// decodes to; absent means an empty array.
fn parse_preferences(raw: Option<&str>) -> anyhow::Result<Value> {
    let raw = raw.unwrap_or("[]");
    serde_json::from_str(raw).with_context(|| format!("invalid preferences payload '{}'", raw))
}

pub async fn submit_form(
    State(state): State<AppState>,
    form: UploadedForm,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4();

    let (Some(name), Some(email), Some(password), Some(category)) = (
        form.text("name"),
        form.text("email"),
        form.text("password"),
        form.text("category"),
    ) else {
        return Err(ApiError::validation("Missing required fields"));
    };

    if !email_format_ok(email) {
        return Err(ApiError::validation("Invalid email format"));
    }

    if !password_format_ok(password) {
        return Err(ApiError::validation("Password does not meet requirements"));
    }

    let preferences = parse_preferences(form.text("preferences"))?;

    let image_validation = form.file.as_ref().map(|file| report(&state, file));

    info!(
        "✅ Submission {} accepted for '{}' <{}> ({}, preferences: {}, image: {})",
        request_id,
        name,
        email,
        category,
        preferences,
        form.file
            .as_ref()
            .map(|f| f.filename.as_str())
            .unwrap_or("none")
    );

    Ok((
        StatusCode::OK,
        Json(SubmitResponse {
            success: true,
            message: "Form submitted successfully".to_string(),
            data: SubmissionEcho {
                name: name.to_string(),
                email: email.to_string(),
                category: category.to_string(),
                preferences,
                image_validation,
                timestamp: state.clock.timestamp(),
            },
        }),
    ))
}

fn report(state: &AppState, file: &StoredFile) -> ImageReport {
    ImageReport {
        filename: file.filename.clone(),
        size: file.size,
        mimetype: file.mimetype.clone(),
        ai_validation: AiValidation {
            format: "valid",
            quality: "high",
            contains_face: state.scores.next_score() > 0.5,
        },
    }
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "OK",
        timestamp: state.clock.timestamp(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_email_format() {
        assert!(email_format_ok("john@example.com"));
        assert!(email_format_ok("a..b@example.com"));
        assert!(!email_format_ok("invalid-email"));
        assert!(!email_format_ok("john@@example.com"));
        assert!(!email_format_ok("john doe@example.com"));
        assert!(!email_format_ok("john@example"));
    }

    #[test]
    fn test_password_format() {
        assert!(password_format_ok("Strong@123"));
        assert!(password_format_ok("Strong@456"));
        assert!(!password_format_ok("weak"));
        assert!(!password_format_ok("strong@123"));
        assert!(!password_format_ok("Strong1234"));
        // '#' is a client special but outside the server's alphabet.
        assert!(!password_format_ok("Strong#123"));
        assert!(!password_format_ok("Strong@123#"));
    }

    #[test]
    fn test_parse_preferences() {
        assert_eq!(parse_preferences(None).unwrap(), json!([]));
        assert_eq!(
            parse_preferences(Some(r#"["Newsletter","Beta Features"]"#)).unwrap(),
            json!(["Newsletter", "Beta Features"])
        );
        assert_eq!(parse_preferences(Some("[1,2]")).unwrap(), json!([1, 2]));
        assert_eq!(
            parse_preferences(Some(r#""Newsletter""#)).unwrap(),
            json!("Newsletter")
        );
        assert!(parse_preferences(Some("not json")).is_err());
    }
}
