//! # Form State Controller
//!
//! Holds everything a rendered form instance keeps between events: the field
//! values, per-field error messages, the image preview, and the submission
//! banner. Input events update one field and clear its error; a submit runs
//! every check and, when they all pass, plays a scripted two-stage timer
//! sequence in place of a network call:
//!
//! ```text
//! submit ──> [submitting] ── submit_delay ──> [success banner] ── reset_delay ──> [empty form]
//! ```
//!
//! Observers follow the status through [`FormController::subscribe`].

use base64::{engine::general_purpose, Engine as _};
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::client::validation::{
    validate_email, validate_image, validate_name, validate_password, ImageFile,
};
use crate::common::clock::{Clock, SystemClock};
use crate::common::constraints::{Category, Preference};
use crate::common::random::{ScoreSource, ThreadRngScores};

/// Form fields that can carry an error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Password,
    Preferences,
    Category,
    Image,
}

/// Free-text inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Name,
    Email,
    Password,
}

impl From<TextField> for Field {
    fn from(field: TextField) -> Self {
        match field {
            TextField::Name => Field::Name,
            TextField::Email => Field::Email,
            TextField::Password => Field::Password,
        }
    }
}

/// A single change event from the form.
#[derive(Debug, Clone, PartialEq)]
pub enum InputChange {
    Text { field: TextField, value: String },
    Preference { preference: Preference, checked: bool },
    Category(Option<Category>),
}

/// Current values of every field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Checked preferences in the order they were checked.
    pub preferences: Vec<Preference>,
    pub category: Option<Category>,
    pub image: Option<ImageFile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerKind {
    Success,
    Error,
}

/// The success/failure message shown above the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    #[serde(rename = "type")]
    pub kind: BannerKind,
    pub message: String,
}

impl Banner {
    fn success(message: &str) -> Self {
        Self {
            kind: BannerKind::Success,
            message: message.to_string(),
        }
    }

    fn error(message: &str) -> Self {
        Self {
            kind: BannerKind::Error,
            message: message.to_string(),
        }
    }
}

/// Submission state published to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormStatus {
    pub is_submitting: bool,
    pub banner: Option<Banner>,
}

/// Delays of the simulated submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormTimings {
    /// Stands in for the network round trip.
    pub submit_delay: Duration,
    /// How long the success banner stays before the form is cleared.
    pub reset_delay: Duration,
}

impl Default for FormTimings {
    fn default() -> Self {
        Self {
            submit_delay: Duration::from_millis(1500),
            reset_delay: Duration::from_millis(2000),
        }
    }
}

/// What a successful submit hands off (and logs).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub name: String,
    pub email: String,
    pub preferences: Vec<Preference>,
    pub category: Option<Category>,
    pub image_uploaded: Option<String>,
    pub timestamp: String,
}

/// Why [`FormController::submit`] did not produce a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("form has {} invalid field(s)", .0.len())]
pub struct FormRejected(pub BTreeMap<Field, String>);

const NAME_ERROR: &str = "Name must be at least 2 characters and contain only letters";
const EMAIL_ERROR: &str = "Please enter a valid email address";
const PASSWORD_ERROR: &str =
    "Password must be 8+ characters with uppercase, lowercase, number, and special character";
const PREFERENCES_ERROR: &str = "Please select at least one preference";
const CATEGORY_ERROR: &str = "Please select a category";
const IMAGE_ERROR: &str = "Please upload an image";
const FIX_ERRORS: &str = "Please fix the errors before submitting";
const SUBMITTED: &str = "Form submitted successfully! Check console for details.";

/// State container for one form instance.
pub struct FormController {
    data: FormData,
    errors: BTreeMap<Field, String>,
    image_preview: Option<String>,
    status: watch::Sender<FormStatus>,
    timings: FormTimings,
    scores: Arc<dyn ScoreSource>,
    clock: Arc<dyn Clock>,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new(
            FormTimings::default(),
            Arc::new(ThreadRngScores),
            Arc::new(SystemClock),
        )
    }
}

impl FormController {
    pub fn new(timings: FormTimings, scores: Arc<dyn ScoreSource>, clock: Arc<dyn Clock>) -> Self {
        let (status, _) = watch::channel(FormStatus::default());
        Self {
            data: FormData::default(),
            errors: BTreeMap::new(),
            image_preview: None,
            status,
            timings,
            scores,
            clock,
        }
    }

    pub fn data(&self) -> &FormData {
        &self.data
    }

    pub fn errors(&self) -> &BTreeMap<Field, String> {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// `data:` URL of the accepted image, if any.
    pub fn image_preview(&self) -> Option<&str> {
        self.image_preview.as_deref()
    }

    pub fn status(&self) -> FormStatus {
        self.status.borrow().clone()
    }

    /// Follow the submission status as it changes.
    pub fn subscribe(&self) -> watch::Receiver<FormStatus> {
        self.status.subscribe()
    }

    /// Apply one input event and clear the touched field's error.
    pub fn handle_input(&mut self, change: InputChange) {
        let field = match change {
            InputChange::Text { field, value } => {
                match field {
                    TextField::Name => self.data.name = value,
                    TextField::Email => self.data.email = value,
                    TextField::Password => self.data.password = value,
                }
                Field::from(field)
            }
            InputChange::Preference {
                preference,
                checked,
            } => {
                if checked {
                    if !self.data.preferences.contains(&preference) {
                        self.data.preferences.push(preference);
                    }
                } else {
                    self.data.preferences.retain(|p| *p != preference);
                }
                Field::Preferences
            }
            InputChange::Category(category) => {
                self.data.category = category;
                Field::Category
            }
        };

        self.errors.remove(&field);
    }

    /// Check a picked image and, if it passes, keep it and build its preview.
    ///
    /// A rejected pick records the image error and drops the preview; an image
    /// accepted earlier stays in the form data.
    pub fn select_image(&mut self, file: ImageFile) -> bool {
        let validation = validate_image(&file, self.scores.as_ref());

        if !validation.is_valid() {
            warn!("Image '{}' rejected: {}", file.name, validation.result.message);
            self.errors.insert(Field::Image, validation.result.message);
            self.image_preview = None;
            return false;
        }

        self.image_preview = Some(preview_data_url(&file));
        self.data.image = Some(file);
        self.errors.remove(&Field::Image);
        true
    }

    /// Run every check, replacing the error set with all failures found.
    pub fn validate_form(&mut self) -> bool {
        let mut errors = BTreeMap::new();

        if !validate_name(&self.data.name).valid {
            errors.insert(Field::Name, NAME_ERROR.to_string());
        }
        if !validate_email(&self.data.email).valid {
            errors.insert(Field::Email, EMAIL_ERROR.to_string());
        }
        if !validate_password(&self.data.password).valid {
            errors.insert(Field::Password, PASSWORD_ERROR.to_string());
        }
        if self.data.preferences.is_empty() {
            errors.insert(Field::Preferences, PREFERENCES_ERROR.to_string());
        }
        if self.data.category.is_none() {
            errors.insert(Field::Category, CATEGORY_ERROR.to_string());
        }
        if self.data.image.is_none() {
            errors.insert(Field::Image, IMAGE_ERROR.to_string());
        }

        self.errors = errors;
        self.errors.is_empty()
    }

    /// Validate and, if everything passes, run the simulated submission.
    ///
    /// Resolves once the form has been reset after the success banner.
    pub async fn submit(&mut self) -> Result<SubmissionPayload, FormRejected> {
        if !self.validate_form() {
            self.publish(false, Some(Banner::error(FIX_ERRORS)));
            return Err(FormRejected(self.errors.clone()));
        }

        self.publish(true, None);
        tokio::time::sleep(self.timings.submit_delay).await;

        let payload = SubmissionPayload {
            name: self.data.name.clone(),
            email: self.data.email.clone(),
            preferences: self.data.preferences.clone(),
            category: self.data.category,
            image_uploaded: self.data.image.as_ref().map(|f| f.name.clone()),
            timestamp: self.clock.timestamp(),
        };

        match serde_json::to_string(&payload) {
            Ok(json) => info!("📨 Form submitted: {}", json),
            Err(e) => info!("📨 Form submitted: {:?} ({})", payload, e),
        }

        self.publish(false, Some(Banner::success(SUBMITTED)));

        tokio::time::sleep(self.timings.reset_delay).await;
        self.reset();

        Ok(payload)
    }

    /// Clear every field, the preview, and the banner.
    pub fn reset(&mut self) {
        self.data = FormData::default();
        self.image_preview = None;
        self.publish(false, None);
    }

    fn publish(&self, is_submitting: bool, banner: Option<Banner>) {
        self.status.send_replace(FormStatus {
            is_submitting,
            banner,
        });
    }
}

fn preview_data_url(file: &ImageFile) -> String {
    format!(
        "data:{};base64,{}",
        file.mime_type,
        general_purpose::STANDARD.encode(&file.bytes)
    )
}
