//! # Client Components
//!
//! The form side of the tester, without any rendering:
//!
//! ## Validators ([`validation`])
//! Pure checks for name, email, password and image, each returning a verdict
//! and a message.
//!
//! ## Form Controller ([`form`])
//! Field state, per-field errors, image preview and the simulated submission.

pub mod form;
pub mod validation;

pub use form::{FormController, FormTimings, InputChange};
pub use validation::{validate_email, validate_image, validate_name, validate_password, ValidationResult};
