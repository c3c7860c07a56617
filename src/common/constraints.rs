//! # Submission Constraints
//!
//! The fixed rules a submission is checked against: the category and preference
//! enumerations, the accepted image types, the upload size limit, and the
//! character classes a password is built from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum number of characters in a trimmed name.
pub const MIN_NAME_CHARS: usize = 2;

/// Minimum number of characters in a password.
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Largest accepted image, in bytes (5 MiB).
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Special characters accepted by the client password check.
pub const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Special characters accepted by the server password check.
///
/// The server rule is narrower: the password may only be built from ASCII
/// letters, digits and these characters.
pub const SERVER_PASSWORD_SPECIALS: &str = "@$!%*?&";

/// MIME types the client form accepts for the image field.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/jpg", "image/webp"];

/// Fragments the upload filter looks for in both the MIME type and the file extension.
pub const UPLOAD_TYPE_FRAGMENTS: [&str; 4] = ["jpeg", "jpg", "png", "webp"];

/// Role the submitter picks from the category select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Developer,
    Designer,
    Tester,
    Manager,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Developer,
        Category::Designer,
        Category::Tester,
        Category::Manager,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Developer => "developer",
            Category::Designer => "designer",
            Category::Tester => "tester",
            Category::Manager => "manager",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownOption(s.to_string()))
    }
}

/// An opt-in item from the preference checkboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Preference {
    #[serde(rename = "Newsletter")]
    Newsletter,
    #[serde(rename = "Product Updates")]
    ProductUpdates,
    #[serde(rename = "Beta Features")]
    BetaFeatures,
    #[serde(rename = "Community Events")]
    CommunityEvents,
}

impl Preference {
    pub const ALL: [Preference; 4] = [
        Preference::Newsletter,
        Preference::ProductUpdates,
        Preference::BetaFeatures,
        Preference::CommunityEvents,
    ];

    /// Label shown next to the checkbox and sent over the wire.
    pub fn label(&self) -> &'static str {
        match self {
            Preference::Newsletter => "Newsletter",
            Preference::ProductUpdates => "Product Updates",
            Preference::BetaFeatures => "Beta Features",
            Preference::CommunityEvents => "Community Events",
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Preference {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preference::ALL
            .into_iter()
            .find(|p| p.label() == s)
            .ok_or_else(|| UnknownOption(s.to_string()))
    }
}

/// Returned when a string names no known category or preference.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown option: {0}")]
pub struct UnknownOption(pub String);

/// Whether `c` belongs to the client password special-character set.
pub fn is_password_special(c: char) -> bool {
    PASSWORD_SPECIALS.contains(c)
}

/// Whether `value` contains one of the upload type fragments.
///
/// The check is a substring test, so `image/png` and `.png` both pass.
pub fn mentions_image_type(value: &str) -> bool {
    UPLOAD_TYPE_FRAGMENTS.iter().any(|t| value.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
        assert!("admin".parse::<Category>().is_err());
    }

    #[test]
    fn test_preference_serializes_as_label() {
        let json = serde_json::to_string(&vec![Preference::ProductUpdates, Preference::Newsletter]).unwrap();
        assert_eq!(json, r#"["Product Updates","Newsletter"]"#);
        assert_eq!("Beta Features".parse::<Preference>(), Ok(Preference::BetaFeatures));
    }

    #[test]
    fn test_special_characters() {
        for c in PASSWORD_SPECIALS.chars() {
            assert!(is_password_special(c));
        }
        assert!(!is_password_special('_'));
        assert!(!is_password_special('a'));
    }

    #[test]
    fn test_mentions_image_type() {
        assert!(mentions_image_type("image/png"));
        assert!(mentions_image_type(".jpeg"));
        assert!(!mentions_image_type("image/gif"));
        assert!(!mentions_image_type(""));
    }
}
