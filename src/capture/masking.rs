//! Field masking policy
//!
//! Masking is partial on purpose: non-password values keep their last four
//! characters so operators can tell similar values apart.

use crate::capture::dom::{ElementSnapshot, MASK_ATTRIBUTE};

/// Field-name fragments that mark a field as sensitive
pub const SENSITIVE_KEYWORDS: [&str; 7] = ["password", "pwd", "pass", "credit", "card", "cvv", "ssn"];

/// Replacement for password-typed fields, independent of the real length
pub const PASSWORD_PLACEHOLDER: &str = "********";

/// Replacement for masked values shorter than the visible suffix
pub const SHORT_PLACEHOLDER: &str = "****";

const VISIBLE_SUFFIX: usize = 4;

/// Whether an input's value must be masked before it leaves the client
pub fn should_mask(element: &ElementSnapshot, field_type: &str, field_name: &str) -> bool {
    if field_type == "password" {
        return true;
    }

    let lower_name = field_name.to_lowercase();
    if SENSITIVE_KEYWORDS
        .iter()
        .any(|keyword| lower_name.contains(keyword))
    {
        return true;
    }

    element.has_attribute(MASK_ATTRIBUTE)
}

/// Mask a field value
pub fn mask_value(value: &str, field_type: &str) -> String {
    if field_type == "password" {
        return PASSWORD_PLACEHOLDER.to_string();
    }
    if value.is_empty() {
        return String::new();
    }

    let len = value.chars().count();
    if len >= VISIBLE_SUFFIX {
        let suffix: String = value.chars().skip(len - VISIBLE_SUFFIX).collect();
        format!("{}{}", "*".repeat(len - VISIBLE_SUFFIX), suffix)
    } else {
        SHORT_PLACEHOLDER.to_string()
    }
}
