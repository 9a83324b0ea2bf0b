// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::{PlatformError, PlatformResult};
use regex::Regex;

lazy_static::lazy_static! {
    /// Identity document numbers: digits or letters, 3 to 20 characters.
    pub static ref DOCUMENT_NUMBER: Regex = Regex::new(r"^[A-Za-z0-9]{3,20}$")
        .expect("Invalid document number pattern");

    pub static ref EMAIL: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
        .expect("Invalid email pattern");

    /// CUPS procedure codes are six alphanumeric characters.
    pub static ref CUPS_CODE: Regex = Regex::new(r"^[A-Z0-9]{6}$")
        .expect("Invalid CUPS code pattern");

    pub static ref USERNAME: Regex = Regex::new(r"^[a-z0-9._-]{3,32}$")
        .expect("Invalid username pattern");
}

/// Fail with a validation error naming `field` when `value` is blank.
pub fn require_text(field: &str, value: &str) -> PlatformResult<()> {
    if value.trim().is_empty() {
        return Err(PlatformError::Validation(format!("{field} is required")));
    }
    Ok(())
}

pub fn require_match(field: &str, value: &str, pattern: &Regex) -> PlatformResult<()> {
    if !pattern.is_match(value) {
        return Err(PlatformError::Validation(format!(
            "{field} '{value}' has an invalid format"
        )));
    }
    Ok(())
}

pub fn require_positive(field: &str, value: i64) -> PlatformResult<()> {
    if value <= 0 {
        return Err(PlatformError::Validation(format!("{field} must be positive")));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_patterns() {
        assert!(DOCUMENT_NUMBER.is_match("1020304050"));
        assert!(!DOCUMENT_NUMBER.is_match("10-20"));
        assert!(EMAIL.is_match("ana@clinica.co"));
        assert!(!EMAIL.is_match("ana@clinica"));
        assert!(CUPS_CODE.is_match("890201"));
        assert!(!CUPS_CODE.is_match("8902"));
    }

    #[test]
    fn test_require_text_names_field() {
        assert_eq!(
            require_text("reason", "  "),
            Err(PlatformError::Validation("reason is required".to_string()))
        );
    }
}
