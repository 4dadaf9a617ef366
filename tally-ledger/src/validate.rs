//! Input-shape validation for registration fields

use crate::error::{Error, Result};
use regex::Regex;

/// Compiled validation patterns
///
/// Built once and owned by the engine; every check returns
/// [`Error::Validation`] naming the offending field.
pub struct Validator {
    /// Regex for email (`local@domain.tld` shape)
    email_regex: Regex,

    /// Regex for phone numbers (`+` optional, 2-15 digits, no leading zero)
    phone_regex: Regex,
}

impl Validator {
    /// Create new validator
    pub fn new() -> Self {
        let email_regex = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
        let phone_regex = Regex::new(r"^\+?[1-9]\d{1,14}$").unwrap();

        Self {
            email_regex,
            phone_regex,
        }
    }

    /// Validate a display-name field is non-empty after trimming
    pub fn validate_name(&self, field: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(Error::Validation(format!("{} must not be empty", field)));
        }
        Ok(())
    }

    /// Validate email shape
    pub fn validate_email(&self, email: &str) -> Result<()> {
        if !self.email_regex.is_match(email) {
            return Err(Error::Validation(format!(
                "Invalid email format: {}",
                email
            )));
        }
        Ok(())
    }

    /// Validate phone number shape
    pub fn validate_phone(&self, phone: &str) -> Result<()> {
        if !self.phone_regex.is_match(phone) {
            return Err(Error::Validation(format!(
                "Invalid phone number format: {}",
                phone
            )));
        }
        Ok(())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
