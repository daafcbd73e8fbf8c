//! Validated buyer email address.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why a string was rejected as an email address.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input was empty or whitespace-only.
    #[error("email is required")]
    Blank,
    /// The input exceeds the RFC 5321 length limit.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The input has no `@`, or nothing on one side of it.
    #[error("email must look like name@domain")]
    Malformed,
}

/// The email an order is attributed to.
///
/// The host application resolves who is signed in; this type only guards the
/// shape of what it hands over. Validation is deliberately shallow (an `@`
/// with something on both sides); the store backend is the authority on
/// deliverability.
///
/// ```
/// use clementine_core::Email;
///
/// assert!(Email::parse("jordan@example.com").is_ok());
/// assert!(Email::parse("  jordan@example.com  ").is_ok()); // trimmed
/// assert!(Email::parse("jordan.example.com").is_err());
/// assert!(Email::parse("@example.com").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Longest accepted address (RFC 5321 path limit).
    pub const MAX_LENGTH: usize = 254;

    /// Parse and normalize an email address.
    ///
    /// Surrounding whitespace is trimmed before any check, matching how
    /// blank-vs-missing is judged elsewhere in checkout input handling.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] when the trimmed input is empty, longer than
    /// [`Self::MAX_LENGTH`], or not of the form `local@domain` with both
    /// parts non-empty.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(EmailError::Blank);
        }
        if trimmed.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        match trimmed.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
                Ok(Self(trimmed.to_owned()))
            }
            _ => Err(EmailError::Malformed),
        }
    }

    /// The normalized address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
