//! Security utilities: secret handling and SQL identifier hygiene.
//!
//! Credentials read from the environment are wrapped in [`SecureString`] so
//! they never show up in `Debug` output or logs and are wiped on drop. Column,
//! table and suite names end up inside generated SQL and file paths, so they
//! go through [`SqlSecurity`] first.

use crate::error::{DigestError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use zeroize::ZeroizeOnDrop;

/// A secure string that automatically clears its contents when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct SecureString(String);

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureString(***)")
    }
}

impl SecureString {
    /// Create a new secure string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the string value. Use carefully and avoid storing the result.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if the wrapped value is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// SQL keywords that may not appear as an identifier segment.
const RESERVED_SEGMENTS: &[&str] = &[
    "union", "select", "insert", "update", "delete", "drop", "create", "alter", "exec",
    "execute", "declare", "truncate", "grant",
];

static IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
    // Letters, digits and underscores; dots separate qualified names.
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*(\.[a-zA-Z_][a-zA-Z0-9_]*)*$")
        .expect("Hard-coded regex pattern should be valid")
});

/// SQL identifier validation and escaping utilities.
pub struct SqlSecurity;

impl SqlSecurity {
    /// Validates and quotes a SQL identifier (column or table name).
    ///
    /// Quoting keeps mixed-case column names such as `Total_Revenue` intact
    /// when the statement runs through DataFusion.
    ///
    /// # Examples
    /// ```rust
    /// use dq_digest::security::SqlSecurity;
    ///
    /// assert_eq!(SqlSecurity::escape_identifier("Order_ID").unwrap(), "\"Order_ID\"");
    /// assert!(SqlSecurity::escape_identifier("id; DROP TABLE users--").is_err());
    /// ```
    pub fn escape_identifier(identifier: &str) -> Result<String> {
        Self::validate_identifier(identifier)?;
        Ok(format!("\"{identifier}\""))
    }

    /// Validates a SQL identifier without quoting it.
    pub fn validate_identifier(identifier: &str) -> Result<()> {
        if identifier.trim().is_empty() {
            return Err(DigestError::SecurityError(
                "SQL identifier cannot be empty or whitespace-only".to_string(),
            ));
        }

        if identifier.len() > 128 {
            return Err(DigestError::SecurityError(
                "SQL identifier too long (max 128 characters)".to_string(),
            ));
        }

        if !IDENTIFIER_REGEX.is_match(identifier) {
            return Err(DigestError::SecurityError(format!(
                "Invalid SQL identifier format: '{identifier}'. Identifiers must start with a letter or underscore and contain only letters, numbers, underscores, and dots"
            )));
        }

        for segment in identifier.split('.') {
            let lower = segment.to_lowercase();
            if RESERVED_SEGMENTS.contains(&lower.as_str()) {
                return Err(DigestError::SecurityError(format!(
                    "SQL identifier contains reserved keyword: '{segment}'"
                )));
            }
        }

        Ok(())
    }

    /// Quotes a string literal for use inside generated SQL.
    pub fn escape_literal(value: &str) -> Result<String> {
        if value.contains('\0') {
            return Err(DigestError::SecurityError(
                "SQL literal cannot contain null bytes".to_string(),
            ));
        }
        Ok(format!("'{}'", value.replace('\'', "''")))
    }
}
