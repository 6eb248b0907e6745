//! String length constraint.
//!
//! Lengths are counted in characters on the VARCHAR rendering of each value,
//! so numeric identifiers are measured by their digits.

use super::count_violations;
use crate::core::{Constraint, ConstraintResult};
use crate::prelude::*;
use crate::security::SqlSecurity;
use async_trait::async_trait;
use datafusion::execution::context::SessionContext;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

/// Types of length assertions that can be made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthAssertion {
    /// Length must be exactly this many characters
    Exactly(usize),
    /// Length must be between min and max (inclusive)
    Between(usize, usize),
}

impl LengthAssertion {
    /// SQL predicate that holds for values breaking the assertion.
    fn violation(&self, length_expr: &str) -> String {
        match self {
            LengthAssertion::Exactly(len) => format!("{length_expr} <> {len}"),
            LengthAssertion::Between(min, max) => {
                format!("({length_expr} < {min} OR {length_expr} > {max})")
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            LengthAssertion::Exactly(_) => "length_equals",
            LengthAssertion::Between(_, _) => "length_between",
        }
    }
}

impl fmt::Display for LengthAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthAssertion::Exactly(len) => write!(f, "exactly {len} characters"),
            LengthAssertion::Between(min, max) => write!(f, "between {min} and {max} characters"),
        }
    }
}

/// Checks the character length of every non-null value.
#[derive(Debug, Clone)]
pub struct LengthConstraint {
    column: String,
    column_identifier: String,
    assertion: LengthAssertion,
}

impl LengthConstraint {
    pub fn new(column: impl Into<String>, assertion: LengthAssertion) -> Result<Self> {
        if let LengthAssertion::Between(min, max) = assertion {
            if min > max {
                return Err(DigestError::Configuration(format!(
                    "length bounds are inverted: {min} > {max}"
                )));
            }
        }
        let column = column.into();
        let column_identifier = SqlSecurity::escape_identifier(&column)?;
        Ok(Self {
            column,
            column_identifier,
            assertion,
        })
    }

    pub fn exactly(column: impl Into<String>, length: usize) -> Result<Self> {
        Self::new(column, LengthAssertion::Exactly(length))
    }

    pub fn between(column: impl Into<String>, min: usize, max: usize) -> Result<Self> {
        Self::new(column, LengthAssertion::Between(min, max))
    }

    pub fn assertion(&self) -> LengthAssertion {
        self.assertion
    }
}

#[async_trait]
impl Constraint for LengthConstraint {
    #[instrument(skip(self, ctx), fields(
        column = %self.column,
        assertion = %self.assertion
    ))]
    async fn evaluate(&self, ctx: &SessionContext) -> Result<ConstraintResult> {
        let column = &self.column_identifier;
        let length_expr = format!("character_length(CAST({column} AS VARCHAR))");
        let violation = format!(
            "{column} IS NOT NULL AND {}",
            self.assertion.violation(&length_expr)
        );

        let counts = count_violations(ctx, &violation).await?;
        Ok(counts.into_result(&format!("are not {}", self.assertion)))
    }

    fn name(&self) -> &str {
        self.assertion.name()
    }

    fn column(&self) -> &str {
        &self.column
    }

    fn description(&self) -> String {
        format!("{} must be {}", self.column, self.assertion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConstraintStatus;
    use crate::test_helpers::{evaluate_constraint_with_context, int_context, string_context};

    #[tokio::test]
    async fn test_exactly_passes() {
        let ctx = string_context("Order_ID", vec![Some("100000001"), Some("123456789")]).await;
        let constraint = LengthConstraint::exactly("Order_ID", 9).unwrap();
        let result = evaluate_constraint_with_context(&constraint, &ctx, "data")
            .await
            .unwrap();
        assert_eq!(result.status, ConstraintStatus::Success);
        assert!(result.observed_value.is_none());
    }

    #[tokio::test]
    async fn test_exactly_fails_on_short_value() {
        let ctx = string_context("Order_ID", vec![Some("100000001"), Some("12345")]).await;
        let constraint = LengthConstraint::exactly("Order_ID", 9).unwrap();
        let result = evaluate_constraint_with_context(&constraint, &ctx, "data")
            .await
            .unwrap();
        assert_eq!(result.status, ConstraintStatus::Failure);
        assert_eq!(result.metric, Some(1.0));
    }

    #[tokio::test]
    async fn test_numeric_column_measured_by_digits() {
        let ctx = int_context("Order_ID", vec![Some(686800706), Some(185941302)]).await;
        let constraint = LengthConstraint::exactly("Order_ID", 9).unwrap();
        let result = evaluate_constraint_with_context(&constraint, &ctx, "data")
            .await
            .unwrap();
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_between_is_inclusive_and_ignores_nulls() {
        let ctx = string_context(
            "Customer_Id",
            vec![Some("A"), Some("DD37Cf93aecA6Dc"), None],
        )
        .await;
        let constraint = LengthConstraint::between("Customer_Id", 1, 15).unwrap();
        let result = evaluate_constraint_with_context(&constraint, &ctx, "data")
            .await
            .unwrap();
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_between_fails_on_long_value() {
        let ctx = string_context("Customer_Id", vec![Some("ABCDEFGHIJKLMNOPQRST")]).await;
        let constraint = LengthConstraint::between("Customer_Id", 1, 15).unwrap();
        let result = evaluate_constraint_with_context(&constraint, &ctx, "data")
            .await
            .unwrap();
        assert_eq!(result.status, ConstraintStatus::Failure);
    }

    #[tokio::test]
    async fn test_multibyte_characters_counted_once() {
        let ctx = string_context("Last_Name", vec![Some("Müller"), Some("José")]).await;
        let constraint = LengthConstraint::between("Last_Name", 4, 6).unwrap();
        let result = evaluate_constraint_with_context(&constraint, &ctx, "data")
            .await
            .unwrap();
        assert!(result.is_success());
    }

    #[test]
    fn test_assertion_display() {
        assert_eq!(LengthAssertion::Exactly(9).to_string(), "exactly 9 characters");
        assert_eq!(
            LengthAssertion::Between(1, 15).to_string(),
            "between 1 and 15 characters"
        );
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        assert!(LengthConstraint::between("Customer_Id", 15, 1).is_err());
    }
}
