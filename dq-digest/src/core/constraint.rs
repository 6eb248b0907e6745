//! The executable side of a rule.

use crate::prelude::*;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;

/// Outcome of evaluating one constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintStatus {
    Success,
    Failure,
}

impl ConstraintStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ConstraintStatus::Success)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ConstraintStatus::Failure)
    }
}

/// The result of evaluating a constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintResult {
    pub status: ConstraintStatus,
    /// Number of rows that broke the rule, where the rule counts rows.
    pub metric: Option<f64>,
    /// Value reported back to the reader, if the rule produces one.
    pub observed_value: Option<Value>,
    /// Short explanation for failures.
    pub message: Option<String>,
}

impl ConstraintResult {
    pub fn success() -> Self {
        Self {
            status: ConstraintStatus::Success,
            metric: None,
            observed_value: None,
            message: None,
        }
    }

    /// A pass or fail decided by counting offending rows.
    pub fn from_unexpected_count(unexpected: i64, total: i64, what: &str) -> Self {
        if unexpected == 0 {
            Self {
                metric: Some(0.0),
                ..Self::success()
            }
        } else {
            Self {
                status: ConstraintStatus::Failure,
                metric: Some(unexpected as f64),
                observed_value: None,
                message: Some(format!("{unexpected} of {total} rows {what}")),
            }
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: ConstraintStatus::Failure,
            metric: None,
            observed_value: None,
            message: Some(message.into()),
        }
    }

    /// Attaches an observed value to this result.
    pub fn with_observed_value(mut self, value: impl Into<Value>) -> Self {
        self.observed_value = Some(value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// A per-column check that runs against a registered table.
///
/// Implementations read the table name from
/// [`current_validation_context`](super::current_validation_context), so the
/// same constraint can be evaluated against any dataset.
#[async_trait]
pub trait Constraint: Debug + Send + Sync {
    /// Evaluates the constraint against the data in the session context.
    ///
    /// Errors mean the check could not be computed at all (missing column,
    /// failed query); a rule that simply does not hold is a `Failure` result.
    async fn evaluate(&self, ctx: &SessionContext) -> Result<ConstraintResult>;

    /// Returns the name of the constraint.
    fn name(&self) -> &str;

    /// Returns the column this constraint operates on.
    fn column(&self) -> &str;

    /// Returns a description of what this constraint validates.
    fn description(&self) -> String;
}

/// A boxed constraint for use in collections.
pub type BoxedConstraint = Box<dyn Constraint>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_count_zero_is_success() {
        let result = ConstraintResult::from_unexpected_count(0, 10, "are null");
        assert!(result.is_success());
        assert_eq!(result.metric, Some(0.0));
        assert!(result.message.is_none());
        assert!(result.observed_value.is_none());
    }

    #[test]
    fn test_unexpected_count_reports_rows() {
        let result = ConstraintResult::from_unexpected_count(2, 3, "are null");
        assert_eq!(result.status, ConstraintStatus::Failure);
        assert_eq!(result.metric, Some(2.0));
        assert_eq!(result.message.as_deref(), Some("2 of 3 rows are null"));
    }

    #[test]
    fn test_observed_value_builder() {
        let result = ConstraintResult::success().with_observed_value("VARCHAR");
        assert_eq!(result.observed_value, Some(Value::from("VARCHAR")));

        let failure = ConstraintResult::failure("wrong type").with_observed_value("INTEGER");
        assert!(failure.status.is_failure());
        assert_eq!(failure.message.as_deref(), Some("wrong type"));
    }
}
