//! Not-null constraint.

use super::count_violations;
use crate::core::{Constraint, ConstraintResult};
use crate::prelude::*;
use crate::security::SqlSecurity;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use tracing::{debug, instrument};

/// Fails if any value in the column is null.
///
/// # Examples
///
/// ```rust
/// use dq_digest::constraints::NotNullConstraint;
///
/// let constraint = NotNullConstraint::new("Total_Cost").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct NotNullConstraint {
    column: String,
    column_identifier: String,
}

impl NotNullConstraint {
    pub fn new(column: impl Into<String>) -> Result<Self> {
        let column = column.into();
        let column_identifier = SqlSecurity::escape_identifier(&column)?;
        Ok(Self {
            column,
            column_identifier,
        })
    }
}

#[async_trait]
impl Constraint for NotNullConstraint {
    #[instrument(skip(self, ctx), fields(constraint.name = %self.name(), constraint.column = %self.column))]
    async fn evaluate(&self, ctx: &SessionContext) -> Result<ConstraintResult> {
        let counts = count_violations(ctx, &format!("{} IS NULL", self.column_identifier)).await?;
        debug!(
            data.rows = counts.total,
            data.nulls = counts.unexpected,
            "Counted nulls"
        );
        Ok(counts.into_result("are null"))
    }

    fn name(&self) -> &str {
        "not_null"
    }

    fn column(&self) -> &str {
        &self.column
    }

    fn description(&self) -> String {
        format!("{} must not contain nulls", self.column)
    }
}
