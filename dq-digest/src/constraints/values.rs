//! Value constraints: numeric ranges and set membership.

use super::count_violations;
use crate::core::{Constraint, ConstraintResult};
use crate::prelude::*;
use crate::security::SqlSecurity;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use tracing::instrument;

/// Checks that every non-null value lies within inclusive bounds.
///
/// Either bound may be open. Values are compared as `DOUBLE`, so integer and
/// decimal columns are handled alike; a column whose values cannot be cast
/// makes the evaluation fail.
///
/// # Examples
///
/// ```rust
/// use dq_digest::constraints::RangeConstraint;
///
/// // Total_Revenue >= 0, no upper bound
/// let constraint = RangeConstraint::new("Total_Revenue", Some(0.0), None).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct RangeConstraint {
    column: String,
    column_identifier: String,
    min: Option<f64>,
    max: Option<f64>,
}

impl RangeConstraint {
    pub fn new(column: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Result<Self> {
        for bound in [min, max].into_iter().flatten() {
            if !bound.is_finite() {
                return Err(DigestError::Configuration(format!(
                    "range bound must be finite, got {bound}"
                )));
            }
        }
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(DigestError::Configuration(format!(
                    "range bounds are inverted: {lo} > {hi}"
                )));
            }
        }

        let column = column.into();
        let column_identifier = SqlSecurity::escape_identifier(&column)?;
        Ok(Self {
            column,
            column_identifier,
            min,
            max,
        })
    }

    fn bounds(&self) -> String {
        match (self.min, self.max) {
            (Some(lo), Some(hi)) => format!("between {lo} and {hi}"),
            (Some(lo), None) => format!("at least {lo}"),
            (None, Some(hi)) => format!("at most {hi}"),
            (None, None) => "any value".to_string(),
        }
    }
}

#[async_trait]
impl Constraint for RangeConstraint {
    #[instrument(skip(self, ctx), fields(constraint.column = %self.column, min = ?self.min, max = ?self.max))]
    async fn evaluate(&self, ctx: &SessionContext) -> Result<ConstraintResult> {
        let column = &self.column_identifier;
        let value = format!("CAST({column} AS DOUBLE)");

        let mut outside = Vec::new();
        if let Some(lo) = self.min {
            outside.push(format!("{value} < {lo:?}"));
        }
        if let Some(hi) = self.max {
            outside.push(format!("{value} > {hi:?}"));
        }
        if outside.is_empty() {
            // Still touch the column so a missing one is reported.
            outside.push("FALSE".to_string());
        }

        let violation = format!("{column} IS NOT NULL AND ({})", outside.join(" OR "));
        let counts = count_violations(ctx, &violation).await?;
        Ok(counts.into_result(&format!("are not {}", self.bounds())))
    }

    fn name(&self) -> &str {
        "between"
    }

    fn column(&self) -> &str {
        &self.column
    }

    fn description(&self) -> String {
        format!("{} must be {}", self.column, self.bounds())
    }
}

/// Checks that every non-null value is a member of a fixed set.
///
/// Membership is tested on the VARCHAR rendering of each value.
#[derive(Debug, Clone)]
pub struct ContainmentConstraint {
    column: String,
    column_identifier: String,
    allowed_values: Vec<String>,
}

impl ContainmentConstraint {
    pub fn new<I, S>(column: impl Into<String>, allowed_values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let column = column.into();
        let column_identifier = SqlSecurity::escape_identifier(&column)?;
        Ok(Self {
            column,
            column_identifier,
            allowed_values: allowed_values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn allowed_values(&self) -> &[String] {
        &self.allowed_values
    }
}

#[async_trait]
impl Constraint for ContainmentConstraint {
    #[instrument(skip(self, ctx), fields(constraint.column = %self.column, allowed = self.allowed_values.len()))]
    async fn evaluate(&self, ctx: &SessionContext) -> Result<ConstraintResult> {
        let column = &self.column_identifier;

        let violation = if self.allowed_values.is_empty() {
            format!("{column} IS NOT NULL")
        } else {
            let literals = self
                .allowed_values
                .iter()
                .map(|v| SqlSecurity::escape_literal(v))
                .collect::<Result<Vec<_>>>()?
                .join(", ");
            format!("{column} IS NOT NULL AND CAST({column} AS VARCHAR) NOT IN ({literals})")
        };

        let counts = count_violations(ctx, &violation).await?;
        Ok(counts.into_result("are not in the allowed set"))
    }

    fn name(&self) -> &str {
        "in_set"
    }

    fn column(&self) -> &str {
        &self.column
    }

    fn description(&self) -> String {
        format!(
            "{} must be one of [{}]",
            self.column,
            self.allowed_values.join(", ")
        )
    }
}
