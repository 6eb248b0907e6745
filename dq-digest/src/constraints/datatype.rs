//! Declared column type constraint.

use crate::core::{current_validation_context, ColumnType, Constraint, ConstraintResult};
use crate::prelude::*;
use crate::security::SqlSecurity;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use tracing::instrument;

/// Checks the declared type of a column against an expected type family.
///
/// Unlike the other constraints this reads the schema rather than the rows,
/// and it reports the actual family name as its observed value.
#[derive(Debug, Clone)]
pub struct ColumnTypeConstraint {
    column: String,
    expected: ColumnType,
}

impl ColumnTypeConstraint {
    pub fn new(column: impl Into<String>, expected: ColumnType) -> Result<Self> {
        let column = column.into();
        SqlSecurity::validate_identifier(&column)?;
        Ok(Self { column, expected })
    }

    pub fn expected(&self) -> &ColumnType {
        &self.expected
    }
}

#[async_trait]
impl Constraint for ColumnTypeConstraint {
    #[instrument(skip(self, ctx), fields(column = %self.column, expected = %self.expected))]
    async fn evaluate(&self, ctx: &SessionContext) -> Result<ConstraintResult> {
        let validation_ctx = current_validation_context();
        let df = ctx.table(validation_ctx.table_name()).await?;
        let schema = df.schema();

        let field = schema
            .field_with_name(None, &self.column)
            .map_err(|_| DigestError::ColumnNotFound {
                column: self.column.clone(),
            })?;

        let actual = ColumnType::from_arrow(field.data_type());
        let result = if actual == self.expected {
            ConstraintResult::success()
        } else {
            ConstraintResult::failure(format!(
                "Column '{}' has type {actual}, expected {}",
                self.column, self.expected
            ))
        };
        Ok(result.with_observed_value(actual.name()))
    }

    fn name(&self) -> &str {
        "of_type"
    }

    fn column(&self) -> &str {
        &self.column
    }

    fn description(&self) -> String {
        format!("{} must be of type {}", self.column, self.expected)
    }
}
