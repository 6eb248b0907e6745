//! Constraint implementations, one per rule kind.
//!
//! Each constraint reads the target table from the task-local
//! [`ValidationContext`](crate::core::ValidationContext) and answers with a
//! single aggregate query. Nulls only count against [`NotNullConstraint`];
//! every other kind looks at non-null values alone. An empty table satisfies
//! every rule.
//!
//! ## Usage
//!
//! ```rust
//! use dq_digest::constraints::{LengthConstraint, RangeConstraint};
//!
//! let order_id = LengthConstraint::exactly("Order_ID", 9).unwrap();
//! let price = RangeConstraint::new("Unit_Price", Some(0.0), Some(10000.0)).unwrap();
//! ```

mod completeness;
mod datatype;
mod length;
mod values;

pub use completeness::NotNullConstraint;
pub use datatype::ColumnTypeConstraint;
pub use length::{LengthAssertion, LengthConstraint};
pub use values::{ContainmentConstraint, RangeConstraint};

use crate::core::{current_table, ConstraintResult};
use crate::prelude::*;
use arrow::array::{Array, Int64Array};
use datafusion::prelude::SessionContext;

/// Row counts behind a count-based rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ViolationCount {
    pub total: i64,
    pub unexpected: i64,
}

impl ViolationCount {
    pub(crate) fn into_result(self, what: &str) -> ConstraintResult {
        ConstraintResult::from_unexpected_count(self.unexpected, self.total, what)
    }
}

/// Counts all rows of the current table and the rows matching `violation`.
pub(crate) async fn count_violations(
    ctx: &SessionContext,
    violation: &str,
) -> Result<ViolationCount> {
    let table = current_table()?;
    let sql = format!(
        "SELECT COUNT(*) AS total_count, \
                COUNT(CASE WHEN {violation} THEN 1 END) AS unexpected_count \
         FROM {table}"
    );

    let batches = ctx.sql(&sql).await?.collect().await?;
    let batch = batches
        .iter()
        .find(|b| b.num_rows() > 0)
        .ok_or_else(|| DigestError::Internal("aggregate query returned no rows".to_string()))?;

    let read = |index: usize, label: &str| -> Result<i64> {
        let array = batch
            .column(index)
            .as_any()
            .downcast_ref::<Int64Array>()
            .ok_or_else(|| DigestError::Internal(format!("failed to extract {label}")))?;
        Ok(if array.is_null(0) { 0 } else { array.value(0) })
    };

    Ok(ViolationCount {
        total: read(0, "total count")?,
        unexpected: read(1, "unexpected count")?,
    })
}
