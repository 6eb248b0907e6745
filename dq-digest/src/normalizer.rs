//! Flattens rule outcomes into report records.

use crate::core::RuleOutcome;
use crate::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Text shown for an absent observed value.
pub const NULL_CELL: &str = "null";

/// One row of a report table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    #[serde(rename = "Column Name")]
    pub column_name: String,
    #[serde(rename = "Expectation Type")]
    pub expectation_type: String,
    #[serde(rename = "Success")]
    pub success: bool,
    #[serde(rename = "Observed Value")]
    pub observed_value: Option<Value>,
}

impl EvaluationRecord {
    pub fn new(
        column_name: impl Into<String>,
        expectation_type: impl Into<String>,
        success: bool,
        observed_value: Option<Value>,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            expectation_type: expectation_type.into(),
            success,
            observed_value,
        }
    }

    /// The four cell strings of this record, in table column order.
    pub fn to_cells(&self) -> [String; 4] {
        [
            self.column_name.clone(),
            self.expectation_type.clone(),
            self.success.to_string(),
            observed_text(self.observed_value.as_ref()),
        ]
    }

    /// Parses a row of cell strings back into a record.
    ///
    /// Observed values are read back as `null`, booleans, numbers, or
    /// otherwise as plain strings.
    pub fn from_cells(cells: &[String]) -> Result<Self> {
        let [column, kind, success, observed] = cells else {
            return Err(DigestError::Internal(format!(
                "expected 4 cells, found {}",
                cells.len()
            )));
        };
        let success = match success.as_str() {
            "true" => true,
            "false" => false,
            other => {
                return Err(DigestError::Internal(format!(
                    "success cell must be true or false, got '{other}'"
                )))
            }
        };
        Ok(Self::new(column, kind, success, parse_observed(observed)))
    }
}

/// Renders an observed value as table text.
pub fn observed_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NULL_CELL.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn parse_observed(text: &str) -> Option<Value> {
    match text {
        NULL_CELL => None,
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        _ => {
            if let Ok(n) = text.parse::<i64>() {
                Some(Value::Number(n.into()))
            } else if let Some(n) = text.parse::<f64>().ok().and_then(Number::from_f64) {
                Some(Value::Number(n))
            } else {
                Some(Value::String(text.to_string()))
            }
        }
    }
}

impl From<&RuleOutcome> for EvaluationRecord {
    fn from(outcome: &RuleOutcome) -> Self {
        Self::new(
            outcome.column(),
            outcome.kind_id(),
            outcome.success(),
            outcome.observed_value().cloned(),
        )
    }
}

/// Maps outcomes to records one-to-one, keeping their order.
pub fn normalize(outcomes: &[RuleOutcome]) -> Vec<EvaluationRecord> {
    outcomes.iter().map(EvaluationRecord::from).collect()
}
