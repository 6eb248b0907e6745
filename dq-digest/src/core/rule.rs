//! Declarative per-column rules.
//!
//! A [`Rule`] is plain data: it serializes into the rule-set store and is
//! turned into an executable [`Constraint`](super::Constraint) only when a
//! dataset is evaluated.

use crate::constraints::{
    ColumnTypeConstraint, ContainmentConstraint, LengthConstraint, NotNullConstraint,
    RangeConstraint,
};
use crate::core::BoxedConstraint;
use crate::prelude::*;
use arrow::datatypes::DataType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared column type, compared by family rather than exact width.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    Varchar,
    Integer,
    Float,
    Boolean,
    Date,
    Timestamp,
    /// Any type without a family of its own, kept by name.
    Other(String),
}

impl ColumnType {
    /// Returns the family of an Arrow type.
    pub fn from_arrow(data_type: &DataType) -> Self {
        match data_type {
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => ColumnType::Varchar,
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => ColumnType::Integer,
            DataType::Float16
            | DataType::Float32
            | DataType::Float64
            | DataType::Decimal128(_, _)
            | DataType::Decimal256(_, _) => ColumnType::Float,
            DataType::Boolean => ColumnType::Boolean,
            DataType::Date32 | DataType::Date64 => ColumnType::Date,
            DataType::Timestamp(_, _) => ColumnType::Timestamp,
            other => ColumnType::Other(other.to_string()),
        }
    }

    /// The SQL-style name of this type.
    pub fn name(&self) -> &str {
        match self {
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Integer => "INTEGER",
            ColumnType::Float => "FLOAT",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Date => "DATE",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Other(name) => name,
        }
    }
}

impl From<String> for ColumnType {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "VARCHAR" | "TEXT" | "STRING" => ColumnType::Varchar,
            "INTEGER" | "INT" | "BIGINT" => ColumnType::Integer,
            "FLOAT" | "DOUBLE" | "NUMERIC" => ColumnType::Float,
            "BOOLEAN" | "BOOL" => ColumnType::Boolean,
            "DATE" => ColumnType::Date,
            "TIMESTAMP" => ColumnType::Timestamp,
            _ => ColumnType::Other(value),
        }
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The predicate a rule applies to its column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RuleKind {
    /// No value may be null.
    NotNull,
    /// Non-null values must lie within the inclusive bounds.
    Between {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// Non-null values must have exactly this many characters.
    LengthEquals { length: usize },
    /// Non-null values must have between `min` and `max` characters.
    LengthBetween { min: usize, max: usize },
    /// Non-null values must be members of the set.
    InSet { values: Vec<String> },
    /// The column must be declared with this type.
    OfType { type_name: ColumnType },
}

impl RuleKind {
    /// Stable identifier of the kind, shown as the "Expectation Type".
    pub fn id(&self) -> &'static str {
        match self {
            RuleKind::NotNull => "not-null",
            RuleKind::Between { .. } => "between",
            RuleKind::LengthEquals { .. } => "length-equals",
            RuleKind::LengthBetween { .. } => "length-between",
            RuleKind::InSet { .. } => "in-set",
            RuleKind::OfType { .. } => "of-type",
        }
    }
}

/// A (column, predicate) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub column: String,
    #[serde(flatten)]
    pub kind: RuleKind,
}

impl Rule {
    pub fn new(column: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            column: column.into(),
            kind,
        }
    }

    pub fn not_null(column: impl Into<String>) -> Self {
        Self::new(column, RuleKind::NotNull)
    }

    pub fn between(column: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Self::new(column, RuleKind::Between { min, max })
    }

    pub fn length_equals(column: impl Into<String>, length: usize) -> Self {
        Self::new(column, RuleKind::LengthEquals { length })
    }

    pub fn length_between(column: impl Into<String>, min: usize, max: usize) -> Self {
        Self::new(column, RuleKind::LengthBetween { min, max })
    }

    pub fn in_set<I, S>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            column,
            RuleKind::InSet {
                values: values.into_iter().map(Into::into).collect(),
            },
        )
    }

    pub fn of_type(column: impl Into<String>, type_name: ColumnType) -> Self {
        Self::new(column, RuleKind::OfType { type_name })
    }

    /// Identifier of this rule's kind.
    pub fn kind_id(&self) -> &'static str {
        self.kind.id()
    }

    /// Builds the executable constraint for this rule.
    pub fn constraint(&self) -> Result<BoxedConstraint> {
        let column = self.column.as_str();
        Ok(match &self.kind {
            RuleKind::NotNull => Box::new(NotNullConstraint::new(column)?),
            RuleKind::Between { min, max } => Box::new(RangeConstraint::new(column, *min, *max)?),
            RuleKind::LengthEquals { length } => {
                Box::new(LengthConstraint::exactly(column, *length)?)
            }
            RuleKind::LengthBetween { min, max } => {
                Box::new(LengthConstraint::between(column, *min, *max)?)
            }
            RuleKind::InSet { values } => {
                Box::new(ContainmentConstraint::new(column, values.clone())?)
            }
            RuleKind::OfType { type_name } => {
                Box::new(ColumnTypeConstraint::new(column, type_name.clone())?)
            }
        })
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.kind.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::TimeUnit;

    #[test]
    fn test_kind_ids() {
        assert_eq!(Rule::not_null("a").kind_id(), "not-null");
        assert_eq!(Rule::between("a", Some(0.0), None).kind_id(), "between");
        assert_eq!(Rule::length_equals("a", 9).kind_id(), "length-equals");
        assert_eq!(Rule::length_between("a", 1, 15).kind_id(), "length-between");
        assert_eq!(Rule::in_set("a", ["x"]).kind_id(), "in-set");
        assert_eq!(
            Rule::of_type("a", ColumnType::Varchar).kind_id(),
            "of-type"
        );
    }

    #[test]
    fn test_column_type_families() {
        assert_eq!(ColumnType::from_arrow(&DataType::Utf8View), ColumnType::Varchar);
        assert_eq!(ColumnType::from_arrow(&DataType::Int16), ColumnType::Integer);
        assert_eq!(ColumnType::from_arrow(&DataType::UInt64), ColumnType::Integer);
        assert_eq!(ColumnType::from_arrow(&DataType::Float64), ColumnType::Float);
        assert_eq!(ColumnType::from_arrow(&DataType::Date32), ColumnType::Date);
        assert_eq!(
            ColumnType::from_arrow(&DataType::Timestamp(TimeUnit::Microsecond, None)),
            ColumnType::Timestamp
        );
        assert!(matches!(
            ColumnType::from_arrow(&DataType::Binary),
            ColumnType::Other(_)
        ));
    }

    #[test]
    fn test_column_type_names_parse_back() {
        for ty in [
            ColumnType::Varchar,
            ColumnType::Integer,
            ColumnType::Float,
            ColumnType::Boolean,
            ColumnType::Date,
            ColumnType::Timestamp,
        ] {
            assert_eq!(ColumnType::from(ty.name().to_string()), ty);
        }
        assert_eq!(
            ColumnType::from("Interval".to_string()),
            ColumnType::Other("Interval".to_string())
        );
    }

    #[test]
    fn test_rule_json_shape() {
        let rule = Rule::between("Unit_Price", Some(0.0), Some(10000.0));
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "column": "Unit_Price",
                "kind": "between",
                "min": 0.0,
                "max": 10000.0
            })
        );

        let typed = Rule::of_type("Index", ColumnType::Integer);
        let json = serde_json::to_string(&typed).unwrap();
        assert!(json.contains("\"type_name\":\"INTEGER\""));
        let parsed: Rule = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, typed);
    }

    #[test]
    fn test_open_upper_bound_omitted() {
        let rule = Rule::between("Total_Revenue", Some(0.0), None);
        let json = serde_json::to_value(&rule).unwrap();
        assert!(json.get("max").is_none());
    }

    #[test]
    fn test_constraint_rejects_unsafe_column() {
        assert!(Rule::not_null("x; DROP TABLE sales").constraint().is_err());
        assert!(Rule::length_between("Customer_Id", 1, 15).constraint().is_ok());
    }
}
