//! Prelude for commonly used types and traits in dq-digest.

pub use crate::core::{ColumnType, DatasetDefinition, Rule, RuleKind, SuiteStore, Validator};
pub use crate::error::{DigestError, ErrorKind, Result};
pub use crate::formatters::{FormatterConfig, ResultFormatter};
pub use crate::normalizer::EvaluationRecord;
pub use crate::pipeline::{NotificationStatus, Pipeline, PipelineOutcome};
