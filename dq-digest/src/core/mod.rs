//! Rules, rule sets and their evaluation.
//!
//! ## Overview
//!
//! - **[`Rule`]**: a declarative (column, predicate) pair
//! - **[`RuleSet`]**: a named, persisted collection of rules for one dataset
//! - **[`SuiteStore`]**: the file-backed home of rule sets and data docs
//! - **[`Constraint`]**: the executable form of a rule, evaluated with DataFusion
//! - **[`Validator`]**: binds a dataset, declares its rules and evaluates them
//!
//! ## Architecture
//!
//! ```text
//! DatasetDefinition ──rules──▶ RuleSet ──save──▶ <context>/expectations/<suite>.json
//!                                 │
//!                                 ▼
//!                    Rule::constraint() ──evaluate──▶ RuleOutcome
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use dq_digest::core::{DatasetDefinition, SuiteStore, Validator};
//! use dq_digest::sources::{DatasetLoader, MemoryLoader};
//!
//! # async fn example(loader: MemoryLoader) -> dq_digest::prelude::Result<()> {
//! let def = DatasetDefinition::sales();
//! let dataset = loader.load(&def).await?;
//! let validator = Validator::new(SuiteStore::new("gx"));
//! let outcomes = validator.validate(&dataset, &def.suite_name, &def.rules).await?;
//! println!("{} rules evaluated", outcomes.len());
//! # Ok(())
//! # }
//! ```

mod catalog;
mod constraint;
mod rule;
mod rule_set;
mod store;
pub mod validation_context;
mod validator;

pub use catalog::DatasetDefinition;
pub use constraint::{BoxedConstraint, Constraint, ConstraintResult, ConstraintStatus};
pub use rule::{ColumnType, Rule, RuleKind};
pub use rule_set::RuleSet;
pub use store::SuiteStore;
pub use validation_context::{current_validation_context, ValidationContext, CURRENT_CONTEXT};
pub use validator::{RuleOutcome, Validator};

pub(crate) use validator::current_table;
