//! Runs a dataset's rules and keeps the rule set store in step.

use super::{current_validation_context, Rule, SuiteStore, ValidationContext, CURRENT_CONTEXT};
use super::{ConstraintResult, ConstraintStatus};
use crate::formatters::{MarkdownFormatter, ResultFormatter};
use crate::normalizer::normalize;
use crate::prelude::*;
use crate::sources::Dataset;
use datafusion::prelude::SessionContext;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// One rule paired with the result of evaluating it.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    pub rule: Rule,
    pub result: ConstraintResult,
}

impl RuleOutcome {
    pub fn column(&self) -> &str {
        &self.rule.column
    }

    pub fn kind_id(&self) -> &'static str {
        self.rule.kind_id()
    }

    pub fn success(&self) -> bool {
        self.result.is_success()
    }

    pub fn observed_value(&self) -> Option<&Value> {
        self.result.observed_value.as_ref()
    }
}

/// Evaluates rule sets against datasets.
#[derive(Debug, Clone)]
pub struct Validator {
    store: SuiteStore,
}

impl Validator {
    pub fn new(store: SuiteStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SuiteStore {
        &self.store
    }

    /// Validates `dataset` against the rule set `suite_name`.
    ///
    /// The rule set is created if the store does not have it yet, the given
    /// rules are declared on it (replacing earlier parameters for the same
    /// column and kind) and the set is saved. Only the given rules are then
    /// evaluated, in declaration order, so rules the stored set carries from
    /// earlier runs never add or reorder outcomes. Any failure along the way
    /// is reported as a [`ErrorKind::SuiteError`].
    #[instrument(skip(self, dataset, rules), fields(
        dataset.name = %dataset.name(),
        suite.name = %suite_name,
        dataset.rows = dataset.num_rows()
    ))]
    pub async fn validate(
        &self,
        dataset: &Dataset,
        suite_name: &str,
        rules: &[Rule],
    ) -> Result<Vec<RuleOutcome>> {
        let outcomes = self
            .run(dataset, suite_name, rules)
            .await
            .map_err(|e| e.into_suite_error(suite_name))?;

        let passed = outcomes.iter().filter(|o| o.success()).count();
        info!(
            rules.total = outcomes.len(),
            rules.passed = passed,
            rules.failed = outcomes.len() - passed,
            "Validation finished"
        );

        self.publish_data_docs(suite_name, &outcomes).await;
        Ok(outcomes)
    }

    async fn run(
        &self,
        dataset: &Dataset,
        suite_name: &str,
        rules: &[Rule],
    ) -> Result<Vec<RuleOutcome>> {
        let mut set = self.store.get_or_create(suite_name).await?;

        let ctx = SessionContext::new();
        let table_name = dataset.name().to_string();
        dataset.register(&ctx, &table_name)?;

        set.extend(rules.iter().cloned());
        self.store.save(&set).await?;

        let scope = ValidationContext::new(table_name, suite_name);
        let mut outcomes = Vec::with_capacity(rules.len());
        for rule in rules {
            let constraint = rule.constraint()?;
            let result = CURRENT_CONTEXT
                .scope(scope.clone(), constraint.evaluate(&ctx))
                .await?;

            match result.status {
                ConstraintStatus::Success => debug!(
                    rule.column = %rule.column,
                    rule.kind = rule.kind_id(),
                    constraint.metric = ?result.metric,
                    "Rule passed"
                ),
                ConstraintStatus::Failure => warn!(
                    rule.column = %rule.column,
                    rule.kind = rule.kind_id(),
                    constraint.metric = ?result.metric,
                    failure.message = result.message.as_deref().unwrap_or(""),
                    "Rule failed"
                ),
            }

            outcomes.push(RuleOutcome {
                rule: rule.clone(),
                result,
            });
        }
        Ok(outcomes)
    }

    async fn publish_data_docs(&self, suite_name: &str, outcomes: &[RuleOutcome]) {
        let written = match MarkdownFormatter::new().format(suite_name, &normalize(outcomes)) {
            Ok(page) => self.store.write_data_docs(suite_name, &page).await,
            Err(e) => Err(e),
        };
        match written {
            Ok(path) => debug!(path = %path.display(), "Data docs updated"),
            Err(e) => warn!(
                error = %e,
                error.kind = %e.kind(),
                "Could not write data docs"
            ),
        }
    }
}

/// Name of the table the current evaluation targets, quoted for SQL.
pub(crate) fn current_table() -> Result<String> {
    crate::security::SqlSecurity::escape_identifier(current_validation_context().table_name())
}
