//! The end-to-end digest run.
//!
//! ```text
//! sales ─────► load ─► validate ─► normalize ─┐
//!                                             ├─► [any results?] ─► build report ─► [written?] ─► notify
//! customers ─► load ─► validate ─► normalize ─┘
//! ```
//!
//! No stage failure aborts the run. A failed load or validation leaves that
//! dataset without records, a failed report build skips notification, and a
//! failed notification is simply recorded.

use crate::core::{DatasetDefinition, Validator};
use crate::formatters::{FormatterConfig, HumanFormatter, ResultFormatter};
use crate::normalizer::{normalize, EvaluationRecord};
use crate::notify::Notifier;
use crate::prelude::*;
use crate::report::ReportBuilder;
use crate::sources::DatasetLoader;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// How far a dataset got through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetStatus {
    Validated,
    LoadFailed(ErrorKind),
    ValidationFailed(ErrorKind),
}

/// The records one dataset produced, and how it fared.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetOutcome {
    pub name: String,
    pub records: Vec<EvaluationRecord>,
    pub status: DatasetStatus,
}

impl DatasetOutcome {
    fn degraded(name: &str, status: DatasetStatus) -> Self {
        Self {
            name: name.to_string(),
            records: Vec::new(),
            status,
        }
    }

    pub fn has_results(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn passed(&self) -> usize {
        self.records.iter().filter(|r| r.success).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Neither dataset produced any records.
    NoResults,
    /// The report could not be built.
    ReportFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStatus {
    Sent,
    Failed(ErrorKind),
    Skipped(SkipReason),
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub sales: DatasetOutcome,
    pub customers: DatasetOutcome,
    /// Path of the written report, if one was built.
    pub report: Option<PathBuf>,
    pub notification: NotificationStatus,
}

impl fmt::Display for PipelineOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for dataset in [&self.sales, &self.customers] {
            write!(
                f,
                "{}: {}/{} rules passed ({:?}); ",
                dataset.name,
                dataset.passed(),
                dataset.records.len(),
                dataset.status
            )?;
        }
        match &self.report {
            Some(path) => write!(f, "report {}; ", path.display())?,
            None => write!(f, "no report; ")?,
        }
        write!(f, "notification {:?}", self.notification)
    }
}

/// Runs both datasets through the stages.
pub struct Pipeline {
    loader: Arc<dyn DatasetLoader>,
    validator: Validator,
    report_builder: ReportBuilder,
    notifier: Arc<dyn Notifier>,
    sales: DatasetDefinition,
    customers: DatasetDefinition,
}

impl Pipeline {
    pub fn new(
        loader: Arc<dyn DatasetLoader>,
        validator: Validator,
        report_builder: ReportBuilder,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            loader,
            validator,
            report_builder,
            notifier,
            sales: DatasetDefinition::sales(),
            customers: DatasetDefinition::customers(),
        }
    }

    /// Runs the whole digest once.
    #[instrument(skip(self), fields(loader = %self.loader.description()))]
    pub async fn run(&self) -> PipelineOutcome {
        let sales = self.process(&self.sales).await;
        let customers = self.process(&self.customers).await;

        if !sales.has_results() && !customers.has_results() {
            warn!("No dataset produced results; skipping report and notification");
            return PipelineOutcome {
                sales,
                customers,
                report: None,
                notification: NotificationStatus::Skipped(SkipReason::NoResults),
            };
        }

        let report = match self
            .report_builder
            .build(&sales.records, &customers.records)
            .await
        {
            Ok(path) => path,
            Err(e) => {
                error!(
                    error = %e,
                    error.kind = %e.kind(),
                    "Report build failed; skipping notification"
                );
                return PipelineOutcome {
                    sales,
                    customers,
                    report: None,
                    notification: NotificationStatus::Skipped(SkipReason::ReportFailed),
                };
            }
        };

        let notification = match self.notifier.send(&report).await {
            Ok(()) => NotificationStatus::Sent,
            Err(e) => {
                error!(error = %e, error.kind = %e.kind(), "Notification failed");
                NotificationStatus::Failed(e.kind())
            }
        };

        PipelineOutcome {
            sales,
            customers,
            report: Some(report),
            notification,
        }
    }

    #[instrument(skip(self, definition), fields(dataset.name = %definition.name))]
    async fn process(&self, definition: &DatasetDefinition) -> DatasetOutcome {
        let dataset = match self.loader.load(definition).await {
            Ok(dataset) => dataset,
            Err(e) => {
                warn!(
                    error = %e,
                    error.kind = %e.kind(),
                    "Load failed; dataset will have no results"
                );
                return DatasetOutcome::degraded(
                    &definition.name,
                    DatasetStatus::LoadFailed(e.kind()),
                );
            }
        };
        info!(dataset.rows = dataset.num_rows(), "Dataset loaded");

        let outcomes = match self
            .validator
            .validate(&dataset, &definition.suite_name, &definition.rules)
            .await
        {
            Ok(outcomes) => outcomes,
            Err(e) => {
                warn!(
                    error = %e,
                    error.kind = %e.kind(),
                    "Validation failed; dataset will have no results"
                );
                return DatasetOutcome::degraded(
                    &definition.name,
                    DatasetStatus::ValidationFailed(e.kind()),
                );
            }
        };

        let records = normalize(&outcomes);
        let echo = HumanFormatter::with_config(FormatterConfig::default().with_timestamps(false))
            .format(&definition.section_title, &records);
        match echo {
            Ok(table) => info!("\n{table}"),
            Err(e) => debug!(error = %e, "Could not format results for the log"),
        }

        DatasetOutcome {
            name: definition.name.clone(),
            records,
            status: DatasetStatus::Validated,
        }
    }
}
