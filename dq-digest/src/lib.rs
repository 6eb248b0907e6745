//! # dq-digest - a data-quality digest for sales and customer tables
//!
//! dq-digest loads the `Sales` and `Customers` tables from a database, checks
//! each against a fixed list of column rules, renders the outcomes into a
//! two-section PDF report and emails that report. Rules are evaluated with
//! DataFusion over the loaded Arrow batches.
//!
//! ## Overview
//!
//! A run is one pass through four stages:
//!
//! 1. **Load** ([`sources`]): every column of `<schema>.<table>`, read as text
//!    and converted to Arrow.
//! 2. **Validate** ([`core`], [`constraints`]): the dataset's rule set is
//!    created in the suite store if missing, the declared rules are saved, and
//!    exactly the declared rules are evaluated, in declaration order.
//! 3. **Report** ([`normalizer`], [`report`]): rule outcomes become flat
//!    records and are laid out as two tables in one PDF.
//! 4. **Notify** ([`notify`]): the PDF is sent through an SMTP relay.
//!
//! [`pipeline::Pipeline`] wires the stages together. A stage failure never
//! aborts the run; see [`error::ErrorKind`] for how each kind of failure is
//! handled.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dq_digest::config::DigestConfig;
//! use dq_digest::notify::SmtpNotifier;
//! use dq_digest::prelude::*;
//! use dq_digest::report::ReportBuilder;
//! use dq_digest::sources::PostgresLoader;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<()> {
//! let config = DigestConfig::from_env()?;
//!
//! let pipeline = Pipeline::new(
//!     Arc::new(PostgresLoader::from_config(&config.database)?),
//!     Validator::new(SuiteStore::new(&config.context_dir)),
//!     ReportBuilder::new(&config.report.output_path),
//!     Arc::new(SmtpNotifier::new(&config.mail)),
//! );
//!
//! let outcome = pipeline.run().await;
//! if outcome.notification == NotificationStatus::Sent {
//!     println!("report delivered");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Rules
//!
//! Each dataset carries its rules in [`core::DatasetDefinition`]. The rule
//! kinds are:
//!
//! - **not-null**: no value in the column is null
//! - **between**: numeric values fall inside inclusive, optional bounds
//! - **length-equals** / **length-between**: string lengths
//! - **in-set**: values belong to an enumerated set
//! - **of-type**: the column's declared type
//!
//! Rule sets are persisted as JSON under `<context>/expectations/` and reused
//! on later runs, so re-declaring a rule updates it in place.
//!
//! ## Configuration
//!
//! Everything is read from the environment (or a `.env` file); see
//! [`config`] for the variables. Credentials are held in
//! [`security::SecureString`] and never logged.
//!
//! ## Logging
//!
//! The library emits `tracing` events only. The `dq-digest` binary installs a
//! subscriber through [`logging::init_logging`], as text or, with
//! `DQ_LOG_FORMAT=json`, as JSON lines. `RUST_LOG` overrides the default
//! levels.

pub mod config;
pub mod constraints;
pub mod core;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod normalizer;
pub mod notify;
pub mod pipeline;
pub mod prelude;
pub mod report;
pub mod security;
pub mod sources;

#[cfg(test)]
pub mod test_helpers;
