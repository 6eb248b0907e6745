use dq_digest::config::DigestConfig;
use dq_digest::logging::{init_logging, LoggingConfig};
use dq_digest::notify::SmtpNotifier;
use dq_digest::prelude::*;
use dq_digest::report::ReportBuilder;
use dq_digest::sources::PostgresLoader;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match DigestConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // Logging is configured from the environment too; fall back to defaults.
            let _ = init_logging(LoggingConfig::default());
            error!(error = %e, error.kind = %e.kind(), "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(LoggingConfig::from_config(&config)) {
        eprintln!("failed to install logging subscriber: {e}");
    }

    let loader = match PostgresLoader::from_config(&config.database) {
        Ok(loader) => loader,
        Err(e) => {
            error!(error = %e, error.kind = %e.kind(), "Invalid database configuration");
            return ExitCode::FAILURE;
        }
    };

    let pipeline = Pipeline::new(
        Arc::new(loader),
        Validator::new(SuiteStore::new(&config.context_dir)),
        ReportBuilder::new(&config.report.output_path),
        Arc::new(SmtpNotifier::new(&config.mail)),
    );

    let outcome = pipeline.run().await;
    info!(
        notification = ?outcome.notification,
        summary = %outcome,
        "Digest run finished"
    );
    ExitCode::SUCCESS
}
