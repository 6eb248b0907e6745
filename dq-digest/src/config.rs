//! Runtime configuration sourced from the environment.
//!
//! Nothing secret is compiled in: the database connection string and the
//! mail credentials must come from the process environment or a `.env` file.
//!
//! | Variable          | Required | Default                 |
//! |-------------------|----------|-------------------------|
//! | `DATABASE_URL`    | yes      |                         |
//! | `DQ_DB_SCHEMA`    | no       | `dbo`                   |
//! | `DQ_CONTEXT_DIR`  | no       | `gx`                    |
//! | `DQ_REPORT_PATH`  | no       | `combined_report.pdf`   |
//! | `EMAIL_ADDRESS`   | yes      |                         |
//! | `EMAIL_PASSWORD`  | yes      |                         |
//! | `RECIPIENT_EMAIL` | yes      |                         |
//! | `SMTP_HOST`       | no       | `smtp-mail.outlook.com` |
//! | `SMTP_PORT`       | no       | `587`                   |
//! | `DQ_LOG_FORMAT`   | no       | `text`                  |

use crate::error::{DigestError, Result};
use crate::security::{SecureString, SqlSecurity};
use std::path::PathBuf;

/// Default mail relay.
pub const DEFAULT_SMTP_HOST: &str = "smtp-mail.outlook.com";

/// Default SMTP port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

const DEFAULT_SCHEMA: &str = "dbo";
const DEFAULT_CONTEXT_DIR: &str = "gx";
const DEFAULT_REPORT_PATH: &str = "combined_report.pdf";

/// Top-level configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub database: DatabaseConfig,
    /// Root directory of the rule-set store and data docs.
    pub context_dir: PathBuf,
    pub report: ReportConfig,
    pub mail: MailConfig,
    /// Emit JSON log lines instead of human-readable ones.
    pub json_logs: bool,
}

/// Where the datasets are read from.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Driver connection string. Treated as a secret since it usually embeds
    /// a password.
    pub url: SecureString,
    /// Schema qualifier for the dataset tables.
    pub schema: String,
}

/// Where the rendered report is written.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub output_path: PathBuf,
}

/// SMTP relay and envelope settings.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Sender address, also used as the SMTP login.
    pub sender: String,
    pub password: SecureString,
    pub recipient: String,
}

impl DigestConfig {
    /// Loads configuration from `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| {
                    DigestError::Configuration(format!("missing required variable {key}"))
                })
        };
        let optional = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let schema = optional("DQ_DB_SCHEMA", DEFAULT_SCHEMA);
        SqlSecurity::validate_identifier(&schema).map_err(|e| {
            DigestError::Configuration(format!("DQ_DB_SCHEMA is not a valid identifier: {e}"))
        })?;

        let smtp_port = match lookup("SMTP_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                DigestError::Configuration(format!("SMTP_PORT must be a port number, got '{raw}'"))
            })?,
            None => DEFAULT_SMTP_PORT,
        };

        let json_logs = match optional("DQ_LOG_FORMAT", "text").to_ascii_lowercase().as_str() {
            "json" => true,
            "text" => false,
            other => {
                return Err(DigestError::Configuration(format!(
                    "DQ_LOG_FORMAT must be 'text' or 'json', got '{other}'"
                )))
            }
        };

        Ok(Self {
            database: DatabaseConfig {
                url: SecureString::new(required("DATABASE_URL")?),
                schema,
            },
            context_dir: PathBuf::from(optional("DQ_CONTEXT_DIR", DEFAULT_CONTEXT_DIR)),
            report: ReportConfig {
                output_path: PathBuf::from(optional("DQ_REPORT_PATH", DEFAULT_REPORT_PATH)),
            },
            mail: MailConfig {
                smtp_host: optional("SMTP_HOST", DEFAULT_SMTP_HOST),
                smtp_port,
                sender: required("EMAIL_ADDRESS")?,
                password: SecureString::new(required("EMAIL_PASSWORD")?),
                recipient: required("RECIPIENT_EMAIL")?,
            },
            json_logs,
        })
    }
}
