//! Text renderings of evaluation records.
//!
//! The human formatter echoes each dataset's results to the log and the
//! Markdown formatter writes the per-suite data docs page.
//!
//! # Examples
//!
//! ```rust
//! use dq_digest::formatters::{HumanFormatter, ResultFormatter};
//! use dq_digest::normalizer::EvaluationRecord;
//!
//! let records = vec![EvaluationRecord::new("Total_Cost", "not-null", true, None)];
//! let output = HumanFormatter::new().format("Sales Validation Results", &records).unwrap();
//! assert!(output.contains("Total_Cost"));
//! ```

use crate::normalizer::EvaluationRecord;
use crate::prelude::*;
use crate::report::TABLE_HEADERS;
use chrono::Utc;
use std::fmt::Write;

/// Configuration options for formatting evaluation records.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Include a passed/failed summary line
    pub include_summary: bool,
    /// Whether to include timestamps in output
    pub include_timestamps: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_summary: true,
            include_timestamps: true,
        }
    }
}

impl FormatterConfig {
    /// Sets whether to include timestamps.
    pub fn with_timestamps(mut self, include: bool) -> Self {
        self.include_timestamps = include;
        self
    }
}

/// Formats a titled list of evaluation records.
pub trait ResultFormatter {
    /// Formats `records` under `title`.
    fn format(&self, title: &str, records: &[EvaluationRecord]) -> Result<String>;
}

fn fmt_error(e: std::fmt::Error) -> DigestError {
    DigestError::Internal(format!("Failed to format results: {e}"))
}

fn passed(records: &[EvaluationRecord]) -> usize {
    records.iter().filter(|r| r.success).count()
}

/// Formats records as an aligned plain-text table for consoles and logs.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }

    fn write_table(
        &self,
        output: &mut String,
        title: &str,
        records: &[EvaluationRecord],
    ) -> std::fmt::Result {
        let rows: Vec<[String; 4]> = records.iter().map(EvaluationRecord::to_cells).collect();
        let mut widths = TABLE_HEADERS.map(|h| h.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        writeln!(output, "{title}")?;
        if self.config.include_timestamps {
            writeln!(output, "Generated: {}", Utc::now().to_rfc3339())?;
        }
        writeln!(output)?;

        let line = |cells: [&str; 4]| -> String {
            cells
                .iter()
                .zip(widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join(" | ")
        };
        writeln!(output, "{}", line(TABLE_HEADERS))?;
        writeln!(
            output,
            "{}",
            widths.map(|w| "-".repeat(w)).join("-+-")
        )?;

        for row in &rows {
            writeln!(output, "{}", line([&row[0], &row[1], &row[2], &row[3]]))?;
        }

        if self.config.include_summary {
            writeln!(output)?;
            writeln!(
                output,
                "{} of {} rules passed",
                passed(records),
                records.len()
            )?;
        }
        Ok(())
    }
}

impl ResultFormatter for HumanFormatter {
    fn format(&self, title: &str, records: &[EvaluationRecord]) -> Result<String> {
        let mut output = String::new();
        self.write_table(&mut output, title, records)
            .map_err(fmt_error)?;
        Ok(output)
    }
}

/// Formats records as a Markdown page.
#[derive(Debug, Clone, Default)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
}

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    fn write_page(
        &self,
        output: &mut String,
        title: &str,
        records: &[EvaluationRecord],
    ) -> std::fmt::Result {
        writeln!(output, "# {title}")?;
        writeln!(output)?;

        if self.config.include_timestamps {
            writeln!(output, "**Generated:** {}", Utc::now().to_rfc3339())?;
            writeln!(output)?;
        }

        if self.config.include_summary {
            let ok = passed(records);
            writeln!(output, "| Rules | Passed | Failed |")?;
            writeln!(output, "|-------|--------|--------|")?;
            writeln!(output, "| {} | {ok} | {} |", records.len(), records.len() - ok)?;
            writeln!(output)?;
        }

        if records.is_empty() {
            writeln!(output, "_No results._")?;
            return Ok(());
        }

        writeln!(output, "| {} |", TABLE_HEADERS.join(" | "))?;
        writeln!(output, "|{}|", ["---"; 4].join("|"))?;
        for record in records {
            let cells = record.to_cells().map(|c| escape_cell(&c));
            writeln!(output, "| {} |", cells.join(" | "))?;
        }
        Ok(())
    }
}

impl ResultFormatter for MarkdownFormatter {
    fn format(&self, title: &str, records: &[EvaluationRecord]) -> Result<String> {
        let mut output = String::new();
        self.write_page(&mut output, title, records)
            .map_err(fmt_error)?;
        Ok(output)
    }
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|")
}
