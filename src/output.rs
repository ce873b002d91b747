//! Simple Output and Reporting
//!
//! Per-file reports for the command line, as human-readable text or JSON.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::classifier::DocumentType;
use crate::cli::VerbosityLevel;
use crate::error::DocumentError;
use crate::error_reporter::ValidationError;
use crate::pipeline::ValidationResult;

/// What happened to one file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileOutcome {
    Valid {
        document_type: DocumentType,
    },
    Invalid {
        document_type: DocumentType,
        errors: Vec<ValidationError>,
    },
    /// Terminal outcome before or instead of schema validation
    Rejected { reason: RejectionReason, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    EmptyContent,
    Syntax,
    UnsupportedType,
    Internal,
}

impl From<&DocumentError> for RejectionReason {
    fn from(error: &DocumentError) -> Self {
        match error {
            DocumentError::EmptyContent => RejectionReason::EmptyContent,
            DocumentError::Syntax { .. } => RejectionReason::Syntax,
            DocumentError::UnsupportedType { .. } | DocumentError::SchemaNotConfigured { .. } => {
                RejectionReason::UnsupportedType
            }
            DocumentError::Internal { .. } => RejectionReason::Internal,
        }
    }
}

/// Report for a single file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
    pub duration_ms: u64,
}

impl FileReport {
    pub fn new(
        path: &Path,
        result: Result<ValidationResult, DocumentError>,
        duration: Duration,
    ) -> Self {
        let outcome = match result {
            Ok(result) if result.is_valid() => FileOutcome::Valid {
                document_type: result.document_type(),
            },
            Ok(result) => FileOutcome::Invalid {
                document_type: result.document_type(),
                errors: result.errors().to_vec(),
            },
            Err(error) => FileOutcome::Rejected {
                reason: RejectionReason::from(&error),
                message: error.to_string(),
            },
        };

        Self {
            path: path.to_path_buf(),
            outcome,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.outcome, FileOutcome::Valid { .. })
    }
}

/// Totals over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub rejected: usize,
}

impl Summary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        reports.iter().fold(Summary::default(), |mut summary, report| {
            summary.total += 1;
            match report.outcome {
                FileOutcome::Valid { .. } => summary.valid += 1,
                FileOutcome::Invalid { .. } => summary.invalid += 1,
                FileOutcome::Rejected { .. } => summary.rejected += 1,
            }
            summary
        })
    }

    pub fn all_valid(&self) -> bool {
        self.valid == self.total
    }
}

/// Simple output formatter for human-readable results
pub struct Output {
    verbosity: VerbosityLevel,
    show_colors: bool,
}

impl Output {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    pub fn with_colors(verbosity: VerbosityLevel, show_colors: bool) -> Self {
        Self {
            verbosity,
            show_colors,
        }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    /// Every report followed by the summary
    ///
    /// Quiet mode leaves valid files out.
    pub fn format_human(&self, reports: &[FileReport]) -> String {
        let mut output = String::new();

        for report in reports {
            if self.verbosity == VerbosityLevel::Quiet && report.is_valid() {
                continue;
            }
            output.push_str(&self.format_file_report(report));
            output.push('\n');
        }

        output.push_str(&self.format_summary(&Summary::from_reports(reports)));
        output
    }

    pub fn format_json(&self, reports: &[FileReport]) -> serde_json::Result<String> {
        serde_json::to_string_pretty(reports)
    }

    pub fn format_file_report(&self, report: &FileReport) -> String {
        let path_display = report.path.display();
        let duration_str = format_duration(Duration::from_millis(report.duration_ms));

        match &report.outcome {
            FileOutcome::Valid { document_type } => format!(
                "{}  {} ({}, {})",
                self.colorize("✓ VALID", "32"),
                path_display,
                document_type,
                duration_str
            ),
            FileOutcome::Invalid {
                document_type,
                errors,
            } => {
                let mut output = format!(
                    "{}  {} ({}, {}) - {} error{}",
                    self.colorize("✗ INVALID", "31"),
                    path_display,
                    document_type,
                    duration_str,
                    errors.len(),
                    if errors.len() == 1 { "" } else { "s" }
                );

                for error in errors {
                    output.push_str(&format!("\n    {}", error.message));
                    if self.verbosity >= VerbosityLevel::Verbose {
                        output.push_str(&format!("\n      {}", error.engine_message));
                    }
                }
                output
            }
            FileOutcome::Rejected { message, .. } => format!(
                "{}  {} ({}) - {}",
                self.colorize("⚠ REJECTED", "33"),
                path_display,
                duration_str,
                message
            ),
        }
    }

    pub fn format_summary(&self, summary: &Summary) -> String {
        if self.verbosity == VerbosityLevel::Quiet {
            return format!(
                "Invalid: {} Rejected: {}\n",
                summary.invalid, summary.rejected
            );
        }

        let mut output = String::new();
        output.push_str("Validation Summary:\n");
        output.push_str(&format!("  Total files: {}\n", summary.total));
        output.push_str(&format!(
            "  {} {}\n",
            self.colorize("Valid:", "32"),
            summary.valid
        ));

        if summary.invalid > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Invalid:", "31"),
                summary.invalid
            ));
        }
        if summary.rejected > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Rejected:", "33"),
                summary.rejected
            ));
        }

        output
    }
}

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();
    if total_secs < 1.0 {
        format!("{:.0}ms", duration.as_millis())
    } else if total_secs < 60.0 {
        format!("{:.2}s", total_secs)
    } else {
        let mins = (total_secs / 60.0) as u64;
        let secs = total_secs % 60.0;
        format!("{}m{:.1}s", mins, secs)
    }
}
