//! Output formatting for the CLI.
//!
//! This module provides human-readable and JSON output formatters for gate
//! evaluations.

use codeowners_gate_core::gate::{Evaluation, PullRequestRef};
use colored::Colorize;
use serde::Serialize;
use std::io::Write;

/// JSON report of a gate run.
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    /// The evaluated pull request, as `owner/repo#number`; `null` when the
    /// run failed before one was determined.
    pub pull_request: Option<String>,
    /// Whether the gate passed. `false` when the run errored.
    pub passed: bool,
    /// Code-owner approvals required to pass.
    pub required_approvals: Option<u32>,
    /// Code owners whose latest review is an approval.
    pub matched_approvals: Option<usize>,
    /// Logins authorized to approve as code owners.
    pub owners: Vec<String>,
    /// Logins whose latest review is an approval.
    pub approved: Vec<String>,
    /// Owners who currently approve.
    pub matched: Vec<String>,
    /// Teams whose members could not be fetched.
    pub unresolved_teams: Vec<String>,
    /// Error that stopped the run before a verdict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JsonOutput {
    /// Builds the report for a completed evaluation.
    pub fn from_evaluation(pr: &PullRequestRef, evaluation: &Evaluation) -> Self {
        Self {
            pull_request: Some(pr.to_string()),
            passed: evaluation.passed(),
            required_approvals: Some(evaluation.verdict.required_count),
            matched_approvals: Some(evaluation.verdict.matched_count),
            owners: evaluation.owners.iter().map(String::from).collect(),
            approved: evaluation.approved.iter().map(String::from).collect(),
            matched: evaluation.matched.clone(),
            unresolved_teams: evaluation.unresolved_teams.clone(),
            error: None,
        }
    }

    /// Builds the report for a run that failed without a verdict.
    pub fn from_error(pr: Option<&PullRequestRef>, message: impl Into<String>) -> Self {
        Self {
            pull_request: pr.map(ToString::to_string),
            passed: false,
            required_approvals: None,
            matched_approvals: None,
            owners: Vec::new(),
            approved: Vec::new(),
            matched: Vec::new(),
            unresolved_teams: Vec::new(),
            error: Some(message.into()),
        }
    }

    /// Writes the JSON output to a writer.
    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

/// Output formatter for human-readable console output.
pub struct HumanOutput<W: Write> {
    writer: W,
    use_colors: bool,
}

impl<W: Write> HumanOutput<W> {
    /// Creates a new human output formatter.
    pub fn new(writer: W, use_colors: bool) -> Self {
        Self { writer, use_colors }
    }

    /// Writes a header line.
    pub fn write_header(&mut self, title: &str) -> std::io::Result<()> {
        let header = format!("==> {}", title);
        if self.use_colors {
            writeln!(self.writer, "\n{}", header.cyan().bold())
        } else {
            writeln!(self.writer, "\n{}", header)
        }
    }

    /// Writes a labelled list of logins, or `(none)`.
    pub fn write_list<'a>(
        &mut self,
        label: &str,
        items: impl IntoIterator<Item = &'a str>,
    ) -> std::io::Result<()> {
        let items: Vec<&str> = items.into_iter().collect();
        let body = if items.is_empty() {
            "(none)".to_string()
        } else {
            items.join(", ")
        };
        if self.use_colors {
            writeln!(self.writer, "  {:<20} {}", label.bold(), body)
        } else {
            writeln!(self.writer, "  {:<20} {}", label, body)
        }
    }

    /// Writes a warning about teams that contributed no owners.
    pub fn write_unresolved_teams(&mut self, teams: &[String]) -> std::io::Result<()> {
        for team in teams {
            let message = format!("could not resolve members of {}", team);
            if self.use_colors {
                writeln!(self.writer, "  {} {}", "[WARN]".yellow().bold(), message)?;
            } else {
                writeln!(self.writer, "  [WARN] {}", message)?;
            }
        }
        Ok(())
    }

    /// Writes the final verdict line.
    pub fn write_verdict(&mut self, evaluation: &Evaluation) -> std::io::Result<()> {
        writeln!(self.writer)?;

        let verdict = &evaluation.verdict;
        if verdict.passed {
            let message = format!(
                "✓ Code owner approval gate passed ({} of {} required)",
                verdict.matched_count, verdict.required_count
            );
            if self.use_colors {
                writeln!(self.writer, "{}", message.green().bold())
            } else {
                writeln!(self.writer, "{}", message)
            }
        } else {
            let message = format!(
                "✗ Code owner approval gate failed: {} of {} required approvals",
                verdict.matched_count, verdict.required_count
            );
            if self.use_colors {
                writeln!(self.writer, "{}", message.red().bold())
            } else {
                writeln!(self.writer, "{}", message)
            }
        }
    }

    /// Writes a complete evaluation report.
    pub fn write_evaluation(
        &mut self,
        pr: &PullRequestRef,
        evaluation: &Evaluation,
    ) -> std::io::Result<()> {
        self.write_header(&pr.to_string())?;
        self.write_list("Code owners:", evaluation.owners.iter())?;
        self.write_list("Approved by:", evaluation.approved.iter())?;
        self.write_list(
            "Matched owners:",
            evaluation.matched.iter().map(String::as_str),
        )?;
        self.write_unresolved_teams(&evaluation.unresolved_teams)?;
        self.write_verdict(evaluation)
    }

    /// Writes a startup error.
    pub fn write_error(&mut self, message: &str) -> std::io::Result<()> {
        if self.use_colors {
            writeln!(self.writer, "{} {}", "Error:".red().bold(), message)
        } else {
            writeln!(self.writer, "Error: {}", message)
        }
    }
}
