//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::View;
use crate::snapshot::{AssignEdit, CardRef, HoursEdit};
use clap::Parser;
use std::path::PathBuf;

/// Volonter - volunteer hours statistics
///
/// Load a snapshot of users and boards, aggregate the work hours logged on
/// cards, and render user, organization or system statistics as Markdown
/// or JSON.
///
/// Examples:
///   volonter --snapshot data.json
///   volonter --snapshot data/ --view user --user u1
///   volonter --snapshot data.json --view board --board green-hands --format json
///   volonter --snapshot data.json --view ranking --top 5
///   volonter --snapshot data.json --repair --write-snapshot fixed.json
///   volonter --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Snapshot to analyze
    ///
    /// Either a .json file with "users" and "boards" arrays, or a directory
    /// with users/<id>.json and boards/<id>.json documents.
    #[arg(
        short,
        long,
        value_name = "PATH",
        env = "VOLONTER_SNAPSHOT",
        required_unless_present = "init_config"
    )]
    pub snapshot: Option<PathBuf>,

    /// Statistics view to render
    #[arg(long, default_value = "system", value_name = "VIEW")]
    pub view: View,

    /// User whose statistics to show (user view) or whose first board to pick (board view)
    #[arg(short, long, value_name = "ID", env = "VOLONTER_USER")]
    pub user: Option<String>,

    /// Board to show in the board view
    #[arg(short, long, value_name = "ID")]
    pub board: Option<String>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Output file path for the report
    ///
    /// If not specified, the report is printed to stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .volonter.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Number of volunteers listed in the ranking view
    #[arg(long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Category for cards without a type of work
    #[arg(long, value_name = "TEXT")]
    pub fallback_category: Option<String>,

    /// Maximum work hours per card
    #[arg(long, value_name = "HOURS")]
    pub max_hours: Option<u32>,

    /// Exit with code 2 if the snapshot violates data-model invariants
    #[arg(long)]
    pub strict: bool,

    /// Clamp out-of-range hours, drop non-member card assignments and clear bad label colours
    #[arg(long)]
    pub repair: bool,

    /// Set a card's work hours (repeatable)
    ///
    /// Example: --set-hours green-hands:0:2=4
    #[arg(long, value_name = "BOARD:LIST:CARD=HOURS")]
    pub set_hours: Vec<HoursEdit>,

    /// Assign a board member to a card (repeatable)
    ///
    /// Example: --assign green-hands:0:2=u1
    #[arg(long, value_name = "BOARD:LIST:CARD=USER")]
    pub assign: Vec<AssignEdit>,

    /// Remove a card (repeatable, applied after the other edits)
    ///
    /// Example: --remove-card green-hands:1:0
    #[arg(long, value_name = "BOARD:LIST:CARD")]
    pub remove_card: Vec<CardRef>,

    /// Write the (edited) snapshot back to this file
    #[arg(long, value_name = "FILE")]
    pub write_snapshot: Option<PathBuf>,

    /// Generate a default .volonter.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether any edit to the snapshot was requested.
    pub fn has_edits(&self) -> bool {
        self.repair
            || !self.set_hours.is_empty()
            || !self.assign.is_empty()
            || !self.remove_card.is_empty()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.snapshot.is_none() {
            return Err("A snapshot path is required (--snapshot)".to_string());
        }

        if self.view == View::User && self.user.is_none() {
            return Err("The user view needs --user".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.top == Some(0) {
            return Err("--top must be at least 1".to_string());
        }

        if self.max_hours == Some(0) {
            return Err("--max-hours must be at least 1".to_string());
        }

        if let Some(ref category) = self.fallback_category {
            if category.trim().is_empty() {
                return Err("--fallback-category cannot be blank".to_string());
            }
        }

        if let Some(ref path) = self.write_snapshot {
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                return Err(format!(
                    "--write-snapshot must be a .json file: {}",
                    path.display()
                ));
            }
        }

        Ok(())
    }
}
