//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.volonter.toml` files.

use crate::models::{DEFAULT_CATEGORY, MAX_WORK_HOURS};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE: &str = ".volonter.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Aggregation settings.
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path. Empty means stdout.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    String::new()
}

/// Aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Category assigned to cards without a type of work.
    #[serde(default = "default_fallback_category")]
    pub fallback_category: String,

    /// Maximum work hours a single card may carry.
    #[serde(default = "default_max_work_hours")]
    pub max_work_hours: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            fallback_category: default_fallback_category(),
            max_work_hours: default_max_work_hours(),
        }
    }
}

fn default_fallback_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_max_work_hours() -> u32 {
    MAX_WORK_HOURS
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Organization names longer than this are shortened on chart axes.
    #[serde(default = "default_org_label_width")]
    pub org_label_width: usize,

    /// Characters of a shortened organization name kept before "...".
    #[serde(default = "default_org_label_keep")]
    pub org_label_keep: usize,

    /// Category names longer than this are shortened on chart axes.
    #[serde(default = "default_category_label_width")]
    pub category_label_width: usize,

    /// Characters of a shortened category name kept before "...".
    #[serde(default = "default_category_label_keep")]
    pub category_label_keep: usize,

    /// Include snapshot validation warnings in the report.
    #[serde(default = "default_true")]
    pub include_warnings: bool,

    /// Number of volunteers listed in the ranking view.
    #[serde(default = "default_ranking_size")]
    pub ranking_size: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            org_label_width: default_org_label_width(),
            org_label_keep: default_org_label_keep(),
            category_label_width: default_category_label_width(),
            category_label_keep: default_category_label_keep(),
            include_warnings: true,
            ranking_size: default_ranking_size(),
        }
    }
}

fn default_org_label_width() -> usize {
    10
}

fn default_org_label_keep() -> usize {
    8
}

fn default_category_label_width() -> usize {
    15
}

fn default_category_label_keep() -> usize {
    12
}

fn default_true() -> bool {
    true
}

fn default_ranking_size() -> usize {
    10
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if let Some(ref category) = args.fallback_category {
            self.analytics.fallback_category = category.clone();
        }
        if let Some(max) = args.max_hours {
            self.analytics.max_work_hours = max;
        }

        if let Some(top) = args.top {
            self.report.ranking_size = top;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Check values that the file can set but the CLI cannot constrain.
    pub fn validate(&self) -> Result<()> {
        if self.analytics.fallback_category.trim().is_empty() {
            bail!("analytics.fallback_category cannot be blank");
        }
        if self.analytics.max_work_hours == 0 {
            bail!("analytics.max_work_hours must be at least 1");
        }
        if self.report.ranking_size == 0 {
            bail!("report.ranking_size must be at least 1");
        }

        let labels = [
            ("org_label", self.report.org_label_width, self.report.org_label_keep),
            (
                "category_label",
                self.report.category_label_width,
                self.report.category_label_keep,
            ),
        ];
        for (name, width, keep) in labels {
            if keep == 0 || keep > width {
                bail!(
                    "report.{}_keep must be between 1 and report.{}_width ({})",
                    name,
                    name,
                    width
                );
            }
        }

        Ok(())
    }

    /// Log level from the quiet flag and the merged verbose setting.
    pub fn log_level(&self, quiet: bool) -> tracing::Level {
        if quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
