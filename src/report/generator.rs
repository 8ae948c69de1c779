//! Markdown and JSON report generation.
//!
//! This module renders a statistics dashboard, plus snapshot metadata and
//! validation results, as a Markdown document or as JSON.

use super::dashboard::{medal, ChartEntry, Dashboard, StatCard};
use crate::models::RankingEntry;
use crate::snapshot::{Repair, SnapshotWarning};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Width of the longest bar in Markdown charts, in characters.
const BAR_WIDTH: usize = 30;

/// Metadata about the report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Path of the analyzed snapshot.
    pub snapshot: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    pub users: usize,
    pub boards: usize,
    pub cards: usize,
    /// Number of invariant violations found in the snapshot.
    pub warnings: usize,
}

/// The complete statistics report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub dashboard: Dashboard,
    /// Full ranking rows, for the ranking view.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ranking: Vec<RankingEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<SnapshotWarning>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub repairs: Vec<Repair>,
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    // Title
    let dashboard = &report.dashboard;
    match dashboard.subject {
        Some(ref subject) => output.push_str(&format!(
            "# {} Statistics: {}\n\n",
            dashboard.view, subject
        )),
        None => output.push_str(&format!("# {} Statistics\n\n", dashboard.view)),
    }

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(&dashboard.stat_cards));

    if dashboard.is_empty() {
        output.push_str("No data for this view.\n\n");
    } else {
        output.push_str(&generate_bar_section(&dashboard.bar_title, &dashboard.bar));
        output.push_str(&generate_pie_section(&dashboard.pie_title, &dashboard.pie));
    }

    output.push_str(&generate_ranking_section(&report.ranking));
    output.push_str(&generate_warnings_section(&report.warnings));
    output.push_str(&generate_repairs_section(&report.repairs));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Snapshot:** `{}`\n", metadata.snapshot));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Users:** {} | **Boards:** {} | **Cards:** {}\n",
        metadata.users, metadata.boards, metadata.cards
    ));
    if metadata.warnings > 0 {
        section.push_str(&format!("- **Warnings:** {}\n", metadata.warnings));
    }
    section.push('\n');

    section
}

/// Generate the stat card table.
fn generate_summary_section(cards: &[StatCard]) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    let header: Vec<_> = cards.iter().map(|c| escape_cell(&c.label)).collect();
    let values: Vec<_> = cards.iter().map(|c| format!("**{}**", c.value)).collect();

    section.push_str(&format!("| {} |\n", header.join(" | ")));
    section.push_str(&format!("|{}\n", ":---:|".repeat(cards.len())));
    section.push_str(&format!("| {} |\n\n", values.join(" | ")));

    section
}

/// Render a bar chart as a table with text bars scaled to the largest value.
fn generate_bar_section(title: &str, entries: &[ChartEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str(&format!("## {}\n\n", title));
    section.push_str("| Label | Value | |\n");
    section.push_str("|:---|---:|:---|\n");

    let max = entries.iter().map(|e| e.value).max().unwrap_or(0);
    for entry in entries {
        section.push_str(&format!(
            "| {} | {} | `{}` |\n",
            escape_cell(&entry.label),
            entry.value,
            text_bar(entry.value, max)
        ));
    }
    section.push('\n');

    section
}

/// Escape a value for use inside a Markdown table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn text_bar(value: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let width = (value as f64 / max as f64 * BAR_WIDTH as f64).round() as usize;
    "█".repeat(width)
}

/// Render a pie chart as a table of shares.
fn generate_pie_section(title: &str, entries: &[ChartEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str(&format!("## {}\n\n", title));
    section.push_str("| Label | Value | Share | Colour |\n");
    section.push_str("|:---|---:|---:|:---:|\n");

    let total: u64 = entries.iter().map(|e| e.value).sum();
    for entry in entries {
        let share = if total == 0 {
            0.0
        } else {
            entry.value as f64 * 100.0 / total as f64
        };
        section.push_str(&format!(
            "| {} | {} | {:.1}% | {} |\n",
            escape_cell(&entry.label),
            entry.value,
            share,
            entry.color.as_deref().unwrap_or("-")
        ));
    }
    section.push('\n');

    section
}

/// Generate the ranking table.
fn generate_ranking_section(ranking: &[RankingEntry]) -> String {
    if ranking.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Ranking\n\n");
    section.push_str("| # | Volunteer | Email | Hours |\n");
    section.push_str("|:---:|:---|:---|---:|\n");

    for entry in ranking {
        let position = match medal(entry.position) {
            Some(medal) => format!("{} {}", medal, entry.position),
            None => entry.position.to_string(),
        };
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            position,
            escape_cell(&entry.name),
            escape_cell(&entry.email),
            entry.hours
        ));
    }
    section.push('\n');

    section
}

/// Generate the validation warnings section.
fn generate_warnings_section(warnings: &[SnapshotWarning]) -> String {
    if warnings.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Snapshot Warnings\n\n");
    for warning in warnings {
        section.push_str(&format!("- ⚠️ {}\n", warning));
    }
    section.push('\n');

    section
}

/// Generate the repairs section.
fn generate_repairs_section(repairs: &[Repair]) -> String {
    if repairs.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Repairs\n\n");
    for repair in repairs {
        section.push_str(&format!("- 🔧 {}\n", repair));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by volonter*\n".to_string()
}

/// Write a rendered report to a file, replacing any existing one.
pub async fn write_report(content: &str, path: &Path) -> Result<()> {
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    Ok(())
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::dashboard::{board_dashboard, ranking_dashboard, LabelWidths};
    use crate::models::{BoardAnalytics, CategoryStats};

    fn create_test_metadata() -> ReportMetadata {
        ReportMetadata {
            snapshot: "fixtures/snapshot.json".to_string(),
            generated_at: Utc::now(),
            users: 4,
            boards: 3,
            cards: 9,
            warnings: 1,
        }
    }

    fn create_test_report() -> Report {
        let board = BoardAnalytics {
            board_id: "b1".to_string(),
            name: "Green Hands".to_string(),
            total_hours: 12,
            total_volunteers: 2,
            categories: vec![
                CategoryStats {
                    category: "Cleanup".to_string(),
                    hours: 9,
                    volunteers: 2,
                },
                CategoryStats {
                    category: "Other".to_string(),
                    hours: 3,
                    volunteers: 1,
                },
            ],
        };

        Report {
            metadata: create_test_metadata(),
            dashboard: board_dashboard(Some(&board), LabelWidths::default()),
            ranking: Vec::new(),
            warnings: vec![SnapshotWarning::UnknownMember {
                board: "b1".to_string(),
                user: "ghost".to_string(),
            }],
            repairs: Vec::new(),
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# Organization Statistics: Green Hands"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Summary"));
        assert!(markdown.contains("## Hours per work category"));
        assert!(markdown.contains("## Volunteers per work category"));
        assert!(markdown.contains("| Cleanup | 9 |"));
        assert!(markdown.contains("66.7%"));
        assert!(markdown.contains("## Snapshot Warnings"));
        assert!(markdown.contains("ghost"));
        assert!(!markdown.contains("## Repairs"));
    }

    #[test]
    fn test_summary_section() {
        let report = create_test_report();
        let section = generate_summary_section(&report.dashboard.stat_cards);

        assert!(section.contains("| Total hours | Volunteers | Categories |"));
        assert!(section.contains("|:---:|:---:|:---:|"));
        assert!(section.contains("| **12** | **2** | **2** |"));
    }

    #[test]
    fn test_text_bar_scales_to_max() {
        assert_eq!(text_bar(10, 10).chars().count(), BAR_WIDTH);
        assert_eq!(text_bar(5, 10).chars().count(), BAR_WIDTH / 2);
        assert!(text_bar(0, 0).is_empty());
    }

    #[test]
    fn test_empty_dashboard_markdown() {
        let report = Report {
            metadata: create_test_metadata(),
            dashboard: board_dashboard(None, LabelWidths::default()),
            ranking: Vec::new(),
            warnings: Vec::new(),
            repairs: Vec::new(),
        };

        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("# Organization Statistics\n"));
        assert!(markdown.contains("No data for this view."));
        assert!(!markdown.contains("## Hours per work category"));
    }

    #[test]
    fn test_ranking_markdown() {
        let ranking = vec![
            RankingEntry {
                position: 1,
                user_id: "u1".to_string(),
                name: "Mia".to_string(),
                email: "mia@example.com".to_string(),
                hours: 12,
            },
            RankingEntry {
                position: 2,
                user_id: "u2".to_string(),
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                hours: 7,
            },
        ];

        let report = Report {
            metadata: create_test_metadata(),
            dashboard: ranking_dashboard(&ranking),
            ranking,
            warnings: Vec::new(),
            repairs: Vec::new(),
        };

        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("## Ranking"));
        assert!(markdown.contains("| 🥇 1 | Mia | mia@example.com | 12 |"));
        assert!(markdown.contains("| 🥈 2 | Ana |"));
    }

    #[test]
    fn test_table_cells_escape_pipes() {
        let ranking = vec![RankingEntry {
            position: 4,
            user_id: "u1".to_string(),
            name: "Mia | Ana".to_string(),
            email: "mia@example.com".to_string(),
            hours: 3,
        }];

        let section = generate_ranking_section(&ranking);
        assert!(section.contains("| 4 | Mia \\| Ana | mia@example.com | 3 |"));

        let entries = vec![ChartEntry {
            label: "Paint|Draw".to_string(),
            value: 2,
            color: None,
        }];
        assert!(generate_bar_section("Hours", &entries).contains("| Paint\\|Draw | 2 |"));
        assert!(generate_pie_section("Volunteers", &entries)
            .contains("| Paint\\|Draw | 2 | 100.0% | - |"));
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.md");
        std::fs::write(&path, "old contents").unwrap();

        let markdown = generate_markdown_report(&create_test_report());
        tokio_test::block_on(write_report(&markdown, &path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), markdown);

        let missing = dir.path().join("no-such-dir").join("report.md");
        let err = tokio_test::block_on(write_report(&markdown, &missing)).unwrap_err();
        assert!(err.to_string().contains("Failed to write report"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"view\": \"board\""));
        assert!(json.contains("\"stat_cards\""));
        assert!(json.contains("\"kind\": \"unknown_member\""));
        assert!(!json.contains("\"repairs\""));
    }
}
