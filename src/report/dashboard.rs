//! Display records for the statistics views.
//!
//! Converts aggregates into stat cards and bar/pie chart entries. Nothing
//! here touches the snapshot; absent aggregates render as an empty view.

use crate::analysis::{unique_category_count, user_category_hours};
use crate::models::{BoardAnalytics, RankingEntry, SystemAnalytics, UserAnalytics, View};
use serde::Serialize;

/// Accent colour of a stat card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Accent {
    Blue,
    Green,
    Purple,
    Gray,
}

/// A single headline number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub label: String,
    pub value: String,
    pub accent: Accent,
}

impl StatCard {
    fn new(label: &str, value: impl ToString, accent: Accent) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
            accent,
        }
    }
}

/// One bar or pie slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartEntry {
    pub label: String,
    pub value: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Everything needed to draw one statistics view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub view: View,
    /// Name of the user or board shown, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub stat_cards: Vec<StatCard>,
    pub bar_title: String,
    pub bar: Vec<ChartEntry>,
    pub pie_title: String,
    pub pie: Vec<ChartEntry>,
}

impl Dashboard {
    /// Whether the view has nothing to show.
    pub fn is_empty(&self) -> bool {
        self.bar.is_empty() && self.pie.is_empty()
    }
}

/// Axis label limits: labels longer than `width` are cut to `keep` characters plus "...".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelWidth {
    pub width: usize,
    pub keep: usize,
}

impl LabelWidth {
    /// Shorten `label` to fit the axis.
    pub fn apply(&self, label: &str) -> String {
        truncate_label(label, self.width, self.keep)
    }
}

/// Label limits for the organization and category axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelWidths {
    pub organization: LabelWidth,
    pub category: LabelWidth,
}

impl Default for LabelWidths {
    fn default() -> Self {
        Self {
            organization: LabelWidth { width: 10, keep: 8 },
            category: LabelWidth { width: 15, keep: 12 },
        }
    }
}

impl From<&crate::config::ReportConfig> for LabelWidths {
    fn from(config: &crate::config::ReportConfig) -> Self {
        Self {
            organization: LabelWidth {
                width: config.org_label_width,
                keep: config.org_label_keep,
            },
            category: LabelWidth {
                width: config.category_label_width,
                keep: config.category_label_keep,
            },
        }
    }
}

/// Shorten `label`: longer than `width` chars becomes its first `keep` chars plus "...".
pub fn truncate_label(label: &str, width: usize, keep: usize) -> String {
    if label.chars().count() <= width {
        return label.to_string();
    }
    let prefix: String = label.chars().take(keep).collect();
    format!("{}...", prefix)
}

/// `n` evenly spaced hues at saturation 0.7 and value 0.9, as `#RRGGBB`.
pub fn pie_colors(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let hue = (i as f64 * 360.0 / n as f64) % 360.0;
            hsv_to_hex(hue, 0.7, 0.9)
        })
        .collect()
}

fn hsv_to_hex(hue: f64, saturation: f64, value: f64) -> String {
    let chroma = value * saturation;
    let x = chroma * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = value - chroma;

    let (r, g, b) = match (hue / 60.0) as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    let channel = |c: f64| ((c + m) * 255.0).round() as u8;
    format!("#{:02X}{:02X}{:02X}", channel(r), channel(g), channel(b))
}

fn colored(mut entries: Vec<ChartEntry>) -> Vec<ChartEntry> {
    let colors = pie_colors(entries.len());
    for (entry, color) in entries.iter_mut().zip(colors) {
        entry.color = Some(color);
    }
    entries
}

fn entry(label: String, value: impl Into<u64>) -> ChartEntry {
    ChartEntry {
        label,
        value: value.into(),
        color: None,
    }
}

/// Medal prefix for the first three ranks.
pub fn medal(position: usize) -> Option<&'static str> {
    match position {
        1 => Some("🥇"),
        2 => Some("🥈"),
        3 => Some("🥉"),
        _ => None,
    }
}

fn empty(view: View, labels: [&str; 3]) -> Dashboard {
    Dashboard {
        view,
        subject: None,
        stat_cards: labels
            .iter()
            .map(|label| StatCard::new(label, 0, Accent::Gray))
            .collect(),
        bar_title: "No data".to_string(),
        bar: Vec::new(),
        pie_title: "No data".to_string(),
        pie: Vec::new(),
    }
}

/// Dashboard for a single user.
pub fn user_dashboard(user: Option<&UserAnalytics>, widths: LabelWidths) -> Dashboard {
    let Some(user) = user else {
        return empty(View::User, ["Total hours", "Organizations", "Work categories"]);
    };

    let bar = user
        .organizations
        .iter()
        .map(|org| entry(widths.organization.apply(&org.name), org.hours))
        .collect();

    let pie = user_category_hours(user)
        .into_iter()
        .map(|c| entry(c.category, c.hours))
        .collect();

    Dashboard {
        view: View::User,
        subject: Some(user.name.clone()),
        stat_cards: vec![
            StatCard::new("Total hours", user.total_hours, Accent::Blue),
            StatCard::new("Organizations", user.organizations.len(), Accent::Green),
            StatCard::new("Work categories", unique_category_count(user), Accent::Purple),
        ],
        bar_title: "Hours per organization".to_string(),
        bar,
        pie_title: "Hours per work category".to_string(),
        pie: colored(pie),
    }
}

/// Dashboard for a single board.
pub fn board_dashboard(board: Option<&BoardAnalytics>, widths: LabelWidths) -> Dashboard {
    let Some(board) = board else {
        return empty(View::Board, ["Total hours", "Volunteers", "Categories"]);
    };

    let bar = board
        .categories
        .iter()
        .map(|c| entry(widths.category.apply(&c.category), c.hours))
        .collect();

    // Categories nobody is assigned to have no slice.
    let pie = board
        .categories
        .iter()
        .filter(|c| c.volunteers > 0)
        .map(|c| entry(c.category.clone(), c.volunteers as u64))
        .collect();

    Dashboard {
        view: View::Board,
        subject: Some(board.name.clone()),
        stat_cards: vec![
            StatCard::new("Total hours", board.total_hours, Accent::Green),
            StatCard::new("Volunteers", board.total_volunteers, Accent::Blue),
            StatCard::new("Categories", board.categories.len(), Accent::Purple),
        ],
        bar_title: "Hours per work category".to_string(),
        bar,
        pie_title: "Volunteers per work category".to_string(),
        pie: colored(pie),
    }
}

/// Dashboard across every board.
pub fn system_dashboard(system: &SystemAnalytics, widths: LabelWidths) -> Dashboard {
    let bar = system
        .categories
        .iter()
        .map(|c| entry(widths.category.apply(&c.category), c.hours))
        .collect();

    let pie = system
        .categories
        .iter()
        .map(|c| entry(c.category.clone(), c.volunteers as u64))
        .collect();

    Dashboard {
        view: View::System,
        subject: None,
        stat_cards: vec![
            StatCard::new("Total hours", system.total_hours, Accent::Purple),
            StatCard::new("Volunteers", system.total_volunteers, Accent::Blue),
            StatCard::new("Organizations", system.total_organizations, Accent::Green),
        ],
        bar_title: "Hours per work category (system)".to_string(),
        bar,
        pie_title: "Volunteers per work category (system)".to_string(),
        pie: colored(pie),
    }
}

/// Dashboard for the volunteer ranking.
pub fn ranking_dashboard(ranking: &[RankingEntry]) -> Dashboard {
    if ranking.is_empty() {
        return empty(View::Ranking, ["Volunteers", "Total hours", "Top volunteer"]);
    }

    let total: u64 = ranking.iter().map(|r| u64::from(r.hours)).sum();
    let bar = ranking
        .iter()
        .map(|r| {
            let label = match medal(r.position) {
                Some(medal) => format!("{} {}", medal, r.name),
                None => r.name.clone(),
            };
            entry(label, r.hours)
        })
        .collect();

    Dashboard {
        view: View::Ranking,
        subject: None,
        stat_cards: vec![
            StatCard::new("Volunteers", ranking.len(), Accent::Blue),
            StatCard::new("Total hours", total, Accent::Green),
            StatCard::new("Top volunteer", &ranking[0].name, Accent::Purple),
        ],
        bar_title: "Hours per volunteer".to_string(),
        bar,
        pie_title: String::new(),
        pie: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryHours, CategoryStats, OrganizationHours, SystemCategoryStats};

    fn create_test_board() -> BoardAnalytics {
        BoardAnalytics {
            board_id: "b1".to_string(),
            name: "Green Hands".to_string(),
            total_hours: 11,
            total_volunteers: 2,
            categories: vec![
                CategoryStats {
                    category: "Environmental cleanup and conservation".to_string(),
                    hours: 8,
                    volunteers: 2,
                },
                CategoryStats {
                    category: "Other".to_string(),
                    hours: 3,
                    volunteers: 0,
                },
            ],
        }
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("Short", 10, 8), "Short");
        assert_eq!(truncate_label("Exactly 10", 10, 8), "Exactly 10");
        assert_eq!(truncate_label("Green Hands Association", 10, 8), "Green Ha...");
        assert_eq!(
            truncate_label("Environmental cleanup", 15, 12),
            "Environmenta..."
        );
        assert_eq!(truncate_label("Čišćenje okoliša", 10, 8), "Čišćenje...");
    }

    #[test]
    fn test_default_label_widths() {
        let widths = LabelWidths::default();
        assert_eq!(widths.organization.apply("Green Hands"), "Green Ha...");
        assert_eq!(widths.organization.apply("Youth Club"), "Youth Club");
        assert_eq!(
            widths.category.apply("Work with children"),
            "Work with ch..."
        );
        assert_eq!(widths, LabelWidths::from(&crate::config::ReportConfig::default()));
    }

    #[test]
    fn test_pie_colors() {
        let colors = pie_colors(3);
        assert_eq!(colors.len(), 3);
        for color in &colors {
            assert!(crate::snapshot::validate::is_hex_color(color));
        }
        // Red, green, blue dominant in turn; the muted channels match
        assert!(colors[0].ends_with("4545"));
        assert!(colors[1].starts_with("#45") && colors[1].ends_with("45"));
        assert!(colors[2].starts_with("#4545"));
        assert!(pie_colors(0).is_empty());
    }

    #[test]
    fn test_board_dashboard() {
        let board = create_test_board();
        let dashboard = board_dashboard(Some(&board), LabelWidths::default());

        assert_eq!(dashboard.subject.as_deref(), Some("Green Hands"));
        assert_eq!(dashboard.stat_cards[0].value, "11");
        assert_eq!(dashboard.stat_cards[1].value, "2");
        assert_eq!(dashboard.stat_cards[2].value, "2");

        assert_eq!(dashboard.bar.len(), 2);
        assert_eq!(dashboard.bar[0].label, "Environmenta...");
        assert_eq!(dashboard.bar[0].value, 8);

        // Zero-volunteer category has no slice
        assert_eq!(dashboard.pie.len(), 1);
        assert_eq!(dashboard.pie[0].value, 2);
        assert!(dashboard.pie[0].color.is_some());
    }

    #[test]
    fn test_missing_analytics_render_empty() {
        let dashboard = board_dashboard(None, LabelWidths::default());
        assert!(dashboard.is_empty());
        assert!(dashboard.stat_cards.iter().all(|c| c.value == "0"));
        assert!(dashboard.stat_cards.iter().all(|c| c.accent == Accent::Gray));

        let dashboard = user_dashboard(None, LabelWidths::default());
        assert_eq!(dashboard.view, View::User);
        assert!(dashboard.is_empty());
    }

    #[test]
    fn test_user_dashboard() {
        let user = UserAnalytics {
            user_id: "u1".to_string(),
            name: "Ana".to_string(),
            total_hours: 9,
            organizations: vec![
                OrganizationHours {
                    board_id: "b1".to_string(),
                    name: "Green Hands Association".to_string(),
                    hours: 6,
                    categories: vec![CategoryHours {
                        category: "Cleanup".to_string(),
                        hours: 6,
                    }],
                },
                OrganizationHours {
                    board_id: "b2".to_string(),
                    name: "Shelter".to_string(),
                    hours: 3,
                    categories: vec![CategoryHours {
                        category: "Cleanup".to_string(),
                        hours: 3,
                    }],
                },
            ],
        };

        let dashboard = user_dashboard(Some(&user), LabelWidths::default());

        assert_eq!(dashboard.stat_cards[0].value, "9");
        assert_eq!(dashboard.stat_cards[1].value, "2");
        assert_eq!(dashboard.stat_cards[2].value, "1");
        assert_eq!(dashboard.bar[0].label, "Green Ha...");
        assert_eq!(dashboard.bar[1].label, "Shelter");
        assert_eq!(dashboard.pie.len(), 1);
        assert_eq!(dashboard.pie[0].value, 9);
    }

    #[test]
    fn test_system_dashboard() {
        let system = SystemAnalytics {
            total_hours: 5,
            total_volunteers: 0,
            total_organizations: 4,
            categories: vec![SystemCategoryStats {
                category: "Other".to_string(),
                hours: 5,
                volunteers: 0,
                organizations: 1,
            }],
        };

        let dashboard = system_dashboard(&system, LabelWidths::default());
        assert_eq!(dashboard.stat_cards[2].value, "4");
        assert_eq!(dashboard.pie.len(), 1);
        assert_eq!(dashboard.pie[0].value, 0);
    }

    #[test]
    fn test_ranking_dashboard() {
        let ranking: Vec<RankingEntry> = ["Mia", "Petra", "Sara", "Ana"]
            .iter()
            .enumerate()
            .map(|(i, name)| RankingEntry {
                position: i + 1,
                user_id: format!("u{}", i),
                name: name.to_string(),
                email: String::new(),
                hours: 10 - i as u64,
            })
            .collect();

        let dashboard = ranking_dashboard(&ranking);
        assert_eq!(dashboard.bar[0].label, "🥇 Mia");
        assert_eq!(dashboard.bar[2].label, "🥉 Sara");
        assert_eq!(dashboard.bar[3].label, "Ana");
        assert_eq!(dashboard.stat_cards[1].value, "34");
        assert_eq!(dashboard.stat_cards[2].value, "Mia");

        assert!(ranking_dashboard(&[]).is_empty());
    }
}
