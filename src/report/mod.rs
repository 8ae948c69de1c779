//! Report generation.
//!
//! `dashboard` turns aggregates into display records; `generator` renders
//! them as Markdown or JSON.

pub mod dashboard;
pub mod generator;

pub use dashboard::{
    board_dashboard, ranking_dashboard, system_dashboard, user_dashboard, Dashboard, LabelWidths,
};
pub use generator::{
    generate_json_report, generate_markdown_report, write_report, Report, ReportMetadata,
};
