//! Volonter - volunteer hours statistics
//!
//! A CLI tool that loads a snapshot of users and boards, aggregates the
//! work hours logged on cards, and renders user, organization, system or
//! ranking statistics.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, unreadable snapshot, bad config, etc.)
//!   2 - Snapshot violates data-model invariants and --strict was given

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod snapshot;

use analysis::AggregationOptions;
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use models::{RankingEntry, Snapshot, View};
use report::{Dashboard, LabelWidths, Report, ReportMetadata};
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config decides the log level, so it is loaded before logging starts
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(config.log_level(args.quiet));

    info!("Volonter v{}", env!("CARGO_PKG_VERSION"));
    log_config_source(&args);
    debug!("Arguments: {:?}", args);

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .volonter.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the fallback category, hour limit and report layout.");
    Ok(())
}

/// Initialize logging at the given level.
///
/// Logs go to stderr so a report printed to stdout stays clean.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load, edit, validate and report. Returns exit code (0 or 2).
async fn run(args: Args, config: Config) -> Result<i32> {
    let snapshot_path = args
        .snapshot
        .clone()
        .context("A snapshot path is required (--snapshot)")?;
    let to_stdout = config.general.output.is_empty();
    let chatty = !args.quiet && !to_stdout;

    if chatty {
        println!("📥 Loading snapshot: {}", snapshot_path.display());
    }
    let mut snapshot = snapshot::load_snapshot(&snapshot_path)
        .await
        .with_context(|| format!("Failed to load snapshot {}", snapshot_path.display()))?;

    // Edits, then repair, then validation of the result
    let max_hours = config.analytics.max_work_hours;
    apply_edits(&mut snapshot, &args, max_hours)?;

    let repairs = if args.repair {
        let repairs = snapshot::repair(&mut snapshot, max_hours);
        info!("Repaired {} problems", repairs.len());
        repairs
    } else {
        Vec::new()
    };

    let warnings = snapshot::validate(&snapshot, max_hours);

    if let Some(ref path) = args.write_snapshot {
        snapshot::save_snapshot(&snapshot, path)
            .await
            .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;
        if chatty {
            println!("💾 Snapshot written to: {}", path.display());
        }
    } else if args.has_edits() {
        warn!("Edits were applied in memory only; pass --write-snapshot to keep them");
    }

    // Aggregate and build the report
    let opts = AggregationOptions::from(&config.analytics);
    let widths = LabelWidths::from(&config.report);
    let (dashboard, ranking) = build_dashboard(&args, &config, &snapshot, &opts, widths);

    let metadata = ReportMetadata {
        snapshot: snapshot_path.display().to_string(),
        generated_at: Utc::now(),
        users: snapshot.users.len(),
        boards: snapshot.boards.len(),
        cards: snapshot.card_count(),
        warnings: warnings.len(),
    };

    let report = Report {
        metadata,
        dashboard,
        ranking,
        warnings: if config.report.include_warnings {
            warnings.clone()
        } else {
            Vec::new()
        },
        repairs,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    if to_stdout {
        print!("{}", output);
    } else {
        report::write_report(&output, Path::new(&config.general.output)).await?;
    }

    if chatty {
        print_summary(&report.dashboard, warnings.len());
        println!(
            "\n✅ Statistics complete! Report saved to: {}",
            config.general.output
        );
    }

    if args.strict && !warnings.is_empty() {
        eprintln!(
            "\n⛔ Snapshot has {} warnings. Failing (exit code 2).",
            warnings.len()
        );
        return Ok(2);
    }

    Ok(0)
}

/// Apply the --set-hours, --assign and --remove-card edits, in that order.
fn apply_edits(snapshot: &mut Snapshot, args: &Args, max_hours: u32) -> Result<()> {
    for edit in &args.set_hours {
        let board = snapshot
            .board_mut(&edit.target.board)
            .with_context(|| format!("Unknown board '{}'", edit.target.board))?;
        board
            .card_mut(edit.target.list, edit.target.card)?
            .set_work_hours(edit.hours, max_hours)?;
        info!("Set hours of {} to {}", edit.target, edit.hours);
    }

    for edit in &args.assign {
        let board = snapshot
            .board_mut(&edit.target.board)
            .with_context(|| format!("Unknown board '{}'", edit.target.board))?;
        if board.assign_card_member(edit.target.list, edit.target.card, &edit.user)? {
            info!("Assigned {} to {}", edit.user, edit.target);
        } else {
            debug!("{} already assigned to {}", edit.user, edit.target);
        }
    }

    // Each removal shifts later cards of the same list
    for target in &args.remove_card {
        let board = snapshot
            .board_mut(&target.board)
            .with_context(|| format!("Unknown board '{}'", target.board))?;
        let card = board.remove_card(target.list, target.card)?;
        info!("Removed card '{}' at {}", card.name, target);
    }

    Ok(())
}

/// Run the aggregation for the requested view.
fn build_dashboard(
    args: &Args,
    config: &Config,
    snapshot: &Snapshot,
    opts: &AggregationOptions,
    widths: LabelWidths,
) -> (Dashboard, Vec<RankingEntry>) {
    match args.view {
        View::User => {
            let user_id = args.user.as_deref().unwrap_or_default();
            let analytics = analysis::user_analytics(snapshot, user_id, opts);
            if analytics.is_none() {
                warn!("User '{}' is not in the snapshot", user_id);
            }
            (report::user_dashboard(analytics.as_ref(), widths), Vec::new())
        }
        View::Board => {
            let board_id = args.board.clone().or_else(|| {
                let user_id = args.user.as_deref()?;
                analysis::default_board_for(snapshot, user_id).map(|b| b.id.clone())
            });

            let analytics = match board_id {
                Some(ref id) => {
                    let analytics = analysis::board_analytics(snapshot, id, opts);
                    if analytics.is_none() {
                        warn!("Board '{}' is not in the snapshot", id);
                    }
                    analytics
                }
                None => {
                    warn!("No board selected; pass --board or --user");
                    None
                }
            };
            (report::board_dashboard(analytics.as_ref(), widths), Vec::new())
        }
        View::System => {
            let analytics = analysis::system_analytics(snapshot, opts);
            (report::system_dashboard(&analytics, widths), Vec::new())
        }
        View::Ranking => {
            let mut ranking = analysis::volunteer_ranking(snapshot, opts);
            ranking.truncate(config.report.ranking_size);
            (report::ranking_dashboard(&ranking), ranking)
        }
    }
}

/// Print the stat cards to stdout.
fn print_summary(dashboard: &Dashboard, warnings: usize) {
    match dashboard.subject {
        Some(ref subject) => println!("\n📊 {} Statistics: {}", dashboard.view, subject),
        None => println!("\n📊 {} Statistics", dashboard.view),
    }
    for card in &dashboard.stat_cards {
        println!("   {}: {}", card.label, card.value);
    }
    if warnings > 0 {
        println!("   ⚠️  Snapshot warnings: {}", warnings);
    }
}

/// Load configuration from file or use defaults, then apply CLI overrides.
///
/// A config file that exists but cannot be parsed is an error, as is a
/// merged configuration with invalid values.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match args.config {
        Some(ref config_path) => Config::load(config_path)?,
        None => Config::load_default()?.unwrap_or_default(),
    };

    config.merge_with_args(args);
    config.validate().context("Invalid configuration")?;

    Ok(config)
}

/// Report where the configuration came from, once logging is up.
fn log_config_source(args: &Args) {
    match args.config {
        Some(ref config_path) => info!("Loaded config from: {}", config_path.display()),
        None if Path::new(CONFIG_FILE).exists() => {
            info!("Loaded default config from {}", CONFIG_FILE)
        }
        None => debug!("No config file found, using defaults"),
    }
}
