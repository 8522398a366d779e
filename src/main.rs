use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use matchmaker::api::state::AppState;
use matchmaker::balance::balance_teams;
use matchmaker::calculate::assess_balance;
use matchmaker::config::AppConfig;
use matchmaker::models::{format_diff_percent, MonitoringEntry};
use matchmaker::monitoring::{MonitoringLog, MonitoringSummary, Thresholds};
use matchmaker::roster::Roster;

#[derive(Parser)]
#[command(name = "matchmaker")]
#[command(about = "Balance players into two evenly matched teams")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split the selected players into two teams
    Balance {
        /// Player ids or names, space separated
        #[arg(required = true)]
        players: Vec<String>,

        /// Roster file (defaults to <data-dir>/roster.jsonl)
        #[arg(long)]
        roster: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Do not append the result to the monitoring log
        #[arg(long)]
        no_log: bool,
    },

    /// List the roster with calculated scores
    Players {
        /// Roster file (defaults to <data-dir>/roster.jsonl)
        #[arg(long)]
        roster: Option<PathBuf>,
    },

    /// Show recent balancing outcomes and alerts
    Monitor {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the API server
    Serve {
        /// Bind address (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Starting matchmaker v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Balance {
            players,
            roster,
            json,
            no_log,
        } => {
            if let Some(path) = roster {
                config.roster_path = Some(path);
            }
            let roster = load_roster(&config)?;
            let assignment = balance_teams(&roster, &players, config.balancing.options())?;
            let assessment = assess_balance(assignment.diff);

            if config.balancing.log_results && !no_log {
                let log = monitoring_log(&config);
                if let Err(e) = log.record(&assignment) {
                    tracing::warn!("Failed to record monitoring entry: {}", e);
                }
            }

            if json {
                let output = serde_json::json!({
                    "assignment": assignment,
                    "assessment": assessment,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(());
            }

            println!("Team A: {}", assignment.team_a.join(", "));
            println!("Team B: {}", assignment.team_b.join(", "));
            println!(
                "Average winrate: A {:.1}% | B {:.1}%",
                assignment.avg_a * 100.0,
                assignment.avg_b * 100.0
            );
            println!(
                "Win probability: A {:.1}% | B {:.1}%",
                assignment.p_a * 100.0,
                assignment.p_b() * 100.0
            );
            println!(
                "Score gap: {} ({})",
                format_diff_percent(assessment.diff_percent),
                assessment.quality
            );
            println!("{}", assessment.message);

            if !assignment.unresolved.is_empty() {
                println!("Unresolved: {}", assignment.unresolved.join(", "));
            }
            if !assignment.duplicates.is_empty() {
                println!("Duplicates: {}", assignment.duplicates.join(", "));
            }
        }
        Commands::Players { roster } => {
            if let Some(path) = roster {
                config.roster_path = Some(path);
            }
            let roster = load_roster(&config)?;

            println!("{:<6} {:<20} {:>8} {:>6} {:>8}", "ID", "NAME", "WINRATE", "KD", "SCORE");
            for scored in roster.scored() {
                let player = scored.player;
                println!(
                    "{:<6} {:<20} {:>7.1}% {:>6.2} {:>8.4}",
                    player.id,
                    player.name,
                    player.stats.winrate * 100.0,
                    player.stats.kd,
                    scored.calculated_score
                );
            }
        }
        Commands::Monitor { json } => {
            let entries = monitoring_log(&config).load()?;
            let summary =
                MonitoringSummary::from_entries(&entries, Thresholds::from(&config.monitoring));

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            print_summary(&entries, &summary);
        }
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let roster = load_roster(&config)?;
            let addr = format!("{}:{}", config.server.host, config.server.port);
            let state = AppState::new(config, roster);
            let app = matchmaker::api::build_router(state);

            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

fn load_roster(config: &AppConfig) -> Result<Roster> {
    let path = config.roster_path();
    Roster::load(&path).with_context(|| format!("Failed to load roster from {:?}", path))
}

fn monitoring_log(config: &AppConfig) -> MonitoringLog {
    MonitoringLog::new(
        config.storage().monitoring_log_path(),
        config.monitoring.max_entries,
    )
}

fn print_summary(entries: &[MonitoringEntry], summary: &MonitoringSummary) {
    println!("Entries: {}", summary.total_entries);
    if let (Some(mean), Some(std_dev)) = (summary.mean_p_a, summary.std_dev_p_a) {
        println!("pA mean: {:.4} (std dev {:.4})", mean, std_dev);
    }
    println!("Unbalanced: {:.1}%", summary.percent_unbalanced);

    for entry in entries {
        let teams = if entry.has_teams() {
            format!("{} vs {}", entry.team_a.join(", "), entry.team_b.join(", "))
        } else {
            "(teams not recorded)".to_string()
        };
        println!(
            "{}  pA {:.4}  diff {}  {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.p_a,
            format_diff_percent(entry.diff.abs() * 100.0),
            teams
        );
    }

    if summary.is_healthy() {
        println!("No anomalies detected.");
    } else {
        println!("{} anomalies:", summary.anomalies);
        for alert in &summary.alerts {
            println!("  - {}", alert);
        }
    }
}
