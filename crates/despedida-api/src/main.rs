//! despedida CLI and REST API entry point.
//!
//! Binary name: `despedida`
//!
//! Parses CLI arguments, initializes the database and services, then either
//! starts the REST API server or runs a one-shot command.

mod http;
mod state;

use clap::{Parser, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use tracing_subscriber::EnvFilter;

use despedida_core::repository::FarewellRepository;
use despedida_core::service::{FIXED_SESSION_ID, FIXED_SESSION_NAME};
use despedida_core::stats::{self, StatsReport};
use despedida_types::message::Message;

use state::AppState;

#[derive(Parser)]
#[command(name = "despedida", version, about = "Farewell message board API")]
struct Cli {
    /// Emit machine-readable JSON instead of styled output
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
    /// Bootstrap the fixed event session
    Init,
    /// Print the aggregate statistics report
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity; RUST_LOG wins when present
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info,despedida=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    // Initialize application state (DB, services, admin secret)
    let state = AppState::init().await?;

    match cli.command {
        Commands::Serve { host, port } => {
            // The public flow assumes the event session exists
            state
                .farewell_service
                .ensure_session(FIXED_SESSION_ID, FIXED_SESSION_NAME)
                .await?;

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} despedida API listening on {}",
                style("⚡").bold(),
                style(format!("http://{addr}")).cyan()
            );
            println!("  {}", style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Init => {
            let session = state
                .farewell_service
                .ensure_session(FIXED_SESSION_ID, FIXED_SESSION_NAME)
                .await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&session)?);
            } else {
                println!(
                    "  {} Session '{}' ready ({})",
                    style("✓").green(),
                    style(&session.name).cyan(),
                    session.id
                );
            }
        }

        Commands::Stats => {
            // Same fetch as the stats endpoint: full collections, no cache
            let repo = state.farewell_service.repo();
            let sessions = repo.list_sessions().await?;
            let messages: Vec<Message> = repo
                .list_all_messages()
                .await?
                .into_iter()
                .map(|joined| joined.message)
                .collect();

            let report = stats::stats_report(&sessions, &messages, chrono::Utc::now());

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_stats(&report);
            }
        }
    }

    Ok(())
}

/// Styled overview plus a per-session breakdown table.
fn print_stats(report: &StatsReport) {
    let overview = &report.overview;

    println!();
    println!(
        "  {} {} messages across {} sessions ({} active)",
        style("📊").bold(),
        style(overview.total_messages).bold(),
        overview.total_sessions,
        overview.active_sessions
    );
    println!(
        "  {} in the last 7 days, {}/day overall, {} unique authors",
        overview.recent_messages,
        overview.messages_per_day,
        report.text_analysis.unique_authors
    );
    println!();

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Session").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("Status").fg(Color::White),
    ]);

    for row in &report.sessions_data {
        let status_cell = if row.active {
            Cell::new("● active").fg(Color::Green)
        } else {
            Cell::new("○ inactive").fg(Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(&row.session_name),
            Cell::new(row.message_count),
            status_cell,
        ]);
    }

    println!("{table}");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
