mod store;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use coursepilot_engine::config::EngineConfig;
use coursepilot_engine::control;
use coursepilot_engine::session;
use coursepilot_engine::sim::SimPage;
use store::FileStore;

#[derive(Parser, Debug)]
#[command(author, version, about = "Course content automation engine", long_about = None)]
struct Args {
    /// State file (defaults to ~/.coursepilot/state.json).
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one session pass over a simulated page fixture.
    Run {
        /// Page fixture (JSON).
        fixture: PathBuf,
        /// Use production delays instead of the instant profile.
        #[arg(long)]
        realtime: bool,
    },
    /// Show the queue snapshot and the enabled flag.
    Status,
    /// Enable automation.
    Enable,
    /// Disable automation.
    Disable,
    /// Drop the persisted queue.
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut store = FileStore::new(args.store.unwrap_or_else(FileStore::default_path));

    match args.command {
        Command::Run { fixture, realtime } => {
            let json = std::fs::read_to_string(&fixture)?;
            let mut page = SimPage::from_json(&json)?;
            let cfg = if realtime {
                EngineConfig::default()
            } else {
                EngineConfig::instant()
            };

            let report = session::run(&mut page, &mut store, &cfg).await;
            println!("{}", serde_json::to_string_pretty(&ReportView::from(&report))?);
        }
        Command::Status => {
            let enabled = control::is_enabled(&store).await;
            println!("automation: {}", if enabled { "enabled" } else { "disabled" });
            match control::status(&store).await {
                Some(status) => println!("{}", serde_json::to_string_pretty(&status)?),
                None => println!("no queue stored"),
            }
        }
        Command::Enable => {
            let restarted = control::set_enabled(&mut store, true).await?;
            println!(
                "automation enabled{}",
                if restarted { " (restart hook fires)" } else { "" }
            );
        }
        Command::Disable => {
            control::set_enabled(&mut store, false).await?;
            println!("automation disabled");
        }
        Command::Clear => {
            control::clear_queue(&mut store).await?;
            println!("queue cleared");
        }
    }
    Ok(())
}

/// Stable display shape for the session report.
#[derive(serde::Serialize)]
struct ReportView {
    enabled: bool,
    page_kind: Option<String>,
    queued: usize,
    progressed: bool,
    navigated: Option<String>,
    queue_finished: bool,
}

impl From<&session::SessionReport> for ReportView {
    fn from(report: &session::SessionReport) -> Self {
        Self {
            enabled: report.enabled,
            page_kind: report.kind.map(|k| format!("{k:?}").to_lowercase()),
            queued: report.queued,
            progressed: report.progressed,
            navigated: report.navigated.clone(),
            queue_finished: report.queue_finished,
        }
    }
}
