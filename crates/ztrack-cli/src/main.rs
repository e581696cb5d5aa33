#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::table::Workspace;
use output::{OutputMode, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use ztrack_core::config::resolve_state_dir;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "zt: sortable, searchable course achievement tracker",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (defaults to pretty on a terminal, text when piped).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// JSON array of course records (default: $ZT_RECORDS, then
    /// <state-dir>/records.json).
    #[arg(long, global = true, value_name = "PATH")]
    records: Option<PathBuf>,

    /// Directory holding persisted table state and config.toml (default:
    /// $ZT_STATE_DIR, then the platform data directory).
    #[arg(long, global = true, value_name = "DIR")]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }

    fn workspace(&self) -> Workspace {
        Workspace {
            state_dir: resolve_state_dir(self.state_dir.as_deref()),
            records: self.records.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Show the course table",
        after_help = "EXAMPLES:\n    zt --records courses.json list\n\n    # Machine-readable output\n    zt list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        about = "Sort by a column",
        long_about = "Sort by a column. Repeating the command on the active ascending column switches it to descending.",
        after_help = "EXAMPLES:\n    zt sort distance\n    zt sort xp"
    )]
    Sort(cmd::sort::SortArgs),

    #[command(
        about = "Mark courses as done or not done",
        after_help = "EXAMPLES:\n    zt toggle \"Alpe du Zwift\"\n    zt toggle \"Road to Sky\" \"Volcano Climb\""
    )]
    Toggle(cmd::toggle::ToggleArgs),

    #[command(
        about = "Filter courses by name or world",
        after_help = "EXAMPLES:\n    zt search london\n\n    # Clear the filter\n    zt search"
    )]
    Search(cmd::search::SearchArgs),

    #[command(about = "Show completion progress")]
    Status(cmd::status::StatusArgs),

    #[command(about = "Forget saved table state")]
    Reset(cmd::reset::ResetArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("ZT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "ztrack_core=debug,zt=debug,info"
        } else {
            "ztrack_core=info,zt=info,warn"
        })
    });

    let format = env::var("ZT_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = cli.output_mode();
    let workspace = cli.workspace();
    debug!(state_dir = %workspace.state_dir.display(), ?output, "starting");

    match cli.command {
        Commands::List(ref args) => cmd::list::run_list(args, output, &workspace),
        Commands::Sort(ref args) => cmd::sort::run_sort(args, output, &workspace),
        Commands::Toggle(ref args) => cmd::toggle::run_toggle(args, output, &workspace),
        Commands::Search(ref args) => cmd::search::run_search(args, output, &workspace),
        Commands::Status(ref args) => cmd::status::run_status(args, output, &workspace),
        Commands::Reset(ref args) => cmd::reset::run_reset(args, output, &workspace),
    }
}
