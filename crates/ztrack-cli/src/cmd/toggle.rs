//! `zt toggle <name>...`: mark courses as done (or not done).

use std::collections::HashSet;

use clap::Args;
use tracing::info;

use crate::cmd::table::{Workspace, render_view};
use crate::output::{CliError, OutputMode, render_error};

/// Arguments for `zt toggle`.
#[derive(Args, Debug)]
pub struct ToggleArgs {
    /// Course names to toggle. Each name flips independently.
    #[arg(required = true)]
    pub names: Vec<String>,
}

/// Execute `zt toggle`.
///
/// Every name is checked against the record list before anything changes,
/// so a typo leaves the selection untouched.
pub fn run_toggle(args: &ToggleArgs, output: OutputMode, workspace: &Workspace) -> anyhow::Result<()> {
    let mut table = workspace.open_table(output)?;

    let known: HashSet<&str> = table.records().iter().map(|r| r.id()).collect();
    let unknown: Vec<&str> = args
        .names
        .iter()
        .map(String::as_str)
        .filter(|name| !known.contains(name))
        .collect();
    if !unknown.is_empty() {
        render_error(
            output,
            &CliError::with_details(
                format!("no course named {}", unknown.join(", ")),
                "names are case-sensitive; run `zt list` to see them",
                "record_not_found",
            ),
        )?;
        anyhow::bail!("unknown course name");
    }

    for name in &args.names {
        let selected = table.on_toggle_select(name)?;
        info!(name = %name, selected, "toggled");
    }
    render_view(&mut table, output)
}
