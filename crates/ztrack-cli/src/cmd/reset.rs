//! `zt reset`: forget saved table state.

use std::io::Write;

use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::cmd::table::{Workspace, report_store_health};
use crate::output::{OutputMode, render};

/// Arguments for `zt reset`.
#[derive(Args, Debug, Default)]
pub struct ResetArgs {}

#[derive(Debug, Serialize)]
struct ResetOutput {
    ok: bool,
    state_dir: String,
}

/// Execute `zt reset`. Needs no record list.
pub fn run_reset(_args: &ResetArgs, output: OutputMode, workspace: &Workspace) -> anyhow::Result<()> {
    let mut table = workspace.open_state(output)?;
    table.reset()?;
    report_store_health(&table, output)?;
    info!(state_dir = %workspace.state_dir.display(), "state reset");

    let result = ResetOutput {
        ok: true,
        state_dir: workspace.state_dir.display().to_string(),
    };
    render(output, &result, |r, w| {
        writeln!(w, "✓ cleared saved table state in {}", r.state_dir)
    })
}
