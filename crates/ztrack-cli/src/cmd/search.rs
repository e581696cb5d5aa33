//! `zt search [query]`: filter the table by name or world.
//!
//! The query is applied at once rather than after the interactive settle
//! delay. Running without a query clears the filter.

use std::time::Instant;

use clap::Args;

use crate::cmd::table::{Workspace, render_view};
use crate::output::OutputMode;

/// Arguments for `zt search`.
#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Case-insensitive substring matched against name and world.
    pub query: Option<String>,
}

/// Execute `zt search`.
pub fn run_search(args: &SearchArgs, output: OutputMode, workspace: &Workspace) -> anyhow::Result<()> {
    let mut table = workspace.open_table(output)?;
    let query = args.query.as_deref().unwrap_or_default();
    table.on_search_change(query, Instant::now())?;
    table.flush_search();
    render_view(&mut table, output)
}
