//! `zt list`: render the table as it currently stands.

use clap::Args;

use crate::cmd::table::{Workspace, render_view};
use crate::output::OutputMode;

/// Arguments for `zt list`.
#[derive(Args, Debug, Default)]
pub struct ListArgs {}

/// Execute `zt list`.
pub fn run_list(_args: &ListArgs, output: OutputMode, workspace: &Workspace) -> anyhow::Result<()> {
    let mut table = workspace.open_table(output)?;
    render_view(&mut table, output)
}
