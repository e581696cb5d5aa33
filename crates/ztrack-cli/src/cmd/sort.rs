//! `zt sort <column>`: click a column header.
//!
//! Clicking the active ascending column flips it to descending; any other
//! click sorts that column ascending.

use clap::Args;
use tracing::info;

use crate::cmd::table::{Workspace, render_view};
use crate::output::{CliError, OutputMode, render_error};

/// Arguments for `zt sort`.
#[derive(Args, Debug)]
pub struct SortArgs {
    /// Column to sort by: name, world, distance, elevation, or xp.
    pub column: String,
}

/// Execute `zt sort`.
pub fn run_sort(args: &SortArgs, output: OutputMode, workspace: &Workspace) -> anyhow::Result<()> {
    let mut table = workspace.open_table(output)?;
    let sort = match table.on_request_sort(&args.column) {
        Ok(sort) => sort,
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            return Err(err.into());
        }
    };
    info!(key = %sort.key, direction = %sort.direction, "sort changed");
    render_view(&mut table, output)
}
