//! Shared plumbing for commands that operate on the table.
//!
//! [`Workspace`] finds the record list and state directory and opens a
//! [`TableView`] over them; [`render_view`] prints the derived view.

use std::collections::HashSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, warn};
use ztrack_core::config::{TrackerConfig, load_config};
use ztrack_core::error::ErrorCode;
use ztrack_core::record::{Record, SortKey};
use ztrack_core::sort::Direction;
use ztrack_core::store::Store;
use ztrack_core::view::{DerivedView, TableView, column_direction};

use crate::output::{
    CliError, OutputMode, format_percent, pretty_kv, pretty_rule, render_error,
    render_mode, render_warning,
};

/// Environment variable naming the record list.
pub const RECORDS_ENV: &str = "ZT_RECORDS";

/// Record list looked up inside the state directory when none is given.
pub const RECORDS_FILE: &str = "records.json";

/// Where a command finds its records and persisted state.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub state_dir: PathBuf,
    pub records: Option<PathBuf>,
}

impl Workspace {
    /// Record list path: `--records`, then `ZT_RECORDS`, then
    /// `<state_dir>/records.json`.
    pub fn records_path(&self) -> PathBuf {
        let env_path = std::env::var_os(RECORDS_ENV).map(PathBuf::from);
        records_path_inner(self.records.as_deref(), env_path, &self.state_dir)
    }

    /// Load `config.toml`, reporting a parse failure as a structured error.
    pub fn config(&self, output: OutputMode) -> anyhow::Result<TrackerConfig> {
        match load_config(&self.state_dir) {
            Ok(config) => Ok(config),
            Err(err) => {
                let code = ErrorCode::ConfigParseError;
                render_error(
                    output,
                    &CliError::with_details(
                        format!("{err:#}"),
                        code.hint().unwrap_or(code.message()),
                        code.code(),
                    ),
                )?;
                Err(err)
            }
        }
    }

    /// Open the table over the record list, reporting a missing list as a
    /// structured error.
    pub fn open_table(&self, output: OutputMode) -> anyhow::Result<TableView> {
        let path = self.records_path();
        if !path.exists() {
            render_error(
                output,
                &CliError::with_details(
                    format!("record list not found: {}", path.display()),
                    format!("pass --records <PATH> or set {RECORDS_ENV}"),
                    "records_missing",
                ),
            )?;
            anyhow::bail!("record list not found");
        }

        let records = load_records(&path)?;
        let config = self.config(output)?;
        debug!(
            records = records.len(),
            state_dir = %self.state_dir.display(),
            "opening table"
        );
        Ok(TableView::open(records, Store::open(&self.state_dir), &config))
    }

    /// Open the persisted state without any records.
    pub fn open_state(&self, output: OutputMode) -> anyhow::Result<TableView> {
        let config = self.config(output)?;
        Ok(TableView::open(Vec::new(), Store::open(&self.state_dir), &config))
    }
}

fn records_path_inner(flag: Option<&Path>, env_path: Option<PathBuf>, state_dir: &Path) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    if let Some(path) = env_path.filter(|p| !p.as_os_str().is_empty()) {
        return path;
    }
    state_dir.join(RECORDS_FILE)
}

/// Read a JSON array of records.
pub fn load_records(path: &Path) -> anyhow::Result<Vec<Record>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let records: Vec<Record> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let mut seen = HashSet::new();
    for record in &records {
        if !seen.insert(record.id()) {
            warn!(
                name = record.id(),
                "duplicate record name; selection treats them as one"
            );
        }
    }
    Ok(records)
}

/// Report a degraded store without failing the command.
pub fn report_store_health(table: &TableView, output: OutputMode) -> anyhow::Result<()> {
    if let Some(err) = table.store().last_write_error() {
        let mut warning = CliError::from(err);
        warning.suggestion = Some(
            "changes apply to this run only; check that the state directory is writable"
                .to_string(),
        );
        render_warning(output, &warning)?;
    }
    Ok(())
}

/// Render the current derived view in `output` mode.
pub fn render_view(table: &mut TableView, output: OutputMode) -> anyhow::Result<()> {
    report_store_health(table, output)?;
    render_mode(output, table.view(), write_text, write_pretty)
}

fn format_metric(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}

fn write_text(view: &DerivedView, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "selected\tname\tworld\tdistance\televation\txp")?;
    for row in &view.rows {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            if row.selected { "x" } else { "" },
            row.record.name,
            row.record.world,
            format_metric(row.record.distance),
            format_metric(row.record.elevation),
            row.record.xp,
        )?;
    }
    Ok(())
}

fn header(view: &DerivedView, key: SortKey) -> String {
    match column_direction(view.sort, key) {
        Some(direction) if key.is_numeric() => {
            format!("{} {}", arrow(direction), key.label())
        }
        Some(direction) => format!("{} {}", key.label(), arrow(direction)),
        None => key.label().to_string(),
    }
}

const fn arrow(direction: Direction) -> &'static str {
    match direction {
        Direction::Asc => "▲",
        Direction::Desc => "▼",
    }
}

fn write_pretty(view: &DerivedView, w: &mut dyn Write) -> io::Result<()> {
    write_progress(view, w)?;
    pretty_kv(
        w,
        "Sorted by",
        format!("{} ({})", view.sort.key.label(), view.sort.direction.label()),
    )?;
    if !view.query.is_empty() {
        pretty_kv(w, "Search", format!("{:?}", view.query))?;
    }
    pretty_rule(w)?;

    writeln!(
        w,
        "    {:<28} {:<14} {:>10} {:>10} {:>7}",
        header(view, SortKey::Name),
        header(view, SortKey::World),
        header(view, SortKey::Distance),
        header(view, SortKey::Elevation),
        header(view, SortKey::Xp),
    )?;
    if view.rows.is_empty() {
        writeln!(w, "    (no matching courses)")?;
    }
    for row in &view.rows {
        writeln!(
            w,
            "[{}] {:<28} {:<14} {:>10} {:>10} {:>7}",
            if row.selected { "x" } else { " " },
            row.record.name,
            row.record.world,
            format_metric(row.record.distance),
            format_metric(row.record.elevation),
            row.record.xp,
        )?;
    }
    Ok(())
}

/// The progress header shown above the table and by `zt status`.
pub fn write_progress(view: &DerivedView, w: &mut dyn Write) -> io::Result<()> {
    let totals = view.totals;
    pretty_kv(
        w,
        "Courses",
        format!(
            "{}/{} ({})",
            totals.selected_count,
            totals.total_count,
            format_percent(totals.course_ratio()),
        ),
    )?;
    pretty_kv(
        w,
        "XP",
        format!(
            "{}/{} ({})",
            totals.xp_earned,
            totals.xp_total,
            format_percent(totals.xp_ratio()),
        ),
    )
}
