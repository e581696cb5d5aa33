//! `zt status`: progress summary without the table.
//!
//! Reports totals for the rows the current search shows and for the whole
//! record list, so progress hidden by a filter is still visible.

use std::io::Write;

use clap::Args;
use serde::Serialize;
use ztrack_core::aggregate::Totals;
use ztrack_core::sort::SortState;

use crate::cmd::table::{Workspace, report_store_health};
use crate::output::{
    OutputMode, format_percent, percent, pretty_kv, pretty_section, render_mode,
};

/// Arguments for `zt status`.
#[derive(Args, Debug, Default)]
pub struct StatusArgs {}

/// Totals plus completion ratios.
#[derive(Debug, Serialize)]
struct Progress {
    #[serde(flatten)]
    totals: Totals,
    #[serde(skip_serializing_if = "Option::is_none")]
    courses_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    xp_pct: Option<f64>,
}

impl From<Totals> for Progress {
    fn from(totals: Totals) -> Self {
        Self {
            courses_pct: percent(totals.course_ratio()),
            xp_pct: percent(totals.xp_ratio()),
            totals,
        }
    }
}

/// Full status output payload.
#[derive(Debug, Serialize)]
struct StatusOutput {
    query: String,
    sort: SortState,
    visible: Progress,
    overall: Progress,
    /// Selected names with no matching record.
    unmatched_selected: usize,
}

/// Execute `zt status`.
pub fn run_status(_args: &StatusArgs, output: OutputMode, workspace: &Workspace) -> anyhow::Result<()> {
    let mut table = workspace.open_table(output)?;
    report_store_health(&table, output)?;

    let selection_len = table.selection().len();
    let view = table.view();
    let status = StatusOutput {
        query: view.query.clone(),
        sort: view.sort,
        visible: view.totals.into(),
        overall: view.overall.into(),
        unmatched_selected: selection_len.saturating_sub(view.overall.selected_count),
    };

    render_mode(output, &status, write_text, write_pretty)
}

fn write_text(status: &StatusOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for (scope, progress) in [("visible", &status.visible), ("overall", &status.overall)] {
        writeln!(
            w,
            "{scope}\t{}/{}\t{}/{}",
            progress.totals.selected_count,
            progress.totals.total_count,
            progress.totals.xp_earned,
            progress.totals.xp_total,
        )?;
    }
    Ok(())
}

fn write_progress(w: &mut dyn Write, progress: &Progress) -> std::io::Result<()> {
    pretty_kv(
        w,
        "Courses",
        format!(
            "{}/{} ({})",
            progress.totals.selected_count,
            progress.totals.total_count,
            format_percent(progress.totals.course_ratio()),
        ),
    )?;
    pretty_kv(
        w,
        "XP",
        format!(
            "{}/{} ({})",
            progress.totals.xp_earned,
            progress.totals.xp_total,
            format_percent(progress.totals.xp_ratio()),
        ),
    )
}

fn write_pretty(status: &StatusOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if status.query.is_empty() {
        pretty_section(w, "Progress")?;
        write_progress(w, &status.overall)?;
    } else {
        pretty_section(w, &format!("Matching {:?}", status.query))?;
        write_progress(w, &status.visible)?;
        writeln!(w)?;
        pretty_section(w, "All courses")?;
        write_progress(w, &status.overall)?;
    }
    if status.unmatched_selected > 0 {
        pretty_kv(
            w,
            "Unmatched",
            format!("{} selected names not in the record list", status.unmatched_selected),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(selected_count: usize, total_count: usize, xp_earned: u64, xp_total: u64) -> Totals {
        Totals {
            total_count,
            selected_count,
            xp_total,
            xp_earned,
        }
    }

    #[test]
    fn progress_ratios_skip_empty_denominators() {
        let progress = Progress::from(Totals::default());
        assert_eq!(progress.courses_pct, None);
        assert_eq!(progress.xp_pct, None);

        let json = serde_json::to_value(&progress).unwrap();
        assert!(json.get("xp_pct").is_none());
        assert_eq!(json["total_count"], 0);
    }

    #[test]
    fn pretty_shows_both_scopes_when_filtered() {
        let status = StatusOutput {
            query: "lon".to_string(),
            sort: SortState::default(),
            visible: totals(0, 1, 0, 20).into(),
            overall: totals(1, 2, 10, 30).into(),
            unmatched_selected: 0,
        };
        let mut buf = Vec::new();
        write_pretty(&status, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Matching \"lon\""));
        assert!(text.contains("0/1 (0.0%)"));
        assert!(text.contains("All courses"));
        assert!(text.contains("10/30 (33.3%)"));
    }

    #[test]
    fn text_lists_visible_then_overall() {
        let status = StatusOutput {
            query: String::new(),
            sort: SortState::default(),
            visible: totals(1, 2, 20, 30).into(),
            overall: totals(1, 2, 20, 30).into(),
            unmatched_selected: 3,
        };
        let mut buf = Vec::new();
        write_text(&status, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "visible\t1/2\t20/30\noverall\t1/2\t20/30\n"
        );
    }
}
