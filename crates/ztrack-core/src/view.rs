//! View orchestration: one derived table per update cycle.
//!
//! [`derive_view`] is the pure pipeline (filter, stable sort, mark selected
//! rows, aggregate). [`TableView`] owns the record list, the persisted
//! interaction state, and the search debouncer, and re-runs the pipeline only
//! when one of its inputs changed: the record list, the sort state, the
//! selection, or the *settled* search query. Raw keystrokes only move the
//! debouncer.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use crate::aggregate::Totals;
use crate::config::TrackerConfig;
use crate::debounce::{DEFAULT_SETTLE, Debounced, TimerToken};
use crate::error::Result;
use crate::filter::filter_records;
use crate::record::{Record, SortKey};
use crate::selection::SelectionSet;
use crate::sort::{Direction, SortState};
use crate::store::Store;

/// Store keys for persisted interaction state.
pub mod keys {
    /// Sort direction (`"asc"` / `"desc"`).
    pub const ORDER: &str = "order";
    /// Sort column.
    pub const ORDER_BY: &str = "orderBy";
    /// Array of selected record names.
    pub const SELECTION: &str = "selection";
    /// Raw search text as last typed.
    pub const SEARCH: &str = "search";

    pub const ALL: [&str; 4] = [ORDER, ORDER_BY, SELECTION, SEARCH];
}

/// One visible table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    #[serde(flatten)]
    pub record: Record,
    pub selected: bool,
}

/// Render-ready output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DerivedView {
    /// Visible rows in display order.
    pub rows: Vec<Row>,
    /// Totals over the visible rows.
    #[serde(flatten)]
    pub totals: Totals,
    /// Totals over every loaded record, ignoring the search.
    pub overall: Totals,
    pub sort: SortState,
    /// Settled query that produced `rows`.
    pub query: String,
}

/// Run the full pipeline over `records`.
#[must_use]
pub fn derive_view(
    records: &[Record],
    sort: SortState,
    selection: &SelectionSet,
    query: &str,
) -> DerivedView {
    let filtered = filter_records(records, query);
    let totals = Totals::compute(filtered.iter().copied(), selection);
    let rows = sort
        .sort(filtered)
        .into_iter()
        .map(|record| Row {
            selected: selection.contains(record.id()),
            record: record.clone(),
        })
        .collect();

    DerivedView {
        rows,
        totals,
        overall: Totals::compute(records, selection),
        sort,
        query: query.to_string(),
    }
}

/// Revisions of every pipeline input, used as the memo key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InputKey {
    records: u64,
    order: u64,
    order_by: u64,
    selection: u64,
    query: u64,
}

/// Interactive table state over one record list.
#[derive(Debug)]
pub struct TableView {
    records: Vec<Record>,
    records_revision: u64,
    store: Store,
    default_sort: SortState,
    search: Debounced<String>,
    memo_key: Option<InputKey>,
    derived: DerivedView,
}

impl TableView {
    /// Open a view with default configuration.
    pub fn new(records: Vec<Record>, store: Store) -> Self {
        Self::with_settings(records, store, SortState::default(), DEFAULT_SETTLE)
    }

    /// Open a view using the sort defaults and settle duration from `config`.
    pub fn open(records: Vec<Record>, store: Store, config: &TrackerConfig) -> Self {
        Self::with_settings(
            records,
            store,
            config.table.default_sort(),
            config.search.settle(),
        )
    }

    /// Open a view, loading the persisted query as already settled.
    pub fn with_settings(
        records: Vec<Record>,
        mut store: Store,
        default_sort: SortState,
        settle: Duration,
    ) -> Self {
        let query: String = store.get(keys::SEARCH, String::new());
        Self {
            records,
            records_revision: 0,
            store,
            default_sort,
            search: Debounced::new(query, settle),
            memo_key: None,
            derived: DerivedView::default(),
        }
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Replace the record list wholesale. Selection is kept.
    pub fn replace_records(&mut self, records: Vec<Record>) {
        self.records = records;
        self.records_revision += 1;
    }

    /// Current sort state, falling back to defaults for absent or corrupt
    /// persisted values.
    pub fn sort_state(&mut self) -> SortState {
        SortState {
            key: self.store.get(keys::ORDER_BY, self.default_sort.key),
            direction: self.store.get(keys::ORDER, self.default_sort.direction),
        }
    }

    pub fn selection(&mut self) -> SelectionSet {
        self.store.get(keys::SELECTION, SelectionSet::new())
    }

    /// The query as typed, settled or not.
    #[must_use]
    pub fn raw_query(&self) -> &str {
        self.search.latest()
    }

    /// The query the current view is filtered by.
    #[must_use]
    pub fn settled_query(&self) -> &str {
        self.search.settled()
    }

    /// Column header click. Unknown column names fail fast.
    pub fn on_request_sort(&mut self, column: &str) -> Result<SortState> {
        let key: SortKey = column.parse()?;
        self.request_sort(key)
    }

    /// Advance the sort state machine for a click on `key` and persist it.
    pub fn request_sort(&mut self, key: SortKey) -> Result<SortState> {
        let next = self.sort_state().request(key);
        self.set_sort(next)?;
        Ok(next)
    }

    /// Persist an explicit sort state.
    pub fn set_sort(&mut self, sort: SortState) -> Result<()> {
        self.store.set(keys::ORDER, &sort.direction)?;
        self.store.set(keys::ORDER_BY, &sort.key)
    }

    /// Row click. Returns whether `id` is selected afterwards.
    pub fn on_toggle_select(&mut self, id: &str) -> Result<bool> {
        let next = self.selection().toggle(id);
        let selected = next.contains(id);
        self.store.set(keys::SELECTION, &next)?;
        Ok(selected)
    }

    /// Search keystroke at `now`. The raw text is persisted immediately; the
    /// view only follows once the input settles.
    pub fn on_search_change(&mut self, raw: &str, now: Instant) -> Result<Option<TimerToken>> {
        self.store.set(keys::SEARCH, &raw)?;
        Ok(self.search.update(raw.to_string(), now))
    }

    /// Advance the debounce clock. Returns true if the settled query changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.search.poll(now)
    }

    /// Timer callback form of [`tick`](TableView::tick).
    pub fn fire(&mut self, token: TimerToken) -> bool {
        self.search.fire(token)
    }

    /// Apply any pending query immediately.
    pub fn flush_search(&mut self) -> bool {
        self.search.flush()
    }

    /// When the pending query will settle, if one is pending.
    #[must_use]
    pub fn search_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    /// Forget all persisted interaction state and return to defaults.
    pub fn reset(&mut self) -> Result<()> {
        for key in keys::ALL {
            self.store.remove(key)?;
        }
        self.search = Debounced::new(String::new(), self.search.settle_duration());
        self.memo_key = None;
        Ok(())
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    pub const fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// The derived view for the current inputs, recomputed only if an input
    /// changed since the last call.
    pub fn view(&mut self) -> &DerivedView {
        let key = self.input_key();
        if self.memo_key != Some(key) {
            let sort = self.sort_state();
            let selection = self.selection();
            self.derived = derive_view(&self.records, sort, &selection, self.search.settled());
            self.memo_key = Some(key);
            debug!(
                rows = self.derived.rows.len(),
                selected = self.derived.totals.selected_count,
                sort_key = %sort.key,
                direction = %sort.direction,
                "recomputed table view"
            );
        }
        &self.derived
    }

    fn input_key(&self) -> InputKey {
        InputKey {
            records: self.records_revision,
            order: self.store.revision(keys::ORDER),
            order_by: self.store.revision(keys::ORDER_BY),
            selection: self.store.revision(keys::SELECTION),
            query: self.search.revision(),
        }
    }
}

/// Convenience for callers that only need the direction label of a column.
#[must_use]
pub fn column_direction(sort: SortState, column: SortKey) -> Option<Direction> {
    (sort.key == column).then_some(sort.direction)
}
