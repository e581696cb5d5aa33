//! ztrack-core library.
//!
//! State engine for an achievement table: records are filtered by a debounced
//! search, stably sorted by a persisted column and direction, and aggregated
//! against a persisted selection. [`view::TableView`] ties the pieces
//! together; every other module is usable on its own.

pub mod aggregate;
pub mod config;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod record;
pub mod selection;
pub mod sort;
pub mod store;
pub mod view;

/// # Conventions
///
/// - **Errors**: Library operations return [`error::Result`]; config loading
///   uses `anyhow::Result` with context.
/// - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
pub use aggregate::Totals;
pub use error::{ErrorCode, TrackError};
pub use record::{Record, SortKey};
pub use selection::SelectionSet;
pub use sort::{Direction, SortState};
pub use store::Store;
pub use view::{DerivedView, Row, TableView};
