use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::record::SortKey;
use crate::sort::{Direction, SortState};

/// Name of the optional config file inside the state directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the state directory.
pub const STATE_DIR_ENV: &str = "ZT_STATE_DIR";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub table: TableConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period before a typed query is applied.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub const fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Sort applied before the user has clicked any column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableConfig {
    #[serde(default)]
    pub order: Direction,
    #[serde(default)]
    pub order_by: SortKey,
}

impl TableConfig {
    #[must_use]
    pub const fn default_sort(&self) -> SortState {
        SortState::new(self.order_by, self.order)
    }
}

/// Load `<state_dir>/config.toml`, falling back to defaults when absent.
pub fn load_config(state_dir: &Path) -> Result<TrackerConfig> {
    let path = state_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(TrackerConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<TrackerConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Resolve where interaction state lives.
///
/// Precedence: explicit flag, then `ZT_STATE_DIR`, then the platform data
/// directory, then `./.ztrack`.
#[must_use]
pub fn resolve_state_dir(flag: Option<&Path>) -> PathBuf {
    let env_dir = env::var_os(STATE_DIR_ENV).map(PathBuf::from);
    resolve_state_dir_inner(flag, env_dir, dirs::data_dir())
}

fn resolve_state_dir_inner(
    flag: Option<&Path>,
    env_dir: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    if let Some(dir) = env_dir.filter(|d| !d.as_os_str().is_empty()) {
        return dir;
    }
    data_dir.map_or_else(|| PathBuf::from(".ztrack"), |dir| dir.join("ztrack"))
}

const fn default_settle_ms() -> u64 {
    300
}
