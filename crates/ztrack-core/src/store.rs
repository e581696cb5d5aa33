//! Persistent key-value store with an in-process cache.
//!
//! Values are JSON documents addressed by short string keys. Reads go through
//! the cache; writes update the cache first, then the durable [`Backend`].
//! A failing backend degrades the store to session-only state: the failure is
//! logged and retained in [`Store::last_write_error`], never returned to the
//! caller of [`Store::set`].
//!
//! Malformed stored data (unparseable JSON, or JSON of the wrong shape) is
//! treated as absent and the caller's default is returned.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, TrackError};

/// Durable medium behind a [`Store`].
pub trait Backend {
    /// Raw stored text for `key`, or `None` if nothing is stored.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Durably replace the value under `key`.
    fn write(&mut self, key: &str, raw: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// One `<key>.json` file per key inside a state directory.
///
/// Writes go to a hidden temp file which is then renamed over the target, so
/// a crash mid-write leaves either the old or the new document.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Backend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(TrackError::StoreRead {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn write(&mut self, key: &str, raw: &str) -> Result<()> {
        let wrap = |source| TrackError::StoreWrite {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(wrap)?;
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, raw).map_err(wrap)?;
        fs::rename(&tmp, self.path(key)).map_err(wrap)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(TrackError::StoreWrite {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// Session-only backend. Can be switched into a failing mode to simulate an
/// unavailable medium (quota exceeded, revoked permissions).
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: HashMap<String, String>,
    unavailable: bool,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed raw stored text, bypassing serialization.
    #[must_use]
    pub fn with_raw(mut self, key: &str, raw: &str) -> Self {
        self.values.insert(key.to_string(), raw.to_string());
        self
    }

    /// Make every subsequent write and remove fail.
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(TrackError::Unavailable("quota exceeded".to_string()));
        }
        Ok(())
    }
}

impl Backend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, raw: &str) -> Result<()> {
        self.check_available()?;
        self.values.insert(key.to_string(), raw.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.check_available()?;
        self.values.remove(key);
        Ok(())
    }
}

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    key: String,
    callback: Box<dyn FnMut(&Value)>,
}

/// Cached, observable view over a [`Backend`].
pub struct Store {
    backend: Box<dyn Backend>,
    /// `None` records a key known to be absent (or unreadable).
    cache: HashMap<String, Option<Value>>,
    revisions: HashMap<String, u64>,
    subscribers: Vec<Subscriber>,
    next_subscription: u64,
    last_write_error: Option<TrackError>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("cache", &self.cache)
            .field("revisions", &self.revisions)
            .field("subscribers", &self.subscribers.len())
            .field("last_write_error", &self.last_write_error)
            .finish_non_exhaustive()
    }
}

impl Store {
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            cache: HashMap::new(),
            revisions: HashMap::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
            last_write_error: None,
        }
    }

    /// Store persisted under `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self::new(FileBackend::new(dir))
    }

    /// Session-only store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Stored value for `key`, or `default` when absent or malformed.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str, default: T) -> T {
        if let Err(err) = validate_key(key) {
            warn!("ignoring read of {key:?}: {err}");
            return default;
        }
        let Some(value) = self.cached(key) else {
            return default;
        };
        match serde_json::from_value::<T>(value.clone()) {
            Ok(parsed) => parsed,
            Err(source) => {
                let err = TrackError::Malformed {
                    key: key.to_string(),
                    source,
                };
                debug!("{err}; using default");
                default
            }
        }
    }

    /// Store `value` under `key` and notify subscribers.
    ///
    /// The cache is updated before the durable write, so the next [`get`]
    /// sees `value` even if the write fails. Durable failures are logged and
    /// kept in [`last_write_error`]; only programming errors (invalid key,
    /// unserializable value) are returned.
    ///
    /// [`get`]: Store::get
    /// [`last_write_error`]: Store::last_write_error
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        validate_key(key)?;
        let value = serde_json::to_value(value).map_err(|source| TrackError::Malformed {
            key: key.to_string(),
            source,
        })?;

        self.cache.insert(key.to_string(), Some(value.clone()));
        self.bump(key);

        let raw = value.to_string();
        if let Err(err) = self.backend.write(key, &raw) {
            warn!("state for {key:?} kept for this session only: {err}");
            self.last_write_error = Some(err);
        }

        self.notify(key, &value);
        Ok(())
    }

    /// Remove `key`, reverting subsequent reads to their defaults.
    pub fn remove(&mut self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.cache.insert(key.to_string(), None);
        self.bump(key);
        if let Err(err) = self.backend.remove(key) {
            warn!("failed to remove persisted {key:?}: {err}");
            self.last_write_error = Some(err);
        }
        self.notify(key, &Value::Null);
        Ok(())
    }

    /// Number of times `key` has been set or removed through this store.
    #[must_use]
    pub fn revision(&self, key: &str) -> u64 {
        self.revisions.get(key).copied().unwrap_or(0)
    }

    /// Call `callback` with the new value whenever `key` changes.
    pub fn subscribe(
        &mut self,
        key: &str,
        callback: impl FnMut(&Value) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push(Subscriber {
            id,
            key: key.to_string(),
            callback: Box::new(callback),
        });
        id
    }

    /// Stop notifying `id`. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|sub| sub.id != id);
        self.subscribers.len() != before
    }

    /// Most recent durable failure, if any.
    #[must_use]
    pub const fn last_write_error(&self) -> Option<&TrackError> {
        self.last_write_error.as_ref()
    }

    /// Take (and clear) the most recent durable failure.
    pub fn take_write_error(&mut self) -> Option<TrackError> {
        self.last_write_error.take()
    }

    fn cached(&mut self, key: &str) -> Option<&Value> {
        if !self.cache.contains_key(key) {
            let loaded = self.load(key);
            self.cache.insert(key.to_string(), loaded);
        }
        self.cache.get(key).and_then(Option::as_ref)
    }

    fn load(&self, key: &str) -> Option<Value> {
        let raw = match self.backend.read(key) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!("treating {key:?} as absent: {err}");
                return None;
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => Some(value),
            Err(source) => {
                let err = TrackError::Malformed {
                    key: key.to_string(),
                    source,
                };
                warn!("{err}; treating as absent");
                None
            }
        }
    }

    fn bump(&mut self, key: &str) {
        *self.revisions.entry(key.to_string()).or_insert(0) += 1;
    }

    fn notify(&mut self, key: &str, value: &Value) {
        for sub in self.subscribers.iter_mut().filter(|sub| sub.key == key) {
            (sub.callback)(value);
        }
    }
}

fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(TrackError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn missing_key_returns_default() {
        let mut store = Store::in_memory();
        assert_eq!(store.get("order", "desc".to_string()), "desc");
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut store = Store::in_memory();
        store.set("search", &"alpe").unwrap();
        assert_eq!(store.get("search", String::new()), "alpe");
    }

    #[test]
    fn unparseable_raw_value_is_treated_as_absent() {
        let backend = MemoryBackend::new().with_raw("selection", "[\"Alpe\", ");
        let mut store = Store::new(backend);
        let got: Vec<String> = store.get("selection", Vec::new());
        assert!(got.is_empty());
    }

    #[test]
    fn wrongly_shaped_value_is_treated_as_absent() {
        let backend = MemoryBackend::new().with_raw("selection", "{\"not\":\"a list\"}");
        let mut store = Store::new(backend);
        let got: Vec<String> = store.get("selection", vec!["fallback".to_string()]);
        assert_eq!(got, ["fallback"]);
    }

    #[test]
    fn failed_write_still_updates_session_view() {
        let mut backend = MemoryBackend::new();
        backend.set_unavailable(true);
        let mut store = Store::new(backend);

        store.set("order", &"asc").unwrap();

        assert_eq!(store.get("order", "desc".to_string()), "asc");
        assert!(matches!(
            store.last_write_error(),
            Some(TrackError::Unavailable(_))
        ));
        assert!(store.take_write_error().is_some());
        assert!(store.last_write_error().is_none());
    }

    #[test]
    fn subscribers_see_changes_for_their_key_only() {
        let mut store = Store::in_memory();
        let seen: Rc<RefCell<Vec<Value>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let id = store.subscribe("search", move |v| sink.borrow_mut().push(v.clone()));

        store.set("search", &"lon").unwrap();
        store.set("order", &"asc").unwrap();
        store.set("search", &"london").unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![Value::from("lon"), Value::from("london")]
        );

        assert!(store.unsubscribe(id));
        store.set("search", &"x").unwrap();
        assert_eq!(seen.borrow().len(), 2);
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn revision_counts_changes_per_key() {
        let mut store = Store::in_memory();
        assert_eq!(store.revision("order"), 0);
        store.set("order", &"asc").unwrap();
        store.set("order", &"desc").unwrap();
        store.remove("order").unwrap();
        assert_eq!(store.revision("order"), 3);
        assert_eq!(store.revision("search"), 0);
    }

    #[test]
    fn remove_reverts_to_default() {
        let mut store = Store::in_memory();
        store.set("search", &"volcano").unwrap();
        store.remove("search").unwrap();
        assert_eq!(store.get("search", String::new()), "");
    }

    #[test]
    fn invalid_key_is_rejected() {
        let mut store = Store::in_memory();
        assert!(matches!(
            store.set("../escape", &1),
            Err(TrackError::InvalidKey(_))
        ));
        assert!(matches!(store.set("", &1), Err(TrackError::InvalidKey(_))));
        assert_eq!(store.get("a/b", 7), 7);
    }

    #[test]
    fn file_backend_persists_across_stores() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = Store::open(dir.path());
            store.set("orderBy", &"distance").unwrap();
            assert!(store.last_write_error().is_none());
        }
        let mut reopened = Store::open(dir.path());
        assert_eq!(reopened.get("orderBy", "xp".to_string()), "distance");
        assert!(dir.path().join("orderBy.json").is_file());
        assert!(!dir.path().join(".orderBy.json.tmp").exists());
    }

    #[test]
    fn file_backend_failure_degrades_to_session_state() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "file in the way").unwrap();

        let mut store = Store::open(blocker.join("state"));
        store.set("search", &"alpe").unwrap();

        assert_eq!(store.get("search", String::new()), "alpe");
        assert!(matches!(
            store.last_write_error(),
            Some(TrackError::StoreWrite { .. })
        ));
    }

    #[test]
    fn file_backend_corrupt_file_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("order.json"), "not json at all").unwrap();
        let mut store = Store::open(dir.path());
        assert_eq!(store.get("order", "desc".to_string()), "desc");
    }
}
