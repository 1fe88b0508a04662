//! Durable flight-route database.
//!
//! A single JSON object file mapping flight numbers to route records, loaded
//! once at startup and rewritten in full after every newly discovered route.
//! The dataset is small and writes are rare (one per newly seen flight), so
//! a full rewrite through a temp file keeps the ledger crash-safe without an
//! append log.

use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use tracing::warn;

use crate::domain::{FlightNumber, RouteRecord};

/// Errors that can occur when loading or persisting the route database.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The persisted database exists but is not valid JSON.
    #[error("route database corrupt at {}: {message}", path.display())]
    Corrupt { path: PathBuf, message: String },

    /// Filesystem operation failed
    #[error("route database I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failed to encode the database for writing
    #[error("failed to encode route database: {message}")]
    Encode { message: String },

    /// Refused to store a record missing an airport code
    #[error("refusing to store incomplete route for {flight}")]
    IncompleteRecord { flight: String },
}

/// Configuration for the route store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the JSON database file.
    pub path: PathBuf,

    /// If the file exists but is corrupt, move it aside and start empty
    /// instead of failing. The damaged file is kept at `<path>.corrupt`.
    pub start_empty_on_corrupt: bool,
}

impl StoreConfig {
    /// Create a new store config for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            start_empty_on_corrupt: false,
        }
    }

    /// Opt into starting empty when the persisted file is corrupt.
    pub fn with_start_empty_on_corrupt(mut self, enabled: bool) -> Self {
        self.start_empty_on_corrupt = enabled;
        self
    }
}

/// Durable flight number → route record map.
///
/// Entries are first-writer-wins: route identity for a flight number is
/// treated as stable, so an existing entry is never overwritten.
#[derive(Debug)]
pub struct RouteStore {
    config: StoreConfig,
    routes: RwLock<HashMap<String, RouteRecord>>,
}

impl RouteStore {
    /// Open the store, loading any persisted routes.
    ///
    /// A missing file is not an error and yields an empty store. A corrupt
    /// file fails with [`StoreError::Corrupt`] unless the config opts into
    /// starting empty, in which case the damaged file is preserved at
    /// `<path>.corrupt`.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        let routes = match std::fs::read_to_string(&config.path) {
            Ok(contents) => match serde_json::from_str::<HashMap<String, RouteRecord>>(&contents) {
                Ok(map) => map,
                Err(e) if config.start_empty_on_corrupt => {
                    let backup = corrupt_backup_path(&config.path);
                    std::fs::rename(&config.path, &backup)?;
                    warn!(
                        path = %config.path.display(),
                        backup = %backup.display(),
                        error = %e,
                        "route database corrupt; moved aside, starting empty"
                    );
                    HashMap::new()
                }
                Err(e) => {
                    return Err(StoreError::Corrupt {
                        path: config.path.clone(),
                        message: e.to_string(),
                    });
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(StoreError::Io(e)),
        };

        Ok(Self {
            config,
            routes: RwLock::new(routes),
        })
    }

    /// Look up a route, trying each variant in order. First hit wins.
    pub async fn lookup(&self, variants: &[FlightNumber]) -> Option<RouteRecord> {
        let guard = self.routes.read().await;
        variants
            .iter()
            .find_map(|variant| guard.get(variant.as_str()).cloned())
    }

    /// Record a newly discovered route and persist it before returning.
    ///
    /// Returns `Ok(false)` without touching disk if the flight number is
    /// already present (first-writer-wins). Incomplete records are refused.
    pub async fn record_discovered(
        &self,
        flight: &FlightNumber,
        record: &RouteRecord,
    ) -> Result<bool, StoreError> {
        if !record.is_complete() {
            return Err(StoreError::IncompleteRecord {
                flight: flight.as_str().to_owned(),
            });
        }

        let mut guard = self.routes.write().await;

        if guard.contains_key(flight.as_str()) {
            return Ok(false);
        }

        guard.insert(flight.as_str().to_owned(), record.clone());

        // Keep the in-memory view honest: an entry we could not persist is
        // rolled back, and the caller can retry on a later discovery.
        if let Err(e) = persist(&self.config.path, &guard) {
            guard.remove(flight.as_str());
            return Err(e);
        }

        Ok(true)
    }

    /// Number of persisted routes.
    pub async fn len(&self) -> usize {
        self.routes.read().await.len()
    }

    /// Whether the store holds any routes.
    pub async fn is_empty(&self) -> bool {
        self.routes.read().await.is_empty()
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }
}

/// Write the full map to disk: temp file in the same directory, then an
/// atomic rename over the target so concurrent readers of the file never
/// observe a partial write.
fn persist(path: &Path, routes: &HashMap<String, RouteRecord>) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    // Write keys in sorted order so rewrites diff cleanly.
    let ordered: BTreeMap<&String, &RouteRecord> = routes.iter().collect();
    let json = serde_json::to_string_pretty(&ordered).map_err(|e| StoreError::Encode {
        message: e.to_string(),
    })?;

    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;

    Ok(())
}

fn corrupt_backup_path(path: &Path) -> PathBuf {
    let mut os = OsString::from(path.as_os_str());
    os.push(".corrupt");
    PathBuf::from(os)
}
