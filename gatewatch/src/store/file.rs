//! Durable store backed by JSON files.
//!
//! Layout under the store root:
//!
//! ```text
//! cache/{BASE}_{radius_tenths}.json   one CacheEntry per key
//! latest/{BASE}.json                  icao24 -> latest AircraftSnapshot
//! tracks/{BASE}.jsonl                 append-only TrackPoint log
//! ```
//!
//! Entry writes go through a temporary file and a rename so concurrent
//! readers never see a torn file. Multiple processes sharing the directory
//! get last-writer-wins semantics.
//!
//! Track de-duplication uses an in-memory index per base, seeded from the
//! log the first time the base is written after `open`. The index keeps
//! timestamps within [`TRACK_INDEX_WINDOW_MS`] of each aircraft's newest point
//! and forgets aircraft not seen for that long. Points older than the window
//! are treated as already logged.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{DurableStore, StoreError, TrackPoint};
use crate::aircraft::AircraftSnapshot;
use crate::cache::{CacheEntry, CacheKey};

const CACHE_DIR: &str = "cache";
const LATEST_DIR: &str = "latest";
const TRACKS_DIR: &str = "tracks";

/// How far back the track index remembers logged timestamps, in milliseconds.
const TRACK_INDEX_WINDOW_MS: i64 = 6 * 60 * 60 * 1000;

/// Parsed contents of one track log.
#[derive(Debug, Default)]
struct TrackLog {
    points: Vec<TrackPoint>,
    /// The file does not end with a newline.
    unterminated: bool,
}

/// Logged timestamps (epoch millis) per icao24 for one base.
#[derive(Debug, Default)]
struct TrackIndex {
    aircraft: HashMap<String, BTreeSet<i64>>,
    /// The next append must start on a fresh line.
    unterminated: bool,
}

impl TrackIndex {
    fn from_points(points: &[TrackPoint]) -> Self {
        let mut index = Self::default();
        for point in points {
            index.record(&point.icao24, point.ts.timestamp_millis());
        }
        index.prune(None);
        index
    }

    /// Record a timestamp; false if it is already logged or too old to tell.
    fn record(&mut self, icao24: &str, ts: i64) -> bool {
        let logged = self.aircraft.entry(icao24.to_string()).or_default();
        let newest = logged.last().copied().unwrap_or(ts);
        if ts < newest - TRACK_INDEX_WINDOW_MS {
            return false;
        }
        logged.insert(ts)
    }

    /// Drop timestamps outside the window, and aircraft whose newest point
    /// is older than the window relative to `now_ms` when given.
    fn prune(&mut self, now_ms: Option<i64>) {
        let window = TRACK_INDEX_WINDOW_MS;
        self.aircraft.retain(|_, logged| {
            let Some(&newest) = logged.last() else {
                return false;
            };
            if now_ms.is_some_and(|now| newest < now - window) {
                return false;
            }
            *logged = logged.split_off(&(newest - window));
            true
        });
    }

    fn len(&self) -> usize {
        self.aircraft.len()
    }
}

/// Durable store writing JSON files under a root directory.
pub struct FileStore {
    root: PathBuf,
    /// Serializes read-modify-write of the latest-state files.
    latest_lock: Mutex<()>,
    /// Track de-duplication index per base, loaded on first write.
    track_index: Mutex<HashMap<String, TrackIndex>>,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory layout.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        for dir in [CACHE_DIR, LATEST_DIR, TRACKS_DIR] {
            fs::create_dir_all(root.join(dir)).await?;
        }

        debug!(root = %root.display(), "Opened file store");

        Ok(Self {
            root,
            latest_lock: Mutex::new(()),
            track_index: Mutex::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.root
            .join(CACHE_DIR)
            .join(format!("{}_{}.json", sanitize(&key.base), key.radius_tenths))
    }

    fn latest_path(&self, base: &str) -> PathBuf {
        self.root
            .join(LATEST_DIR)
            .join(format!("{}.json", sanitize(base)))
    }

    fn track_path(&self, base: &str) -> PathBuf {
        self.root
            .join(TRACKS_DIR)
            .join(format!("{}.jsonl", sanitize(base)))
    }

    /// Read every track point logged for a base.
    ///
    /// Lines that do not parse, such as a partial line left by an interrupted
    /// append, are skipped.
    pub async fn read_track_points(&self, base: &str) -> Result<Vec<TrackPoint>, StoreError> {
        Ok(self.read_track_log(base).await?.points)
    }

    async fn read_track_log(&self, base: &str) -> Result<TrackLog, StoreError> {
        let content = match fs::read_to_string(self.track_path(base)).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(TrackLog::default()),
            Err(e) => return Err(e.into()),
        };

        let mut skipped = 0usize;
        let points = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(point) => Some(point),
                Err(_) => {
                    skipped += 1;
                    None
                }
            })
            .collect();
        if skipped > 0 {
            warn!(base, skipped, "Skipped unreadable track log lines");
        }

        Ok(TrackLog {
            points,
            unterminated: !content.is_empty() && !content.ends_with('\n'),
        })
    }

    /// Read the latest-state map for a base.
    pub async fn read_latest(
        &self,
        base: &str,
    ) -> Result<BTreeMap<String, AircraftSnapshot>, StoreError> {
        match fs::read(self.latest_path(base)).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keep file names to a safe character set.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Write via a sibling temporary file and rename into place.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension(format!("tmp-{}", std::process::id()));
    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

impl DurableStore for FileStore {
    async fn read_by_key(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StoreError> {
        match fs::read(self.entry_path(key)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn upsert(&self, entry: &CacheEntry) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(entry)?;
        write_atomic(&self.entry_path(&entry.key), &bytes).await
    }

    async fn upsert_latest(
        &self,
        base: &str,
        aircraft: &[AircraftSnapshot],
    ) -> Result<(), StoreError> {
        let _guard = self.latest_lock.lock().await;

        let mut latest = self.read_latest(base).await?;
        for snapshot in aircraft {
            latest.insert(snapshot.icao24.clone(), snapshot.clone());
        }

        let bytes = serde_json::to_vec(&latest)?;
        write_atomic(&self.latest_path(base), &bytes).await
    }

    async fn insert_track_points(&self, points: &[TrackPoint]) -> Result<(), StoreError> {
        let mut indexes = self.track_index.lock().await;
        let mut per_base: BTreeMap<&str, Vec<&TrackPoint>> = BTreeMap::new();
        for point in points {
            per_base.entry(point.base.as_str()).or_default().push(point);
        }

        for (base, batch) in per_base {
            if !indexes.contains_key(base) {
                let log = self.read_track_log(base).await?;
                let mut index = TrackIndex::from_points(&log.points);
                index.unterminated = log.unterminated;
                debug!(base, aircraft = index.len(), "Loaded track index from log");
                indexes.insert(base.to_string(), index);
            }
            let Some(index) = indexes.get_mut(base) else {
                continue;
            };

            let mut lines = String::new();
            let mut newest = None;
            for point in batch {
                let ts = point.ts.timestamp_millis();
                newest = newest.max(Some(ts));
                if !index.record(&point.icao24, ts) {
                    continue;
                }
                lines.push_str(&serde_json::to_string(point)?);
                lines.push('\n');
            }
            index.prune(newest);

            if lines.is_empty() {
                continue;
            }
            if std::mem::take(&mut index.unterminated) {
                lines.insert(0, '\n');
            }

            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.track_path(base))
                .await?;
            file.write_all(lines.as_bytes()).await?;
            file.flush().await?;
        }

        Ok(())
    }
}
