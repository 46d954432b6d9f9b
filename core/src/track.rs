//! Lazily resolved CD-audio tracks.
//!
//! Every source owns a [`TrackCache`]. A track is resolved the first time it
//! is asked for and the resulting [`TrackHandle`] is memoized; callers racing
//! on the same unresolved track share one in-flight resolution and all get
//! the same handle back.
//!
//! Where resolved audio lives is a [`TrackCacheStrategy`]: in memory, or
//! spilled into a temporary directory for hosts that cannot afford to keep
//! whole tracks resident.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use hashbrown::HashMap;
use tokio::sync::OnceCell;

use crate::config::TrackCacheStrategy;
use crate::error::{LoadError, Result};

/// Playable handle for a resolved track.
///
/// Cheap to clone; clones refer to the same resolved track.
#[derive(Debug, Clone)]
pub struct TrackHandle {
    inner: Arc<TrackInner>,
}

#[derive(Debug)]
struct TrackInner {
    track: u32,
    locator: String,
    location: TrackLocation,
}

/// Where the resolved audio bytes can be read from.
#[derive(Debug, Clone)]
pub enum TrackLocation {
    Memory(Arc<[u8]>),
    File(PathBuf),
}

impl TrackHandle {
    fn new(track: u32, locator: String, location: TrackLocation) -> Self {
        Self {
            inner: Arc::new(TrackInner {
                track,
                locator,
                location,
            }),
        }
    }

    pub fn track(&self) -> u32 {
        self.inner.track
    }

    /// URL-like locator handed to the audio player.
    pub fn locator(&self) -> &str {
        &self.inner.locator
    }

    pub fn location(&self) -> &TrackLocation {
        &self.inner.location
    }

    /// Reads the audio bytes back, wherever they are stored.
    pub fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        match &self.inner.location {
            TrackLocation::Memory(bytes) => Ok(bytes.to_vec()),
            TrackLocation::File(path) => std::fs::read(path),
        }
    }

    /// Whether both handles are the same memoized resolution.
    pub fn ptr_eq(a: &TrackHandle, b: &TrackHandle) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

/// Raw audio produced by a source when a track is first requested.
#[derive(Debug, Clone)]
pub struct TrackData {
    /// File name the audio came from (used for the locator and extension)
    pub file_name: String,
    pub bytes: Arc<[u8]>,
}

impl TrackData {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Memoizing per-track cache.
#[derive(Debug)]
pub struct TrackCache {
    strategy: TrackCacheStrategy,
    slots: Mutex<HashMap<u32, Arc<OnceCell<TrackHandle>>>>,
    spill_dir: Mutex<Option<tempfile::TempDir>>,
}

impl TrackCache {
    pub fn new(strategy: TrackCacheStrategy) -> Self {
        Self {
            strategy,
            slots: Mutex::new(HashMap::new()),
            spill_dir: Mutex::new(None),
        }
    }

    /// Number of tracks resolved so far.
    #[cfg(test)]
    fn resolved(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.values().filter(|cell| cell.initialized()).count()
    }

    /// Returns the memoized handle for `track`, resolving it with `resolve`
    /// on first access.
    ///
    /// A failed resolution is not cached; the next caller retries.
    pub async fn get_or_resolve<F, Fut>(&self, track: u32, resolve: F) -> Result<TrackHandle>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TrackData>>,
    {
        if track == 0 {
            return Err(LoadError::InvalidTrack(track));
        }

        let cell = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(slots.entry(track).or_default())
        };

        let resolved = cell
            .get_or_try_init(|| async {
                let data = resolve().await?;
                let handle = self.store(track, data)?;
                tracing::debug!(track, locator = handle.locator(), "Resolved CD-DA track");
                Ok::<_, LoadError>(handle)
            })
            .await;
        match resolved {
            Ok(handle) => Ok(handle.clone()),
            Err(e) => {
                self.release_empty_slot(track, &cell);
                Err(e)
            }
        }
    }

    /// Drops the slot for `track` if it is still `cell`, never resolved and
    /// nobody else is waiting on it.
    fn release_empty_slot(&self, track: u32, cell: &Arc<OnceCell<TrackHandle>>) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let unused = slots.get(&track).is_some_and(|slot| {
            Arc::ptr_eq(slot, cell) && !slot.initialized() && Arc::strong_count(slot) == 2
        });
        if unused {
            slots.remove(&track);
        }
    }

    fn store(&self, track: u32, data: TrackData) -> Result<TrackHandle> {
        match self.strategy {
            TrackCacheStrategy::Memory => Ok(TrackHandle::new(
                track,
                format!("track:{}/{}", track, data.file_name),
                TrackLocation::Memory(data.bytes),
            )),
            TrackCacheStrategy::Disk => {
                let path = self.spill(track, &data)?;
                Ok(TrackHandle::new(
                    track,
                    path.display().to_string(),
                    TrackLocation::File(path),
                ))
            }
        }
    }

    fn spill(&self, track: u32, data: &TrackData) -> Result<PathBuf> {
        let mut dir = self.spill_dir.lock().unwrap_or_else(|e| e.into_inner());
        let root = match &*dir {
            Some(existing) => existing.path().to_path_buf(),
            None => {
                let created = tempfile::Builder::new().prefix("xsys-cdda").tempdir()?;
                let root = created.path().to_path_buf();
                *dir = Some(created);
                root
            }
        };

        let ext = Path::new(&data.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("wav")
            .to_ascii_lowercase();
        let path = root.join(format!("track{:02}.{}", track, ext));
        std::fs::write(&path, &data.bytes)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn data(name: &str, bytes: &[u8]) -> Result<TrackData> {
        Ok(TrackData::new(name, bytes.to_vec()))
    }

    #[tokio::test]
    async fn memoizes_first_resolution() {
        let cache = TrackCache::new(TrackCacheStrategy::Memory);
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let a = cache
            .get_or_resolve(2, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                data("02.ogg", b"first")
            })
            .await
            .unwrap();
        let b = cache
            .get_or_resolve(2, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                data("02.ogg", b"second")
            })
            .await
            .unwrap();

        assert!(TrackHandle::ptr_eq(&a, &b));
        assert_eq!(b.read_bytes().unwrap(), b"first");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.locator(), "track:2/02.ogg");
        assert_eq!(cache.resolved(), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_resolution() {
        let cache = TrackCache::new(TrackCacheStrategy::Memory);
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let resolve = || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            data("05.wav", b"pcm")
        };

        let (a, b) = tokio::join!(cache.get_or_resolve(5, resolve), cache.get_or_resolve(5, resolve));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert!(TrackHandle::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = TrackCache::new(TrackCacheStrategy::Memory);

        let err = cache
            .get_or_resolve(3, || async { Err(LoadError::InvalidTrack(3)) })
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::InvalidTrack(3)));
        assert_eq!(cache.resolved(), 0);

        let ok = cache
            .get_or_resolve(3, || async { data("03.mp3", b"late") })
            .await
            .unwrap();
        assert_eq!(ok.track(), 3);
    }

    #[tokio::test]
    async fn failed_lookups_leave_no_slots_behind() {
        let cache = TrackCache::new(TrackCacheStrategy::Memory);
        for track in 1..=500 {
            let err = cache
                .get_or_resolve(track, || async move { Err(LoadError::InvalidTrack(track)) })
                .await
                .unwrap_err();
            assert!(matches!(err, LoadError::InvalidTrack(t) if t == track));
        }
        assert!(cache.slots.lock().unwrap().is_empty());

        cache
            .get_or_resolve(2, || async { data("02.ogg", b"two") })
            .await
            .unwrap();
        assert_eq!(cache.slots.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn track_zero_is_invalid() {
        let cache = TrackCache::new(TrackCacheStrategy::Memory);
        let err = cache
            .get_or_resolve(0, || async { data("0.wav", b"") })
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::InvalidTrack(0)));
    }

    #[tokio::test]
    async fn disk_strategy_spills_to_file() {
        let cache = TrackCache::new(TrackCacheStrategy::Disk);
        let handle = cache
            .get_or_resolve(7, || async { data("07.OGG", b"vorbis") })
            .await
            .unwrap();

        let TrackLocation::File(path) = handle.location() else {
            panic!("expected a file-backed track");
        };
        assert!(path.ends_with("track07.ogg"));
        assert_eq!(handle.locator(), path.display().to_string());
        assert_eq!(handle.read_bytes().unwrap(), b"vorbis");

        let again = cache
            .get_or_resolve(7, || async { data("07.OGG", b"other") })
            .await
            .unwrap();
        assert!(TrackHandle::ptr_eq(&handle, &again));
    }
}
