//! Graph providers and the memoizing cache in front of them.
//!
//! # Single-flight loading
//!
//! [`CachedProvider`] keeps one slot per place name.  A request takes the
//! slot's lock before checking it, so concurrent first requests for the same
//! place queue behind a single load and then share its `Arc<RoadGraph>`.
//! Requests for different places hold different slots and load in parallel.
//!
//! A failed load caches nothing; the next request tries again.  When no other
//! request is waiting on the slot it is dropped, so unknown place names do
//! not accumulate.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use rr_graph::loader::load_csv_dir;
use rr_graph::RoadGraph;

use crate::config::DEFAULT_CACHE_TTL_SECS;
use crate::ProviderError;

// ── GraphProvider trait ───────────────────────────────────────────────────────

/// Source of road graphs keyed by place name (e.g. `"Bengaluru, India"`).
///
/// Implementations may block on disk or network I/O.
pub trait GraphProvider: Send + Sync {
    fn load(&self, place: &str) -> Result<RoadGraph, ProviderError>;
}

impl<F> GraphProvider for F
where
    F: Fn(&str) -> Result<RoadGraph, ProviderError> + Send + Sync,
{
    fn load(&self, place: &str) -> Result<RoadGraph, ProviderError> {
        self(place)
    }
}

// ── CsvGraphProvider ──────────────────────────────────────────────────────────

/// Reads `<data_dir>/<slug>/nodes.csv` and `edges.csv`, where `slug` is the
/// place name lowercased with runs of non-alphanumerics collapsed to `-`
/// (`"Bengaluru, India"` → `bengaluru-india`).
#[derive(Clone, Debug)]
pub struct CsvGraphProvider {
    data_dir: PathBuf,
}

impl CsvGraphProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory the tables for `place` are read from.
    pub fn dir_for(&self, place: &str) -> PathBuf {
        self.data_dir.join(slug(place))
    }
}

impl GraphProvider for CsvGraphProvider {
    fn load(&self, place: &str) -> Result<RoadGraph, ProviderError> {
        let dir = self.dir_for(place);
        if !dir.is_dir() {
            return Err(ProviderError::UnknownPlace(place.to_owned()));
        }
        load_csv_dir(&dir).map_err(|source| ProviderError::Load { place: place.to_owned(), source })
    }
}

/// Lowercase, alphanumeric runs joined by `-`.
pub fn slug(place: &str) -> String {
    let mut out = String::with_capacity(place.len());
    for word in place.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push('-');
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
    }
    out
}

// ── CachedProvider ────────────────────────────────────────────────────────────

struct Cached {
    graph:     Arc<RoadGraph>,
    loaded_at: Instant,
}

type Slot = Arc<Mutex<Option<Cached>>>;

/// Memoizes an inner [`GraphProvider`] per place, with an optional TTL.
pub struct CachedProvider<P> {
    inner: P,
    ttl:   Option<Duration>,
    slots: Mutex<FxHashMap<String, Slot>>,
}

impl<P: GraphProvider> CachedProvider<P> {
    /// Cache with the default one-hour TTL.
    pub fn new(inner: P) -> Self {
        Self::with_ttl(inner, Some(Duration::from_secs(DEFAULT_CACHE_TTL_SECS)))
    }

    /// Cache with an explicit TTL; `None` never expires.
    pub fn with_ttl(inner: P, ttl: Option<Duration>) -> Self {
        Self { inner, ttl, slots: Mutex::new(FxHashMap::default()) }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// The graph for `place`, loading it at most once per TTL window.
    pub fn get(&self, place: &str) -> Result<Arc<RoadGraph>, ProviderError> {
        let slot = {
            let mut slots = lock(&self.slots);
            Arc::clone(slots.entry(place.to_owned()).or_default())
        };

        let mut entry = lock(&slot);
        if let Some(cached) = entry.as_ref() {
            if self.is_fresh(cached) {
                return Ok(Arc::clone(&cached.graph));
            }
            log::debug!("cached graph for {place:?} expired");
        }

        let started = Instant::now();
        let graph = match self.inner.load(place) {
            Ok(graph) => Arc::new(graph),
            Err(e) => {
                drop(entry);
                self.release(place, &slot);
                return Err(e);
            }
        };
        log::info!(
            "loaded graph for {place:?}: {} nodes, {} edges in {:.2?}",
            graph.node_count(),
            graph.edge_count(),
            started.elapsed()
        );
        *entry = Some(Cached { graph: Arc::clone(&graph), loaded_at: Instant::now() });
        Ok(graph)
    }

    /// `true` if `place` currently has a fresh cached graph.
    pub fn is_cached(&self, place: &str) -> bool {
        let slot = match lock(&self.slots).get(place) {
            Some(slot) => Arc::clone(slot),
            None => return false,
        };
        let entry = lock(&slot);
        entry.as_ref().is_some_and(|c| self.is_fresh(c))
    }

    /// Drop the cached graph for `place`.  In-flight holders keep their `Arc`.
    pub fn invalidate(&self, place: &str) {
        lock(&self.slots).remove(place);
    }

    pub fn clear(&self) {
        lock(&self.slots).clear();
    }

    /// Number of places with a slot, cached or loading.
    pub fn len(&self) -> usize {
        lock(&self.slots).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.slots).is_empty()
    }

    /// Remove `slot` after a failed load unless another request holds it.
    fn release(&self, place: &str, slot: &Slot) {
        let mut slots = lock(&self.slots);
        // Handles are only handed out under the map lock: one is ours, one is
        // the map's.
        let idle = slots
            .get(place)
            .is_some_and(|s| Arc::ptr_eq(s, slot) && Arc::strong_count(slot) == 2);
        if idle {
            slots.remove(place);
        }
    }

    fn is_fresh(&self, cached: &Cached) -> bool {
        match self.ttl {
            Some(ttl) => cached.loaded_at.elapsed() < ttl,
            None => true,
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    // Slots are only ever written whole, so a poisoned lock holds valid data.
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
