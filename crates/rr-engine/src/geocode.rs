//! Geocoding collaborators.
//!
//! Real deployments put a network geocoder behind [`Geocoder`] and wrap it in
//! a [`CachedGeocoder`].  [`StaticGeocoder`] is an in-memory gazetteer for
//! tests, demos, and fixed deployments.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use rr_core::GeoPoint;

use crate::GeocodeError;

/// Free text → coordinate.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, query: &str) -> Result<GeoPoint, GeocodeError>;
}

fn normalize(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

// ── StaticGeocoder ────────────────────────────────────────────────────────────

/// Case- and whitespace-insensitive lookup table.
///
/// A query also matches when it is a known name followed by a
/// comma-separated qualifier: with `"Koramangala"` registered,
/// `"Koramangala, Bengaluru, India"` resolves to it.
#[derive(Clone, Debug, Default)]
pub struct StaticGeocoder {
    places: FxHashMap<String, GeoPoint>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, name: &str, pos: GeoPoint) -> Self {
        self.insert(name, pos);
        self
    }

    pub fn insert(&mut self, name: &str, pos: GeoPoint) {
        self.places.insert(normalize(name), pos);
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

impl Geocoder for StaticGeocoder {
    fn geocode(&self, query: &str) -> Result<GeoPoint, GeocodeError> {
        let key = normalize(query);
        if let Some(&pos) = self.places.get(&key) {
            return Ok(pos);
        }
        // Strip qualifiers from the right: "a, b, c" → "a, b" → "a".
        let mut head = key.as_str();
        while let Some((left, _)) = head.rsplit_once(',') {
            head = left.trim_end();
            if let Some(&pos) = self.places.get(head) {
                return Ok(pos);
            }
        }
        Err(GeocodeError::AmbiguousOrNotFound(query.to_owned()))
    }
}

impl<S: AsRef<str>> FromIterator<(S, GeoPoint)> for StaticGeocoder {
    fn from_iter<I: IntoIterator<Item = (S, GeoPoint)>>(iter: I) -> Self {
        let mut g = StaticGeocoder::new();
        for (name, pos) in iter {
            g.insert(name.as_ref(), pos);
        }
        g
    }
}

// ── CachedGeocoder ────────────────────────────────────────────────────────────

/// Memoizes successful lookups of an inner geocoder for `ttl`.
///
/// Failures are not cached.  Storing a new entry evicts every expired one.
pub struct CachedGeocoder<G> {
    inner:   G,
    ttl:     Option<Duration>,
    entries: Mutex<FxHashMap<String, (GeoPoint, Instant)>>,
}

impl<G: Geocoder> CachedGeocoder<G> {
    pub fn new(inner: G, ttl: Option<Duration>) -> Self {
        Self { inner, ttl, entries: Mutex::new(FxHashMap::default()) }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Number of stored lookups, expired ones included until the next insert.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_fresh(&self, at: Instant) -> bool {
        self.ttl.is_none_or(|ttl| at.elapsed() < ttl)
    }
}

impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    fn geocode(&self, query: &str) -> Result<GeoPoint, GeocodeError> {
        let key = normalize(query);
        {
            let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(&(pos, at)) = entries.get(&key) {
                if self.is_fresh(at) {
                    return Ok(pos);
                }
            }
        }

        // Lookups are independent; concurrent misses may both hit the inner
        // geocoder.
        let pos = self.inner.geocode(query)?;
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if self.ttl.is_some() {
            entries.retain(|_, &mut (_, at)| self.is_fresh(at));
        }
        entries.insert(key, (pos, Instant::now()));
        Ok(pos)
    }
}
