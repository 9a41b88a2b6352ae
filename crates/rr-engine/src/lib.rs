//! `rr-engine` — place-to-place routing on top of `rr-graph`.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`engine`]   | `compute_route`, `render_coordinates`, `RoutingEngine`, `RoutePlan` |
//! | [`provider`] | `GraphProvider`, `CachedProvider` (single-flight, TTL), `CsvGraphProvider` |
//! | [`geocode`]  | `Geocoder`, `StaticGeocoder`, `CachedGeocoder`            |
//! | [`config`]   | `EngineConfig` (JSON)                                     |
//! | [`error`]    | `RouteError`, `ProviderError`, `GeocodeError`             |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use rr_core::GeoPoint;
//! use rr_engine::{CsvGraphProvider, EngineConfig, RoutingEngine, StaticGeocoder};
//!
//! let geocoder = StaticGeocoder::new()
//!     .with_place("Indiranagar", GeoPoint::new(12.9719, 77.6412))
//!     .with_place("Koramangala", GeoPoint::new(12.9352, 77.6245));
//! let engine = RoutingEngine::new(
//!     EngineConfig::default(),
//!     CsvGraphProvider::new("data"),
//!     geocoder,
//! )?;
//! let plan = engine.route_places("Bengaluru, India", "Indiranagar", "Koramangala", None)?;
//! println!("{}", plan.to_geojson());
//! ```
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | `route_many` and weight assignment run on Rayon.          |
//! | `osm`      | Enables `rr_graph::osm`.                                  |

pub mod config;
pub mod engine;
pub mod error;
pub mod geocode;
pub mod provider;

#[cfg(test)]
mod tests;

pub use config::{EngineConfig, DEFAULT_CACHE_TTL_SECS};
pub use engine::{compute_route, render_coordinates, RoutePlan, RoutingEngine};
pub use error::{GeocodeError, ProviderError, RouteError, RouteResult};
pub use geocode::{CachedGeocoder, Geocoder, StaticGeocoder};
pub use provider::{CachedProvider, CsvGraphProvider, GraphProvider};
