//! `rr-graph` — road graph, time-weighted costing, routing, and geometry.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`network`]  | `RoadGraph` (CSR + R-tree), `RoadGraphBuilder`, `EdgeRef`    |
//! | [`weight`]   | `Weighting` trait, `TrafficProfile`, `EdgeWeights`, `CostedGraph` |
//! | [`router`]   | `Router` trait, `Route`, `DijkstraRouter`, `shortest_path`   |
//! | [`geometry`] | `Polyline`, `reconstruct`, `render_coordinates`              |
//! | [`loader`]   | CSV node/edge table loading                                  |
//! | [`osm`]      | `load_from_pbf` (feature = `"osm"` only)                     |
//! | [`error`]    | `GraphError`, `GraphResult<T>`                               |
//!
//! # Request lifecycle
//!
//! ```text
//! RoadGraph (shared, read-only)
//!   └─ assign_weights(&profile, hour) ──► CostedGraph (request-local weights)
//!        └─ shortest_path(from, to) ────► Option<Route>
//!             └─ reconstruct(graph, route) ► Polyline (lat, lon)
//! ```
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `osm`      | Enables OSM PBF loading via the `osmpbf` crate.           |
//! | `parallel` | Computes weight tables with Rayon.                        |

pub mod error;
pub mod geometry;
pub mod loader;
pub mod network;
pub mod router;
pub mod weight;

#[cfg(feature = "osm")]
pub mod osm;


pub use error::{GraphError, GraphResult};
pub use geometry::{reconstruct, reconstruct_nodes, render_coordinates, Polyline};
pub use network::{EdgeRef, RoadGraph, RoadGraphBuilder};
pub use router::{shortest_path, shortest_path_cancellable, DijkstraRouter, Route, Router};
pub use weight::{
    traffic_weight, BaseWeights, CostedGraph, EdgeWeights, TrafficProfile, Weighting,
    RUSH_HOURS, RUSH_HOUR_MULTIPLIER,
};
