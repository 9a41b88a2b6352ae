//! Composed routing entry points.
//!
//! ```text
//! compute_route(graph, start, end, hour, weighting)
//!   ① snap start / end   ── nearest_node      ─► EmptyGraph
//!   ② cost edges         ── assign_weights    (request-local)
//!   ③ search             ── Router::route     ─► NoPathFound / Cancelled
//! ```
//!
//! [`RoutingEngine`] adds the collaborators on top: graph provider (cached),
//! geocoder, and configuration, and returns a [`RoutePlan`] with the
//! rendered polyline.  The first failure is returned; there are no partial
//! results.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use serde_json::{json, Value};

use rr_core::{GeoPoint, Hour, NodeId};
use rr_graph::{
    reconstruct, CostedGraph, DijkstraRouter, Polyline, RoadGraph, Route, Router, Weighting,
};

use crate::provider::{CachedProvider, GraphProvider};
use crate::{CachedGeocoder, EngineConfig, Geocoder, RouteError, RouteResult};

// ── Free functions ────────────────────────────────────────────────────────────

/// Snap both coordinates, cost the graph for `hour`, and search.
///
/// # Errors
///
/// - [`RouteError::EmptyGraph`] if the graph has no nodes.
/// - [`RouteError::NoPathFound`] if the end is unreachable from the start.
pub fn compute_route<W: Weighting + ?Sized>(
    graph:     &RoadGraph,
    start:     GeoPoint,
    end:       GeoPoint,
    hour:      Hour,
    weighting: &W,
) -> RouteResult<Route> {
    let from = graph.nearest_node(start)?;
    let to = graph.nearest_node(end)?;
    let costed = graph.assign_weights(weighting, hour);
    search(&DijkstraRouter, &costed, from, to, None)
}

/// Route coordinates as `[lat, lon]` pairs.
pub fn render_coordinates(graph: &RoadGraph, route: &Route) -> Vec<[f64; 2]> {
    rr_graph::render_coordinates(graph, route)
}

fn search<R: Router + ?Sized>(
    router: &R,
    costed: &CostedGraph<'_>,
    from:   NodeId,
    to:     NodeId,
    cancel: Option<&AtomicBool>,
) -> RouteResult<Route> {
    router
        .route(costed, from, to, cancel)?
        .ok_or(RouteError::NoPathFound { from, to })
}

// ── RoutePlan ─────────────────────────────────────────────────────────────────

/// A routed request with everything a renderer needs.
#[derive(Debug, Clone)]
pub struct RoutePlan {
    pub route:      Route,
    pub polyline:   Polyline,
    /// Requested (pre-snap) start and end coordinates.
    pub start:      GeoPoint,
    pub end:        GeoPoint,
    pub start_node: NodeId,
    pub end_node:   NodeId,
    /// Positions of `start_node` and `end_node`, where the map markers go.
    pub start_pos:  GeoPoint,
    pub end_pos:    GeoPoint,
    /// Hour the weights were computed for.
    pub hour:       Hour,
}

impl RoutePlan {
    /// `[lat, lon]` pairs.
    pub fn coordinates(&self) -> Vec<[f64; 2]> {
        self.polyline.to_lat_lon()
    }

    /// GeoJSON `FeatureCollection`: the route `LineString` plus start and
    /// end `Point`s on the snapped nodes.  Coordinates are `[lon, lat]` as
    /// GeoJSON requires; each marker also carries the `requested` point.
    pub fn to_geojson(&self) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "LineString", "coordinates": self.polyline.to_lon_lat() },
                    "properties": {
                        "hour": self.hour.get(),
                        "cost": self.route.total_cost,
                        "nodes": self.route.nodes.len(),
                        "length_m": self.polyline.length_m(),
                        "skipped_hops": self.polyline.skipped_hops,
                    }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": self.start_pos.to_lon_lat() },
                    "properties": { "marker": "start", "requested": self.start.to_lon_lat() }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": self.end_pos.to_lon_lat() },
                    "properties": { "marker": "end", "requested": self.end.to_lon_lat() }
                }
            ]
        })
    }
}

// ── RoutingEngine ─────────────────────────────────────────────────────────────

/// Place-to-place router over a cached graph provider and a cached geocoder.
///
/// Both caches use `config.cache_ttl()`.
///
/// `Send + Sync` whenever its parts are; share it behind an `Arc` and call it
/// from any number of threads.
pub struct RoutingEngine<P, G, R = DijkstraRouter> {
    config:   EngineConfig,
    graphs:   CachedProvider<P>,
    geocoder: CachedGeocoder<G>,
    router:   R,
}

impl<P: GraphProvider, G: Geocoder> RoutingEngine<P, G, DijkstraRouter> {
    /// # Errors
    ///
    /// [`RouteError::Config`] if `config` fails validation.
    pub fn new(config: EngineConfig, provider: P, geocoder: G) -> RouteResult<Self> {
        Self::with_router(config, provider, geocoder, DijkstraRouter)
    }
}

impl<P: GraphProvider, G: Geocoder, R: Router> RoutingEngine<P, G, R> {
    pub fn with_router(config: EngineConfig, provider: P, geocoder: G, router: R) -> RouteResult<Self> {
        config.validate()?;
        let graphs = CachedProvider::with_ttl(provider, config.cache_ttl());
        let geocoder = CachedGeocoder::new(geocoder, config.cache_ttl());
        Ok(Self { config, graphs, geocoder, router })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn graphs(&self) -> &CachedProvider<P> {
        &self.graphs
    }

    pub fn geocoder(&self) -> &CachedGeocoder<G> {
        &self.geocoder
    }

    /// Local hour now, per `config.utc_offset_secs`.
    pub fn current_hour(&self) -> Hour {
        self.config.current_hour()
    }

    /// The (cached) road graph for `place`.
    pub fn graph(&self, place: &str) -> RouteResult<Arc<RoadGraph>> {
        Ok(self.graphs.get(place)?)
    }

    /// Load `city`, geocode both endpoints, and route between them.
    ///
    /// `hour = None` uses the current local hour.
    pub fn route_places(
        &self,
        city: &str,
        from: &str,
        to:   &str,
        hour: Option<Hour>,
    ) -> RouteResult<RoutePlan> {
        let graph = self.graph(city)?;
        let start = self.geocoder.geocode(from)?;
        let end = self.geocoder.geocode(to)?;
        log::debug!("geocoded {from:?} -> {start}, {to:?} -> {end}");
        self.plan(&graph, start, end, hour, None)
    }

    /// Route between two coordinates on an already-loaded graph.
    ///
    /// Setting `cancel` stops the search with [`RouteError::Cancelled`].
    pub fn plan(
        &self,
        graph:  &RoadGraph,
        start:  GeoPoint,
        end:    GeoPoint,
        hour:   Option<Hour>,
        cancel: Option<&AtomicBool>,
    ) -> RouteResult<RoutePlan> {
        let hour = hour.unwrap_or_else(|| self.current_hour());
        let start_node = graph.nearest_node(start)?;
        let end_node = graph.nearest_node(end)?;

        let costed = graph.assign_weights(&self.config.profile, hour);
        let route = search(&self.router, &costed, start_node, end_node, cancel)?;
        let polyline = reconstruct(graph, &route);
        if polyline.skipped_hops > 0 {
            log::warn!("route {start_node} -> {end_node}: {} hops without geometry", polyline.skipped_hops);
        }

        log::info!(
            "routed {start_node} -> {end_node} at {hour}: {} nodes, cost {:.1}",
            route.nodes.len(),
            route.total_cost
        );
        Ok(RoutePlan {
            route,
            polyline,
            start,
            end,
            start_node,
            end_node,
            start_pos: graph.get_node(start_node)?,
            end_pos: graph.get_node(end_node)?,
            hour,
        })
    }

    /// Route many coordinate pairs against one weight table.
    ///
    /// Results are in input order; each pair fails independently.  With the
    /// `parallel` feature the searches run on Rayon's thread pool.
    pub fn route_many(
        &self,
        graph: &RoadGraph,
        pairs: &[(GeoPoint, GeoPoint)],
        hour:  Hour,
    ) -> Vec<RouteResult<Route>> {
        let costed = graph.assign_weights(&self.config.profile, hour);
        let one = |&(start, end): &(GeoPoint, GeoPoint)| -> RouteResult<Route> {
            let from = graph.nearest_node(start)?;
            let to = graph.nearest_node(end)?;
            search(&self.router, &costed, from, to, None)
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            pairs.par_iter().map(one).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            pairs.iter().map(one).collect()
        }
    }
}
