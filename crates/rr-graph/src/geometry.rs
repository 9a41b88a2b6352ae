//! Route → polyline reconstruction.
//!
//! Each hop `nodes[i] → nodes[i+1]` contributes:
//!
//! - the full stored shape of its edge, oriented in travel direction, when
//!   the edge has detailed geometry;
//! - otherwise a straight segment between the two node positions.
//!
//! The edge for a hop is the one the search recorded in [`Route::edges`].
//! When that is missing (node-only routes), the cheapest parallel edge is
//! used: cheapest by the request's weights if given, else by base length.
//!
//! A hop with no connecting edge is logged and skipped; the rest of the
//! polyline is still produced.
//!
//! Output points are [`GeoPoint`]s, latitude first.  `to_lon_lat` exists for
//! GeoJSON writers.

use rr_core::{EdgeId, GeoPoint, NodeId};

use crate::network::{EdgeRef, RoadGraph};
use crate::router::Route;
use crate::weight::EdgeWeights;

/// Ordered route coordinates, latitude first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    pub points: Vec<GeoPoint>,
    /// Hops dropped because no connecting edge was found.
    pub skipped_hops: usize,
}

impl Polyline {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `[lat, lon]` pairs.
    pub fn to_lat_lon(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| p.to_lat_lon()).collect()
    }

    /// `[lon, lat]` pairs (GeoJSON order).
    pub fn to_lon_lat(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| p.to_lon_lat()).collect()
    }

    /// Great-circle length of the polyline in metres.
    pub fn length_m(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance_m(w[1])).sum()
    }
}

/// Reconstruct the geometry of a route produced by the search.
pub fn reconstruct(graph: &RoadGraph, route: &Route) -> Polyline {
    build(graph, &route.nodes, &route.edges, None)
}

/// Reconstruct a node-only route, choosing connecting edges by `weights`
/// (or by base length when `None`).
pub fn reconstruct_nodes(graph: &RoadGraph, nodes: &[NodeId], weights: Option<&EdgeWeights>) -> Polyline {
    build(graph, nodes, &[], weights)
}

/// Route coordinates as `[lat, lon]` pairs, ready for a renderer.
pub fn render_coordinates(graph: &RoadGraph, route: &Route) -> Vec<[f64; 2]> {
    reconstruct(graph, route).to_lat_lon()
}

fn build(graph: &RoadGraph, nodes: &[NodeId], recorded: &[EdgeId], weights: Option<&EdgeWeights>) -> Polyline {
    let mut line = Polyline::default();

    for (i, hop) in nodes.windows(2).enumerate() {
        let (u, v) = (hop[0], hop[1]);
        let edge = recorded
            .get(i)
            .copied()
            .filter(|&e| graph.connects(e, u, v))
            .map(|e| graph.edge_ref(e))
            .or_else(|| cheapest_between(graph, u, v, weights));

        let Some(edge) = edge else {
            log::warn!("no edge between {u} and {v}; skipping hop {i} of route geometry");
            line.skipped_hops += 1;
            continue;
        };

        match edge.geometry {
            Some(shape) => {
                let source = graph.node_pos[u.index()];
                if runs_backwards(shape, source) {
                    line.points.extend(shape.iter().rev().copied());
                } else {
                    line.points.extend_from_slice(shape);
                }
            }
            None => {
                line.points.push(graph.node_pos[u.index()]);
                line.points.push(graph.node_pos[v.index()]);
            }
        }
    }

    line
}

fn cheapest_between<'g>(
    graph:   &'g RoadGraph,
    u:       NodeId,
    v:       NodeId,
    weights: Option<&EdgeWeights>,
) -> Option<EdgeRef<'g>> {
    let cost = |e: &EdgeRef<'_>| match weights {
        Some(w) => w.get(e.id).unwrap_or(f64::INFINITY),
        None => e.length_m,
    };
    // min_by keeps the first of equal elements, i.e. the lowest key.
    graph.edges_between(u, v).min_by(|a, b| cost(a).total_cmp(&cost(b)))
}

/// `true` if the stored shape starts at the far end of the edge.
fn runs_backwards(shape: &[GeoPoint], source: GeoPoint) -> bool {
    match (shape.first(), shape.last()) {
        (Some(&first), Some(&last)) => source.distance_m(last) < source.distance_m(first),
        _ => false,
    }
}
