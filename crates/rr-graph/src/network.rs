//! Road graph representation and builder.
//!
//! # Data layout
//!
//! The graph is a directed multigraph in **Compressed Sparse Row (CSR)**
//! format.  Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_*[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays are sorted by source node and indexed by `EdgeId`.  The sort
//! is stable, so parallel edges between the same pair keep their insertion
//! order, and that order is their `key` (0, 1, 2, …).  `(from, to, key)`
//! addresses every edge uniquely.
//!
//! The graph never stores routing weights.  Per-request costs live in an
//! [`EdgeWeights`](crate::EdgeWeights) side table keyed by `EdgeId`, so one
//! `RoadGraph` can be shared (`Arc<RoadGraph>`) by any number of concurrent
//! requests.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over an equirectangular projection: longitudes are
//! scaled by `cos(mean latitude)` so squared planar distance is monotonic with
//! true ground distance at city scale.

use std::ops::Range;

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use rr_core::{EdgeId, GeoPoint, NodeId, RoadClass};

use crate::{GraphError, GraphResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a projected `[lat, lon * lon_scale]` point
/// with the associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dy = self.point[0] - point[0];
        let dx = self.point[1] - point[1];
        dy * dy + dx * dx
    }
}

// ── EdgeRef ───────────────────────────────────────────────────────────────────

/// Borrowed view of one edge and all of its attributes.
#[derive(Copy, Clone, Debug)]
pub struct EdgeRef<'a> {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    /// Disambiguates parallel edges between `from` and `to`.
    pub key: u32,
    pub class: RoadClass,
    pub length_m: f64,
    /// Detailed road shape, latitude first, in *stored* order (which may run
    /// opposite to `from → to`).
    pub geometry: Option<&'a [GeoPoint]>,
}

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Directed road multigraph in CSR format plus a spatial index for snapping.
///
/// Immutable once built.  Fields are `pub` for direct indexed access on hot
/// paths; use [`RoadGraphBuilder`] to construct one.
pub struct RoadGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Geographic position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<GeoPoint>,

    /// Identifier assigned by the data provider (e.g. OSM node id), if any.
    pub node_source_id: Vec<Option<i64>>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    pub edge_from: Vec<NodeId>,
    pub edge_to: Vec<NodeId>,
    pub edge_key: Vec<u32>,
    pub edge_class: Vec<RoadClass>,
    /// Base length in metres.
    pub edge_length_m: Vec<f64>,
    pub edge_geometry: Vec<Option<Vec<GeoPoint>>>,

    // ── Indices ───────────────────────────────────────────────────────────
    source_index: FxHashMap<i64, NodeId>,
    spatial_idx: RTree<NodeEntry>,
    lon_scale: f64,
}

impl std::fmt::Debug for RoadGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoadGraph")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .finish_non_exhaustive()
    }
}

impl RoadGraph {
    /// Construct a graph with no nodes or edges.
    pub fn empty() -> Self {
        RoadGraphBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn contains_node(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    // ── Node access ───────────────────────────────────────────────────────

    /// Position of `node`, or [`GraphError::NodeNotFound`].
    pub fn get_node(&self, node: NodeId) -> GraphResult<GeoPoint> {
        self.node_pos
            .get(node.index())
            .copied()
            .ok_or(GraphError::NodeNotFound(node))
    }

    /// The provider identifier recorded for `node`.
    pub fn source_id(&self, node: NodeId) -> Option<i64> {
        self.node_source_id.get(node.index()).copied().flatten()
    }

    /// Reverse lookup from a provider identifier.
    pub fn node_by_source_id(&self, source_id: i64) -> Option<NodeId> {
        self.source_index.get(&source_id).copied()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    #[inline]
    fn out_range(&self, node: NodeId) -> Range<usize> {
        if !self.contains_node(node) {
            return 0..0;
        }
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        start..end
    }

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    ///
    /// A contiguous index range; empty for unknown nodes.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.out_range(node).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.out_range(node).len()
    }

    /// All attributes of edge `id`.
    ///
    /// # Panics
    /// Panics if `id` is not an edge of this graph.
    pub fn edge_ref(&self, id: EdgeId) -> EdgeRef<'_> {
        let i = id.index();
        EdgeRef {
            id,
            from: self.edge_from[i],
            to: self.edge_to[i],
            key: self.edge_key[i],
            class: self.edge_class[i],
            length_m: self.edge_length_m[i],
            geometry: self.edge_geometry[i].as_deref(),
        }
    }

    /// Edges from `from` to `to`, in key order.  Empty if none exist.
    pub fn edges_between(&self, from: NodeId, to: NodeId) -> impl Iterator<Item = EdgeRef<'_>> + '_ {
        self.out_edges(from)
            .filter(move |e| self.edge_to[e.index()] == to)
            .map(|e| self.edge_ref(e))
    }

    /// The parallel edge `(from, to, key)`.
    pub fn edge(&self, from: NodeId, to: NodeId, key: u32) -> Option<EdgeRef<'_>> {
        self.edges_between(from, to).find(|e| e.key == key)
    }

    /// `true` if `id` runs from `from` to `to`.
    #[inline]
    pub fn connects(&self, id: EdgeId, from: NodeId, to: NodeId) -> bool {
        id.index() < self.edge_count()
            && self.edge_from[id.index()] == from
            && self.edge_to[id.index()] == to
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    #[inline]
    fn project(&self, pos: GeoPoint) -> [f64; 2] {
        [pos.lat, pos.lon * self.lon_scale]
    }

    /// Return the `NodeId` of the node nearest to `pos`.
    ///
    /// Equidistant candidates resolve to the lowest `NodeId`, so results are
    /// reproducible regardless of R-tree layout.
    ///
    /// # Errors
    ///
    /// - [`GraphError::InvalidCoordinate`] for a non-finite or out-of-range `pos`.
    /// - [`GraphError::EmptyGraph`] if the graph has no nodes.
    pub fn nearest_node(&self, pos: GeoPoint) -> GraphResult<NodeId> {
        let pos = GeoPoint::checked(pos.lat, pos.lon)
            .map_err(|_| GraphError::InvalidCoordinate { lat: pos.lat, lon: pos.lon })?;
        let query = self.project(pos);
        let mut candidates = self.spatial_idx.nearest_neighbor_iter_with_distance_2(&query);

        let (first, best_d2) = candidates.next().ok_or(GraphError::EmptyGraph)?;
        let mut best = first.id;
        for (entry, d2) in candidates {
            if d2 > best_d2 {
                break;
            }
            best = best.min(entry.id);
        }
        Ok(best)
    }

    /// Return up to `k` nearest nodes to `pos`, sorted by ascending distance.
    /// Empty for an invalid `pos`.
    pub fn k_nearest_nodes(&self, pos: GeoPoint, k: usize) -> Vec<NodeId> {
        if GeoPoint::checked(pos.lat, pos.lon).is_err() {
            return Vec::new();
        }
        let query = self.project(pos);
        self.spatial_idx
            .nearest_neighbor_iter(&query)
            .take(k)
            .map(|e| e.id)
            .collect()
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// Nodes must be added before the edges that reference them; an edge with an
/// unknown endpoint is rejected, so a built graph never has dangling edges.
///
/// # Example
///
/// ```
/// use rr_core::{GeoPoint, RoadClass};
/// use rr_graph::RoadGraphBuilder;
///
/// let mut b = RoadGraphBuilder::new();
/// let a = b.add_node(GeoPoint::new(12.971, 77.641));
/// let c = b.add_node(GeoPoint::new(12.935, 77.624));
/// b.add_road(a, c, RoadClass::Primary, 4_300.0).unwrap();
/// let graph = b.build();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 2); // bidirectional
/// ```
pub struct RoadGraphBuilder {
    nodes:      Vec<GeoPoint>,
    source_ids: Vec<Option<i64>>,
    raw_edges:  Vec<RawEdge>,
}

struct RawEdge {
    from:     NodeId,
    to:       NodeId,
    class:    RoadClass,
    length_m: f64,
    geometry: Option<Vec<GeoPoint>>,
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), source_ids: Vec::new(), raw_edges: Vec::new() }
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:      Vec::with_capacity(nodes),
            source_ids: Vec::with_capacity(nodes),
            raw_edges:  Vec::with_capacity(edges),
        }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: GeoPoint) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        self.source_ids.push(None);
        id
    }

    /// Add a node that carries the provider's own identifier.
    pub fn add_node_with_source_id(&mut self, pos: GeoPoint, source_id: i64) -> NodeId {
        let id = self.add_node(pos);
        self.source_ids[id.index()] = Some(source_id);
        id
    }

    /// Add a **directed** edge without detailed geometry.
    pub fn add_edge(
        &mut self,
        from:     NodeId,
        to:       NodeId,
        class:    RoadClass,
        length_m: f64,
    ) -> GraphResult<()> {
        self.push_edge(from, to, class, length_m, None)
    }

    /// Add a directed edge with a detailed shape given latitude first.
    ///
    /// The shape may run in either direction; reconstruction orients it.
    /// Shapes with fewer than two points are dropped.
    pub fn add_edge_with_geometry(
        &mut self,
        from:     NodeId,
        to:       NodeId,
        class:    RoadClass,
        length_m: f64,
        geometry: Vec<GeoPoint>,
    ) -> GraphResult<()> {
        let geometry = (geometry.len() >= 2).then_some(geometry);
        self.push_edge(from, to, class, length_m, geometry)
    }

    /// Like [`add_edge_with_geometry`](Self::add_edge_with_geometry) but takes
    /// the shape as provider-ordered `[lon, lat]` pairs.
    pub fn add_edge_with_lon_lat_geometry(
        &mut self,
        from:     NodeId,
        to:       NodeId,
        class:    RoadClass,
        length_m: f64,
        coords:   &[[f64; 2]],
    ) -> GraphResult<()> {
        let geometry = coords
            .iter()
            .map(|&[lon, lat]| GeoPoint::from_lon_lat(lon, lat))
            .collect();
        self.add_edge_with_geometry(from, to, class, length_m, geometry)
    }

    /// Convenience: add edges in **both directions** for a two-way road.
    pub fn add_road(
        &mut self,
        a:        NodeId,
        b:        NodeId,
        class:    RoadClass,
        length_m: f64,
    ) -> GraphResult<()> {
        self.add_edge(a, b, class, length_m)?;
        self.add_edge(b, a, class, length_m)
    }

    fn push_edge(
        &mut self,
        from:     NodeId,
        to:       NodeId,
        class:    RoadClass,
        length_m: f64,
        geometry: Option<Vec<GeoPoint>>,
    ) -> GraphResult<()> {
        for node in [from, to] {
            if node.index() >= self.nodes.len() {
                return Err(GraphError::NodeNotFound(node));
            }
        }
        if !length_m.is_finite() || length_m < 0.0 {
            return Err(GraphError::InvalidEdge(format!(
                "{from} -> {to} has length {length_m}"
            )));
        }
        self.raw_edges.push(RawEdge { from, to, class, length_m, geometry });
        Ok(())
    }

    /// Position of a node added earlier (used by loaders to derive lengths).
    pub fn node_pos(&self, id: NodeId) -> Option<GeoPoint> {
        self.nodes.get(id.index()).copied()
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadGraph`].
    ///
    /// Time complexity: O(E log E) for the edge sort + O(N log N) for the
    /// R-tree bulk load.
    pub fn build(self) -> RoadGraph {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        // Stable sort keeps insertion order among parallel edges.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        // Parallel-edge keys: ordinal within each (from, to) pair.
        let mut edge_key = Vec::with_capacity(edge_count);
        let mut seen: FxHashMap<NodeId, u32> = FxHashMap::default();
        let mut current_from = NodeId::INVALID;
        for e in &raw {
            if e.from != current_from {
                seen.clear();
                current_from = e.from;
            }
            let slot = seen.entry(e.to).or_insert(0);
            edge_key.push(*slot);
            *slot += 1;
        }

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let mut edge_from     = Vec::with_capacity(edge_count);
        let mut edge_to       = Vec::with_capacity(edge_count);
        let mut edge_class    = Vec::with_capacity(edge_count);
        let mut edge_length_m = Vec::with_capacity(edge_count);
        let mut edge_geometry = Vec::with_capacity(edge_count);
        for e in raw {
            edge_from.push(e.from);
            edge_to.push(e.to);
            edge_class.push(e.class);
            edge_length_m.push(e.length_m);
            edge_geometry.push(e.geometry);
        }

        let source_index: FxHashMap<i64, NodeId> = self
            .source_ids
            .iter()
            .enumerate()
            .filter_map(|(i, sid)| sid.map(|s| (s, NodeId(i as u32))))
            .collect();

        // Projection scale from the mean latitude; clamped so polar data
        // cannot collapse the longitude axis.
        let lon_scale = if node_count == 0 {
            1.0
        } else {
            let mean_lat = self.nodes.iter().map(|p| p.lat).sum::<f64>() / node_count as f64;
            mean_lat.to_radians().cos().max(0.01)
        };

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, pos)| NodeEntry {
                point: [pos.lat, pos.lon * lon_scale],
                id: NodeId(i as u32),
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        log::debug!("built road graph: {node_count} nodes, {edge_count} edges");

        RoadGraph {
            node_pos: self.nodes,
            node_source_id: self.source_ids,
            node_out_start,
            edge_from,
            edge_to,
            edge_key,
            edge_class,
            edge_length_m,
            edge_geometry,
            source_index,
            spatial_idx,
            lon_scale,
        }
    }
}

impl Default for RoadGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
