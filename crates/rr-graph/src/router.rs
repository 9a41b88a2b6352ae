//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! Callers route through the [`Router`] trait so the search can be swapped
//! (A*, contraction hierarchies) without touching the engine.  The default
//! [`DijkstraRouter`] is a binary-heap Dijkstra, O((V + E) log V).
//!
//! # Determinism
//!
//! The heap orders by `(cost, NodeId)` and a node's predecessor only changes
//! on a **strict** improvement, so among equal-cost paths the first one found
//! is kept.  For a fixed graph and weight table the result never varies.
//! Among parallel edges the cheapest wins, and on a cost tie the lowest key.
//!
//! # Cancellation
//!
//! [`shortest_path_cancellable`] checks an `AtomicBool` each time a node is
//! settled and stops with [`GraphError::Cancelled`] once it is set.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use rr_core::{EdgeId, NodeId};

use crate::weight::CostedGraph;
use crate::{GraphError, GraphResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Nodes visited in order, start first.  Never contains repeats.
    pub nodes: Vec<NodeId>,
    /// `edges[i]` is the edge the search used from `nodes[i]` to `nodes[i+1]`.
    pub edges: Vec<EdgeId>,
    /// Sum of edge costs under the request's weight table.
    pub total_cost: f64,
}

impl Route {
    /// Single-node route for `start == end`.
    pub fn trivial(node: NodeId) -> Self {
        Self { nodes: vec![node], edges: Vec::new(), total_cost: 0.0 }
    }

    /// A node-only route, e.g. received from an external planner.  Geometry
    /// reconstruction picks connecting edges itself.
    pub fn from_nodes(nodes: Vec<NodeId>) -> Self {
        Self { nodes, edges: Vec::new(), total_cost: 0.0 }
    }

    /// `true` if the start and end are the same node.
    pub fn is_trivial(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn start(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn end(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// The edge recorded for the hop `nodes[i] → nodes[i+1]`, if any.
    pub fn edge_at(&self, i: usize) -> Option<EdgeId> {
        self.edges.get(i).copied()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable shortest-path engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`; routers hold no per-request state.
pub trait Router: Send + Sync {
    /// Compute the minimum-cost route from `from` to `to`.
    ///
    /// Returns `Ok(None)` when `to` is unreachable, and errors only for
    /// unknown endpoints or cancellation.
    fn route(
        &self,
        costed: &CostedGraph<'_>,
        from:   NodeId,
        to:     NodeId,
        cancel: Option<&AtomicBool>,
    ) -> GraphResult<Option<Route>>;
}

/// Standard Dijkstra's algorithm over the CSR road graph.
#[derive(Copy, Clone, Debug, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(
        &self,
        costed: &CostedGraph<'_>,
        from:   NodeId,
        to:     NodeId,
        cancel: Option<&AtomicBool>,
    ) -> GraphResult<Option<Route>> {
        dijkstra(costed, from, to, cancel)
    }
}

/// Minimum-cost route from `from` to `to` on `costed`.
pub fn shortest_path(costed: &CostedGraph<'_>, from: NodeId, to: NodeId) -> GraphResult<Option<Route>> {
    dijkstra(costed, from, to, None)
}

/// [`shortest_path`] that stops with [`GraphError::Cancelled`] once `cancel`
/// is set.
pub fn shortest_path_cancellable(
    costed: &CostedGraph<'_>,
    from:   NodeId,
    to:     NodeId,
    cancel: &AtomicBool,
) -> GraphResult<Option<Route>> {
    dijkstra(costed, from, to, Some(cancel))
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

#[derive(Copy, Clone)]
struct State {
    cost: f64,
    node: NodeId,
}

// Min-heap by cost, then by NodeId (reversed for std's max-heap).
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

fn dijkstra(
    costed: &CostedGraph<'_>,
    from:   NodeId,
    to:     NodeId,
    cancel: Option<&AtomicBool>,
) -> GraphResult<Option<Route>> {
    let graph = costed.graph();
    for node in [from, to] {
        if !graph.contains_node(node) {
            return Err(GraphError::NodeNotFound(node));
        }
    }

    if from == to {
        return Ok(Some(Route::trivial(from)));
    }

    let n = graph.node_count();
    let mut dist      = vec![f64::INFINITY; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];
    let mut settled   = vec![false; n];

    dist[from.index()] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(State { cost: 0.0, node: from });
    let mut settled_count = 0usize;

    while let Some(State { cost, node }) = heap.pop() {
        if settled[node.index()] {
            continue;
        }
        settled[node.index()] = true;
        settled_count += 1;

        if cancel.is_some_and(|flag| flag.load(AtomicOrdering::Relaxed)) {
            log::debug!("search {from} -> {to} cancelled after {settled_count} settled nodes");
            return Err(GraphError::Cancelled);
        }

        if node == to {
            log::debug!("search {from} -> {to} settled {settled_count} nodes, cost {cost:.1}");
            return Ok(Some(trace_back(costed, &prev_edge, from, to, cost)));
        }

        for edge in graph.out_edges(node) {
            let neighbor = graph.edge_to[edge.index()];
            if settled[neighbor.index()] {
                continue;
            }
            let new_cost = cost + costed.cost(edge);

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(State { cost: new_cost, node: neighbor });
            }
        }
    }

    log::debug!("no path {from} -> {to}; exhausted {settled_count} reachable nodes");
    Ok(None)
}

fn trace_back(
    costed:    &CostedGraph<'_>,
    prev_edge: &[EdgeId],
    from:      NodeId,
    to:        NodeId,
    total:     f64,
) -> Route {
    let graph = costed.graph();
    let mut edges = Vec::new();
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        debug_assert!(e.is_valid(), "settled node {cur} has no predecessor");
        edges.push(e);
        cur = graph.edge_from[e.index()];
    }
    edges.reverse();

    let mut nodes = Vec::with_capacity(edges.len() + 1);
    nodes.push(from);
    nodes.extend(edges.iter().map(|e| graph.edge_to[e.index()]));

    Route { nodes, edges, total_cost: total }
}
