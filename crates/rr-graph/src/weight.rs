//! Time-of-day edge weighting.
//!
//! # Cost model
//!
//! ```text
//! cost(edge, hour) = length_m × base_weight(class) × multiplier(hour)
//! ```
//!
//! | Class         | Base weight |
//! |---------------|-------------|
//! | motorway      | 1.0         |
//! | trunk         | 1.2         |
//! | primary       | 1.3         |
//! | secondary     | 1.4         |
//! | tertiary      | 1.5         |
//! | residential   | 1.6         |
//! | unclassified  | 1.8         |
//!
//! `multiplier(hour)` is 1.5 for hours in [`RUSH_HOURS`] and 1.0 otherwise.
//! Classification text is normalized with [`RoadClass::normalize`]
//! (first substring match in table order).
//!
//! # Request-local weights
//!
//! [`RoadGraph::assign_weights`] evaluates the weighting once per edge into
//! an [`EdgeWeights`] table owned by the caller.  The table is complete before
//! the [`CostedGraph`] is handed out, and the shared graph is never written.

use serde::{Deserialize, Serialize};

use rr_core::{EdgeId, Hour, RoadClass};

use crate::{GraphError, GraphResult, RoadGraph};

/// Hours of the day that count as rush hour.
pub const RUSH_HOURS: [u8; 5] = [8, 9, 17, 18, 19];

/// Cost multiplier applied during rush hour.
pub const RUSH_HOUR_MULTIPLIER: f64 = 1.5;

const DEFAULT_BASE_WEIGHTS: [f64; 7] = [1.0, 1.2, 1.3, 1.4, 1.5, 1.6, 1.8];

/// Weight factor for classification text at `hour` under the default profile.
///
/// Total: every input yields a positive, finite value.
pub fn traffic_weight(classification: &str, hour: Hour) -> f64 {
    let class = RoadClass::normalize(classification);
    let multiplier = if RUSH_HOURS.contains(&hour.get()) { RUSH_HOUR_MULTIPLIER } else { 1.0 };
    DEFAULT_BASE_WEIGHTS[class.index()] * multiplier
}

// ── Weighting trait ───────────────────────────────────────────────────────────

/// Pluggable per-edge cost factor.
///
/// Implementations must be `Send + Sync` so a single weighting can serve
/// concurrent requests, and must return a positive, finite factor for every
/// input (Dijkstra relies on non-negative costs).
pub trait Weighting: Send + Sync {
    /// Multiplicative cost factor for a road of `class` at `hour`.
    fn factor(&self, class: RoadClass, hour: Hour) -> f64;

    /// Effective cost of traversing `length_m` metres of `class` at `hour`.
    #[inline]
    fn edge_cost(&self, class: RoadClass, length_m: f64, hour: Hour) -> f64 {
        length_m * self.factor(class, hour)
    }
}

// ── TrafficProfile ────────────────────────────────────────────────────────────

/// Base weight per road class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseWeights {
    pub motorway:     f64,
    pub trunk:        f64,
    pub primary:      f64,
    pub secondary:    f64,
    pub tertiary:     f64,
    pub residential:  f64,
    pub unclassified: f64,
}

impl BaseWeights {
    pub fn get(&self, class: RoadClass) -> f64 {
        match class {
            RoadClass::Motorway     => self.motorway,
            RoadClass::Trunk        => self.trunk,
            RoadClass::Primary      => self.primary,
            RoadClass::Secondary    => self.secondary,
            RoadClass::Tertiary     => self.tertiary,
            RoadClass::Residential  => self.residential,
            RoadClass::Unclassified => self.unclassified,
        }
    }
}

impl Default for BaseWeights {
    fn default() -> Self {
        let [motorway, trunk, primary, secondary, tertiary, residential, unclassified] =
            DEFAULT_BASE_WEIGHTS;
        Self { motorway, trunk, primary, secondary, tertiary, residential, unclassified }
    }
}

/// Class-and-hour weighting: base weight per class, scaled during rush hour.
///
/// `TrafficProfile::default()` is the fixed table in the module docs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficProfile {
    pub base_weights:    BaseWeights,
    pub rush_hours:      Vec<Hour>,
    pub rush_multiplier: f64,
}

impl Default for TrafficProfile {
    fn default() -> Self {
        Self {
            base_weights:    BaseWeights::default(),
            rush_hours:      RUSH_HOURS.iter().filter_map(|&h| Hour::new(h).ok()).collect(),
            rush_multiplier: RUSH_HOUR_MULTIPLIER,
        }
    }
}

impl TrafficProfile {
    #[inline]
    pub fn is_rush_hour(&self, hour: Hour) -> bool {
        self.rush_hours.contains(&hour)
    }

    pub fn time_multiplier(&self, hour: Hour) -> f64 {
        if self.is_rush_hour(hour) { self.rush_multiplier } else { 1.0 }
    }

    /// Weight factor for free-form classification text.
    pub fn weight(&self, classification: &str, hour: Hour) -> f64 {
        self.factor(RoadClass::normalize(classification), hour)
    }

    /// Reject profiles that would produce non-positive or non-finite costs.
    pub fn validate(&self) -> GraphResult<()> {
        for class in RoadClass::ALL {
            let w = self.base_weights.get(class);
            if !w.is_finite() || w <= 0.0 {
                return Err(GraphError::InvalidProfile(format!(
                    "base weight for {class} must be positive, got {w}"
                )));
            }
        }
        if !self.rush_multiplier.is_finite() || self.rush_multiplier <= 0.0 {
            return Err(GraphError::InvalidProfile(format!(
                "rush multiplier must be positive, got {}",
                self.rush_multiplier
            )));
        }
        Ok(())
    }
}

impl Weighting for TrafficProfile {
    #[inline]
    fn factor(&self, class: RoadClass, hour: Hour) -> f64 {
        self.base_weights.get(class) * self.time_multiplier(hour)
    }
}

// ── EdgeWeights / CostedGraph ─────────────────────────────────────────────────

/// Request-local cost for every edge of one graph, indexed by `EdgeId`.
#[derive(Clone, Debug)]
pub struct EdgeWeights {
    costs: Vec<f64>,
    hour:  Hour,
}

impl EdgeWeights {
    #[inline]
    pub fn cost(&self, edge: EdgeId) -> f64 {
        self.costs[edge.index()]
    }

    pub fn get(&self, edge: EdgeId) -> Option<f64> {
        self.costs.get(edge.index()).copied()
    }

    /// The hour these costs were computed for.
    pub fn hour(&self) -> Hour {
        self.hour
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

/// A shared [`RoadGraph`] paired with one request's [`EdgeWeights`].
#[derive(Clone, Debug)]
pub struct CostedGraph<'g> {
    graph:   &'g RoadGraph,
    weights: EdgeWeights,
}

impl<'g> CostedGraph<'g> {
    pub fn graph(&self) -> &'g RoadGraph {
        self.graph
    }

    pub fn weights(&self) -> &EdgeWeights {
        &self.weights
    }

    pub fn hour(&self) -> Hour {
        self.weights.hour
    }

    #[inline]
    pub fn cost(&self, edge: EdgeId) -> f64 {
        self.weights.cost(edge)
    }

    /// Give up the borrow of the graph and keep only the weight table.
    pub fn into_weights(self) -> EdgeWeights {
        self.weights
    }
}

impl RoadGraph {
    /// Cost every edge for `hour` under `weighting`.  O(|E|).
    ///
    /// The returned view owns its weights; the graph is untouched, so any
    /// number of requests may cost the same graph concurrently.
    pub fn assign_weights<W: Weighting + ?Sized>(&self, weighting: &W, hour: Hour) -> CostedGraph<'_> {
        let costs = self.compute_costs(weighting, hour);
        log::debug!("assigned {} edge weights for {hour}", costs.len());
        CostedGraph { graph: self, weights: EdgeWeights { costs, hour } }
    }

    #[cfg(not(feature = "parallel"))]
    fn compute_costs<W: Weighting + ?Sized>(&self, weighting: &W, hour: Hour) -> Vec<f64> {
        self.edge_class
            .iter()
            .zip(&self.edge_length_m)
            .map(|(&class, &len)| weighting.edge_cost(class, len, hour))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn compute_costs<W: Weighting + ?Sized>(&self, weighting: &W, hour: Hour) -> Vec<f64> {
        use rayon::prelude::*;

        self.edge_class
            .par_iter()
            .zip(self.edge_length_m.par_iter())
            .map(|(&class, &len)| weighting.edge_cost(class, len, hour))
            .collect()
    }
}
