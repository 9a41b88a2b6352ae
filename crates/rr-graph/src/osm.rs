//! OSM PBF loading (feature `osm`).
//!
//! ```ignore
//! let graph = rr_graph::osm::load_from_pbf(Path::new("bengaluru.osm.pbf"))?;
//! ```
//!
//! Only ways whose `highway` tag is open to cars are kept.  The graph is not
//! simplified: each consecutive pair of way nodes becomes its own edge, with
//! a haversine length and no stored shape.  The raw `highway` text goes
//! through [`RoadClass::normalize`], so `motorway_link` costs as `Motorway`
//! and `living_street` as `Unclassified`.
//!
//! Direction follows the `oneway` tag: `yes`/`true`/`1` keeps way order,
//! `-1`/`reverse` flips it, anything else adds both directions.  Motorways,
//! motorway links and roundabouts are one-way unless tagged `oneway=no`.
//! OSM node ids are kept as source ids ([`RoadGraph::node_by_source_id`]).

use std::path::Path;

use osmpbf::{Element, ElementReader};
use rustc_hash::{FxHashMap, FxHashSet};

use rr_core::{GeoPoint, NodeId, RoadClass};

use crate::network::{RoadGraph, RoadGraphBuilder};
use crate::{GraphError, GraphResult};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Direction {
    Both,
    Forward,
    Backward,
}

struct DriveWay {
    nodes:     Vec<i64>,
    class:     RoadClass,
    direction: Direction,
}

/// Load the drivable road graph contained in a PBF extract.
///
/// # Errors
///
/// [`GraphError::Osm`] if the file cannot be opened or decoded.
pub fn load_from_pbf(path: &Path) -> GraphResult<RoadGraph> {
    let osm_err = |e: osmpbf::Error| GraphError::Osm(format!("{}: {e}", path.display()));

    // Single pass: positions of every node, plus the drivable ways.
    let mut positions: FxHashMap<i64, GeoPoint> = FxHashMap::default();
    let mut ways: Vec<DriveWay> = Vec::new();

    ElementReader::from_path(path)
        .map_err(osm_err)?
        .for_each(|element| match element {
            Element::Node(n) => {
                positions.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::DenseNode(n) => {
                positions.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::Way(w) => {
                let tags: Vec<(&str, &str)> = w.tags().collect();
                if let Some(way) = drive_way(&tags, w.refs().collect()) {
                    ways.push(way);
                }
            }
            _ => {}
        })
        .map_err(osm_err)?;

    // Keep only nodes some drivable way touches, numbered in OSM id order so
    // NodeIds do not depend on hash iteration.
    let mut used: Vec<i64> = ways
        .iter()
        .flat_map(|w| w.nodes.iter().copied())
        .collect::<FxHashSet<i64>>()
        .into_iter()
        .collect();
    used.sort_unstable();

    let mut builder = RoadGraphBuilder::with_capacity(used.len(), used.len() * 2);
    let mut graph_id: FxHashMap<i64, NodeId> = FxHashMap::default();
    for osm_id in used {
        if let Some(&pos) = positions.get(&osm_id) {
            graph_id.insert(osm_id, builder.add_node_with_source_id(pos, osm_id));
        }
    }
    drop(positions);

    let mut missing = 0usize;
    for way in &ways {
        for pair in way.nodes.windows(2) {
            let (Some(&a), Some(&b)) = (graph_id.get(&pair[0]), graph_id.get(&pair[1])) else {
                missing += 1;
                continue;
            };
            let length_m = match (builder.node_pos(a), builder.node_pos(b)) {
                (Some(pa), Some(pb)) => pa.distance_m(pb),
                _ => continue,
            };
            match way.direction {
                Direction::Forward  => builder.add_edge(a, b, way.class, length_m)?,
                Direction::Backward => builder.add_edge(b, a, way.class, length_m)?,
                Direction::Both     => builder.add_road(a, b, way.class, length_m)?,
            }
        }
    }
    if missing > 0 {
        log::warn!("{}: {missing} way segments reference nodes outside the extract", path.display());
    }

    let graph = builder.build();
    log::info!(
        "loaded {}: {} drivable ways, {} nodes, {} edges",
        path.display(),
        ways.len(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

fn tag<'a>(tags: &[(&'a str, &'a str)], key: &str) -> Option<&'a str> {
    tags.iter().find(|(k, _)| *k == key).map(|&(_, v)| v)
}

fn drive_way(tags: &[(&str, &str)], nodes: Vec<i64>) -> Option<DriveWay> {
    let highway = tag(tags, "highway")?;
    if !is_drivable(highway) || nodes.len() < 2 {
        return None;
    }
    let implied_oneway =
        matches!(highway, "motorway" | "motorway_link") || tag(tags, "junction") == Some("roundabout");
    let direction = match tag(tags, "oneway") {
        Some("yes" | "true" | "1") => Direction::Forward,
        Some("-1" | "reverse") => Direction::Backward,
        Some("no" | "false" | "0") => Direction::Both,
        _ if implied_oneway => Direction::Forward,
        _ => Direction::Both,
    };
    Some(DriveWay { nodes, class: RoadClass::normalize(highway), direction })
}

fn is_drivable(highway: &str) -> bool {
    !matches!(
        highway,
        "footway" | "path" | "cycleway" | "pedestrian" | "steps" | "track" | "bridleway"
            | "corridor" | "proposed" | "construction" | "platform" | "elevator" | "bus_guideway"
            | "raceway" | "abandoned"
    )
}
