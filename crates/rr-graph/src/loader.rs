//! CSV graph loader.
//!
//! Reads the node and edge tables that common OSM tooling exports for a
//! drive network.
//!
//! # `nodes.csv`
//!
//! ```csv
//! osmid,y,x
//! 101,12.9719,77.6412
//! 102,12.9352,77.6245
//! ```
//!
//! `y` is latitude and `x` longitude.
//!
//! # `edges.csv`
//!
//! ```csv
//! u,v,key,highway,length,geometry
//! 101,102,0,primary,4312.5,"LINESTRING (77.6412 12.9719, 77.6300 12.9550, 77.6245 12.9352)"
//! 102,101,0,primary,4312.5,
//! ```
//!
//! | Column     | Required | Meaning                                                 |
//! |------------|----------|---------------------------------------------------------|
//! | `u`, `v`   | yes      | source / target `osmid`                                 |
//! | `key`      | no       | parallel-edge ordinal; rows are inserted in key order   |
//! | `highway`  | no       | classification text, normalized via `RoadClass`         |
//! | `length`   | no       | metres; derived from geometry or endpoints when empty   |
//! | `geometry` | no       | WKT `LINESTRING` in **lon lat** order                   |
//!
//! Each row is one directed edge.  A row naming an unknown `osmid` is a
//! parse error.

use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use wkt::TryFromWkt;

use rr_core::{GeoPoint, NodeId, RoadClass};

use crate::network::{RoadGraph, RoadGraphBuilder};
use crate::{GraphError, GraphResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    osmid: i64,
    y:     f64,
    x:     f64,
}

#[derive(Deserialize)]
struct EdgeRecord {
    u:        i64,
    v:        i64,
    #[serde(default)]
    key:      Option<u32>,
    #[serde(default)]
    highway:  Option<String>,
    #[serde(default)]
    length:   Option<f64>,
    #[serde(default)]
    geometry: Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load `nodes.csv` and `edges.csv` from `dir`.
pub fn load_csv_dir(dir: &Path) -> GraphResult<RoadGraph> {
    let nodes = std::fs::File::open(dir.join("nodes.csv"))?;
    let edges = std::fs::File::open(dir.join("edges.csv"))?;
    load_csv_readers(nodes, edges)
}

/// Like [`load_csv_dir`] but accepts any `Read` sources.
pub fn load_csv_readers<N: Read, E: Read>(nodes: N, edges: E) -> GraphResult<RoadGraph> {
    let node_rows: Vec<NodeRecord> = read_rows(nodes)?;
    let mut edge_rows: Vec<EdgeRecord> = read_rows(edges)?;

    let mut builder = RoadGraphBuilder::with_capacity(node_rows.len(), edge_rows.len());
    let mut by_osmid: FxHashMap<i64, NodeId> = FxHashMap::default();
    by_osmid.reserve(node_rows.len());

    for row in node_rows {
        let pos = GeoPoint::checked(row.y, row.x)
            .map_err(|e| GraphError::Parse(format!("node {}: {e}", row.osmid)))?;
        let id = builder.add_node_with_source_id(pos, row.osmid);
        by_osmid.insert(row.osmid, id);
    }

    // Stable: parallel edges without a key keep file order.
    edge_rows.sort_by_key(|r| r.key.unwrap_or(0));

    for row in edge_rows {
        let lookup = |osmid: i64| {
            by_osmid.get(&osmid).copied().ok_or_else(|| {
                GraphError::Parse(format!("edge {} -> {} references unknown node {osmid}", row.u, row.v))
            })
        };
        let from = lookup(row.u)?;
        let to = lookup(row.v)?;
        let class = RoadClass::normalize_opt(row.highway.as_deref());

        let shape = match row.geometry.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => Some(parse_linestring(text)?),
            _ => None,
        };

        let length_m = match (row.length, &shape) {
            (Some(len), _) => len,
            (None, Some(points)) => points.windows(2).map(|w| w[0].distance_m(w[1])).sum(),
            (None, None) => endpoint_distance(&builder, from, to),
        };

        match shape {
            Some(points) => builder.add_edge_with_geometry(from, to, class, length_m, points)?,
            None => builder.add_edge(from, to, class, length_m)?,
        }
    }

    Ok(builder.build())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn read_rows<R: Read, T: for<'de> Deserialize<'de>>(reader: R) -> GraphResult<Vec<T>> {
    csv::Reader::from_reader(reader)
        .deserialize::<T>()
        .map(|row| row.map_err(|e| GraphError::Parse(e.to_string())))
        .collect()
}

/// Parse a WKT `LINESTRING` (x = lon, y = lat) into latitude-first points.
fn parse_linestring(text: &str) -> GraphResult<Vec<GeoPoint>> {
    let line = geo_types::LineString::<f64>::try_from_wkt_str(text)
        .map_err(|e| GraphError::Parse(format!("invalid geometry {text:?}: {e}")))?;
    Ok(line.0.into_iter().map(|c| GeoPoint::from_lon_lat(c.x, c.y)).collect())
}

fn endpoint_distance(builder: &RoadGraphBuilder, from: NodeId, to: NodeId) -> f64 {
    match (builder.node_pos(from), builder.node_pos(to)) {
        (Some(a), Some(b)) => a.distance_m(b),
        _ => 0.0,
    }
}
