//! Synthetic east-Bengaluru road network.
//!
//! Seven junctions between Indiranagar and Koramangala.  Two corridors
//! compete: the arterial route (100 Feet Road → Inner Ring Road) and a
//! shorter chain of residential streets through Ejipura.  Off-peak the
//! arterials win on class weight; the rush multiplier scales both, so the
//! ranking only changes under a class-specific profile.

use rr_core::{GeoPoint, NodeId, RoadClass};
use rr_graph::{GraphResult, RoadGraph, RoadGraphBuilder};

/// Named places the demo geocoder knows about.
pub const PLACES: [(&str, GeoPoint); 4] = [
    ("Indiranagar", GeoPoint { lat: 12.9719, lon: 77.6412 }),
    ("Domlur",      GeoPoint { lat: 12.9610, lon: 77.6387 }),
    ("Ejipura",     GeoPoint { lat: 12.9450, lon: 77.6300 }),
    ("Koramangala", GeoPoint { lat: 12.9352, lon: 77.6245 }),
];

/// Build the network.
pub fn build_network() -> GraphResult<RoadGraph> {
    let mut b = RoadGraphBuilder::new();

    let indiranagar  = b.add_node_with_source_id(GeoPoint::new(12.9719, 77.6412), 1);
    let domlur       = b.add_node_with_source_id(GeoPoint::new(12.9610, 77.6387), 2);
    let irr_junction = b.add_node_with_source_id(GeoPoint::new(12.9530, 77.6360), 3);
    let sony_signal  = b.add_node_with_source_id(GeoPoint::new(12.9370, 77.6270), 4);
    let koramangala  = b.add_node_with_source_id(GeoPoint::new(12.9352, 77.6245), 5);
    let ejipura      = b.add_node_with_source_id(GeoPoint::new(12.9450, 77.6300), 6);
    let hal_2nd      = b.add_node_with_source_id(GeoPoint::new(12.9650, 77.6330), 7);

    // 100 Feet Road, with a bend; shape stored in [lon, lat] as map tooling
    // exports it, and shared by both directions.
    let hundred_ft = [
        [77.6412, 12.9719],
        [77.6405, 12.9680],
        [77.6395, 12.9640],
        [77.6387, 12.9610],
    ];
    let len = shape_length(&hundred_ft);
    b.add_edge_with_lon_lat_geometry(indiranagar, domlur, RoadClass::Primary, len, &hundred_ft)?;
    b.add_edge_with_lon_lat_geometry(domlur, indiranagar, RoadClass::Primary, len, &hundred_ft)?;

    road(&mut b, domlur, irr_junction, RoadClass::Trunk)?;
    road(&mut b, irr_junction, sony_signal, RoadClass::Trunk)?;
    road(&mut b, sony_signal, koramangala, RoadClass::Secondary)?;

    // Residential shortcut.
    road(&mut b, indiranagar, hal_2nd, RoadClass::Residential)?;
    road(&mut b, hal_2nd, ejipura, RoadClass::Residential)?;
    road(&mut b, ejipura, koramangala, RoadClass::Residential)?;

    // One-way link from Ejipura onto the ring road.
    let d = distance(&b, ejipura, irr_junction);
    b.add_edge(ejipura, irr_junction, RoadClass::Tertiary, d)?;

    Ok(b.build())
}

fn road(b: &mut RoadGraphBuilder, u: NodeId, v: NodeId, class: RoadClass) -> GraphResult<()> {
    // Streets are ~20 % longer than the straight line.
    let len = distance(b, u, v) * 1.2;
    b.add_road(u, v, class, len)
}

fn distance(b: &RoadGraphBuilder, u: NodeId, v: NodeId) -> f64 {
    match (b.node_pos(u), b.node_pos(v)) {
        (Some(a), Some(c)) => a.distance_m(c),
        _ => 0.0,
    }
}

fn shape_length(lon_lat: &[[f64; 2]]) -> f64 {
    lon_lat
        .windows(2)
        .map(|w| GeoPoint::from_lon_lat(w[0][0], w[0][1]).distance_m(GeoPoint::from_lon_lat(w[1][0], w[1][1])))
        .sum()
}
