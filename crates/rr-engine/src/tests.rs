//! Unit tests for rr-engine.

#[cfg(test)]
mod helpers {
    use rr_core::{GeoPoint, NodeId, RoadClass};
    use rr_graph::{RoadGraph, RoadGraphBuilder};

    use crate::StaticGeocoder;

    pub const INDIRANAGAR: GeoPoint = GeoPoint { lat: 12.9719, lon: 77.6412 };
    pub const DOMLUR:      GeoPoint = GeoPoint { lat: 12.9610, lon: 77.6387 };
    pub const KORAMANGALA: GeoPoint = GeoPoint { lat: 12.9352, lon: 77.6245 };

    /// One-way triangle with the lengths of the reference scenario:
    /// Indiranagar→Domlur residential 10, Domlur→Koramangala motorway 10,
    /// Indiranagar→Koramangala unclassified 15.
    pub fn city() -> (RoadGraph, [NodeId; 3]) {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(INDIRANAGAR);
        let d = b.add_node(DOMLUR);
        let k = b.add_node(KORAMANGALA);
        b.add_edge(a, d, RoadClass::Residential, 10.0).unwrap();
        b.add_edge(d, k, RoadClass::Motorway, 10.0).unwrap();
        b.add_edge(a, k, RoadClass::Unclassified, 15.0).unwrap();
        (b.build(), [a, d, k])
    }

    pub fn gazetteer() -> StaticGeocoder {
        StaticGeocoder::new()
            .with_place("Indiranagar", INDIRANAGAR)
            .with_place("Domlur", DOMLUR)
            .with_place("Koramangala", KORAMANGALA)
    }

    pub fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }
}

// ── compute_route ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod compute {
    use rr_core::{GeoPoint, Hour};
    use rr_graph::{RoadGraph, TrafficProfile};

    use crate::{compute_route, render_coordinates, RouteError};
    use super::helpers::{approx, city, INDIRANAGAR, KORAMANGALA};

    #[test]
    fn off_peak_and_rush_costs() {
        let (g, [a, d, k]) = city();
        let profile = TrafficProfile::default();

        let route = compute_route(&g, INDIRANAGAR, KORAMANGALA, Hour::NOON, &profile).unwrap();
        assert_eq!(route.nodes, vec![a, d, k]);
        assert!(approx(route.total_cost, 26.0));

        let route = compute_route(&g, INDIRANAGAR, KORAMANGALA, Hour::new(8).unwrap(), &profile).unwrap();
        assert_eq!(route.nodes, vec![a, d, k]);
        assert!(approx(route.total_cost, 39.0));
    }

    #[test]
    fn snaps_nearby_coordinates() {
        let (g, [a, _, k]) = city();
        let near_a = GeoPoint::new(12.9721, 77.6415);
        let near_k = GeoPoint::new(12.9350, 77.6240);
        let route = compute_route(&g, near_a, near_k, Hour::NOON, &TrafficProfile::default()).unwrap();
        assert_eq!(route.start(), Some(a));
        assert_eq!(route.end(), Some(k));
    }

    #[test]
    fn unreachable_is_no_path() {
        let (g, [a, _, k]) = city();
        let err = compute_route(&g, KORAMANGALA, INDIRANAGAR, Hour::NOON, &TrafficProfile::default())
            .unwrap_err();
        assert!(err.is_no_path());
        assert!(matches!(err, RouteError::NoPathFound { from, to } if from == k && to == a));
    }

    #[test]
    fn empty_graph() {
        let err = compute_route(
            &RoadGraph::empty(),
            INDIRANAGAR,
            KORAMANGALA,
            Hour::NOON,
            &TrafficProfile::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RouteError::EmptyGraph));
        assert!(!err.is_no_path());
    }

    #[test]
    fn invalid_coordinates_are_errors() {
        let (g, _) = city();
        let profile = TrafficProfile::default();
        for bad in [
            GeoPoint::new(f64::NAN, f64::NAN),
            GeoPoint::new(12.97, f64::INFINITY),
            GeoPoint::new(-95.0, 77.6),
        ] {
            let err = compute_route(&g, bad, KORAMANGALA, Hour::NOON, &profile).unwrap_err();
            assert!(matches!(err, RouteError::InvalidCoordinate { .. }));
            assert!(!err.is_no_path());
            let err = compute_route(&g, INDIRANAGAR, bad, Hour::NOON, &profile).unwrap_err();
            assert!(matches!(err, RouteError::InvalidCoordinate { .. }));
        }
    }

    #[test]
    fn same_point_is_trivial() {
        let (g, [a, ..]) = city();
        let route = compute_route(&g, INDIRANAGAR, INDIRANAGAR, Hour::NOON, &TrafficProfile::default())
            .unwrap();
        assert_eq!(route.nodes, vec![a]);
        assert_eq!(route.total_cost, 0.0);
        assert!(render_coordinates(&g, &route).is_empty());
    }

    #[test]
    fn rendered_coordinates_are_lat_lon() {
        let (g, _) = city();
        let route = compute_route(&g, INDIRANAGAR, KORAMANGALA, Hour::NOON, &TrafficProfile::default())
            .unwrap();
        let coords = render_coordinates(&g, &route);
        assert_eq!(coords.first(), Some(&[12.9719, 77.6412]));
        assert_eq!(coords.last(), Some(&[12.9352, 77.6245]));
    }
}

// ── RoutingEngine ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod engine {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use serde_json::json;

    use rr_core::{GeoPoint, Hour};
    use rr_graph::RoadGraph;

    use crate::{EngineConfig, GeocodeError, ProviderError, RouteError, RoutingEngine};
    use super::helpers::{approx, city, gazetteer, INDIRANAGAR, KORAMANGALA};

    type CityProvider = Box<dyn Fn(&str) -> Result<RoadGraph, ProviderError> + Send + Sync>;

    fn counting_provider(loads: Arc<AtomicUsize>) -> CityProvider {
        Box::new(move |place: &str| {
            loads.fetch_add(1, Ordering::SeqCst);
            if place == "Bengaluru, India" {
                Ok(city().0)
            } else {
                Err(ProviderError::UnknownPlace(place.to_owned()))
            }
        })
    }

    fn engine() -> (RoutingEngine<CityProvider, crate::StaticGeocoder>, Arc<AtomicUsize>) {
        let loads = Arc::new(AtomicUsize::new(0));
        let engine =
            RoutingEngine::new(EngineConfig::default(), counting_provider(Arc::clone(&loads)), gazetteer())
                .unwrap();
        (engine, loads)
    }

    #[test]
    fn route_places_end_to_end() {
        let (engine, loads) = engine();
        let plan = engine
            .route_places("Bengaluru, India", "Indiranagar", "Koramangala, Bengaluru", Some(Hour::NOON))
            .unwrap();

        assert_eq!(plan.route.nodes.len(), 3);
        assert!(approx(plan.route.total_cost, 26.0));
        assert_eq!(plan.start, INDIRANAGAR);
        assert_eq!(plan.end, KORAMANGALA);
        assert_eq!(plan.hour, Hour::NOON);
        assert_eq!(plan.polyline.points.first(), Some(&INDIRANAGAR));
        assert_eq!(plan.polyline.points.last(), Some(&KORAMANGALA));
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        // Second request hits the cache.
        engine
            .route_places("Bengaluru, India", "Indiranagar", "Koramangala", Some(Hour::new(18).unwrap()))
            .unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn default_hour_comes_from_config() {
        let (engine, _) = engine();
        let plan = engine
            .route_places("Bengaluru, India", "Indiranagar", "Koramangala", None)
            .unwrap();
        // Both hours are read from the same clock; allow for a rollover.
        let now = engine.current_hour().get();
        assert!(plan.hour.get() == now || (plan.hour.get() + 1) % 24 == now);
    }

    #[test]
    fn geocode_failure_propagates() {
        let (engine, _) = engine();
        let err = engine
            .route_places("Bengaluru, India", "Atlantis", "Koramangala", Some(Hour::NOON))
            .unwrap_err();
        assert!(matches!(
            err,
            RouteError::Geocode(GeocodeError::AmbiguousOrNotFound(ref q)) if q == "Atlantis"
        ));
    }

    #[test]
    fn provider_failure_propagates() {
        let (engine, _) = engine();
        let err = engine
            .route_places("Mysuru, India", "Indiranagar", "Koramangala", Some(Hour::NOON))
            .unwrap_err();
        assert!(matches!(err, RouteError::Provider(ProviderError::UnknownPlace(_))));
    }

    #[test]
    fn no_path_is_distinguishable() {
        let (engine, _) = engine();
        let err = engine
            .route_places("Bengaluru, India", "Koramangala", "Indiranagar", Some(Hour::NOON))
            .unwrap_err();
        assert!(err.is_no_path());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.profile.rush_multiplier = -1.0;
        let loads = Arc::new(AtomicUsize::new(0));
        let result = RoutingEngine::new(config, counting_provider(loads), gazetteer());
        assert!(matches!(result, Err(RouteError::Config(_))));
    }

    #[test]
    fn cancelled_plan() {
        let (engine, _) = engine();
        let graph = engine.graph("Bengaluru, India").unwrap();
        let flag = AtomicBool::new(true);
        let err = engine
            .plan(&graph, INDIRANAGAR, KORAMANGALA, Some(Hour::NOON), Some(&flag))
            .unwrap_err();
        assert!(matches!(err, RouteError::Cancelled));
    }

    #[test]
    fn route_many_keeps_order_and_isolates_failures() {
        let (engine, _) = engine();
        let graph = engine.graph("Bengaluru, India").unwrap();
        let pairs = [
            (INDIRANAGAR, KORAMANGALA),
            (KORAMANGALA, INDIRANAGAR),
            (INDIRANAGAR, INDIRANAGAR),
        ];
        let results = engine.route_many(&graph, &pairs, Hour::new(8).unwrap());
        assert_eq!(results.len(), 3);
        assert!(approx(results[0].as_ref().unwrap().total_cost, 39.0));
        assert!(results[1].as_ref().unwrap_err().is_no_path());
        assert!(results[2].as_ref().unwrap().is_trivial());
    }

    #[test]
    fn non_finite_coordinates_do_not_panic() {
        let (engine, _) = engine();
        let graph = engine.graph("Bengaluru, India").unwrap();
        let nan = GeoPoint::new(f64::NAN, 77.6);
        let err = engine.plan(&graph, nan, KORAMANGALA, Some(Hour::NOON), None).unwrap_err();
        assert!(matches!(err, RouteError::InvalidCoordinate { .. }));

        let results = engine.route_many(&graph, &[(INDIRANAGAR, nan), (INDIRANAGAR, KORAMANGALA)], Hour::NOON);
        assert!(matches!(results[0], Err(RouteError::InvalidCoordinate { .. })));
        assert!(results[1].is_ok());
    }

    #[test]
    fn markers_sit_on_snapped_nodes() {
        let (engine, _) = engine();
        let graph = engine.graph("Bengaluru, India").unwrap();
        let near_a = GeoPoint::new(12.9721, 77.6415);
        let near_k = GeoPoint::new(12.9350, 77.6240);
        let plan = engine.plan(&graph, near_a, near_k, Some(Hour::NOON), None).unwrap();
        assert_eq!(plan.start, near_a);
        assert_eq!(plan.start_pos, INDIRANAGAR);
        assert_eq!(plan.end_pos, KORAMANGALA);

        let doc = plan.to_geojson();
        let start = &doc["features"][1];
        assert_eq!(start["geometry"]["coordinates"], json!([77.6412, 12.9719]));
        assert_eq!(start["properties"]["requested"], json!([77.6415, 12.9721]));
        assert_eq!(doc["features"][2]["geometry"]["coordinates"], json!([77.6245, 12.9352]));
    }

    #[test]
    fn geocoding_is_cached() {
        let (engine, _) = engine();
        assert_eq!(engine.geocoder().ttl(), Some(std::time::Duration::from_secs(3600)));
        for _ in 0..3 {
            engine
                .route_places("Bengaluru, India", "Indiranagar", "Koramangala", Some(Hour::NOON))
                .unwrap();
        }
        assert_eq!(engine.geocoder().len(), 2);
        assert_eq!(engine.geocoder().inner().len(), 3);
    }

    #[test]
    fn geojson_uses_lon_lat() {
        let (engine, _) = engine();
        let plan = engine
            .route_places("Bengaluru, India", "Indiranagar", "Koramangala", Some(Hour::NOON))
            .unwrap();
        let doc = plan.to_geojson();
        assert_eq!(doc["type"], "FeatureCollection");
        let line = &doc["features"][0];
        assert_eq!(line["geometry"]["type"], "LineString");
        assert_eq!(line["geometry"]["coordinates"][0], json!([77.6412, 12.9719]));
        assert_eq!(line["properties"]["hour"], 12);
        assert_eq!(doc["features"][1]["properties"]["marker"], "start");
        assert_eq!(doc["features"][2]["geometry"]["coordinates"], json!([77.6245, 12.9352]));
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        let (engine, loads) = engine();
        let engine = Arc::new(engine);
        std::thread::scope(|s| {
            for _ in 0..4 {
                let engine = Arc::clone(&engine);
                s.spawn(move || {
                    let plan = engine
                        .route_places("Bengaluru, India", "Indiranagar", "Koramangala", Some(Hour::NOON))
                        .unwrap();
                    assert_eq!(plan.route.nodes.len(), 3);
                });
            }
        });
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }
}

// ── Providers ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod provider {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use rr_graph::RoadGraph;

    use crate::provider::slug;
    use crate::{CachedProvider, CsvGraphProvider, GraphProvider, ProviderError};

    /// Slow provider that counts loads and fails the first `fail_first` calls.
    struct Counting {
        loads:      AtomicUsize,
        fail_first: usize,
    }

    impl Counting {
        fn new(fail_first: usize) -> Self {
            Self { loads: AtomicUsize::new(0), fail_first }
        }

        fn loads(&self) -> usize {
            self.loads.load(Ordering::SeqCst)
        }
    }

    impl GraphProvider for Counting {
        fn load(&self, place: &str) -> Result<RoadGraph, ProviderError> {
            let n = self.loads.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(30));
            if n < self.fail_first {
                return Err(ProviderError::UnknownPlace(place.to_owned()));
            }
            Ok(super::helpers::city().0)
        }
    }

    #[test]
    fn concurrent_first_requests_load_once() {
        let cache = CachedProvider::new(Counting::new(0));
        let graphs: Vec<Arc<RoadGraph>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8).map(|_| s.spawn(|| cache.get("Bengaluru, India").unwrap())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(cache.inner().loads(), 1);
        for g in &graphs[1..] {
            assert!(Arc::ptr_eq(g, &graphs[0]));
        }
        assert!(cache.is_cached("Bengaluru, India"));
    }

    #[test]
    fn places_are_cached_separately() {
        let cache = CachedProvider::new(Counting::new(0));
        cache.get("a").unwrap();
        cache.get("b").unwrap();
        cache.get("a").unwrap();
        assert_eq!(cache.inner().loads(), 2);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = CachedProvider::new(Counting::new(1));
        assert!(cache.get("x").is_err());
        assert!(!cache.is_cached("x"));
        assert!(cache.get("x").is_ok());
        assert!(cache.get("x").is_ok());
        assert_eq!(cache.inner().loads(), 2);
    }

    #[test]
    fn failed_places_leave_no_slot() {
        let cache = CachedProvider::new(|place: &str| -> Result<RoadGraph, ProviderError> {
            Err(ProviderError::UnknownPlace(place.to_owned()))
        });
        for i in 0..1000 {
            assert!(cache.get(&format!("nowhere {i}")).is_err());
        }
        assert!(cache.is_empty());

        let cache = CachedProvider::new(Counting::new(0));
        cache.get("x").unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn concurrent_failures_leave_no_slot() {
        let cache = CachedProvider::new(Counting::new(usize::MAX));
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| assert!(cache.get("x").is_err()));
            }
        });
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_ttl_always_reloads() {
        let cache = CachedProvider::with_ttl(Counting::new(0), Some(Duration::ZERO));
        cache.get("x").unwrap();
        cache.get("x").unwrap();
        assert_eq!(cache.inner().loads(), 2);
        assert!(!cache.is_cached("x"));
    }

    #[test]
    fn invalidate_forces_reload() {
        let cache = CachedProvider::with_ttl(Counting::new(0), None);
        let first = cache.get("x").unwrap();
        cache.invalidate("x");
        let second = cache.get("x").unwrap();
        assert_eq!(cache.inner().loads(), 2);
        assert!(!Arc::ptr_eq(&first, &second));
        // The old handle is still usable.
        assert_eq!(first.node_count(), 3);
    }

    #[test]
    fn default_ttl_is_one_hour() {
        let cache = CachedProvider::new(Counting::new(0));
        assert_eq!(cache.ttl(), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn slugs() {
        assert_eq!(slug("Bengaluru, India"), "bengaluru-india");
        assert_eq!(slug("  São Paulo -- Brazil "), "são-paulo-brazil");
        assert_eq!(slug("NYC"), "nyc");
    }

    const NODES: &str = "osmid,y,x\n1,12.9719,77.6412\n2,12.9352,77.6245\n";
    const EDGES: &str = "u,v,key,highway,length,geometry\n1,2,0,primary,4300,\n2,1,0,primary,4300,\n";

    #[test]
    fn csv_provider_reads_place_dir() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("bengaluru-india");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("nodes.csv"), NODES).unwrap();
        std::fs::write(dir.join("edges.csv"), EDGES).unwrap();

        let provider = CsvGraphProvider::new(root.path());
        assert_eq!(provider.dir_for("Bengaluru, India"), dir);
        let g = provider.load("Bengaluru, India").unwrap();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 2);
        assert!(g.node_by_source_id(2).is_some());
    }

    #[test]
    fn csv_provider_unknown_place() {
        let root = tempfile::tempdir().unwrap();
        let err = CsvGraphProvider::new(root.path()).load("Nowhere").unwrap_err();
        assert!(matches!(err, ProviderError::UnknownPlace(p) if p == "Nowhere"));
    }

    #[test]
    fn csv_provider_bad_tables() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("broken");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("nodes.csv"), NODES).unwrap();
        // edges.csv missing.
        let err = CsvGraphProvider::new(root.path()).load("Broken").unwrap_err();
        assert!(matches!(err, ProviderError::Load { .. }));
    }
}

// ── Geocoding ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod geocode {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use rr_core::GeoPoint;

    use crate::{CachedGeocoder, GeocodeError, Geocoder, StaticGeocoder};
    use super::helpers::{gazetteer, INDIRANAGAR, KORAMANGALA};

    #[test]
    fn case_and_whitespace_insensitive() {
        let g = gazetteer();
        assert_eq!(g.geocode("indiranagar").unwrap(), INDIRANAGAR);
        assert_eq!(g.geocode("  KORAMANGALA ").unwrap(), KORAMANGALA);
    }

    #[test]
    fn qualifiers_are_stripped() {
        let g = gazetteer();
        assert_eq!(g.geocode("Koramangala, Bengaluru, India").unwrap(), KORAMANGALA);
    }

    #[test]
    fn unknown_is_ambiguous_or_not_found() {
        let g = gazetteer();
        assert_eq!(
            g.geocode("Whitefield"),
            Err(GeocodeError::AmbiguousOrNotFound("Whitefield".to_owned()))
        );
        assert!(g.geocode("").is_err());
    }

    #[test]
    fn from_iterator() {
        let g: StaticGeocoder = [("A", GeoPoint::new(1.0, 2.0)), ("B", GeoPoint::new(3.0, 4.0))]
            .into_iter()
            .collect();
        assert_eq!(g.len(), 2);
        assert_eq!(g.geocode("b").unwrap(), GeoPoint::new(3.0, 4.0));
    }

    struct Counting {
        calls: AtomicUsize,
        inner: StaticGeocoder,
    }

    impl Geocoder for Counting {
        fn geocode(&self, query: &str) -> Result<GeoPoint, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.geocode(query)
        }
    }

    #[test]
    fn cached_geocoder_memoizes_hits_only() {
        let cached = CachedGeocoder::new(
            Counting { calls: AtomicUsize::new(0), inner: gazetteer() },
            Some(Duration::from_secs(3600)),
        );
        cached.geocode("Indiranagar").unwrap();
        cached.geocode("indiranagar").unwrap();
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 1);

        assert!(cached.geocode("Atlantis").is_err());
        assert!(cached.geocode("Atlantis").is_err());
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 3);
        assert_eq!(cached.len(), 1);
    }

    #[test]
    fn expired_lookups_are_evicted() {
        let cached = CachedGeocoder::new(gazetteer(), Some(Duration::ZERO));
        cached.geocode("Indiranagar").unwrap();
        cached.geocode("Koramangala").unwrap();
        cached.geocode("Domlur").unwrap();
        assert_eq!(cached.len(), 1);

        let forever = CachedGeocoder::new(gazetteer(), None);
        forever.geocode("Indiranagar").unwrap();
        forever.geocode("Koramangala").unwrap();
        assert_eq!(forever.len(), 2);
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use std::io::Write;
    use std::time::{Duration, UNIX_EPOCH};

    use rr_core::{CoreError, Hour};

    use crate::EngineConfig;

    #[test]
    fn defaults() {
        let c = EngineConfig::default();
        assert_eq!(c.cache_ttl(), Some(Duration::from_secs(3600)));
        assert_eq!(c.utc_offset_secs, 0);
        assert_eq!(c.profile.rush_multiplier, 1.5);
        assert_eq!(c.profile.rush_hours.len(), 5);
        assert!(c.data_dir.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_overrides() {
        let c = EngineConfig::from_json_str(
            r#"{
                "profile": { "rush_hours": [7, 8], "rush_multiplier": 2.0 },
                "utc_offset_secs": 19800,
                "cache_ttl_secs": null,
                "data_dir": "/var/lib/rushroute"
            }"#,
        )
        .unwrap();
        assert_eq!(c.profile.rush_hours, vec![Hour::new(7).unwrap(), Hour::new(8).unwrap()]);
        assert_eq!(c.profile.rush_multiplier, 2.0);
        // Untouched nested fields keep their defaults.
        assert_eq!(c.profile.base_weights.motorway, 1.0);
        assert_eq!(c.utc_offset_secs, 19800);
        assert_eq!(c.cache_ttl(), None);
        assert_eq!(c.data_dir.as_deref(), Some(std::path::Path::new("/var/lib/rushroute")));
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(EngineConfig::from_json_str("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn rejects_invalid_values() {
        for bad in [
            r#"{ "profile": { "rush_hours": [25] } }"#,
            r#"{ "profile": { "rush_multiplier": 0.0 } }"#,
            r#"{ "profile": { "base_weights": { "trunk": -1.2 } } }"#,
            r#"{ "utc_offset_secs": 90000 }"#,
            r#"{ "utc_offset_secs": -2147483648 }"#,
            r#"{ "cache_ttl_secs": "soon" }"#,
            "not json",
        ] {
            let err = EngineConfig::from_json_str(bad).unwrap_err();
            assert!(matches!(err, CoreError::Config(_)), "{bad}");
        }
    }

    #[test]
    fn json_round_trip() {
        let mut c = EngineConfig::default();
        c.utc_offset_secs = -18000;
        let text = c.to_json_pretty().unwrap();
        assert_eq!(EngineConfig::from_json_str(&text).unwrap(), c);
    }

    #[test]
    fn from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "utc_offset_secs": 3600 }}"#).unwrap();
        let c = EngineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(c.utc_offset_secs, 3600);

        let missing = EngineConfig::from_json_file(std::path::Path::new("/definitely/not/here.json"));
        assert!(matches!(missing, Err(CoreError::Config(_))));
    }

    #[test]
    fn hour_from_wall_clock() {
        let at = UNIX_EPOCH + Duration::from_secs(1_700_000_000); // 22:13 UTC
        let utc = EngineConfig::default();
        assert_eq!(utc.hour_at(at), Hour::new(22).unwrap());

        let ist = EngineConfig { utc_offset_secs: 19_800, ..EngineConfig::default() };
        assert_eq!(ist.hour_at(at), Hour::new(3).unwrap());
    }
}
