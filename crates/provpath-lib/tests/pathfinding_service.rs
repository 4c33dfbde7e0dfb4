mod common;

use std::time::Duration;

use common::{ok_response, ScriptedTransport};
use provpath_lib::{
    load_registry, Error, MatchKind, PathRequest, PathfindingService, RetryPolicy, RoadClass,
    RouteResolver, TransportFailure,
};

fn dataset_service() -> PathfindingService {
    let registry = load_registry(&common::data_dir()).expect("dataset loads");
    PathfindingService::new(registry).expect("service builds")
}

fn with_transport(
    service: PathfindingService,
    transport: &ScriptedTransport,
) -> PathfindingService {
    let resolver = RouteResolver::new(
        Box::new(transport.clone()),
        RetryPolicy::default().with_backoff(Duration::ZERO),
    );
    service.with_resolver(Some(resolver))
}

#[test]
fn blank_endpoints_are_invalid_input() {
    let service = dataset_service();
    let err = service
        .find_path(&PathRequest::new("  ", "Hà Nội"))
        .expect_err("blank start");
    assert!(matches!(err, Error::InvalidInput { field, .. } if field == "start"));

    let err = service
        .find_path(&PathRequest::new("Hà Nội", ""))
        .expect_err("blank end");
    assert!(matches!(err, Error::InvalidInput { field, .. } if field == "end"));

    // Blank input wins over an unresolvable other endpoint.
    let err = service
        .find_path(&PathRequest::new("zzzz", ""))
        .expect_err("blank end after unknown start");
    assert!(matches!(err, Error::InvalidInput { field, .. } if field == "end"));
}

#[test]
fn unknown_endpoint_propagates_suggestions() {
    let service = dataset_service();
    let err = service
        .find_path(&PathRequest::new("Ha Nam", "Huế"))
        .expect_err("unknown start");
    match err {
        Error::RegionNotFound { suggestions, .. } => {
            assert!(suggestions.contains(&"Hà Nội".to_string()))
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn path_is_annotated_with_estimates() {
    let service = dataset_service();
    let request = PathRequest::new("ha noi", "da nang").with_road_class(RoadClass::Highway);
    let result = service.find_path(&request).expect("path");

    assert_eq!(result.codes().first(), Some(&"01"));
    assert_eq!(result.codes().last(), Some(&"48"));
    assert_eq!(result.hop_count(), 7);
    assert_eq!(result.road_class, RoadClass::Highway);

    let segments = result.segments.as_ref().expect("segments");
    assert_eq!(segments.len(), 7);
    assert!(segments.iter().all(|s| s.road_class == RoadClass::Highway));
    let total: f64 = segments.iter().map(|s| s.distance_km).sum();
    let estimated = result.estimated_distance_km.expect("estimate");
    assert!((estimated - total).abs() < 1e-9);
    assert!(estimated > 600.0, "Hanoi to Da Nang is several hundred km");
    assert_eq!(result.real_distance_km, None);
}

#[test]
fn missing_coordinates_skip_segments_but_keep_topology() {
    let service = PathfindingService::new(common::missing_coordinates()).expect("service");
    let result = service
        .find_path(&PathRequest::new("24", "25"))
        .expect("topology-only path");

    assert_eq!(result.codes(), vec!["24", "01", "25"]);
    assert_eq!(result.segments.as_deref().map(<[_]>::len), Some(0));
    assert_eq!(result.estimated_distance_km, None);

    let estimator = service.estimator();
    let graph = service.graph();
    let hanoi = graph.region("01").expect("vertex");
    let bac_ninh = graph.region("24").expect("vertex");
    assert!(matches!(
        estimator.estimate_road_distance(bac_ninh, hanoi, RoadClass::National),
        Err(Error::MissingCoordinates { .. })
    ));
}

#[test]
fn resolver_timeouts_never_fail_the_request() {
    let transport = ScriptedTransport::always(Err(TransportFailure::Timeout));
    let service = with_transport(dataset_service(), &transport);

    let result = service
        .find_path(&PathRequest::new("Bắc Ninh", "Phú Thọ"))
        .expect("path still returned");
    assert_eq!(result.codes(), vec!["24", "01", "25"]);
    assert!(result.estimated_distance_km.is_some());
    assert_eq!(result.real_distance_km, None);
    assert_eq!(transport.calls(), 3);
}

#[test]
fn resolver_success_attaches_real_distance() {
    let transport = ScriptedTransport::always(Ok(ok_response(92_300.0)));
    let service = with_transport(dataset_service(), &transport);

    let result = service
        .find_path(&PathRequest::new("24", "25"))
        .expect("path");
    assert_eq!(result.real_distance_km, Some(92.3));
    assert_eq!(transport.last_coordinates().len(), 3);

    let skipped = service
        .find_path(&PathRequest::new("24", "25").with_real_distance(false))
        .expect("path");
    assert_eq!(skipped.real_distance_km, None);
    assert_eq!(transport.calls(), 1);
}

#[test]
fn same_start_and_end_is_zero_hops() {
    let transport = ScriptedTransport::always(Ok(ok_response(1.0)));
    let service = with_transport(dataset_service(), &transport);
    let result = service
        .find_path(&PathRequest::new("Huế", "46"))
        .expect("path");
    assert_eq!(result.hop_count(), 0);
    assert_eq!(result.estimated_distance_km, Some(0.0));
    assert_eq!(transport.calls(), 0);
}

#[test]
fn disconnected_regions_report_no_path() {
    let service = PathfindingService::new(common::two_islands()).expect("service");
    let err = service
        .find_path(&PathRequest::new("01", "96"))
        .expect_err("disconnected");
    assert!(matches!(err, Error::NoPathFound { .. }));

    let report = service.check_connectivity("Hà Nội", "Cà Mau").expect("report");
    assert!(!report.connected);
    assert_eq!(report.first.code, "01");
    assert_eq!(report.second.code, "96");
}

#[test]
fn batch_lookup_skips_failures() {
    let service = dataset_service();
    let results = service
        .find_paths(&[("01", "79"), ("Atlantis", "01"), ("11", "04")])
        .expect("batch");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].hop_count(), 13);
    assert_eq!(results[1].codes(), vec!["11", "12", "15", "08", "04"]);
}

#[test]
fn reachable_is_sorted_by_hops_then_code() {
    let service = dataset_service();
    let reachable = service.reachable("Hà Nội", Some(1)).expect("reachable");
    let codes: Vec<&str> = reachable.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, vec!["01", "19", "24", "25", "33", "37"]);
    assert_eq!(reachable[0].hops, 0);
    assert!(reachable[1..].iter().all(|r| r.hops == 1));
}

#[test]
fn region_info_lists_graph_neighbors() {
    let service = dataset_service();
    let info = service.region_info("Cà Mau").expect("info");
    assert_eq!(info.code, "96");
    assert_eq!(info.neighbor_count, 2);
    let codes: Vec<&str> = info.neighbors.iter().map(|n| n.code.as_str()).collect();
    assert!(codes.contains(&"91"));
    assert!(codes.contains(&"92"));
}

#[test]
fn neighbor_counts_agree_on_one_sided_data() {
    let service = PathfindingService::new(common::one_sided()).expect("service builds");
    let listed = service.regions().expect("regions");
    for summary in &listed {
        let info = service.region_info(&summary.code).expect("info");
        assert_eq!(summary.neighbor_count, info.neighbor_count, "{}", summary.code);
    }
    let bac_ninh = listed.iter().find(|r| r.code == "24").expect("listed");
    assert_eq!(bac_ninh.neighbor_count, 1);

    let report = service.check_connectivity("24", "25").expect("report");
    assert!(report.connected);
    assert_eq!(report.first.neighbor_count, 1);
}

#[test]
fn listing_search_validation_and_stats() {
    let service = dataset_service();

    let regions = service.regions().expect("regions");
    assert_eq!(regions.len(), 34);
    assert!(regions.windows(2).all(|w| w[0].code < w[1].code));

    let found = service.search("can tho", None).expect("search");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, "92");

    let valid = service.validate_identifier("thanh pho ho chi minh");
    assert!(valid.valid);
    assert_eq!(valid.matched_by, Some(MatchKind::Name));
    assert_eq!(valid.region.map(|r| r.code), Some("79".to_string()));

    let invalid = service.validate_identifier("Hanoy");
    assert!(!invalid.valid);
    assert!(invalid.error.is_some());
    assert!(invalid.suggestions.contains(&"Hà Nội".to_string()));

    let stats = service.stats().expect("stats");
    assert!(stats.connected);
    assert_eq!(stats.graph.edge_count, 58);
}
