mod common;

use common::MockFeed;
use gtfs_graph::prelude::*;

#[test]
fn minimal_feed_resolves() {
    let repository = MockFeed::new().put_minimal().load("1").unwrap();
    assert_eq!(repository.scope(), "1");

    let trip = repository.trips().get(&repository.scoped_id("t0")).unwrap();
    let route = repository.route_for_trip(trip).unwrap();
    assert_eq!(route.id.to_string(), "1_r0");
    assert_eq!(route.short_name.as_deref(), Some("10"));
    assert_eq!(&*repository.agency_for_route(route).unwrap().id, "a0");

    let stop_times = repository.stop_times_for_trip(trip);
    assert_eq!(stop_times.len(), 2);
    assert_eq!(stop_times[0].arrival_time, Some(Time::from_seconds(3600)));
    assert_eq!(stop_times[0].departure_time, Some(Time::from_seconds(3900)));
    let stop = repository.place_for_stop_time(&stop_times[1]).unwrap();
    assert_eq!(stop.name(), "Stop One");

    let capabilities = repository.capabilities();
    assert!(!capabilities.legacy_fares);
    assert!(!capabilities.fares_v2);
    assert!(!capabilities.flex);
}

#[test]
fn forward_references_resolve() {
    let repository = MockFeed::new()
        .put_lines(
            "stop_times",
            "trip_id,arrival_time,departure_time,stop_id,stop_sequence",
            &["t0,10:00:00,10:00:00,s1,2", "t0,09:00:00,09:00:00,s0,1"],
        )
        .put_lines("trips", "route_id,service_id,trip_id", &["r0,sid0,t0"])
        .put_lines("stops", "stop_id,stop_name,parent_station", &["s0,Child,s1", "s1,Parent,"])
        .put_lines("routes", "route_id,route_type", &["r0,3"])
        .put_agency()
        .load("1")
        .unwrap();

    let child = repository.stops().get(&repository.scoped_id("s0")).unwrap();
    assert_eq!(
        repository.stops().linked(&child.parent_station).unwrap().name.as_deref(),
        Some("Parent")
    );
    let stop_times = repository.stop_times_by_trip_id("t0").unwrap();
    assert_eq!(stop_times[0].sequence, 1);
    assert_eq!(stop_times[1].sequence, 2);
}

#[test]
fn scope_defaults_to_first_agency() {
    let repository = MockFeed::new()
        .put_minimal()
        .load_with(Config::default())
        .unwrap();
    assert_eq!(repository.scope(), "a0");
    assert!(repository.stops().by_id(&AgencyAndId::new("a0", "s0")).is_some());
}

#[test]
fn missing_agency_without_default_fails() {
    let err = MockFeed::new()
        .put_lines("stops", "stop_id,stop_name", &["s0,Stop Zero"])
        .load_with(Config::default())
        .unwrap_err();
    assert!(matches!(err, Error::MissingAgency));

    let repository = MockFeed::new()
        .put_lines("stops", "stop_id,stop_name", &["s0,Stop Zero"])
        .load("1")
        .unwrap();
    assert_eq!(repository.stops().len(), 1);
}

#[test]
fn unknown_trip_is_dangling() {
    let err = MockFeed::new()
        .put_minimal()
        .put_lines(
            "stop_times",
            "trip_id,arrival_time,departure_time,stop_id,stop_sequence",
            &["t9,01:00:00,01:00:00,s0,0"],
        )
        .load("1")
        .unwrap_err();
    match err {
        Error::DanglingReference { kind, field, token, .. } => {
            assert_eq!(kind, EntityKind::StopTime);
            assert_eq!(field, "trip");
            assert_eq!(token, "t9");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_stop_is_dangling() {
    let err = MockFeed::new()
        .put_minimal()
        .put_lines(
            "stop_times",
            "trip_id,arrival_time,departure_time,stop_id,stop_sequence",
            &["t0,01:00:00,01:00:00,nowhere,0"],
        )
        .load("1")
        .unwrap_err();
    assert!(matches!(
        err,
        Error::DanglingReference { kind: EntityKind::StopTime, ref token, .. } if token == "nowhere"
    ));
}

#[test]
fn unknown_optional_reference_is_unset() {
    let repository = MockFeed::new()
        .put_minimal()
        .put_lines(
            "routes",
            "route_id,agency_id,route_type",
            &["r0,someone_else,3"],
        )
        .put_lines("stops", "stop_id,stop_name,parent_station", &["s0,Zero,ghost", "s1,One,"])
        .load("1")
        .unwrap();
    let route = &repository.routes()[0];
    assert!(!route.agency.is_resolved());
    assert!(repository.agency_for_route(route).is_none());
    let stop = repository.stops().get(&repository.scoped_id("s0")).unwrap();
    assert!(repository.stops().linked(&stop.parent_station).is_none());
}

#[test]
fn route_without_agency_id_uses_first_agency() {
    let repository = MockFeed::new()
        .put_minimal()
        .put_lines(
            "agency",
            "agency_id,agency_name,agency_url,agency_timezone",
            &[
                "a0,First,http://first.gov/,America/Los_Angeles",
                "a1,Second,http://second.gov/,America/Los_Angeles",
            ],
        )
        .load("1")
        .unwrap();
    let route = &repository.routes()[0];
    assert_eq!(&*repository.agency_for_route(route).unwrap().name, "First");
}

#[test]
fn duplicate_stop_id_fails() {
    let err = MockFeed::new()
        .put_minimal()
        .put_lines("stops", "stop_id,stop_name", &["s0,Zero", "s1,One", "s0,Again"])
        .load("1")
        .unwrap_err();
    match err {
        Error::DuplicateIdentifier { kind, id, row } => {
            assert_eq!(kind, EntityKind::Stop);
            assert_eq!(id, "1_s0");
            assert_eq!(row, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_fields_fail() {
    let err = MockFeed::new()
        .put_minimal()
        .put_lines("fare_products", "fare_product_id,amount,currency", &["p0,1,USD"])
        .put_lines(
            "fare_leg_rules",
            "network_id,distance_type,fare_product_id",
            &["bus,7,p0"],
        )
        .load("1")
        .unwrap_err();
    match err {
        Error::MalformedField { table, column, value, .. } => {
            assert_eq!(table, "fare_leg_rules");
            assert_eq!(column, "distance_type");
            assert_eq!(value, "7");
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = MockFeed::new()
        .put_minimal()
        .put_lines(
            "stop_times",
            "trip_id,arrival_time,departure_time,stop_id,stop_sequence",
            &["t0,01:00:00,01:00:00,s0,-1"],
        )
        .load("1")
        .unwrap_err();
    assert!(matches!(err, Error::MalformedField { ref column, .. } if column == "stop_sequence"));

    let err = MockFeed::new()
        .put_minimal()
        .put_lines("routes", "route_id,route_type", &["r0,bus"])
        .load("1")
        .unwrap_err();
    assert!(matches!(err, Error::MalformedField { ref column, .. } if column == "route_type"));
}

#[test]
fn out_of_range_values_are_malformed() {
    let err = MockFeed::new()
        .put_minimal()
        .put_lines(
            "stop_times",
            "trip_id,arrival_time,departure_time,stop_id,stop_sequence",
            &["t0,2000000:00:00,2000000:00:00,s0,0"],
        )
        .load("1")
        .unwrap_err();
    assert!(matches!(err, Error::MalformedField { ref column, .. } if column == "arrival_time"));

    let err = MockFeed::new()
        .put_minimal()
        .put_lines(
            "stop_times",
            "trip_id,arrival_time,departure_time,stop_id,stop_sequence",
            &["t0,01:00:00,01:00:00,s0,5000000000"],
        )
        .load("1")
        .unwrap_err();
    match err {
        Error::MalformedField { column, value, reason, .. } => {
            assert_eq!(column, "stop_sequence");
            assert_eq!(value, "5000000000");
            assert_eq!(reason, "sequence out of range");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn strict_lookup_reports_not_found() {
    let repository = MockFeed::new().put_minimal().load("1").unwrap();
    let err = repository
        .stops()
        .get(&repository.scoped_id("s9"))
        .unwrap_err();
    match err {
        Error::NotFound { kind, id } => {
            assert_eq!(kind, EntityKind::Stop);
            assert_eq!(id, "1_s9");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(repository.place_by_id(&repository.scoped_id("s9")).is_none());
    assert!(repository.stop_times_by_trip_id("t9").is_none());
}

#[test]
fn unknown_tables_are_ignored() {
    let repository = MockFeed::new()
        .put_minimal()
        .put_lines("calendar", "service_id,monday", &["sid0,1"])
        .load("1")
        .unwrap();
    assert_eq!(repository.trips().len(), 1);
}

#[test]
fn stop_times_keep_row_order_on_equal_sequence() {
    let repository = MockFeed::new()
        .put_minimal()
        .put_lines(
            "stop_times",
            "trip_id,arrival_time,departure_time,stop_id,stop_sequence",
            &[
                "t0,01:00:00,01:00:00,s1,5",
                "t0,01:10:00,01:10:00,s0,5",
                "t0,00:50:00,00:50:00,s0,1",
            ],
        )
        .load("1")
        .unwrap();
    let stop_times = repository.stop_times_by_trip_id("t0").unwrap();
    let places: Vec<&str> = stop_times
        .iter()
        .filter_map(|stop_time| repository.place_for_stop_time(stop_time))
        .map(|place| place.id().id())
        .collect();
    assert_eq!(places, vec!["s0", "s1", "s0"]);
    assert_eq!(stop_times[1].arrival_time, Some(Time::from_seconds(3600)));
}

#[test]
fn times_past_midnight_are_kept() {
    let repository = MockFeed::new()
        .put_minimal()
        .put_lines(
            "stop_times",
            "trip_id,arrival_time,departure_time,stop_id,stop_sequence",
            &["t0,25:10:00,25:12:30,s0,0"],
        )
        .load("1")
        .unwrap();
    let stop_time = &repository.stop_times()[0];
    assert_eq!(stop_time.arrival_time, Some(Time::from_seconds(25 * 3600 + 600)));
    assert_eq!(
        stop_time.departure_time.map(|time| time.to_hms_string()).as_deref(),
        Some("25:12:30")
    );
}
