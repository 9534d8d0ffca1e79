mod common;

use common::{MockFeed, load_directory};
use gtfs_graph::prelude::*;

#[test]
fn turlock_fares_v2() {
    let repository = load_directory("turlock", "1642");

    let agency = repository.agencies().get("1642").unwrap();
    assert_eq!(&*agency.name, "Turlock Transit");
    assert_eq!(&*agency.url, "http://www.turlocktransit.com/");
    assert_eq!(&*agency.timezone, "America/Los_Angeles");

    assert_eq!(repository.fare_products().len(), 12);
    let product = repository
        .fare_products()
        .iter()
        .min_by(|a, b| a.id.cmp(&b.id))
        .unwrap();
    assert_eq!(
        product.id.id(),
        "id=31-day_disabled|category=disabled|medium=null"
    );
    assert_eq!(product.name.as_deref(), Some("31-Day Pass Persons with Disabilities"));
    assert_eq!(&*product.currency, "USD");
    assert_eq!(product.amount, 15.0);
    assert_eq!(product.duration_unit, Some(3));
    assert_eq!(product.duration_amount, Some(31));
    assert_eq!(product.duration_type, Some(2));
    let category = repository
        .rider_categories()
        .linked(&product.rider_category)
        .unwrap();
    assert_eq!(category.name.as_deref(), Some("Persons with Disabilities"));
    assert_eq!(category.id.id(), "disabled");
    assert!(product.fare_medium.get().is_none());

    assert_eq!(repository.fare_leg_rules().len(), 12);
    let rule = repository
        .fare_leg_rules()
        .iter()
        .min_by(|a, b| a.id.cmp(&b.id))
        .unwrap();
    assert_eq!(
        &*rule.id,
        "groupId=Turlock|product=31-day_disabled|network=null|fromArea=null|toArea=null"
    );
    assert_eq!(rule.leg_group_id.as_ref().unwrap().id(), "Turlock");
    let products = repository.fare_products_for_leg_rule(rule);
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].index, product.index);

    assert_eq!(repository.rider_categories().len(), 5);
    let youth = repository
        .rider_categories()
        .get(&repository.scoped_id("youth"))
        .unwrap();
    assert_eq!(youth.name.as_deref(), Some("Youth Age 18 and Under"));
    assert_eq!(youth.max_age, 18);
    assert_eq!(youth.min_age, MISSING_VALUE);
    assert_eq!(youth.min_age(), None);
    assert_eq!(
        youth.eligibility_url.as_deref(),
        Some("http://www.turlocktransit.com/fares.html")
    );

    assert!(repository.has_legacy_fares());
    assert!(repository.has_fares_v2());
}

#[test]
fn turlock_legacy_fare_rules() {
    let repository = load_directory("turlock", "1642");
    let regular = repository
        .fare_attributes()
        .get(&repository.scoped_id("regular"))
        .unwrap();
    assert_eq!(regular.price, 1.5);
    assert_eq!(regular.transfers, None);
    assert_eq!(
        repository.agencies().linked(&regular.agency).unwrap().id.as_ref(),
        "1642"
    );

    let rules = repository.fare_rules_for_attribute(regular);
    assert_eq!(rules.len(), 2);
    let routes: Vec<_> = rules
        .iter()
        .filter_map(|rule| repository.routes().linked(&rule.route))
        .map(|route| route.id.id().to_string())
        .collect();
    assert_eq!(routes, vec!["1", "2"]);

    let reduced = repository
        .fare_attributes()
        .get(&repository.scoped_id("reduced"))
        .unwrap();
    assert_eq!(reduced.transfers, Some(0));
}

fn mdot() -> MockFeed {
    MockFeed::new()
        .put_lines(
            "agency",
            "agency_id,agency_name,agency_url,agency_timezone",
            &["1,Maryland Transit Administration Metro Subway,https://www.mta.maryland.gov,America/New_York"],
        )
        .put_lines(
            "routes",
            "route_id,route_short_name,route_type,network_id",
            &["metro,Metro,1,core"],
        )
        .put_lines(
            "fare_media",
            "fare_media_id,fare_media_name,fare_media_type",
            &[
                "charmcard,CharmCard,2",
                "charmcard_senior,Senior CharmCard,2",
                "cash,Cash,0",
            ],
        )
        .put_lines(
            "fare_products",
            "fare_product_id,fare_product_name,fare_media_id,amount,currency",
            &[
                "core_local_one_way_fare,One Way - Core Service,charmcard,2.00,USD",
                "core_local_one_way_fare,One Way - Core Service,cash,2.00,USD",
                "core_local_1_day_fare,1-Day Pass - Core Service,charmcard,4.60,USD",
            ],
        )
        .put_lines(
            "fare_leg_rules",
            "leg_group_id,network_id,fare_product_id",
            &[
                "core_local_one_way_trip,core,core_local_one_way_fare",
                "core_local_one_way_trip,core,core_local_1_day_fare",
            ],
        )
        .put_lines(
            "fare_transfer_rules",
            "from_leg_group_id,to_leg_group_id,transfer_count,duration_limit,duration_limit_type,fare_transfer_type",
            &[
                "core_express_one_way_trip,core_express_one_way_trip,,5400,1,",
                "core_local_one_way_trip,core_local_one_way_trip,1,5400,1,0",
                "core_local_one_way_trip,core_express_one_way_trip,1,5400,1,0",
            ],
        )
}

#[test]
fn mdot_fares_v2() {
    let repository = mdot().load("1").unwrap();

    let product = repository
        .fare_products()
        .iter()
        .min_by(|a, b| a.id.cmp(&b.id))
        .unwrap();
    assert_eq!(
        product.id.id(),
        "id=core_local_1_day_fare|category=null|medium=charmcard"
    );
    assert!((product.amount - 4.6).abs() < 0.01);
    let medium = repository.fare_media().linked(&product.fare_medium).unwrap();
    assert_eq!(medium.name.as_deref(), Some("CharmCard"));

    let rule = repository
        .fare_leg_rules()
        .iter()
        .min_by(|a, b| a.id.cmp(&b.id))
        .unwrap();
    assert_eq!(
        &*rule.id,
        "groupId=core_local_one_way_trip|product=core_local_1_day_fare|network=core|fromArea=null|toArea=null"
    );

    let one_way = repository
        .fare_leg_rules()
        .iter()
        .find(|rule| rule.id.contains("product=core_local_one_way_fare"))
        .unwrap();
    assert_eq!(repository.fare_products_for_leg_rule(one_way).len(), 2);

    assert_eq!(repository.fare_transfer_rules().len(), 3);
    let transfer = repository
        .fare_transfer_rules()
        .iter()
        .min_by(|a, b| a.id.cmp(&b.id))
        .unwrap();
    assert_eq!(
        &*transfer.id,
        "1_core_express_one_way_trip_1_core_express_one_way_trip_null_-999_5400"
    );
    assert_eq!(
        transfer.from_leg_group_id,
        Some(AgencyAndId::new("1", "core_express_one_way_trip"))
    );
    assert_eq!(transfer.transfer_count, MISSING_VALUE);
    assert_eq!(transfer.transfer_count(), None);
    assert_eq!(transfer.duration_limit, 5400);

    let medium = repository
        .fare_media()
        .get(&repository.scoped_id("charmcard_senior"))
        .unwrap();
    assert_eq!(medium.name.as_deref(), Some("Senior CharmCard"));

    assert!(repository.stop_area_elements().is_empty());
    assert_eq!(repository.routes().len(), 1);
    assert_eq!(repository.routes()[0].network_id.as_deref(), Some("core"));

    assert!(!repository.has_legacy_fares());
    assert!(repository.has_fares_v2());
}

#[test]
fn fare_leg_rule_distance() {
    let repository = MockFeed::new()
        .put_minimal()
        .put_lines("fare_products", "fare_product_id, amount, currency", &["fare_1,5,EUR"])
        .put_lines(
            "fare_leg_rules",
            "network_id,min_distance,max_distance,distance_type,fare_product_id",
            &["bus,0,3,1,fare_1"],
        )
        .load("1")
        .unwrap();
    let rule = &repository.fare_leg_rules()[0];
    assert_eq!(rule.min_distance, Some(0.0));
    assert_eq!(rule.max_distance, Some(3.0));
    assert_eq!(rule.distance_type, Some(1));
    assert_eq!(
        &*rule.id,
        "groupId=null|product=fare_1|network=bus|fromArea=null|toArea=null"
    );
}

#[test]
fn equal_synthesized_ids_are_folded() {
    let repository = MockFeed::new()
        .put_agency()
        .put_lines(
            "fare_products",
            "fare_product_id,fare_product_name,amount,currency",
            &["fare_1,First,5,EUR", "fare_1,Second,6,EUR"],
        )
        .put_lines(
            "fare_leg_rules",
            "leg_group_id,fare_product_id",
            &["lg,fare_1", "lg,fare_1"],
        )
        .load("1")
        .unwrap();
    assert_eq!(repository.fare_products().len(), 1);
    assert_eq!(repository.fare_products()[0].name.as_deref(), Some("First"));
    assert_eq!(repository.fare_leg_rules().len(), 1);
}

#[test]
fn synthesized_ids_are_stable_across_loads() {
    let first = mdot().load("1").unwrap();
    let second = mdot().load("1").unwrap();
    let ids = |repository: &Repository| -> Vec<String> {
        repository
            .fare_products()
            .iter()
            .map(|product| product.id.to_string())
            .chain(repository.fare_leg_rules().iter().map(|rule| rule.id.to_string()))
            .chain(repository.fare_transfer_rules().iter().map(|rule| rule.id.to_string()))
            .collect()
    };
    assert_eq!(ids(&first), ids(&second));
}

#[test]
fn transfer_rule_ids_keep_codes_as_written() {
    let repository = MockFeed::new()
        .put_agency()
        .put_lines(
            "fare_transfer_rules",
            "from_leg_group_id,to_leg_group_id,transfer_count,duration_limit,fare_transfer_type",
            &["a,b,01,5400,0"],
        )
        .load("1")
        .unwrap();
    let rule = &repository.fare_transfer_rules()[0];
    assert_eq!(&*rule.id, "1_a_1_b_0_01_5400");
    assert_eq!(rule.transfer_count, 1);
}

#[test]
fn capability_flags_are_independent() {
    let legacy = MockFeed::new().put_minimal().put_lines(
        "fare_attributes",
        "fare_id,price,currency_type,payment_method,transfers",
        &["f0,2.50,USD,0,"],
    );
    let fares_v2 = MockFeed::new()
        .put_minimal()
        .put_lines("fare_products", "fare_product_id,amount,currency", &["p0,2.50,USD"]);
    let both = legacy
        .clone()
        .put_lines("fare_products", "fare_product_id,amount,currency", &["p0,2.50,USD"]);

    let flags = |feed: &MockFeed| {
        let capabilities = feed.load("1").unwrap().capabilities();
        (capabilities.legacy_fares, capabilities.fares_v2)
    };
    assert_eq!(flags(&legacy), (true, false));
    assert_eq!(flags(&fares_v2), (false, true));
    assert_eq!(flags(&both), (true, true));
    assert_eq!(flags(&MockFeed::new().put_minimal()), (false, false));
}
