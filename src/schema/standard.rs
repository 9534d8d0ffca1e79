use crate::schema::{
    EntityKind, EntitySchema, FieldSpec, FieldType, ForeignKey, IdPart, IdStrategy, IdTemplate,
};

use EntityKind::*;
use FieldType::{Float, Int, Text, Time};

/// Rider category ages, transfer counts and duration limits use this when
/// the feed leaves them blank.
pub const MISSING_VALUE: i64 = -999;

const fn code(min: i64, max: i64) -> FieldType {
    FieldType::Code { min, max }
}

const fn link(
    name: &'static str,
    columns: &'static [&'static str],
    targets: &'static [EntityKind],
    required: bool,
) -> ForeignKey {
    ForeignKey {
        name,
        columns,
        targets,
        required,
    }
}

/// Anything a stop time or an area member can name, in lookup order.
pub const PLACE_TARGETS: &[EntityKind] = &[Stop, Location, StopArea];

const AGENCY_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("agency_id", Text),
    FieldSpec::required("agency_name", Text),
    FieldSpec::required("agency_url", Text),
    FieldSpec::required("agency_timezone", Text),
    FieldSpec::optional("agency_lang", Text),
    FieldSpec::optional("agency_phone", Text),
    FieldSpec::optional("agency_fare_url", Text),
    FieldSpec::optional("agency_email", Text),
];

const ROUTE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("route_id", Text),
    FieldSpec::optional("agency_id", Text),
    FieldSpec::optional("route_short_name", Text),
    FieldSpec::optional("route_long_name", Text),
    FieldSpec::optional("route_desc", Text),
    FieldSpec::required("route_type", Int),
    FieldSpec::optional("route_url", Text),
    FieldSpec::optional("route_color", Text),
    FieldSpec::optional("route_text_color", Text),
    FieldSpec::optional("route_sort_order", Int),
    FieldSpec::optional("network_id", Text),
];

const TRIP_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("route_id", Text),
    FieldSpec::required("service_id", Text),
    FieldSpec::required("trip_id", Text),
    FieldSpec::optional("trip_headsign", Text),
    FieldSpec::optional("trip_short_name", Text),
    FieldSpec::optional("direction_id", code(0, 1)),
    FieldSpec::optional("block_id", Text),
    FieldSpec::optional("shape_id", Text),
    FieldSpec::optional("wheelchair_accessible", code(0, 2)),
    FieldSpec::optional("bikes_allowed", code(0, 2)),
];

const STOP_TIME_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("trip_id", Text),
    FieldSpec::optional("arrival_time", Time),
    FieldSpec::optional("departure_time", Time),
    FieldSpec::optional("stop_id", Text),
    FieldSpec::optional("location_group_id", Text),
    FieldSpec::optional("location_id", Text),
    FieldSpec::required("stop_sequence", Int),
    FieldSpec::optional("stop_headsign", Text),
    FieldSpec::optional("start_pickup_drop_off_window", Time),
    FieldSpec::optional("end_pickup_drop_off_window", Time),
    FieldSpec::defaulted("pickup_type", code(0, 3), 0),
    FieldSpec::defaulted("drop_off_type", code(0, 3), 0),
    FieldSpec::optional("shape_dist_traveled", Float),
    FieldSpec::optional("timepoint", code(0, 1)),
    FieldSpec::optional("pickup_booking_rule_id", Text),
    FieldSpec::optional("drop_off_booking_rule_id", Text),
];

const STOP_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("stop_id", Text),
    FieldSpec::optional("stop_code", Text),
    FieldSpec::optional("stop_name", Text),
    FieldSpec::optional("stop_desc", Text),
    FieldSpec::optional("stop_lat", Float),
    FieldSpec::optional("stop_lon", Float),
    FieldSpec::optional("zone_id", Text),
    FieldSpec::optional("stop_url", Text),
    FieldSpec::defaulted("location_type", code(0, 4), 0),
    FieldSpec::optional("parent_station", Text),
    FieldSpec::optional("wheelchair_boarding", code(0, 2)),
    FieldSpec::optional("platform_code", Text),
];

const LOCATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("location_id", Text),
    FieldSpec::optional("stop_name", Text),
    FieldSpec::optional("stop_desc", Text),
    FieldSpec::optional("zone_id", Text),
    FieldSpec::optional("stop_url", Text),
    FieldSpec::optional("geometry", Text),
];

const AREA_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("area_id", Text),
    FieldSpec::optional("area_name", Text),
];

const STOP_AREA_ELEMENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("area_id", Text),
    FieldSpec::required("stop_id", Text),
];

const FARE_ATTRIBUTE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("fare_id", Text),
    FieldSpec::required("price", Float),
    FieldSpec::required("currency_type", Text),
    FieldSpec::required("payment_method", code(0, 1)),
    FieldSpec::optional("transfers", code(0, 2)),
    FieldSpec::optional("agency_id", Text),
    FieldSpec::optional("transfer_duration", Int),
];

const FARE_RULE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("fare_id", Text),
    FieldSpec::optional("route_id", Text),
    FieldSpec::optional("origin_id", Text),
    FieldSpec::optional("destination_id", Text),
    FieldSpec::optional("contains_id", Text),
];

const FARE_PRODUCT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("fare_product_id", Text),
    FieldSpec::optional("fare_product_name", Text),
    FieldSpec::optional("rider_category_id", Text),
    FieldSpec::optional("fare_media_id", Text),
    FieldSpec::required("amount", Float),
    FieldSpec::required("currency", Text),
    FieldSpec::optional("duration_start", code(0, 1)),
    FieldSpec::optional("duration_amount", Int),
    FieldSpec::optional("duration_unit", code(0, 6)),
    FieldSpec::optional("duration_type", code(1, 2)),
];

const RIDER_CATEGORY_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("rider_category_id", Text),
    FieldSpec::optional("rider_category_name", Text),
    FieldSpec::defaulted("min_age", Int, MISSING_VALUE),
    FieldSpec::defaulted("max_age", Int, MISSING_VALUE),
    FieldSpec::optional("eligibility_url", Text),
    FieldSpec::optional("is_default_fare_category", code(0, 1)),
];

const FARE_MEDIUM_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("fare_media_id", Text),
    FieldSpec::optional("fare_media_name", Text),
    FieldSpec::optional("fare_media_type", code(0, 4)),
];

const FARE_LEG_RULE_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("leg_group_id", Text),
    FieldSpec::optional("network_id", Text),
    FieldSpec::optional("from_area_id", Text),
    FieldSpec::optional("to_area_id", Text),
    FieldSpec::optional("from_timeframe_group_id", Text),
    FieldSpec::optional("to_timeframe_group_id", Text),
    FieldSpec::optional("fare_product_id", Text),
    FieldSpec::optional("rule_priority", Int),
    FieldSpec::optional("min_distance", Float),
    FieldSpec::optional("max_distance", Float),
    FieldSpec::optional("distance_type", code(0, 1)),
];

const FARE_TRANSFER_RULE_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("from_leg_group_id", Text),
    FieldSpec::optional("to_leg_group_id", Text),
    FieldSpec::defaulted("transfer_count", Int, MISSING_VALUE),
    FieldSpec::defaulted("duration_limit", Int, MISSING_VALUE),
    FieldSpec::optional("duration_limit_type", code(0, 3)),
    FieldSpec::optional("fare_transfer_type", code(0, 2)),
    FieldSpec::optional("fare_product_id", Text),
];

const STOP_AREA_ELEMENT_ID: IdTemplate = IdTemplate {
    separator: "_",
    parts: &[IdPart::plain("area_id"), IdPart::plain("stop_id")],
};

const FARE_PRODUCT_ID: IdTemplate = IdTemplate {
    separator: "|",
    parts: &[
        IdPart::labeled("id", "fare_product_id"),
        IdPart::labeled("category", "rider_category_id"),
        IdPart::labeled("medium", "fare_media_id"),
    ],
};

const FARE_LEG_RULE_ID: IdTemplate = IdTemplate {
    separator: "|",
    parts: &[
        IdPart::labeled("groupId", "leg_group_id"),
        IdPart::labeled("product", "fare_product_id"),
        IdPart::labeled("network", "network_id"),
        IdPart::labeled("fromArea", "from_area_id"),
        IdPart::labeled("toArea", "to_area_id"),
    ],
};

const FARE_TRANSFER_RULE_ID: IdTemplate = IdTemplate {
    separator: "_",
    parts: &[
        IdPart::scoped("from_leg_group_id"),
        IdPart::scoped("to_leg_group_id"),
        IdPart::plain("fare_transfer_type"),
        IdPart::plain("transfer_count"),
        IdPart::plain("duration_limit"),
    ],
};

const ROUTE_LINKS: &[ForeignKey] = &[link("agency", &["agency_id"], &[Agency], false)];

const TRIP_LINKS: &[ForeignKey] = &[link("route", &["route_id"], &[Route], true)];

const STOP_TIME_LINKS: &[ForeignKey] = &[
    link("trip", &["trip_id"], &[Trip], true),
    link(
        "stop",
        &["stop_id", "location_group_id", "location_id"],
        PLACE_TARGETS,
        true,
    ),
];

const STOP_LINKS: &[ForeignKey] = &[link("parent_station", &["parent_station"], &[Stop], false)];

const STOP_AREA_LINKS: &[ForeignKey] = &[link("area", &["area_id"], &[Area], true)];

const STOP_AREA_ELEMENT_LINKS: &[ForeignKey] = &[
    link("area", &["area_id"], &[Area], true),
    link("stop", &["stop_id"], PLACE_TARGETS, true),
];

const FARE_ATTRIBUTE_LINKS: &[ForeignKey] = &[link("agency", &["agency_id"], &[Agency], false)];

const FARE_RULE_LINKS: &[ForeignKey] = &[
    link("fare", &["fare_id"], &[FareAttribute], true),
    link("route", &["route_id"], &[Route], false),
];

const FARE_PRODUCT_LINKS: &[ForeignKey] = &[
    link("rider_category", &["rider_category_id"], &[RiderCategory], false),
    link("fare_medium", &["fare_media_id"], &[FareMedium], false),
];

const FARE_LEG_RULE_LINKS: &[ForeignKey] = &[
    link("from_area", &["from_area_id"], &[Area], false),
    link("to_area", &["to_area_id"], &[Area], false),
];

pub(super) fn entity(kind: EntityKind) -> EntitySchema {
    let (table, fields, foreign_keys, id): (_, &'static [FieldSpec], &'static [ForeignKey], _) =
        match kind {
            Agency => (
                Some("agency"),
                AGENCY_FIELDS,
                &[],
                IdStrategy::Explicit { column: "agency_id" },
            ),
            Route => (
                Some("routes"),
                ROUTE_FIELDS,
                ROUTE_LINKS,
                IdStrategy::Explicit { column: "route_id" },
            ),
            Trip => (
                Some("trips"),
                TRIP_FIELDS,
                TRIP_LINKS,
                IdStrategy::Explicit { column: "trip_id" },
            ),
            StopTime => (
                Some("stop_times"),
                STOP_TIME_FIELDS,
                STOP_TIME_LINKS,
                IdStrategy::Anonymous,
            ),
            Stop => (
                Some("stops"),
                STOP_FIELDS,
                STOP_LINKS,
                IdStrategy::Explicit { column: "stop_id" },
            ),
            Location => (
                Some("locations"),
                LOCATION_FIELDS,
                &[],
                IdStrategy::Explicit {
                    column: "location_id",
                },
            ),
            Area => (
                Some("areas"),
                AREA_FIELDS,
                &[],
                IdStrategy::Explicit { column: "area_id" },
            ),
            // Built from its elements, never read from a table
            StopArea => (
                None,
                &[],
                STOP_AREA_LINKS,
                IdStrategy::Explicit { column: "area_id" },
            ),
            StopAreaElement => (
                Some("stop_areas"),
                STOP_AREA_ELEMENT_FIELDS,
                STOP_AREA_ELEMENT_LINKS,
                IdStrategy::Synthesized {
                    template: STOP_AREA_ELEMENT_ID,
                    dedupe: false,
                },
            ),
            FareAttribute => (
                Some("fare_attributes"),
                FARE_ATTRIBUTE_FIELDS,
                FARE_ATTRIBUTE_LINKS,
                IdStrategy::Explicit { column: "fare_id" },
            ),
            FareRule => (
                Some("fare_rules"),
                FARE_RULE_FIELDS,
                FARE_RULE_LINKS,
                IdStrategy::Anonymous,
            ),
            FareProduct => (
                Some("fare_products"),
                FARE_PRODUCT_FIELDS,
                FARE_PRODUCT_LINKS,
                IdStrategy::Synthesized {
                    template: FARE_PRODUCT_ID,
                    dedupe: true,
                },
            ),
            RiderCategory => (
                Some("rider_categories"),
                RIDER_CATEGORY_FIELDS,
                &[],
                IdStrategy::Explicit {
                    column: "rider_category_id",
                },
            ),
            FareMedium => (
                Some("fare_media"),
                FARE_MEDIUM_FIELDS,
                &[],
                IdStrategy::Explicit {
                    column: "fare_media_id",
                },
            ),
            FareLegRule => (
                Some("fare_leg_rules"),
                FARE_LEG_RULE_FIELDS,
                FARE_LEG_RULE_LINKS,
                IdStrategy::Synthesized {
                    template: FARE_LEG_RULE_ID,
                    dedupe: true,
                },
            ),
            FareTransferRule => (
                Some("fare_transfer_rules"),
                FARE_TRANSFER_RULE_FIELDS,
                &[],
                IdStrategy::Synthesized {
                    template: FARE_TRANSFER_RULE_ID,
                    dedupe: true,
                },
            ),
        };
    EntitySchema {
        kind,
        table,
        fields,
        foreign_keys,
        id,
    }
}
