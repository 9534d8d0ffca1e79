use std::{sync::Arc, time::Instant};

use tracing::debug;

use super::Source;
use crate::{
    gtfs,
    repository::{
        Agency, Area, FareAttribute, FareLegRule, FareMedium, FareProduct, FareRule,
        FareTransferRule, Link, Location, LocationType, Repository, RiderCategory, Route, Stop,
        StopAccessType, StopAreaElement, StopTime, Timepoint, Trip,
    },
    schema::{EntityKind, MISSING_VALUE, Record},
    shared::{AgencyAndId, Coordinate},
};

fn text(record: &Record<'_>, name: &str) -> Option<Arc<str>> {
    record.text(name).map(Arc::from)
}

fn code(record: &Record<'_>, name: &str) -> Option<u8> {
    record.int(name).map(|value| value as u8)
}

impl Repository {
    /// First pass: every row becomes an entity with its references pending.
    pub(super) fn materialize(&mut self, source: &Source<'_>) -> Result<(), gtfs::Error> {
        let now = Instant::now();
        self.load_agencies(source)?;
        self.load_routes(source)?;
        self.load_trips(source)?;
        self.load_stops(source)?;
        self.load_locations(source)?;
        self.load_areas(source)?;
        self.load_stop_area_elements(source)?;
        self.load_stop_times(source)?;
        self.load_legacy_fares(source)?;
        self.load_fare_products(source)?;
        self.load_fare_rules_v2(source)?;
        debug!("Materializing feed took {:?}", now.elapsed());
        Ok(())
    }

    fn load_agencies(&mut self, source: &Source<'_>) -> Result<(), gtfs::Error> {
        let default_id = source.config.default_agency_id.as_deref();
        source.fill(&mut self.agencies, |record| {
            let name = record.text("agency_name").unwrap_or_default();
            let id = record.text("agency_id").or(default_id).unwrap_or(name);
            Ok(Agency {
                index: u32::MAX,
                id: id.into(),
                name: name.into(),
                url: record.text("agency_url").unwrap_or_default().into(),
                timezone: record.text("agency_timezone").unwrap_or_default().into(),
                lang: text(record, "agency_lang"),
                phone: text(record, "agency_phone"),
                fare_url: text(record, "agency_fare_url"),
                email: text(record, "agency_email"),
            })
        })
    }

    /// Link to the named agency, or to the feed's first one when the row
    /// names none.
    fn agency_link(&self, source: &Source<'_>, record: &Record<'_>) -> Result<Link<u32>, gtfs::Error> {
        let link = source.link(record, "agency")?;
        if link != Link::Unset {
            return Ok(link);
        }
        Ok(self
            .agencies
            .get_index(0)
            .map(|agency| Link::Pending(agency.id.clone()))
            .unwrap_or_default())
    }

    fn load_routes(&mut self, source: &Source<'_>) -> Result<(), gtfs::Error> {
        let mut routes = std::mem::take(&mut self.routes);
        source.fill(&mut routes, |record| {
            Ok(Route {
                index: u32::MAX,
                id: source.id(record)?,
                agency: self.agency_link(source, record)?,
                short_name: text(record, "route_short_name"),
                long_name: text(record, "route_long_name"),
                desc: text(record, "route_desc"),
                route_type: record.int("route_type").unwrap_or_default(),
                url: text(record, "route_url"),
                color: text(record, "route_color"),
                text_color: text(record, "route_text_color"),
                sort_order: record.int("route_sort_order"),
                network_id: text(record, "network_id"),
            })
        })?;
        self.routes = routes;
        Ok(())
    }

    fn load_trips(&mut self, source: &Source<'_>) -> Result<(), gtfs::Error> {
        source.fill(&mut self.trips, |record| {
            Ok(Trip {
                index: u32::MAX,
                id: source.id(record)?,
                route: source.link(record, "route")?,
                service_id: record.text("service_id").unwrap_or_default().into(),
                headsign: text(record, "trip_headsign"),
                short_name: text(record, "trip_short_name"),
                direction_id: code(record, "direction_id"),
                block_id: text(record, "block_id"),
                shape_id: text(record, "shape_id"),
                wheelchair_accessible: code(record, "wheelchair_accessible"),
                bikes_allowed: code(record, "bikes_allowed"),
            })
        })
    }

    fn load_stops(&mut self, source: &Source<'_>) -> Result<(), gtfs::Error> {
        source.fill(&mut self.stops, |record| {
            let coordinate = match (record.float("stop_lat"), record.float("stop_lon")) {
                (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
                _ => None,
            };
            Ok(Stop {
                index: u32::MAX,
                id: source.id(record)?,
                code: text(record, "stop_code"),
                name: text(record, "stop_name"),
                desc: text(record, "stop_desc"),
                coordinate,
                zone_id: text(record, "zone_id"),
                url: text(record, "stop_url"),
                location_type: LocationType::from(record.int("location_type").unwrap_or_default()),
                parent_station: source.link(record, "parent_station")?,
                wheelchair_boarding: code(record, "wheelchair_boarding"),
                platform_code: text(record, "platform_code"),
            })
        })
    }

    fn load_locations(&mut self, source: &Source<'_>) -> Result<(), gtfs::Error> {
        source.fill(&mut self.locations, |record| {
            Ok(Location {
                index: u32::MAX,
                id: source.id(record)?,
                name: text(record, "stop_name"),
                desc: text(record, "stop_desc"),
                zone_id: text(record, "zone_id"),
                url: text(record, "stop_url"),
                geometry: text(record, "geometry"),
            })
        })
    }

    fn load_areas(&mut self, source: &Source<'_>) -> Result<(), gtfs::Error> {
        source.fill(&mut self.areas, |record| {
            Ok(Area {
                index: u32::MAX,
                id: source.id(record)?,
                name: text(record, "area_name"),
            })
        })
    }

    fn load_stop_area_elements(&mut self, source: &Source<'_>) -> Result<(), gtfs::Error> {
        source.fill(&mut self.stop_area_elements, |record| {
            Ok(StopAreaElement {
                index: u32::MAX,
                id: source.id(record)?,
                area: source.link(record, "area")?,
                place: source.link(record, "stop")?,
            })
        })
    }

    fn load_stop_times(&mut self, source: &Source<'_>) -> Result<(), gtfs::Error> {
        debug!("Loading stop times...");
        let now = Instant::now();
        let mut stop_times: Vec<StopTime> = Vec::new();
        source.each(EntityKind::StopTime, |record| {
            let sequence = record.int("stop_sequence").unwrap_or_default();
            let sequence = u32::try_from(sequence).map_err(|_| {
                record.malformed("stop_sequence", &sequence.to_string(), "sequence out of range")
            })?;
            stop_times.push(StopTime {
                // Row position until the stop times are grouped by trip
                index: stop_times.len() as u32,
                trip: source.link(record, "trip")?,
                place: source.link(record, "stop")?,
                sequence,
                arrival_time: record.time("arrival_time"),
                departure_time: record.time("departure_time"),
                headsign: text(record, "stop_headsign"),
                start_pickup_drop_off_window: record.time("start_pickup_drop_off_window"),
                end_pickup_drop_off_window: record.time("end_pickup_drop_off_window"),
                pickup_type: StopAccessType::from(record.int("pickup_type").unwrap_or_default()),
                drop_off_type: StopAccessType::from(record.int("drop_off_type").unwrap_or_default()),
                dist_traveled: record.float("shape_dist_traveled"),
                timepoint: Timepoint::from(record.int("timepoint")),
                pickup_booking_rule_id: text(record, "pickup_booking_rule_id"),
                drop_off_booking_rule_id: text(record, "drop_off_booking_rule_id"),
            });
            Ok(())
        })?;
        self.stop_times = stop_times.into();
        debug!("Loading stop times took {:?}", now.elapsed());
        Ok(())
    }

    fn load_legacy_fares(&mut self, source: &Source<'_>) -> Result<(), gtfs::Error> {
        let mut fare_attributes = std::mem::take(&mut self.fare_attributes);
        source.fill(&mut fare_attributes, |record| {
            Ok(FareAttribute {
                index: u32::MAX,
                id: source.id(record)?,
                price: record.float("price").unwrap_or_default(),
                currency: record.text("currency_type").unwrap_or_default().into(),
                payment_method: code(record, "payment_method").unwrap_or_default(),
                transfers: code(record, "transfers"),
                agency: self.agency_link(source, record)?,
                transfer_duration: record.int("transfer_duration"),
            })
        })?;
        self.fare_attributes = fare_attributes;

        let mut fare_rules: Vec<FareRule> = Vec::new();
        source.each(EntityKind::FareRule, |record| {
            fare_rules.push(FareRule {
                index: fare_rules.len() as u32,
                fare: source.link(record, "fare")?,
                route: source.link(record, "route")?,
                origin_id: text(record, "origin_id"),
                destination_id: text(record, "destination_id"),
                contains_id: text(record, "contains_id"),
            });
            Ok(())
        })?;
        self.fare_rules = fare_rules.into();
        Ok(())
    }

    fn load_fare_products(&mut self, source: &Source<'_>) -> Result<(), gtfs::Error> {
        source.fill(&mut self.rider_categories, |record| {
            Ok(RiderCategory {
                index: u32::MAX,
                id: source.id(record)?,
                name: text(record, "rider_category_name"),
                min_age: record.int("min_age").unwrap_or(MISSING_VALUE),
                max_age: record.int("max_age").unwrap_or(MISSING_VALUE),
                eligibility_url: text(record, "eligibility_url"),
                is_default: record.int("is_default_fare_category") == Some(1),
            })
        })?;

        source.fill(&mut self.fare_media, |record| {
            Ok(FareMedium {
                index: u32::MAX,
                id: source.id(record)?,
                name: text(record, "fare_media_name"),
                media_type: code(record, "fare_media_type"),
            })
        })?;

        source.fill(&mut self.fare_products, |record| {
            Ok(FareProduct {
                index: u32::MAX,
                id: source.id(record)?,
                product_id: source.scoped(record.text("fare_product_id").unwrap_or_default()),
                name: text(record, "fare_product_name"),
                rider_category: source.link(record, "rider_category")?,
                fare_medium: source.link(record, "fare_medium")?,
                amount: record.float("amount").unwrap_or_default(),
                currency: record.text("currency").unwrap_or_default().into(),
                duration_start: code(record, "duration_start"),
                duration_amount: record.int("duration_amount"),
                duration_unit: code(record, "duration_unit"),
                duration_type: code(record, "duration_type"),
            })
        })
    }

    fn load_fare_rules_v2(&mut self, source: &Source<'_>) -> Result<(), gtfs::Error> {
        let scoped = |record: &Record<'_>, name: &str| -> Option<AgencyAndId> {
            record.text(name).map(|id| source.scoped(id))
        };

        source.fill(&mut self.fare_leg_rules, |record| {
            Ok(FareLegRule {
                index: u32::MAX,
                id: source.synthesized(record).into(),
                leg_group_id: scoped(record, "leg_group_id"),
                network_id: text(record, "network_id"),
                from_area: source.link(record, "from_area")?,
                to_area: source.link(record, "to_area")?,
                from_timeframe_group_id: text(record, "from_timeframe_group_id"),
                to_timeframe_group_id: text(record, "to_timeframe_group_id"),
                fare_product_id: scoped(record, "fare_product_id"),
                rule_priority: record.int("rule_priority"),
                min_distance: record.float("min_distance"),
                max_distance: record.float("max_distance"),
                distance_type: code(record, "distance_type"),
            })
        })?;

        source.fill(&mut self.fare_transfer_rules, |record| {
            Ok(FareTransferRule {
                index: u32::MAX,
                id: source.synthesized(record).into(),
                from_leg_group_id: scoped(record, "from_leg_group_id"),
                to_leg_group_id: scoped(record, "to_leg_group_id"),
                transfer_count: record.int("transfer_count").unwrap_or(MISSING_VALUE),
                duration_limit: record.int("duration_limit").unwrap_or(MISSING_VALUE),
                duration_limit_type: code(record, "duration_limit_type"),
                fare_transfer_type: code(record, "fare_transfer_type"),
                fare_product_id: scoped(record, "fare_product_id"),
            })
        })
    }
}
