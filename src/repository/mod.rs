use std::{collections::HashMap, sync::Arc};

mod entities;
mod link;
mod place;
pub mod source;
mod table;
pub use entities::*;
pub use link::*;
pub use place::*;
pub use table::*;

use crate::{
    schema::{EntityKind, PLACE_TARGETS},
    shared::AgencyAndId,
};

/// Metadata describing a contiguous range within the global `stop_times` array.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    /// The index where the trip's stop-times begin.
    pub start_idx: u32,
    /// The total number of stop-times in the trip.
    pub count: u32,
}

/// Optional schema extensions found in a loaded feed.
///
/// Each flag is derived from the materialized entities and never set on its
/// own; the flags are independent of each other.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedCapabilities {
    /// At least one `fare_attributes.txt` row.
    pub legacy_fares: bool,
    /// At least one `fare_products.txt` row.
    pub fares_v2: bool,
    /// At least one location or stop area.
    pub flex: bool,
}

/// Every entity of one feed, fully resolved.
///
/// Built by [`Repository::load`] and never mutated afterwards, so any number
/// of threads can query it at once.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    scope: Arc<str>,

    agencies: Table<Agency>,
    routes: Table<Route>,
    trips: Table<Trip>,
    /// Grouped by trip, ordered by sequence within a trip.
    stop_times: Box<[StopTime]>,
    stops: Table<Stop>,
    locations: Table<Location>,
    areas: Table<Area>,
    stop_areas: Table<StopArea>,
    stop_area_elements: Table<StopAreaElement>,
    fare_attributes: Table<FareAttribute>,
    fare_rules: Box<[FareRule]>,
    fare_products: Table<FareProduct>,
    rider_categories: Table<RiderCategory>,
    fare_media: Table<FareMedium>,
    fare_leg_rules: Table<FareLegRule>,
    fare_transfer_rules: Table<FareTransferRule>,

    // Lookups, indexed by the parent's index
    trip_to_stop_times: Box<[Slice]>,
    route_to_trips: Box<[Box<[u32]>]>,
    area_to_elements: Box<[Box<[u32]>]>,
    area_to_stop_area: Box<[Option<u32>]>,
    fare_to_rules: Box<[Box<[u32]>]>,
    place_to_stop_areas: HashMap<Place, Box<[u32]>>,
    product_to_fare_products: HashMap<AgencyAndId, Box<[u32]>>,
}

impl Repository {
    /// Agency id every composite id of this feed is scoped by.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Scopes a feed-local id, e.g. `"4210813"` to `1_4210813`.
    pub fn scoped_id(&self, id: &str) -> AgencyAndId {
        AgencyAndId::new(self.scope.clone(), id)
    }

    pub fn agencies(&self) -> &Table<Agency> {
        &self.agencies
    }

    pub fn routes(&self) -> &Table<Route> {
        &self.routes
    }

    pub fn trips(&self) -> &Table<Trip> {
        &self.trips
    }

    pub fn stop_times(&self) -> &[StopTime] {
        &self.stop_times
    }

    pub fn stops(&self) -> &Table<Stop> {
        &self.stops
    }

    pub fn locations(&self) -> &Table<Location> {
        &self.locations
    }

    pub fn areas(&self) -> &Table<Area> {
        &self.areas
    }

    pub fn stop_areas(&self) -> &Table<StopArea> {
        &self.stop_areas
    }

    pub fn stop_area_elements(&self) -> &Table<StopAreaElement> {
        &self.stop_area_elements
    }

    pub fn fare_attributes(&self) -> &Table<FareAttribute> {
        &self.fare_attributes
    }

    pub fn fare_rules(&self) -> &[FareRule] {
        &self.fare_rules
    }

    pub fn fare_products(&self) -> &Table<FareProduct> {
        &self.fare_products
    }

    pub fn rider_categories(&self) -> &Table<RiderCategory> {
        &self.rider_categories
    }

    pub fn fare_media(&self) -> &Table<FareMedium> {
        &self.fare_media
    }

    pub fn fare_leg_rules(&self) -> &Table<FareLegRule> {
        &self.fare_leg_rules
    }

    pub fn fare_transfer_rules(&self) -> &Table<FareTransferRule> {
        &self.fare_transfer_rules
    }

    /// Number of entities of a kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Agency => self.agencies.len(),
            EntityKind::Route => self.routes.len(),
            EntityKind::Trip => self.trips.len(),
            EntityKind::StopTime => self.stop_times.len(),
            EntityKind::Stop => self.stops.len(),
            EntityKind::Location => self.locations.len(),
            EntityKind::Area => self.areas.len(),
            EntityKind::StopArea => self.stop_areas.len(),
            EntityKind::StopAreaElement => self.stop_area_elements.len(),
            EntityKind::FareAttribute => self.fare_attributes.len(),
            EntityKind::FareRule => self.fare_rules.len(),
            EntityKind::FareProduct => self.fare_products.len(),
            EntityKind::RiderCategory => self.rider_categories.len(),
            EntityKind::FareMedium => self.fare_media.len(),
            EntityKind::FareLegRule => self.fare_leg_rules.len(),
            EntityKind::FareTransferRule => self.fare_transfer_rules.len(),
        }
    }

    pub fn capabilities(&self) -> FeedCapabilities {
        FeedCapabilities {
            legacy_fares: self.has_legacy_fares(),
            fares_v2: self.has_fares_v2(),
            flex: self.has_flex(),
        }
    }

    pub fn has_legacy_fares(&self) -> bool {
        !self.fare_attributes.is_empty()
    }

    pub fn has_fares_v2(&self) -> bool {
        !self.fare_products.is_empty()
    }

    pub fn has_flex(&self) -> bool {
        !self.locations.is_empty() || !self.stop_areas.is_empty()
    }

    /// Returns the stop times of a trip, ordered by sequence.
    pub fn stop_times_for_trip(&self, trip: &Trip) -> &[StopTime] {
        let Some(slice) = self.trip_to_stop_times.get(trip.index as usize) else {
            return &[];
        };
        let start = slice.start_idx as usize;
        &self.stop_times[start..start + slice.count as usize]
    }

    /// Returns the stop times of the trip with the given feed-local id.
    /// If no trip was found with the given id None is returned.
    pub fn stop_times_by_trip_id(&self, trip_id: &str) -> Option<&[StopTime]> {
        let trip = self.trips.by_id(&self.scoped_id(trip_id))?;
        Some(self.stop_times_for_trip(trip))
    }

    pub fn trip_for_stop_time(&self, stop_time: &StopTime) -> Option<&Trip> {
        self.trips.linked(&stop_time.trip)
    }

    pub fn place_for_stop_time(&self, stop_time: &StopTime) -> Option<PlaceRef<'_>> {
        self.place(stop_time.place.get()?)
    }

    pub fn trips_for_route(&self, route: &Route) -> Vec<&Trip> {
        self.route_to_trips
            .get(route.index as usize)
            .map(|trips| trips.iter().map(|i| &self.trips[*i]).collect())
            .unwrap_or_default()
    }

    pub fn route_for_trip(&self, trip: &Trip) -> Option<&Route> {
        self.routes.linked(&trip.route)
    }

    pub fn agency_for_route(&self, route: &Route) -> Option<&Agency> {
        self.agencies.linked(&route.agency)
    }

    pub fn place(&self, place: Place) -> Option<PlaceRef<'_>> {
        Some(match place {
            Place::Stop(i) => PlaceRef::Stop(self.stops.get_index(i)?),
            Place::Location(i) => PlaceRef::Location(self.locations.get_index(i)?),
            Place::StopArea(i) => PlaceRef::StopArea(self.stop_areas.get_index(i)?),
        })
    }

    /// Looks an id up as a stop, then a location, then a stop area.
    pub fn place_by_id(&self, id: &AgencyAndId) -> Option<PlaceRef<'_>> {
        PLACE_TARGETS.iter().find_map(|kind| {
            let place = match kind {
                EntityKind::Stop => Place::Stop(self.stops.index_of(id)?),
                EntityKind::Location => Place::Location(self.locations.index_of(id)?),
                EntityKind::StopArea => Place::StopArea(self.stop_areas.index_of(id)?),
                _ => return None,
            };
            self.place(place)
        })
    }

    /// Member places of a stop area, in handle order.
    pub fn members(&self, stop_area: &StopArea) -> Vec<PlaceRef<'_>> {
        stop_area
            .members()
            .iter()
            .filter_map(|member| self.place(*member))
            .collect()
    }

    /// The stop area wrapping an area, if any element names the area.
    pub fn stop_area_for_area(&self, area: &Area) -> Option<&StopArea> {
        let index = (*self.area_to_stop_area.get(area.index as usize)?)?;
        self.stop_areas.get_index(index)
    }

    pub fn elements_for_area(&self, area: &Area) -> Vec<&StopAreaElement> {
        self.area_to_elements
            .get(area.index as usize)
            .map(|elements| {
                elements
                    .iter()
                    .map(|i| &self.stop_area_elements[*i])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Stop areas that list `place` as a direct member.
    pub fn stop_areas_containing(&self, place: Place) -> Vec<&StopArea> {
        self.place_to_stop_areas
            .get(&place)
            .map(|areas| areas.iter().map(|i| &self.stop_areas[*i]).collect())
            .unwrap_or_default()
    }

    /// Every rider category and medium variant of a `fare_product_id`.
    pub fn fare_products_by_product_id(&self, product_id: &AgencyAndId) -> Vec<&FareProduct> {
        self.product_to_fare_products
            .get(product_id)
            .map(|products| products.iter().map(|i| &self.fare_products[*i]).collect())
            .unwrap_or_default()
    }

    pub fn fare_products_for_leg_rule(&self, rule: &FareLegRule) -> Vec<&FareProduct> {
        rule.fare_product_id
            .as_ref()
            .map(|id| self.fare_products_by_product_id(id))
            .unwrap_or_default()
    }

    pub fn fare_products_for_transfer_rule(&self, rule: &FareTransferRule) -> Vec<&FareProduct> {
        rule.fare_product_id
            .as_ref()
            .map(|id| self.fare_products_by_product_id(id))
            .unwrap_or_default()
    }

    pub fn fare_rules_for_attribute(&self, fare: &FareAttribute) -> Vec<&FareRule> {
        self.fare_to_rules
            .get(fare.index as usize)
            .map(|rules| rules.iter().map(|i| &self.fare_rules[*i as usize]).collect())
            .unwrap_or_default()
    }
}
