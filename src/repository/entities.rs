use std::sync::Arc;

use crate::{
    repository::{Entity, Link, Place},
    schema::{EntityKind, MISSING_VALUE},
    shared::{AgencyAndId, Coordinate, Identifiable, Time},
};

macro_rules! impl_entity {
    ($name:ident, $key:ty) => {
        impl Entity for $name {
            const KIND: EntityKind = EntityKind::$name;
            type Key = $key;

            fn key(&self) -> &Self::Key {
                &self.id
            }

            fn set_index(&mut self, index: u32) {
                self.index = index;
            }
        }
    };
}

/// The operator of the feed's services, and the scope of every id in it.
#[derive(Debug, Default, Clone)]
pub struct Agency {
    pub index: u32,
    /// `agency_id`, or the agency name when the feed omits it.
    pub id: Arc<str>,
    pub name: Arc<str>,
    pub url: Arc<str>,
    pub timezone: Arc<str>,
    pub lang: Option<Arc<str>>,
    pub phone: Option<Arc<str>>,
    pub fare_url: Option<Arc<str>>,
    pub email: Option<Arc<str>>,
}

impl_entity!(Agency, Arc<str>);

/// A grouping of trips that are displayed to riders under a single name (e.g., "Blue Line").
#[derive(Debug, Default, Clone)]
pub struct Route {
    pub index: u32,
    pub id: AgencyAndId,
    /// Operating [`Agency`], the feed agency when the row names none.
    pub agency: Link<u32>,
    pub short_name: Option<Arc<str>>,
    pub long_name: Option<Arc<str>>,
    pub desc: Option<Arc<str>>,
    /// Classification of the vehicle (0: Tram, 1: Subway, 3: Bus, etc.).
    pub route_type: i64,
    pub url: Option<Arc<str>>,
    pub color: Option<Arc<str>>,
    pub text_color: Option<Arc<str>>,
    pub sort_order: Option<i64>,
    /// Network the route belongs to for fare leg matching.
    pub network_id: Option<Arc<str>>,
}

impl_entity!(Route, AgencyAndId);

/// A specific journey taken by a vehicle through a sequence of places.
#[derive(Debug, Default, Clone)]
pub struct Trip {
    pub index: u32,
    pub id: AgencyAndId,
    /// Pointer to the parent [`Route`].
    pub route: Link<u32>,
    pub service_id: Arc<str>,
    pub headsign: Option<Arc<str>>,
    pub short_name: Option<Arc<str>>,
    pub direction_id: Option<u8>,
    pub block_id: Option<Arc<str>>,
    pub shape_id: Option<Arc<str>>,
    pub wheelchair_accessible: Option<u8>,
    pub bikes_allowed: Option<u8>,
}

impl_entity!(Trip, AgencyAndId);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Timepoint {
    Approximate,
    #[default]
    Exact,
}

impl From<Option<i64>> for Timepoint {
    fn from(value: Option<i64>) -> Self {
        match value {
            Some(0) => Self::Approximate,
            _ => Self::Exact,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StopAccessType {
    #[default]
    Regularly,
    NoneAvailable,
    AgencyArrange,
    DriverArrange,
}

impl From<i64> for StopAccessType {
    fn from(value: i64) -> Self {
        match value {
            1 => Self::NoneAvailable,
            2 => Self::AgencyArrange,
            3 => Self::DriverArrange,
            _ => Self::Regularly,
        }
    }
}

/// Individual event within a trip where a vehicle calls at a place.
#[derive(Debug, Default, Clone)]
pub struct StopTime {
    /// Position in the repository's stop time list, which is grouped by trip
    /// and ordered by sequence within each trip.
    pub index: u32,
    pub trip: Link<u32>,
    /// The [`Stop`], [`Location`] or [`StopArea`](super::StopArea) called at.
    pub place: Link<Place>,
    pub sequence: u32,
    pub arrival_time: Option<Time>,
    pub departure_time: Option<Time>,
    pub headsign: Option<Arc<str>>,
    /// Flex service window, used instead of arrival/departure times.
    pub start_pickup_drop_off_window: Option<Time>,
    pub end_pickup_drop_off_window: Option<Time>,
    pub pickup_type: StopAccessType,
    pub drop_off_type: StopAccessType,
    pub dist_traveled: Option<f64>,
    pub timepoint: Timepoint,
    pub pickup_booking_rule_id: Option<Arc<str>>,
    pub drop_off_booking_rule_id: Option<Arc<str>>,
}

/// Categorizes the specific nature of a stop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LocationType {
    /// A standard bus stop or platform.
    #[default]
    Stop,
    /// A major transit hub or rail station containing multiple platforms.
    Station,
    /// A specific physical entrance to a station.
    Entrance,
    /// A generic node in the transit network (often used for logical junctions).
    Node,
    /// A specific designated boarding point.
    Boarding,
}

impl From<i64> for LocationType {
    fn from(value: i64) -> Self {
        match value {
            1 => Self::Station,
            2 => Self::Entrance,
            3 => Self::Node,
            4 => Self::Boarding,
            _ => Self::Stop,
        }
    }
}

/// A physical point where passengers can board or alight from a vehicle.
#[derive(Debug, Default, Clone)]
pub struct Stop {
    pub index: u32,
    pub id: AgencyAndId,
    pub code: Option<Arc<str>>,
    /// Human-readable name (e.g., "Main St & 4th Ave").
    pub name: Option<Arc<str>>,
    pub desc: Option<Arc<str>>,
    pub coordinate: Option<Coordinate>,
    pub zone_id: Option<Arc<str>>,
    pub url: Option<Arc<str>>,
    pub location_type: LocationType,
    /// Enclosing station, when the feed names one that exists.
    pub parent_station: Link<u32>,
    pub wheelchair_boarding: Option<u8>,
    /// The alphanumeric code for the platform (e.g., "4B").
    pub platform_code: Option<Arc<str>>,
}

impl_entity!(Stop, AgencyAndId);

impl Identifiable for Stop {
    fn id(&self) -> &AgencyAndId {
        &self.id
    }

    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// A flex zone: a polygon riders can be picked up or dropped off anywhere in.
#[derive(Debug, Default, Clone)]
pub struct Location {
    pub index: u32,
    pub id: AgencyAndId,
    pub name: Option<Arc<str>>,
    pub desc: Option<Arc<str>>,
    pub zone_id: Option<Arc<str>>,
    pub url: Option<Arc<str>>,
    /// GeoJSON geometry, kept as read.
    pub geometry: Option<Arc<str>>,
}

impl_entity!(Location, AgencyAndId);

impl Identifiable for Location {
    fn id(&self) -> &AgencyAndId {
        &self.id
    }

    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// A named grouping of places.
///
/// An area is not a place by itself; trips reach it through the
/// [`StopArea`](super::StopArea) that wraps it.
#[derive(Debug, Default, Clone)]
pub struct Area {
    pub index: u32,
    pub id: AgencyAndId,
    pub name: Option<Arc<str>>,
}

impl_entity!(Area, AgencyAndId);

/// One `stop_areas.txt` row: membership of a place in an area.
#[derive(Debug, Default, Clone)]
pub struct StopAreaElement {
    pub index: u32,
    /// `<area_id>_<stop_id>`, kept per row even when two rows collide.
    pub id: AgencyAndId,
    pub area: Link<u32>,
    pub place: Link<Place>,
}

impl_entity!(StopAreaElement, AgencyAndId);

/// Legacy fare class from `fare_attributes.txt`.
#[derive(Debug, Default, Clone)]
pub struct FareAttribute {
    pub index: u32,
    pub id: AgencyAndId,
    pub price: f64,
    pub currency: Arc<str>,
    /// 0: paid on board, 1: paid before boarding.
    pub payment_method: u8,
    /// Number of transfers permitted, `None` for unlimited.
    pub transfers: Option<u8>,
    pub agency: Link<u32>,
    /// Seconds before a transfer expires.
    pub transfer_duration: Option<i64>,
}

impl_entity!(FareAttribute, AgencyAndId);

/// Legacy rule applying a [`FareAttribute`] to a route or zones.
#[derive(Debug, Default, Clone)]
pub struct FareRule {
    pub index: u32,
    pub fare: Link<u32>,
    pub route: Link<u32>,
    pub origin_id: Option<Arc<str>>,
    pub destination_id: Option<Arc<str>>,
    pub contains_id: Option<Arc<str>>,
}

#[derive(Debug, Default, Clone)]
pub struct FareProduct {
    pub index: u32,
    /// `id=<product>|category=<category>|medium=<medium>`.
    pub id: AgencyAndId,
    /// `fare_product_id` as written; shared by every category/medium variant.
    pub product_id: AgencyAndId,
    pub name: Option<Arc<str>>,
    pub rider_category: Link<u32>,
    pub fare_medium: Link<u32>,
    pub amount: f64,
    pub currency: Arc<str>,
    pub duration_start: Option<u8>,
    pub duration_amount: Option<i64>,
    pub duration_unit: Option<u8>,
    pub duration_type: Option<u8>,
}

impl_entity!(FareProduct, AgencyAndId);

#[derive(Debug, Default, Clone)]
pub struct RiderCategory {
    pub index: u32,
    pub id: AgencyAndId,
    pub name: Option<Arc<str>>,
    /// [`MISSING_VALUE`] when not specified.
    pub min_age: i64,
    /// [`MISSING_VALUE`] when not specified.
    pub max_age: i64,
    pub eligibility_url: Option<Arc<str>>,
    pub is_default: bool,
}

impl_entity!(RiderCategory, AgencyAndId);

impl RiderCategory {
    pub fn min_age(&self) -> Option<i64> {
        (self.min_age != MISSING_VALUE).then_some(self.min_age)
    }

    pub fn max_age(&self) -> Option<i64> {
        (self.max_age != MISSING_VALUE).then_some(self.max_age)
    }
}

#[derive(Debug, Default, Clone)]
pub struct FareMedium {
    pub index: u32,
    pub id: AgencyAndId,
    pub name: Option<Arc<str>>,
    pub media_type: Option<u8>,
}

impl_entity!(FareMedium, AgencyAndId);

/// Fares v2 rule pricing a single leg.
#[derive(Debug, Default, Clone)]
pub struct FareLegRule {
    pub index: u32,
    /// `groupId=..|product=..|network=..|fromArea=..|toArea=..`.
    pub id: Arc<str>,
    /// Free-form; leg groups are not declared anywhere else in the feed.
    pub leg_group_id: Option<AgencyAndId>,
    pub network_id: Option<Arc<str>>,
    pub from_area: Link<u32>,
    pub to_area: Link<u32>,
    pub from_timeframe_group_id: Option<Arc<str>>,
    pub to_timeframe_group_id: Option<Arc<str>>,
    pub fare_product_id: Option<AgencyAndId>,
    pub rule_priority: Option<i64>,
    pub min_distance: Option<f64>,
    pub max_distance: Option<f64>,
    pub distance_type: Option<u8>,
}

impl_entity!(FareLegRule, Arc<str>);

/// Fares v2 rule pricing a transfer between two legs.
#[derive(Debug, Default, Clone)]
pub struct FareTransferRule {
    pub index: u32,
    /// `<from>_<to>_<type>_<count>_<duration>`.
    pub id: Arc<str>,
    pub from_leg_group_id: Option<AgencyAndId>,
    pub to_leg_group_id: Option<AgencyAndId>,
    /// [`MISSING_VALUE`] when the feed leaves it blank.
    pub transfer_count: i64,
    /// Seconds, [`MISSING_VALUE`] when the feed leaves it blank.
    pub duration_limit: i64,
    pub duration_limit_type: Option<u8>,
    pub fare_transfer_type: Option<u8>,
    pub fare_product_id: Option<AgencyAndId>,
}

impl_entity!(FareTransferRule, Arc<str>);

impl FareTransferRule {
    pub fn transfer_count(&self) -> Option<i64> {
        (self.transfer_count != MISSING_VALUE).then_some(self.transfer_count)
    }

    pub fn duration_limit(&self) -> Option<i64> {
        (self.duration_limit != MISSING_VALUE).then_some(self.duration_limit)
    }
}
