use std::collections::BTreeSet;

use crate::{
    gtfs,
    repository::{Area, Entity, Location, Stop, Table},
    schema::EntityKind,
    shared::{AgencyAndId, Identifiable},
};

/// Handle to anything a stop time or an area member can point at.
///
/// The wrapped value is the index into the table of that kind. Ordering is
/// by variant, then index, which keeps member sets deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Place {
    Stop(u32),
    Location(u32),
    StopArea(u32),
}

impl Place {
    pub fn kind(&self) -> EntityKind {
        match self {
            Place::Stop(_) => EntityKind::Stop,
            Place::Location(_) => EntityKind::Location,
            Place::StopArea(_) => EntityKind::StopArea,
        }
    }

    pub(crate) fn from_kind(kind: EntityKind, index: u32) -> Option<Self> {
        match kind {
            EntityKind::Stop => Some(Place::Stop(index)),
            EntityKind::Location => Some(Place::Location(index)),
            EntityKind::StopArea => Some(Place::StopArea(index)),
            _ => None,
        }
    }
}

/// A borrowed place, as returned by the repository.
#[derive(Debug, Clone, Copy)]
pub enum PlaceRef<'a> {
    Stop(&'a Stop),
    Location(&'a Location),
    StopArea(&'a StopArea),
}

impl<'a> PlaceRef<'a> {
    /// Id of the underlying entity, borrowed from the repository.
    pub fn id(&self) -> &'a AgencyAndId {
        match *self {
            PlaceRef::Stop(stop) => stop.id(),
            PlaceRef::Location(location) => location.id(),
            PlaceRef::StopArea(stop_area) => stop_area.id(),
        }
    }

    pub fn name(&self) -> &'a str {
        match *self {
            PlaceRef::Stop(stop) => stop.name(),
            PlaceRef::Location(location) => location.name(),
            PlaceRef::StopArea(stop_area) => stop_area.name(),
        }
    }

    pub fn place(&self) -> Place {
        match self {
            PlaceRef::Stop(stop) => Place::Stop(stop.index),
            PlaceRef::Location(location) => Place::Location(location.index),
            PlaceRef::StopArea(stop_area) => Place::StopArea(stop_area.index),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.place().kind()
    }
}

impl Identifiable for PlaceRef<'_> {
    fn id(&self) -> &AgencyAndId {
        PlaceRef::id(self)
    }

    fn name(&self) -> &str {
        PlaceRef::name(self)
    }
}

/// An [`Area`] made usable as a place.
///
/// Id and name are the area's; there is no way to give a stop area an
/// identity of its own. Members form a set, adding one twice is a no-op.
#[derive(Debug, Clone)]
pub struct StopArea {
    pub(crate) index: u32,
    area: Area,
    members: BTreeSet<Place>,
}

impl StopArea {
    pub(crate) fn new(area: Area) -> Self {
        Self {
            index: u32::MAX,
            area,
            members: BTreeSet::new(),
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn area(&self) -> &Area {
        &self.area
    }

    pub fn members(&self) -> &BTreeSet<Place> {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, place: &Place) -> bool {
        self.members.contains(place)
    }

    /// Returns false when `place` already was a member.
    pub(crate) fn add_member(&mut self, place: Place) -> bool {
        self.members.insert(place)
    }
}

impl Identifiable for StopArea {
    fn id(&self) -> &AgencyAndId {
        &self.area.id
    }

    fn name(&self) -> &str {
        self.area.name.as_deref().unwrap_or_default()
    }
}

impl Entity for StopArea {
    const KIND: EntityKind = EntityKind::StopArea;
    type Key = AgencyAndId;

    fn key(&self) -> &AgencyAndId {
        &self.area.id
    }

    fn set_index(&mut self, index: u32) {
        self.index = index;
    }
}

/// Whether `target` is `from` or one of its transitive stop area members.
fn reaches(stop_areas: &Table<StopArea>, from: u32, target: u32) -> bool {
    let mut stack = vec![from];
    let mut seen = BTreeSet::new();
    while let Some(current) = stack.pop() {
        if current == target {
            return true;
        }
        if !seen.insert(current) {
            continue;
        }
        if let Some(stop_area) = stop_areas.get_index(current) {
            stack.extend(stop_area.members.iter().filter_map(|member| match member {
                Place::StopArea(index) => Some(*index),
                _ => None,
            }));
        }
    }
    false
}

/// Adds `member` to the stop area at `area`, refusing any addition that
/// would make the area reach itself.
pub(crate) fn add_member(
    stop_areas: &mut Table<StopArea>,
    area: u32,
    member: Place,
) -> Result<bool, gtfs::Error> {
    if let Place::StopArea(nested) = member
        && reaches(stop_areas, nested, area)
    {
        return Err(gtfs::Error::CyclicMembership {
            area: stop_areas[area].id().to_string(),
            member: stop_areas[nested].id().to_string(),
        });
    }
    Ok(stop_areas.rows_mut()[area as usize].add_member(member))
}
