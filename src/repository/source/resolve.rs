use std::{collections::HashMap, time::Instant};

use rayon::prelude::*;
use tracing::debug;

use crate::{
    gtfs,
    repository::{
        FareAttribute, FareLegRule, FareProduct, FareRule, KeyPolicy, Link, Place, Repository,
        Route, Slice, Stop, StopArea, StopAreaElement, StopTime, Trip, place,
    },
    schema::{EntityKind, ForeignKey, Schema},
};

/// Entities with single-target links, addressed by foreign key name.
trait Links {
    const KIND: EntityKind;

    fn link(&self, name: &str) -> Option<&Link<u32>>;
    fn link_mut(&mut self, name: &str) -> Option<&mut Link<u32>>;
    /// Identifies the entity in error reports.
    fn describe(&self) -> String;
}

macro_rules! impl_links {
    ($name:ident { $($fk:literal => $field:ident),+ }, $this:ident => $describe:expr) => {
        impl Links for $name {
            const KIND: EntityKind = EntityKind::$name;

            fn link(&self, name: &str) -> Option<&Link<u32>> {
                match name {
                    $($fk => Some(&self.$field),)+
                    _ => None,
                }
            }

            fn link_mut(&mut self, name: &str) -> Option<&mut Link<u32>> {
                match name {
                    $($fk => Some(&mut self.$field),)+
                    _ => None,
                }
            }

            fn describe(&self) -> String {
                let $this = self;
                $describe
            }
        }
    };
}

impl_links!(Route { "agency" => agency }, route => route.id.to_string());
impl_links!(Trip { "route" => route }, trip => trip.id.to_string());
impl_links!(Stop { "parent_station" => parent_station }, stop => stop.id.to_string());
impl_links!(StopAreaElement { "area" => area }, element => element.id.to_string());
impl_links!(StopTime { "trip" => trip }, stop_time => format!("row {}", stop_time.index + 1));
impl_links!(FareAttribute { "agency" => agency }, fare => fare.id.to_string());
impl_links!(FareRule { "fare" => fare, "route" => route }, rule => format!("row {}", rule.index + 1));
impl_links!(
    FareProduct { "rider_category" => rider_category, "fare_medium" => fare_medium },
    product => product.id.to_string()
);
impl_links!(
    FareLegRule { "from_area" => from_area, "to_area" => to_area },
    rule => rule.id.to_string()
);

/// Rewrites a pending link into its target, or into `Unset` when an optional
/// one finds nothing.
fn resolve<T: Clone>(
    link: &Link<T>,
    fk: &ForeignKey,
    kind: EntityKind,
    owner: impl FnOnce() -> String,
    find: impl FnOnce(&str) -> Option<T>,
) -> Result<Link<T>, gtfs::Error> {
    let Link::Pending(token) = link else {
        return Ok(link.clone());
    };
    match find(token) {
        Some(target) => Ok(Link::Resolved(target)),
        None if fk.required => Err(gtfs::Error::DanglingReference {
            kind,
            id: owner(),
            field: fk.name.to_string(),
            token: token.to_string(),
        }),
        None => Ok(Link::Unset),
    }
}

impl Repository {
    /// Second pass: every pending link is rewritten to its target.
    pub(super) fn resolve(&mut self, schema: &Schema) -> Result<(), gtfs::Error> {
        debug!("Resolving references...");
        let now = Instant::now();

        let links = self.resolve_rows(schema, self.routes.all())?;
        apply(schema, self.routes.rows_mut(), links);
        let links = self.resolve_rows(schema, self.trips.all())?;
        apply(schema, self.trips.rows_mut(), links);
        let links = self.resolve_rows(schema, self.stops.all())?;
        apply(schema, self.stops.rows_mut(), links);
        let links = self.resolve_rows(schema, self.stop_area_elements.all())?;
        apply(schema, self.stop_area_elements.rows_mut(), links);
        let links = self.resolve_rows(schema, &self.stop_times)?;
        apply(schema, &mut self.stop_times, links);
        let links = self.resolve_rows(schema, self.fare_attributes.all())?;
        apply(schema, self.fare_attributes.rows_mut(), links);
        let links = self.resolve_rows(schema, &self.fare_rules)?;
        apply(schema, &mut self.fare_rules, links);
        let links = self.resolve_rows(schema, self.fare_products.all())?;
        apply(schema, self.fare_products.rows_mut(), links);
        let links = self.resolve_rows(schema, self.fare_leg_rules.all())?;
        apply(schema, self.fare_leg_rules.rows_mut(), links);

        self.wrap_areas()?;
        self.resolve_memberships(schema)?;
        self.resolve_stop_time_places(schema)?;

        debug!("Resolving references took {:?}", now.elapsed());
        Ok(())
    }

    /// Index of the entity of `kind` the token names. Agencies are keyed by
    /// the bare token, everything else by the scoped id.
    fn index_of(&self, kind: EntityKind, token: &str) -> Option<u32> {
        let id = self.scoped_id(token);
        match kind {
            EntityKind::Agency => self.agencies.index_of(token),
            EntityKind::Route => self.routes.index_of(&id),
            EntityKind::Trip => self.trips.index_of(&id),
            EntityKind::Stop => self.stops.index_of(&id),
            EntityKind::Location => self.locations.index_of(&id),
            EntityKind::Area => self.areas.index_of(&id),
            EntityKind::StopArea => self.stop_areas.index_of(&id),
            EntityKind::StopAreaElement => self.stop_area_elements.index_of(&id),
            EntityKind::FareAttribute => self.fare_attributes.index_of(&id),
            EntityKind::FareProduct => self.fare_products.index_of(&id),
            EntityKind::RiderCategory => self.rider_categories.index_of(&id),
            EntityKind::FareMedium => self.fare_media.index_of(&id),
            EntityKind::FareLegRule => self.fare_leg_rules.index_of(token),
            EntityKind::FareTransferRule => self.fare_transfer_rules.index_of(token),
            EntityKind::StopTime | EntityKind::FareRule => None,
        }
    }

    /// Tries the targets in declared order; the first kind that knows the
    /// token wins.
    fn find(&self, targets: &[EntityKind], token: &str) -> Option<(EntityKind, u32)> {
        targets
            .iter()
            .find_map(|kind| Some((*kind, self.index_of(*kind, token)?)))
    }

    fn find_place(&self, fk: &ForeignKey, token: &str) -> Option<Place> {
        let (kind, index) = self.find(fk.targets, token)?;
        Place::from_kind(kind, index)
    }

    /// Resolved links of every row, one per foreign key of the row's kind.
    fn resolve_rows<T: Links>(
        &self,
        schema: &Schema,
        rows: &[T],
    ) -> Result<Vec<Vec<Link<u32>>>, gtfs::Error> {
        let foreign_keys = schema.entity(T::KIND).foreign_keys;
        rows.iter()
            .map(|row| {
                foreign_keys
                    .iter()
                    .map(|fk| match row.link(fk.name) {
                        Some(link) => resolve(
                            link,
                            fk,
                            T::KIND,
                            || row.describe(),
                            |token| self.find(fk.targets, token).map(|(_, index)| index),
                        ),
                        None => Ok(Link::Unset),
                    })
                    .collect()
            })
            .collect()
    }

    /// Wraps every area named by a membership row into a stop area, in the
    /// order the areas are first named.
    fn wrap_areas(&mut self) -> Result<(), gtfs::Error> {
        let mut area_to_stop_area: Vec<Option<u32>> = vec![None; self.areas.len()];
        for element in self.stop_area_elements.iter() {
            let Some(area) = element.area.get() else {
                continue;
            };
            if area_to_stop_area[area as usize].is_some() {
                continue;
            }
            let stop_area = StopArea::new(self.areas[area].clone());
            area_to_stop_area[area as usize] =
                self.stop_areas
                    .insert(stop_area, KeyPolicy::Unique, element.index as usize + 1)?;
        }
        debug!("Wrapped {} areas into stop areas", self.stop_areas.len());
        self.area_to_stop_area = area_to_stop_area.into();
        Ok(())
    }

    fn resolve_memberships(&mut self, schema: &Schema) -> Result<(), gtfs::Error> {
        let Some(fk) = schema.entity(EntityKind::StopAreaElement).foreign_key("stop") else {
            return Ok(());
        };
        let places = self
            .stop_area_elements
            .iter()
            .map(|element| {
                resolve(
                    &element.place,
                    fk,
                    EntityKind::StopAreaElement,
                    || element.id.to_string(),
                    |token| self.find_place(fk, token),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (i, place) in places.into_iter().enumerate() {
            let element = &mut self.stop_area_elements.rows_mut()[i];
            element.place = place;
            let (Some(area), Some(member)) = (element.area.get(), element.place.get()) else {
                continue;
            };
            if let Some(stop_area) = self.area_to_stop_area[area as usize] {
                place::add_member(&mut self.stop_areas, stop_area, member)?;
            }
        }
        Ok(())
    }

    fn resolve_stop_time_places(&mut self, schema: &Schema) -> Result<(), gtfs::Error> {
        let Some(fk) = schema.entity(EntityKind::StopTime).foreign_key("stop") else {
            return Ok(());
        };
        let places = self
            .stop_times
            .iter()
            .map(|stop_time| {
                resolve(
                    &stop_time.place,
                    fk,
                    EntityKind::StopTime,
                    || stop_time.describe(),
                    |token| self.find_place(fk, token),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        for (stop_time, place) in self.stop_times.iter_mut().zip(places) {
            stop_time.place = place;
        }
        Ok(())
    }

    /// Derived joins over the resolved graph.
    pub(super) fn build_lookups(&mut self) {
        debug!("Building lookups...");
        let now = Instant::now();

        // Stable, so stop times sharing a sequence keep their row order
        let mut stop_times = std::mem::take(&mut self.stop_times).into_vec();
        stop_times.par_sort_by_key(|stop_time| {
            (stop_time.trip.get().unwrap_or(u32::MAX), stop_time.sequence)
        });
        let mut trip_to_stop_times: Vec<Slice> = vec![Slice::default(); self.trips.len()];
        for (i, stop_time) in stop_times.iter_mut().enumerate() {
            stop_time.index = i as u32;
            let Some(trip) = stop_time.trip.get() else {
                continue;
            };
            let slice = &mut trip_to_stop_times[trip as usize];
            if slice.count == 0 {
                slice.start_idx = i as u32;
            }
            slice.count += 1;
        }
        self.stop_times = stop_times.into();
        self.trip_to_stop_times = trip_to_stop_times.into();

        let mut route_to_trips: Vec<Vec<u32>> = vec![Vec::new(); self.routes.len()];
        for trip in self.trips.iter() {
            if let Some(route) = trip.route.get() {
                route_to_trips[route as usize].push(trip.index);
            }
        }
        self.route_to_trips = route_to_trips.into_iter().map(|val| val.into()).collect();

        let mut area_to_elements: Vec<Vec<u32>> = vec![Vec::new(); self.areas.len()];
        for element in self.stop_area_elements.iter() {
            if let Some(area) = element.area.get() {
                area_to_elements[area as usize].push(element.index);
            }
        }
        self.area_to_elements = area_to_elements.into_iter().map(|val| val.into()).collect();

        let mut place_to_stop_areas: HashMap<Place, Vec<u32>> = HashMap::new();
        for stop_area in self.stop_areas.iter() {
            for member in stop_area.members() {
                place_to_stop_areas
                    .entry(*member)
                    .or_default()
                    .push(stop_area.index());
            }
        }
        self.place_to_stop_areas = place_to_stop_areas
            .into_iter()
            .map(|(place, areas)| (place, areas.into()))
            .collect();

        let mut fare_to_rules: Vec<Vec<u32>> = vec![Vec::new(); self.fare_attributes.len()];
        for rule in self.fare_rules.iter() {
            if let Some(fare) = rule.fare.get() {
                fare_to_rules[fare as usize].push(rule.index);
            }
        }
        self.fare_to_rules = fare_to_rules.into_iter().map(|val| val.into()).collect();

        let mut product_to_fare_products = HashMap::new();
        for product in self.fare_products.iter() {
            product_to_fare_products
                .entry(product.product_id.clone())
                .or_insert_with(Vec::new)
                .push(product.index);
        }
        self.product_to_fare_products = product_to_fare_products
            .into_iter()
            .map(|(id, products)| (id, products.into()))
            .collect();

        debug!("Building lookups took {:?}", now.elapsed());
    }
}

/// Writes resolved links back, in the order [`Repository::resolve_rows`]
/// produced them.
fn apply<T: Links>(schema: &Schema, rows: &mut [T], links: Vec<Vec<Link<u32>>>) {
    let foreign_keys = schema.entity(T::KIND).foreign_keys;
    for (row, links) in rows.iter_mut().zip(links) {
        for (fk, link) in foreign_keys.iter().zip(links) {
            if let Some(slot) = row.link_mut(fk.name) {
                *slot = link;
            }
        }
    }
}
