//! Entity schema registry.
//!
//! Declares, per entity kind, the table it is read from, its typed fields,
//! its links to other kinds and how its identifier is obtained. The
//! registry is built once with [`Schema::standard`] and only read after
//! that; loaders take it by reference.

use std::fmt::Display;

mod coerce;
mod standard;
mod synth;
pub use coerce::*;
pub use standard::{MISSING_VALUE, PLACE_TARGETS};
pub use synth::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Agency,
    Route,
    Trip,
    StopTime,
    Stop,
    Location,
    Area,
    StopArea,
    StopAreaElement,
    FareAttribute,
    FareRule,
    FareProduct,
    RiderCategory,
    FareMedium,
    FareLegRule,
    FareTransferRule,
}

impl EntityKind {
    pub const ALL: [EntityKind; 16] = [
        EntityKind::Agency,
        EntityKind::Route,
        EntityKind::Trip,
        EntityKind::StopTime,
        EntityKind::Stop,
        EntityKind::Location,
        EntityKind::Area,
        EntityKind::StopArea,
        EntityKind::StopAreaElement,
        EntityKind::FareAttribute,
        EntityKind::FareRule,
        EntityKind::FareProduct,
        EntityKind::RiderCategory,
        EntityKind::FareMedium,
        EntityKind::FareLegRule,
        EntityKind::FareTransferRule,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            EntityKind::Agency => "Agency",
            EntityKind::Route => "Route",
            EntityKind::Trip => "Trip",
            EntityKind::StopTime => "StopTime",
            EntityKind::Stop => "Stop",
            EntityKind::Location => "Location",
            EntityKind::Area => "Area",
            EntityKind::StopArea => "StopArea",
            EntityKind::StopAreaElement => "StopAreaElement",
            EntityKind::FareAttribute => "FareAttribute",
            EntityKind::FareRule => "FareRule",
            EntityKind::FareProduct => "FareProduct",
            EntityKind::RiderCategory => "RiderCategory",
            EntityKind::FareMedium => "FareMedium",
            EntityKind::FareLegRule => "FareLegRule",
            EntityKind::FareTransferRule => "FareTransferRule",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Int,
    Float,
    /// Enumerated integer code, valid within `min..=max`.
    Code { min: i64, max: i64 },
    /// `HH:MM:SS`, hours may exceed 23.
    Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    /// Absent or empty maps to the given value instead of to nothing.
    Default(i64),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub presence: Presence,
}

impl FieldSpec {
    pub const fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            presence: Presence::Required,
        }
    }

    pub const fn optional(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            presence: Presence::Optional,
        }
    }

    pub const fn defaulted(name: &'static str, ty: FieldType, default: i64) -> Self {
        Self {
            name,
            ty,
            presence: Presence::Default(default),
        }
    }
}

/// A field that names another entity.
///
/// The token is taken from the first of `columns` holding a value and is
/// looked up in `targets` in order; the first kind that knows it wins.
#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    pub targets: &'static [EntityKind],
    pub required: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum IdStrategy {
    /// Natural key read from a column. Two rows with the same key fail the load.
    Explicit { column: &'static str },
    /// Key built from other fields.
    /// `dedupe` collapses rows with equal keys into the first one, otherwise
    /// every row keeps its own identity.
    Synthesized { template: IdTemplate, dedupe: bool },
    /// Records only reachable through their owner.
    Anonymous,
}

#[derive(Debug, Clone, Copy)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub table: Option<&'static str>,
    pub fields: &'static [FieldSpec],
    pub foreign_keys: &'static [ForeignKey],
    pub id: IdStrategy,
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<(usize, &FieldSpec)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.name == name)
    }

    pub fn foreign_key(&self, name: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.name == name)
    }

    pub fn template(&self) -> Option<&IdTemplate> {
        match &self.id {
            IdStrategy::Synthesized { template, .. } => Some(template),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Schema {
    // Indexed by `EntityKind as usize`
    entities: Box<[EntitySchema]>,
}

impl Schema {
    /// The GTFS schema with the Fares v1, Fares v2 and Flex extensions.
    pub fn standard() -> Self {
        let entities = EntityKind::ALL
            .iter()
            .map(|kind| standard::entity(*kind))
            .collect();
        Self { entities }
    }

    pub fn entity(&self, kind: EntityKind) -> &EntitySchema {
        &self.entities[kind as usize]
    }

    pub fn entities(&self) -> &[EntitySchema] {
        &self.entities
    }

    pub fn by_table(&self, table: &str) -> Option<&EntitySchema> {
        self.entities
            .iter()
            .find(|entity| entity.table == Some(table))
    }

    /// Builds the identifier of a synthesized-key kind from its field
    /// values, given in template order. `None` for kinds with other keys.
    pub fn synthesize<S: AsRef<str>>(&self, kind: EntityKind, values: &[Option<S>]) -> Option<String> {
        self.entity(kind)
            .template()
            .map(|template| template.render(values))
    }
}
