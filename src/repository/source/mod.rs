//! Building a [`Repository`] from raw feed tables.
//!
//! Loading runs in two passes. The first turns every row into an entity and
//! keys it, leaving each reference as the token found in the feed. The
//! second starts once every table is in, and swaps each token for a handle
//! to the entity it names. A reference may therefore point at a row that is
//! read later, or sits in a table that is read later.

use std::{sync::Arc, time::Instant};

use tracing::{debug, info, warn};

use crate::{
    gtfs::{self, Config, Feed, GtfsReader},
    repository::{Entity, KeyPolicy, Link, Repository, Table},
    schema::{EntityKind, IdStrategy, Record, Schema},
    shared::AgencyAndId,
};

mod materialize;
mod resolve;

impl Repository {
    /// Materializes and resolves every table of `feed`.
    ///
    /// Any error aborts the load as a whole; there is no partially built
    /// repository.
    pub fn load(schema: &Schema, config: &Config, feed: &Feed) -> Result<Self, gtfs::Error> {
        let now = Instant::now();
        for table in feed.tables() {
            if schema.by_table(&table.name).is_none() {
                warn!("Ignoring unknown table {}", table.name);
            }
        }

        let source = Source::new(schema, config, feed)?;
        let mut repository = Repository {
            scope: source.scope.clone(),
            ..Default::default()
        };
        repository.materialize(&source)?;
        repository.resolve(schema)?;
        repository.build_lookups();

        let capabilities = repository.capabilities();
        info!(
            "Loaded feed {} in {:?}: {} routes, {} trips, {} stop times, {} stops, {} locations, {} stop areas, {} fare products (legacy fares: {}, fares v2: {}, flex: {})",
            repository.scope,
            now.elapsed(),
            repository.routes.len(),
            repository.trips.len(),
            repository.stop_times.len(),
            repository.stops.len(),
            repository.locations.len(),
            repository.stop_areas.len(),
            repository.fare_products.len(),
            capabilities.legacy_fares,
            capabilities.fares_v2,
            capabilities.flex,
        );
        Ok(repository)
    }

    /// Reads the feed behind `reader` and loads it with the reader's config.
    pub fn load_gtfs(schema: &Schema, reader: &GtfsReader) -> Result<Self, gtfs::Error> {
        let feed = reader.read()?;
        Self::load(schema, reader.config(), &feed)
    }
}

/// The feed being loaded, with the schema it is read against.
pub(super) struct Source<'a> {
    schema: &'a Schema,
    config: &'a Config,
    feed: &'a Feed,
    scope: Arc<str>,
}

impl<'a> Source<'a> {
    fn new(schema: &'a Schema, config: &'a Config, feed: &'a Feed) -> Result<Self, gtfs::Error> {
        let scope = feed_scope(config, feed)?;
        debug!("Scoping feed ids by agency {scope}");
        Ok(Self {
            schema,
            config,
            feed,
            scope,
        })
    }

    fn scoped(&self, id: &str) -> AgencyAndId {
        AgencyAndId::new(self.scope.clone(), id)
    }

    /// Coerces every row of `kind`'s table and hands it to `f`.
    /// Returns the number of rows seen.
    fn each<F>(&self, kind: EntityKind, mut f: F) -> Result<usize, gtfs::Error>
    where
        F: FnMut(&Record<'_>) -> Result<(), gtfs::Error>,
    {
        let entity = self.schema.entity(kind);
        let Some(table) = entity.table else {
            return Ok(0);
        };
        let mut count = 0;
        for (i, row) in self.feed.rows(table).enumerate() {
            let record = Record::new(entity, table, i + 1, row)?;
            f(&record)?;
            count += 1;
        }
        Ok(count)
    }

    /// Builds every row of `T`'s table into `table`, keyed the way the
    /// schema says.
    fn fill<T, F>(&self, table: &mut Table<T>, mut build: F) -> Result<(), gtfs::Error>
    where
        T: Entity,
        F: FnMut(&Record<'_>) -> Result<T, gtfs::Error>,
    {
        debug!("Loading {}...", T::KIND);
        let now = Instant::now();
        let policy = KeyPolicy::from(&self.schema.entity(T::KIND).id);
        let mut folded = 0;
        let rows = self.each(T::KIND, |record| {
            if table.insert(build(record)?, policy, record.number())?.is_none() {
                folded += 1;
            }
            Ok(())
        })?;
        if folded > 0 {
            debug!("Folded {folded} of {rows} {} rows into earlier ones", T::KIND);
        }
        debug!("Loading {} took {:?}", T::KIND, now.elapsed());
        Ok(())
    }

    /// Natural key of an explicitly keyed record, scoped.
    fn id(&self, record: &Record<'_>) -> Result<AgencyAndId, gtfs::Error> {
        match record.schema().id {
            IdStrategy::Explicit { column } => record
                .text(column)
                .map(|id| self.scoped(id))
                .ok_or_else(|| record.malformed(column, "", "identifier is missing")),
            _ => Ok(self.scoped(&self.synthesized(record))),
        }
    }

    /// Key built from the record's template, with the feed scope applied to
    /// the parts that take it.
    fn synthesized(&self, record: &Record<'_>) -> String {
        record
            .schema()
            .template()
            .map(|template| template.render_scoped(&self.scope, &record.id_values()))
            .unwrap_or_default()
    }

    /// The unresolved link named `name`; a required one must have a token.
    fn link<T>(&self, record: &Record<'_>, name: &str) -> Result<Link<T>, gtfs::Error> {
        let token = record.token(name);
        if token.is_none()
            && let Some(fk) = record.schema().foreign_key(name)
            && fk.required
        {
            return Err(record.malformed(
                &fk.columns.join("|"),
                "",
                "required reference is missing",
            ));
        }
        Ok(Link::pending(token))
    }
}

/// The agency id composite ids are scoped by: the configured one, else the
/// first agency's id, else its name.
fn feed_scope(config: &Config, feed: &Feed) -> Result<Arc<str>, gtfs::Error> {
    if let Some(id) = config.default_agency_id.as_deref() {
        return Ok(id.into());
    }
    let agency = feed.rows("agency").next().ok_or(gtfs::Error::MissingAgency)?;
    ["agency_id", "agency_name"]
        .into_iter()
        .filter_map(|column| agency.get(column))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(Arc::from)
        .ok_or(gtfs::Error::MissingAgency)
}
