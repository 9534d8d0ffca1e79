pub mod gtfs;
pub mod repository;
pub mod schema;
pub mod shared;

pub mod prelude {
    pub use crate::gtfs::{Config, Error, Feed, GtfsReader, Row, Table as RawTable};
    pub use crate::repository::{
        FeedCapabilities, Link, Place, PlaceRef, Repository, StopArea, Table,
    };
    pub use crate::schema::{EntityKind, MISSING_VALUE, NULL_TOKEN, Schema};
    pub use crate::shared::{AgencyAndId, Coordinate, Identifiable, Time};
}
