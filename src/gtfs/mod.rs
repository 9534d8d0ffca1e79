use std::io;
use thiserror::Error;

use crate::schema::EntityKind;

mod config;
mod data;
mod loader;
pub mod models;
pub use config::*;
pub use data::*;
pub use loader::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not find file with name: {0}")]
    FileNotFound(String),
    #[error("Malformed field {table}.{column} on row {row}: '{value}' ({reason})")]
    MalformedField {
        table: String,
        row: usize,
        column: String,
        value: String,
        reason: String,
    },
    #[error("{kind} '{id}' references unknown {field} '{token}'")]
    DanglingReference {
        kind: EntityKind,
        id: String,
        field: String,
        token: String,
    },
    #[error("Duplicate {kind} identifier '{id}' on row {row}")]
    DuplicateIdentifier {
        kind: EntityKind,
        id: String,
        row: usize,
    },
    #[error("Adding '{member}' to stop area '{area}' would create a membership cycle")]
    CyclicMembership { area: String, member: String },
    #[error("No {kind} with id '{id}'")]
    NotFound { kind: EntityKind, id: String },
    #[error("Feed has no agency and no default agency id was configured")]
    MissingAgency,
}
