pub mod geo;
pub mod id;
pub mod time;

pub use geo::*;
pub use id::*;
pub use time::*;

/// Shared identity contract for everything a trip or a fare rule can point
/// at as a place.
pub trait Identifiable {
    fn id(&self) -> &AgencyAndId;
    /// Display name, empty when the feed left it blank.
    fn name(&self) -> &str;
}
