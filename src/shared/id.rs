use std::{fmt, sync::Arc};

/// Composite identifier: a feed scope (the agency) plus an id that is only
/// unique within that scope.
///
/// Displays as `<agency_id>_<id>`, which is also the form embedded in
/// synthesized transfer rule ids.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgencyAndId {
    pub agency_id: Arc<str>,
    pub id: Arc<str>,
}

impl AgencyAndId {
    pub fn new(agency_id: impl Into<Arc<str>>, id: impl Into<Arc<str>>) -> Self {
        Self {
            agency_id: agency_id.into(),
            id: id.into(),
        }
    }

    pub fn agency_id(&self) -> &str {
        &self.agency_id
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for AgencyAndId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.agency_id, self.id)
    }
}

impl From<(&str, &str)> for AgencyAndId {
    fn from((agency_id, id): (&str, &str)) -> Self {
        Self::new(agency_id, id)
    }
}

#[test]
fn display_joins_scope_and_id() {
    let id = AgencyAndId::new("1", "4210813");
    assert_eq!(id.to_string(), "1_4210813");
}

#[test]
fn default_is_empty() {
    let id = AgencyAndId::default();
    assert_eq!(id.agency_id(), "");
    assert_eq!(id.id(), "");
}

#[test]
fn equality_is_by_value() {
    let a = AgencyAndId::new("1", "core");
    let b: AgencyAndId = ("1", "core").into();
    assert_eq!(a, b);
    assert_ne!(a, AgencyAndId::new("2", "core"));
}
