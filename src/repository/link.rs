use std::sync::Arc;

/// A reference from one entity to another.
///
/// Rows are materialized with every reference left as the raw token found
/// in the feed; the resolve pass rewrites each `Pending` into `Resolved`
/// (or into `Unset` for an optional reference nobody answers to). A loaded
/// [`Repository`](super::Repository) never holds a `Pending` link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Link<T> {
    #[default]
    Unset,
    Pending(Arc<str>),
    Resolved(T),
}

impl<T> Link<T> {
    pub fn pending(token: Option<&str>) -> Self {
        match token {
            Some(token) => Self::Pending(token.into()),
            None => Self::Unset,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// The unresolved token, if any.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Pending(token) => Some(token),
            _ => None,
        }
    }
}

impl<T: Copy> Link<T> {
    pub fn get(&self) -> Option<T> {
        match self {
            Self::Resolved(target) => Some(*target),
            _ => None,
        }
    }
}

#[test]
fn pending_from_token() {
    let link: Link<u32> = Link::pending(Some("core"));
    assert!(link.is_pending());
    assert_eq!(link.token(), Some("core"));
    assert_eq!(link.get(), None);

    let link: Link<u32> = Link::pending(None);
    assert_eq!(link, Link::Unset);
}

#[test]
fn resolved_yields_target() {
    let link = Link::Resolved(4u32);
    assert!(link.is_resolved());
    assert_eq!(link.get(), Some(4));
    assert_eq!(link.token(), None);
}
