use std::{
    borrow::Borrow,
    collections::HashMap,
    fmt::{Debug, Display},
    hash::Hash,
    ops::Index,
};

use crate::{
    gtfs,
    repository::Link,
    schema::{EntityKind, IdStrategy},
};

/// An entity kind stored in a [`Table`].
pub trait Entity {
    const KIND: EntityKind;
    type Key: Hash + Eq + Clone + Display + Debug;

    fn key(&self) -> &Self::Key;
    fn set_index(&mut self, index: u32);
}

/// What to do when a row's key is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Fail the load.
    Unique,
    /// Keep the first row, drop the newcomer.
    Dedupe,
    /// Keep every row; lookups find the first.
    PerRow,
}

impl From<&IdStrategy> for KeyPolicy {
    fn from(value: &IdStrategy) -> Self {
        match value {
            IdStrategy::Explicit { .. } => Self::Unique,
            IdStrategy::Synthesized { dedupe: true, .. } => Self::Dedupe,
            IdStrategy::Synthesized { dedupe: false, .. } | IdStrategy::Anonymous => Self::PerRow,
        }
    }
}

/// All entities of one kind, in materialization order, with a key index.
#[derive(Debug, Clone)]
pub struct Table<T: Entity> {
    rows: Vec<T>,
    lookup: HashMap<T::Key, u32>,
}

impl<T: Entity> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            lookup: HashMap::new(),
        }
    }
}

impl<T: Entity> Table<T> {
    /// Adds a row and returns its index, `None` when it was folded into an
    /// earlier row with the same key. `row` is only used for error reports.
    pub(crate) fn insert(
        &mut self,
        mut value: T,
        policy: KeyPolicy,
        row: usize,
    ) -> Result<Option<u32>, gtfs::Error> {
        let index = self.rows.len() as u32;
        if self.lookup.contains_key(value.key()) {
            match policy {
                KeyPolicy::Unique => {
                    return Err(gtfs::Error::DuplicateIdentifier {
                        kind: T::KIND,
                        id: value.key().to_string(),
                        row,
                    });
                }
                KeyPolicy::Dedupe => return Ok(None),
                KeyPolicy::PerRow => (),
            }
        } else {
            self.lookup.insert(value.key().clone(), index);
        }
        value.set_index(index);
        self.rows.push(value);
        Ok(Some(index))
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [T] {
        &mut self.rows
    }

    pub fn all(&self) -> &[T] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn index_of<Q>(&self, key: &Q) -> Option<u32>
    where
        T::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup.get(key).copied()
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup.contains_key(key)
    }

    /// Entity with the given key, `None` if there is none.
    pub fn by_id<Q>(&self, key: &Q) -> Option<&T>
    where
        T::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.lookup.get(key)?;
        Some(&self.rows[*index as usize])
    }

    /// Entity with the given key, [`gtfs::Error::NotFound`] if there is none.
    pub fn get<Q>(&self, key: &Q) -> Result<&T, gtfs::Error>
    where
        T::Key: Borrow<Q>,
        Q: Hash + Eq + Display + ?Sized,
    {
        self.by_id(key).ok_or_else(|| gtfs::Error::NotFound {
            kind: T::KIND,
            id: key.to_string(),
        })
    }

    pub fn get_index(&self, index: u32) -> Option<&T> {
        self.rows.get(index as usize)
    }

    /// Follows a resolved link into this table.
    pub fn linked(&self, link: &Link<u32>) -> Option<&T> {
        self.get_index(link.get()?)
    }
}

impl<T: Entity> Index<u32> for Table<T> {
    type Output = T;

    fn index(&self, index: u32) -> &Self::Output {
        &self.rows[index as usize]
    }
}

impl<'a, T: Entity> IntoIterator for &'a Table<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
