//! Object identifiers
//!
//! Entities and items are owned by the world registry. A level only stores
//! their instance ids. The `Unique*` wrappers mark the points where
//! ownership crosses into or out of a level: a level consumes one when an
//! object is placed and hands one back when an object is removed.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for entity instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Unique identifier for item instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// An entity handle whose owner is responsible for it
///
/// Not `Clone`: exactly one holder (the registry, or a level) owns the
/// entity at any time.
#[must_use = "dropping a unique entity leaks it from every level"]
#[derive(Debug, PartialEq, Eq)]
pub struct UniqueEntity(EntityId);

/// An item handle whose owner is responsible for it
#[must_use = "dropping a unique item leaks it from every level"]
#[derive(Debug, PartialEq, Eq)]
pub struct UniqueItem(ItemId);

impl UniqueEntity {
    pub const fn new(id: EntityId) -> Self {
        Self(id)
    }

    pub const fn id(&self) -> EntityId {
        self.0
    }

    /// Give up ownership and return the bare id
    pub fn release(self) -> EntityId {
        self.0
    }
}

impl UniqueItem {
    pub const fn new(id: ItemId) -> Self {
        Self(id)
    }

    pub const fn id(&self) -> ItemId {
        self.0
    }

    /// Give up ownership and return the bare id
    pub fn release(self) -> ItemId {
        self.0
    }
}
