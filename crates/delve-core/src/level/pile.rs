//! Item piles: every item lying on one tile

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::ids::ItemId;

/// Identifier of a pile, unique within its level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PileId(pub u32);

/// The items on a single tile, in the order they were dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPile {
    id: PileId,
    items: Vec<ItemId>,
}

impl ItemPile {
    pub(crate) fn new(id: PileId, first: ItemId) -> Self {
        Self {
            id,
            items: vec![first],
        }
    }

    pub fn id(&self) -> PileId {
        self.id
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: ItemId) -> bool {
        self.items.contains(&item)
    }

    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().copied()
    }

    pub(crate) fn push(&mut self, item: ItemId) {
        self.items.push(item);
    }

    /// Remove `item`, keeping the order of the rest
    pub(crate) fn remove(&mut self, item: ItemId) -> bool {
        match self.items.iter().position(|&i| i == item) {
            Some(i) => {
                self.items.remove(i);
                true
            }
            None => false,
        }
    }

    pub(crate) fn take_all(&mut self) -> Vec<ItemId> {
        core::mem::take(&mut self.items)
    }

    /// Remove the items at `indices`, returned in the order requested
    ///
    /// Fails without touching the pile if any index is out of range or repeated.
    pub(crate) fn take_indices(&mut self, indices: &[usize]) -> Option<Vec<ItemId>> {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != indices.len() || sorted.last().is_some_and(|&i| i >= self.items.len()) {
            return None;
        }

        let taken = indices.iter().map(|&i| self.items[i]).collect();
        for &i in sorted.iter().rev() {
            self.items.remove(i);
        }
        Some(taken)
    }
}

/// Pile key projection for the item index
pub(crate) fn pile_id(pile: &ItemPile) -> PileId {
    pile.id
}

/// Outcome of [`Level::move_items`](crate::level::Level::move_items)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum MoveItemsResult {
    /// Every item left the tile; the pile is gone
    MovedAll,
    /// The requested subset left the tile; the pile remains
    MovedSome,
    /// No pile at the source tile
    NoPile,
    /// An index was out of range or repeated; nothing moved
    BadIndex,
}
