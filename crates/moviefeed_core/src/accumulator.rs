use std::collections::HashSet;

use crate::{CatalogItem, ItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeStats {
    pub appended: usize,
    pub skipped: usize,
}

/// Append every item of `incoming` whose id is not yet in `seen`, in order.
///
/// The first occurrence of an id wins; later occurrences, whether on a later
/// page or further down the same page, are dropped rather than replacing it.
pub fn merge<I>(
    existing: &mut Vec<CatalogItem>,
    incoming: I,
    seen: &mut HashSet<ItemId>,
) -> MergeStats
where
    I: IntoIterator<Item = CatalogItem>,
{
    let mut stats = MergeStats::default();
    for item in incoming {
        if seen.insert(item.id) {
            existing.push(item);
            stats.appended += 1;
        } else {
            stats.skipped += 1;
        }
    }
    stats
}

/// Ordered, duplicate-free collection of catalog items.
///
/// `seen` mirrors the ids in `items` and exists only for O(1) lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageAccumulator {
    items: Vec<CatalogItem>,
    seen: HashSet<ItemId>,
}

impl PageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge_page(&mut self, page: Vec<CatalogItem>) -> MergeStats {
        merge(&mut self.items, page, &mut self.seen)
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn last(&self) -> Option<&CatalogItem> {
        self.items.last()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.seen.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.seen.clear();
    }
}
