//! Ordered, view-owned collection of tracked items.

use crate::domain::entities::{InsertPosition, ItemId, ItemKey, TempId, Tracked};

/// Items of one view, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemCollection<R> {
    items: Vec<Tracked<R>>,
}

impl<R> Default for ItemCollection<R> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<R> ItemCollection<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tracked<R>> {
        self.items.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Tracked<R>] {
        &self.items
    }

    #[must_use]
    pub fn position(&self, key: &ItemKey) -> Option<usize> {
        self.items.iter().position(|item| item.has_key(key))
    }

    #[must_use]
    pub fn get(&self, key: &ItemKey) -> Option<&Tracked<R>> {
        self.items.iter().find(|item| item.has_key(key))
    }

    /// Returns the fields of a confirmed item.
    #[must_use]
    pub fn confirmed(&self, id: &ItemId) -> Option<&R> {
        self.items
            .iter()
            .find(|item| item.id() == Some(id))
            .map(Tracked::record)
    }

    #[must_use]
    pub fn contains(&self, key: &ItemKey) -> bool {
        self.position(key).is_some()
    }

    pub(crate) fn record_mut(&mut self, key: &ItemKey) -> Option<&mut R> {
        self.items
            .iter_mut()
            .find(|item| item.has_key(key))
            .map(Tracked::record_mut)
    }

    /// Inserts at the head or tail and returns the index used.
    pub(crate) fn insert(&mut self, position: InsertPosition, item: Tracked<R>) -> usize {
        match position {
            InsertPosition::Head => {
                self.items.insert(0, item);
                0
            }
            InsertPosition::Tail => {
                self.items.push(item);
                self.items.len() - 1
            }
        }
    }

    /// Inserts at `index`, clamped to the current length.
    pub(crate) fn insert_at(&mut self, index: usize, item: Tracked<R>) -> usize {
        let index = index.min(self.items.len());
        self.items.insert(index, item);
        index
    }

    pub(crate) fn remove(&mut self, key: &ItemKey) -> Option<(usize, Tracked<R>)> {
        let index = self.position(key)?;
        Some((index, self.items.remove(index)))
    }

    /// Moves an item to `index` (clamped). Returns the index it came from.
    pub(crate) fn relocate(&mut self, key: &ItemKey, index: usize) -> Option<usize> {
        let (from, item) = self.remove(key)?;
        self.insert_at(index, item);
        Some(from)
    }

    /// Swaps a provisional item for its confirmed form in place.
    ///
    /// If the durable id is already present the provisional entry is dropped
    /// instead, so a row never shows up twice.
    pub(crate) fn confirm(&mut self, temp_id: TempId, id: ItemId, record: R) -> bool {
        let key = ItemKey::Temp(temp_id);
        let Some(index) = self.position(&key) else {
            return false;
        };
        if self.contains(&ItemKey::Durable(id.clone())) {
            self.items.remove(index);
        } else {
            self.items[index] = Tracked::Confirmed { id, record };
        }
        true
    }

    /// Replaces every confirmed item with `records`, keeping provisional items as an overlay.
    pub(crate) fn replace_confirmed(&mut self, position: InsertPosition, records: Vec<(ItemId, R)>) {
        let provisional: Vec<_> = self
            .items
            .drain(..)
            .filter(|item| !item.is_confirmed())
            .collect();
        let confirmed = records
            .into_iter()
            .map(|(id, record)| Tracked::Confirmed { id, record });

        self.items = match position {
            InsertPosition::Head => provisional.into_iter().chain(confirmed).collect(),
            InsertPosition::Tail => confirmed.chain(provisional).collect(),
        };
    }
}

impl<'a, R> IntoIterator for &'a ItemCollection<R> {
    type Item = &'a Tracked<R>;
    type IntoIter = std::slice::Iter<'a, Tracked<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
