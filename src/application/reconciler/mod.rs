//! Optimistic mutation reconciler.
//!
//! A [`Reconciler`] owns the items of one view. Every mutation is applied to
//! the local collection first, then the matching store call runs on a spawned
//! task. Its outcome comes back as a settlement on a channel and is applied by
//! the owner, so local state is only ever touched from one place.
//!
//! Failed calls are compensated per kind:
//! - create: the provisional item is dropped
//! - update: the inverse patch captured at apply time is re-applied
//! - delete: the removed item is put back at its old index
//! - move: the collection is reloaded from the store

mod collection;
#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub use collection::ItemCollection;

use crate::domain::entities::{Draft, ItemId, ItemKey, Patch, Record, Row, TempId, Tracked};
use crate::domain::errors::{ReconcileError, StoreError, ValidationError};
use crate::domain::ports::{NotificationPort, Query, RemoteStorePort};
use crate::domain::NotificationKind;

/// What applying a settlement did to the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// A provisional item received its durable id.
    Confirmed { temp_id: TempId, id: ItemId },
    /// An update, delete or move was acknowledged.
    Applied { key: ItemKey },
    /// A create was dropped or an update was undone.
    RolledBack { key: ItemKey },
    /// A deleted item was put back.
    Restored { key: ItemKey },
    /// A failed move was repaired by reloading the collection.
    Resynced { count: usize },
    /// The collection was (re)loaded.
    Loaded { count: usize },
    /// A load call failed; the collection was left as is.
    LoadFailed,
    /// The target item is gone; nothing was changed.
    Stale { key: ItemKey },
}

enum Settlement<R: Record> {
    Created {
        temp_id: TempId,
        result: Result<Row, StoreError>,
    },
    Updated {
        id: ItemId,
        inverse: R::Patch,
        notice: Option<String>,
        result: Result<(), StoreError>,
    },
    Deleted {
        id: ItemId,
        index: usize,
        record: R,
        result: Result<(), StoreError>,
    },
    Moved {
        id: ItemId,
        inverse: R::Patch,
        from: usize,
        result: Result<(), StoreError>,
        resync: Option<Result<Vec<Row>, StoreError>>,
    },
    Loaded {
        result: Result<Vec<Row>, StoreError>,
    },
}

/// Owner of one view's items and the store calls mutating them.
pub struct Reconciler<R: Record> {
    items: ItemCollection<R>,
    store: Arc<dyn RemoteStorePort>,
    notifier: Arc<dyn NotificationPort>,
    query: Query,
    pending: HashSet<ItemId>,
    removing: HashSet<ItemId>,
    outstanding: usize,
    sender: mpsc::UnboundedSender<Settlement<R>>,
    receiver: mpsc::UnboundedReceiver<Settlement<R>>,
}

impl<R: Record> Reconciler<R> {
    /// Creates an empty reconciler loading with the record's default query.
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStorePort>, notifier: Arc<dyn NotificationPort>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            items: ItemCollection::new(),
            store,
            notifier,
            query: R::load_query(),
            pending: HashSet::new(),
            removing: HashSet::new(),
            outstanding: 0,
            sender,
            receiver,
        }
    }

    /// Items in display order.
    #[must_use]
    pub const fn items(&self) -> &ItemCollection<R> {
        &self.items
    }

    /// Query used by [`Self::load`] and by move resyncs.
    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    pub fn set_query(&mut self, query: Query) {
        self.query = query;
    }

    /// Returns whether an update, delete or move of `id` is in flight.
    #[must_use]
    pub fn is_pending(&self, id: &ItemId) -> bool {
        self.pending.contains(id)
    }

    /// Number of store calls whose outcome has not been applied yet.
    #[must_use]
    pub const fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Starts loading the collection from the store.
    pub fn load(&mut self) {
        debug!(collection = %R::COLLECTION, "Loading collection");
        let store = self.store.clone();
        let query = self.query.clone();
        self.spawn(async move {
            Settlement::Loaded {
                result: store.list(R::COLLECTION, &query).await,
            }
        });
    }

    /// Inserts a provisional item and starts the create call.
    ///
    /// # Errors
    /// Returns `ReconcileError::Validation` when the draft fails its checks.
    /// Nothing is inserted and no call is made in that case.
    pub fn create(&mut self, draft: R::Draft) -> Result<TempId, ReconcileError> {
        let draft = self.validated(<R::Draft as Draft<R>>::validate(draft))?;
        let temp_id = TempId::generate();
        let index = self.items.insert(
            R::INSERT_AT,
            Tracked::Provisional {
                temp_id,
                record: draft.provisional(),
            },
        );
        debug!(collection = %R::COLLECTION, %temp_id, index, "Inserted provisional item");

        let store = self.store.clone();
        let row = draft.to_row();
        self.spawn(async move {
            Settlement::Created {
                temp_id,
                result: store.create(R::COLLECTION, row).await,
            }
        });
        Ok(temp_id)
    }

    /// Applies a patch to a confirmed item and starts the update call.
    ///
    /// # Errors
    /// Returns `UnknownItem` when `id` is not a confirmed item, `Busy` when it
    /// has a change in flight and `Validation` when the patch fails its checks.
    pub fn update(&mut self, id: &ItemId, patch: R::Patch) -> Result<(), ReconcileError> {
        self.update_inner(id, patch, None)
    }

    /// Like [`Self::update`], announcing `notice` once the store acknowledges it.
    ///
    /// # Errors
    /// Same as [`Self::update`].
    pub fn update_with_notice(
        &mut self,
        id: &ItemId,
        patch: R::Patch,
        notice: impl Into<String>,
    ) -> Result<(), ReconcileError> {
        self.update_inner(id, patch, Some(notice.into()))
    }

    fn update_inner(
        &mut self,
        id: &ItemId,
        patch: R::Patch,
        notice: Option<String>,
    ) -> Result<(), ReconcileError> {
        self.ensure_idle(id)?;
        let patch = self.validated(<R::Patch as Patch<R>>::validate(patch))?;
        let key = ItemKey::Durable(id.clone());
        let record = self
            .items
            .record_mut(&key)
            .ok_or_else(|| ReconcileError::UnknownItem { key: key.clone() })?;
        let inverse = patch.apply(record);
        self.pending.insert(id.clone());
        debug!(collection = %R::COLLECTION, %id, "Applied optimistic update");

        let store = self.store.clone();
        let row = patch.to_row();
        let id = id.clone();
        self.spawn(async move {
            let result = store.update(R::COLLECTION, &id, row).await;
            Settlement::Updated {
                id,
                inverse,
                notice,
                result,
            }
        });
        Ok(())
    }

    /// Removes a confirmed item and starts the delete call.
    ///
    /// # Errors
    /// Returns `UnknownItem` when `id` is not a confirmed item and `Busy` when
    /// it has a change in flight.
    pub fn delete(&mut self, id: &ItemId) -> Result<(), ReconcileError> {
        self.ensure_idle(id)?;
        let key = ItemKey::Durable(id.clone());
        let (index, removed) = self
            .items
            .remove(&key)
            .ok_or(ReconcileError::UnknownItem { key })?;
        let record = match removed {
            Tracked::Confirmed { record, .. } | Tracked::Provisional { record, .. } => record,
        };
        self.pending.insert(id.clone());
        self.removing.insert(id.clone());
        debug!(collection = %R::COLLECTION, %id, index, "Removed item optimistically");

        let store = self.store.clone();
        let id = id.clone();
        self.spawn(async move {
            let result = store.delete(R::COLLECTION, &id).await;
            Settlement::Deleted {
                id,
                index,
                record,
                result,
            }
        });
        Ok(())
    }

    /// Applies a patch, relocates the item to `index` and starts the update call.
    ///
    /// `index` counts positions in the collection with the item taken out.
    /// A failed call is repaired by reloading the collection.
    ///
    /// # Errors
    /// Same as [`Self::update`].
    pub fn move_item(
        &mut self,
        id: &ItemId,
        patch: R::Patch,
        index: usize,
    ) -> Result<(), ReconcileError> {
        self.ensure_idle(id)?;
        let patch = self.validated(<R::Patch as Patch<R>>::validate(patch))?;
        let key = ItemKey::Durable(id.clone());
        let record = self
            .items
            .record_mut(&key)
            .ok_or_else(|| ReconcileError::UnknownItem { key: key.clone() })?;
        let inverse = patch.apply(record);
        let from = self.items.relocate(&key, index).unwrap_or(index);
        self.pending.insert(id.clone());
        debug!(collection = %R::COLLECTION, %id, from, to = index, "Moved item optimistically");

        let store = self.store.clone();
        let query = self.query.clone();
        let row = patch.to_row();
        let id = id.clone();
        self.spawn(async move {
            let result = store.update(R::COLLECTION, &id, row).await;
            let resync = match &result {
                Ok(()) => None,
                Err(_) => Some(store.list(R::COLLECTION, &query).await),
            };
            Settlement::Moved {
                id,
                inverse,
                from,
                result,
                resync,
            }
        });
        Ok(())
    }

    /// Waits for the next store call to finish and applies its outcome.
    ///
    /// Returns `None` when nothing is outstanding.
    pub async fn settle_next(&mut self) -> Option<Reconciliation> {
        if self.outstanding == 0 {
            return None;
        }
        let settlement = self.receiver.recv().await?;
        Some(self.settle(settlement))
    }

    /// Applies outcomes until no store call is outstanding.
    ///
    /// Follow-up calls issued while settling (such as a reload after a
    /// malformed create response) are awaited too.
    pub async fn settle_all(&mut self) -> Vec<Reconciliation> {
        let mut applied = Vec::new();
        while let Some(reconciliation) = self.settle_next().await {
            applied.push(reconciliation);
        }
        applied
    }

    /// Applies the outcomes that are already available without waiting.
    pub fn drain_ready(&mut self) -> Vec<Reconciliation> {
        let mut applied = Vec::new();
        while let Ok(settlement) = self.receiver.try_recv() {
            applied.push(self.settle(settlement));
        }
        applied
    }

    fn spawn<F>(&mut self, call: F)
    where
        F: Future<Output = Settlement<R>> + Send + 'static,
    {
        self.outstanding += 1;
        let sender = self.sender.clone();
        tokio::spawn(async move {
            if sender.send(call.await).is_err() {
                debug!("Reconciler dropped before settlement");
            }
        });
    }

    fn ensure_idle(&self, id: &ItemId) -> Result<(), ReconcileError> {
        let key = ItemKey::Durable(id.clone());
        if self.pending.contains(id) {
            return Err(ReconcileError::Busy { key });
        }
        if !self.items.contains(&key) {
            return Err(ReconcileError::UnknownItem { key });
        }
        Ok(())
    }

    fn validated<T>(&self, result: Result<T, ValidationError>) -> Result<T, ReconcileError> {
        result.map_err(|e| {
            debug!(collection = %R::COLLECTION, error = %e, "Rejected invalid input");
            self.notifier
                .notify(NotificationKind::Error, &capitalize(&e.to_string()));
            ReconcileError::from(e)
        })
    }

    fn settle(&mut self, settlement: Settlement<R>) -> Reconciliation {
        self.outstanding = self.outstanding.saturating_sub(1);
        match settlement {
            Settlement::Created { temp_id, result } => self.settle_create(temp_id, result),
            Settlement::Updated {
                id,
                inverse,
                notice,
                result,
            } => self.settle_update(id, &inverse, notice, result),
            Settlement::Deleted {
                id,
                index,
                record,
                result,
            } => self.settle_delete(id, index, record, result),
            Settlement::Moved {
                id,
                inverse,
                from,
                result,
                resync,
            } => self.settle_move(id, &inverse, from, result, resync),
            Settlement::Loaded { result } => self.settle_load(result),
        }
    }

    fn settle_create(&mut self, temp_id: TempId, result: Result<Row, StoreError>) -> Reconciliation {
        let key = ItemKey::Temp(temp_id);
        if !self.items.contains(&key) {
            debug!(collection = %R::COLLECTION, %key, "Ignoring stale create outcome");
            return Reconciliation::Stale { key };
        }

        let decoded = result.map(R::from_row);
        match decoded {
            Ok(Ok((id, record))) => {
                self.items.confirm(temp_id, id.clone(), record);
                info!(collection = %R::COLLECTION, %temp_id, %id, "Create confirmed");
                self.notify(NotificationKind::Success, format!("{} added", capitalize(R::NOUN)));
                Reconciliation::Confirmed { temp_id, id }
            }
            Ok(Err(e)) => {
                warn!(collection = %R::COLLECTION, error = %e, "Create response unreadable, reloading");
                self.items.remove(&key);
                self.notify(NotificationKind::Error, format!("Failed to add {}", R::NOUN));
                self.load();
                Reconciliation::RolledBack { key }
            }
            Err(e) => {
                warn!(collection = %R::COLLECTION, error = %e, retryable = e.is_network_error(), "Create failed, dropping provisional item");
                self.items.remove(&key);
                self.notify(NotificationKind::Error, format!("Failed to add {}", R::NOUN));
                Reconciliation::RolledBack { key }
            }
        }
    }

    fn settle_update(
        &mut self,
        id: ItemId,
        inverse: &R::Patch,
        notice: Option<String>,
        result: Result<(), StoreError>,
    ) -> Reconciliation {
        self.pending.remove(&id);
        let key = ItemKey::Durable(id);
        let Some(record) = self.items.record_mut(&key) else {
            debug!(collection = %R::COLLECTION, %key, "Ignoring stale update outcome");
            return Reconciliation::Stale { key };
        };

        match result {
            Ok(()) => {
                debug!(collection = %R::COLLECTION, %key, "Update confirmed");
                if let Some(notice) = notice {
                    self.notify(NotificationKind::Success, notice);
                }
                Reconciliation::Applied { key }
            }
            Err(e) => {
                warn!(collection = %R::COLLECTION, %key, error = %e, retryable = e.is_network_error(), "Update failed, restoring previous fields");
                inverse.revert(record);
                self.notify(NotificationKind::Error, format!("Failed to update {}", R::NOUN));
                Reconciliation::RolledBack { key }
            }
        }
    }

    fn settle_delete(
        &mut self,
        id: ItemId,
        index: usize,
        record: R,
        result: Result<(), StoreError>,
    ) -> Reconciliation {
        self.pending.remove(&id);
        self.removing.remove(&id);
        let key = ItemKey::Durable(id.clone());

        match result {
            Ok(()) => {
                info!(collection = %R::COLLECTION, %key, "Delete confirmed");
                self.notify(NotificationKind::Success, format!("{} deleted", capitalize(R::NOUN)));
                Reconciliation::Applied { key }
            }
            Err(e) if self.items.contains(&key) => {
                debug!(collection = %R::COLLECTION, %key, error = %e, "Delete failed, item already back");
                self.notify(NotificationKind::Error, format!("Failed to delete {}", R::NOUN));
                Reconciliation::Stale { key }
            }
            Err(e) => {
                warn!(collection = %R::COLLECTION, %key, index, error = %e, retryable = e.is_network_error(), "Delete failed, restoring item");
                self.items.insert_at(index, Tracked::Confirmed { id, record });
                self.notify(NotificationKind::Error, format!("Failed to delete {}", R::NOUN));
                Reconciliation::Restored { key }
            }
        }
    }

    fn settle_move(
        &mut self,
        id: ItemId,
        inverse: &R::Patch,
        from: usize,
        result: Result<(), StoreError>,
        resync: Option<Result<Vec<Row>, StoreError>>,
    ) -> Reconciliation {
        self.pending.remove(&id);
        let key = ItemKey::Durable(id);

        let Err(e) = result else {
            debug!(collection = %R::COLLECTION, %key, "Move confirmed");
            return Reconciliation::Applied { key };
        };
        warn!(collection = %R::COLLECTION, %key, error = %e, retryable = e.is_network_error(), "Move failed, resyncing");
        self.notify(NotificationKind::Error, format!("Failed to move {}", R::NOUN));

        match resync {
            Some(Ok(rows)) => {
                let count = self.replace_from_rows(rows);
                info!(collection = %R::COLLECTION, count, "Resynced after failed move");
                Reconciliation::Resynced { count }
            }
            Some(Err(e)) => {
                warn!(collection = %R::COLLECTION, %key, error = %e, "Resync failed, undoing move locally");
                self.undo_move(&key, inverse, from)
            }
            None => self.undo_move(&key, inverse, from),
        }
    }

    fn undo_move(&mut self, key: &ItemKey, inverse: &R::Patch, from: usize) -> Reconciliation {
        let Some(record) = self.items.record_mut(key) else {
            return Reconciliation::Stale { key: key.clone() };
        };
        inverse.revert(record);
        self.items.relocate(key, from);
        Reconciliation::RolledBack { key: key.clone() }
    }

    fn settle_load(&mut self, result: Result<Vec<Row>, StoreError>) -> Reconciliation {
        match result {
            Ok(rows) => {
                let count = self.replace_from_rows(rows);
                info!(collection = %R::COLLECTION, count, "Collection loaded");
                Reconciliation::Loaded { count }
            }
            Err(e) => {
                warn!(collection = %R::COLLECTION, error = %e, retryable = e.is_network_error(), "Load failed");
                self.notify(NotificationKind::Error, format!("Failed to load {}s", R::NOUN));
                Reconciliation::LoadFailed
            }
        }
    }

    /// Decodes rows and swaps them in for the confirmed items. Returns how many were kept.
    fn replace_from_rows(&mut self, rows: Vec<Row>) -> usize {
        let mut skipped = 0_usize;
        let records: Vec<_> = rows
            .into_iter()
            .filter_map(|row| match R::from_row(row) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    warn!(collection = %R::COLLECTION, error = %e, "Skipping malformed row");
                    skipped += 1;
                    None
                }
            })
            .filter(|(id, _)| !self.removing.contains(id))
            .collect();

        if skipped > 0 {
            self.notify(
                NotificationKind::Error,
                format!("Skipped {skipped} unreadable {}s", R::NOUN),
            );
        }

        let count = records.len();
        self.items.replace_confirmed(R::INSERT_AT, records);
        count
    }

    fn notify(&self, kind: NotificationKind, message: impl AsRef<str>) {
        self.notifier.notify(kind, message.as_ref());
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
