use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::models::{Destination, DestinationRequest};
use crate::rating::RatingSummary;

/// DestinationStore
///
/// Owns `Destination` records. Every operation on a single id is linearized; operations on
/// different ids never wait on one another. Callers are assumed to be authorized already.
#[async_trait]
pub trait DestinationStore: Send + Sync {
    /// Inserts a new record with a fresh id and zeroed rating fields.
    async fn create(&self, req: DestinationRequest) -> Destination;

    /// Snapshot of every record, ascending by id.
    async fn list(&self) -> Vec<Destination>;

    async fn get(&self, id: i64) -> Option<Destination>;

    /// Case-insensitive substring match on name or location. An empty query matches all.
    async fn search(&self, query: &str) -> Vec<Destination>;

    /// Replaces name, location and description. Rating fields are never touched.
    async fn update(&self, id: i64, req: DestinationRequest) -> Option<Destination>;

    /// Returns true if a record existed and was removed.
    async fn delete(&self, id: i64) -> bool;

    /// Applies `update` to the record's rating fields as one atomic read-modify-write.
    /// Returns `None` if the id does not exist.
    async fn modify_rating(
        &self,
        id: i64,
        update: &(dyn Fn(RatingSummary) -> RatingSummary + Send + Sync),
    ) -> Option<Destination>;
}

/// DestinationState
///
/// The shared handle to the destination store held in the application state.
pub type DestinationState = Arc<dyn DestinationStore>;

/// Slot
///
/// One record behind its own mutex. `removed` is set under that mutex by `delete`, so a
/// caller that fetched the handle before the removal observes the record as gone.
struct Slot {
    record: Destination,
    removed: bool,
}

type Handle = Arc<Mutex<Slot>>;

/// InMemoryDestinationStore
///
/// The index lock is held only to look up, insert or remove a handle; all field reads and
/// writes happen under the per-record mutex. Ids come from a counter that is never rewound.
pub struct InMemoryDestinationStore {
    records: RwLock<BTreeMap<i64, Handle>>,
    last_id: AtomicI64,
}

impl InMemoryDestinationStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            last_id: AtomicI64::new(0),
        }
    }

    fn handle(&self, id: i64) -> Option<Handle> {
        self.records.read().get(&id).cloned()
    }

    fn snapshot(&self) -> Vec<Destination> {
        let handles: Vec<Handle> = self.records.read().values().cloned().collect();
        handles
            .iter()
            .filter_map(|handle| {
                let slot = handle.lock();
                (!slot.removed).then(|| slot.record.clone())
            })
            .collect()
    }
}

impl Default for InMemoryDestinationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DestinationStore for InMemoryDestinationStore {
    async fn create(&self, req: DestinationRequest) -> Destination {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = Destination {
            id,
            name: req.name,
            location: req.location,
            description: req.description,
            average_rating: 0.0,
            rating_count: 0,
        };

        self.records.write().insert(
            id,
            Arc::new(Mutex::new(Slot {
                record: record.clone(),
                removed: false,
            })),
        );

        tracing::info!(destination_id = id, name = %record.name, "destination created");
        record
    }

    async fn list(&self) -> Vec<Destination> {
        self.snapshot()
    }

    async fn get(&self, id: i64) -> Option<Destination> {
        let handle = self.handle(id)?;
        let slot = handle.lock();
        (!slot.removed).then(|| slot.record.clone())
    }

    async fn search(&self, query: &str) -> Vec<Destination> {
        let needle = query.to_lowercase();
        let found: Vec<Destination> = self
            .snapshot()
            .into_iter()
            .filter(|d| {
                d.name.to_lowercase().contains(&needle) || d.location.to_lowercase().contains(&needle)
            })
            .collect();

        tracing::debug!(query = %query, hits = found.len(), "destination search");
        found
    }

    async fn update(&self, id: i64, req: DestinationRequest) -> Option<Destination> {
        let handle = self.handle(id)?;
        let mut slot = handle.lock();
        if slot.removed {
            return None;
        }

        slot.record.name = req.name;
        slot.record.location = req.location;
        slot.record.description = req.description;

        tracing::info!(destination_id = id, "destination updated");
        Some(slot.record.clone())
    }

    async fn delete(&self, id: i64) -> bool {
        let Some(handle) = self.records.write().remove(&id) else {
            tracing::debug!(destination_id = id, "delete on missing destination");
            return false;
        };

        // Wait for any in-flight writer on this record before marking it gone.
        handle.lock().removed = true;

        tracing::info!(destination_id = id, "destination deleted");
        true
    }

    async fn modify_rating(
        &self,
        id: i64,
        update: &(dyn Fn(RatingSummary) -> RatingSummary + Send + Sync),
    ) -> Option<Destination> {
        let handle = self.handle(id)?;
        let mut slot = handle.lock();
        if slot.removed {
            return None;
        }

        let next = update(RatingSummary::of(&slot.record));
        slot.record.average_rating = next.average;
        slot.record.rating_count = next.count;
        Some(slot.record.clone())
    }
}
