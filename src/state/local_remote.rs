//! Entity-agnostic synchroniser between the local cache and one remote
//! collection.
//!
//! Local writes always land in the cache first; remote operations are
//! attempted only while the [`ConnectivityGate`](super::ConnectivityGate) is
//! online and never roll a local write back.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use futures::{
    StreamExt,
    future::{AbortHandle, Abortable},
    stream,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        local_cache::{CacheError, CacheResult, LocalCache},
        models::{Entity, EntityKind, MergePolicy, Record, RemoteDocument, RemoteSnapshot, now_ms},
        remote_store::RemoteStore,
    },
    error::SyncError,
    state::sync_context::SyncContext,
};

/// Pushes run concurrently during a sweep, at most this many at a time.
const SWEEP_CONCURRENCY: usize = 4;

/// Result of a successful [`LocalRemoteStore::push_to_remote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The record had no remote id; one was created and back-filled locally.
    Created {
        /// Remote id now held by the record.
        id: String,
    },
    /// The remote copy was overwritten with the local one.
    Updated,
    /// The remote copy is newer and was left untouched.
    RemoteNewer {
        /// Timestamp of the remote copy.
        remote_last_modified: i64,
    },
}

/// Counters describing how a snapshot was folded into the local collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    /// Remote records added locally.
    pub adopted: usize,
    /// Local records overwritten by the remote copy.
    pub replaced: usize,
    /// Records identical on both sides.
    pub unchanged: usize,
    /// Local records newer than their remote copy.
    pub kept_local: usize,
    /// Synced local records missing from the snapshot.
    pub dropped: usize,
    /// Remote documents that could not be decoded.
    pub skipped: usize,
}

impl ReconcileSummary {
    /// Whether the merge modified the local collection.
    pub fn changed(&self) -> bool {
        self.adopted + self.replaced + self.dropped > 0
    }
}

/// Handle used to address a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKey {
    /// Device-local id.
    Local(Uuid),
    /// Remote id.
    Remote(String),
}

/// What happened remotely when a record was deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteDeletion {
    /// The record never reached the remote store.
    NotNeeded,
    /// The gate was offline; the remote copy was left in place.
    Skipped,
    /// The remote copy was deleted.
    Deleted,
}

/// A record removed by [`LocalRemoteStore::delete_record`].
#[derive(Debug)]
pub struct Deleted<T> {
    /// The removed record.
    pub record: Record<T>,
    /// Outcome of the remote delete; a failure does not restore the record.
    pub remote: Result<RemoteDeletion, SyncError>,
}

/// Push that failed during a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepFailure {
    /// Record whose push failed.
    pub local_id: Uuid,
    /// Message suitable for a toast.
    pub message: String,
}

/// Outcome of pushing every pending record of one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Swept collection.
    pub collection: EntityKind,
    /// Pending records at the start of the sweep.
    pub attempted: usize,
    /// Records that received a remote id.
    pub created: usize,
    /// Remote copies overwritten.
    pub updated: usize,
    /// Records left alone because the remote copy is newer.
    pub remote_newer: usize,
    /// Records deleted while the sweep was running.
    pub skipped: usize,
    /// Pushes that failed.
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    fn new(collection: EntityKind, attempted: usize) -> Self {
        Self {
            collection,
            attempted,
            created: 0,
            updated: 0,
            remote_newer: 0,
            skipped: 0,
            failures: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SyncMeta {
    last_synced_at: Option<i64>,
}

#[derive(Default)]
struct InFlight {
    next_token: u64,
    pushes: HashMap<Uuid, Vec<(u64, AbortHandle)>>,
}

/// Epoch of a deletion whose remote delete has not returned yet.
const DELETE_IN_PROGRESS: u64 = u64::MAX;

/// Remote ids whose state changed locally, tagged with a sequence number so a
/// snapshot fetched before the change cannot undo it.
#[derive(Default)]
struct Changes {
    epoch: u64,
    assigned: HashMap<String, u64>,
    deleted: HashMap<String, u64>,
    /// Epochs observed by snapshot fetches still in flight, with their count.
    observers: BTreeMap<u64, usize>,
}

impl Changes {
    fn bump(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    fn newer_than(map: &HashMap<String, u64>, id: &str, observed: u64) -> bool {
        map.get(id).is_some_and(|epoch| *epoch > observed)
    }

    fn observe(&mut self) -> u64 {
        *self.observers.entry(self.epoch).or_default() += 1;
        self.epoch
    }

    fn release(&mut self, observed: u64) {
        if let Some(count) = self.observers.get_mut(&observed) {
            *count -= 1;
            if *count == 0 {
                self.observers.remove(&observed);
            }
        }
    }

    /// Drop entries every in-flight fetch already observed.
    fn forget_settled(&mut self) {
        let floor = self
            .observers
            .keys()
            .next()
            .copied()
            .unwrap_or(self.epoch);
        self.assigned.retain(|_, epoch| *epoch > floor);
        self.deleted.retain(|_, epoch| *epoch > floor);
    }
}

/// Registration of a snapshot fetch, released on drop.
struct Observation<'a> {
    changes: &'a Mutex<Changes>,
    epoch: u64,
}

impl Drop for Observation<'_> {
    fn drop(&mut self) {
        lock(self.changes).release(self.epoch);
    }
}

enum Backfill {
    Assigned,
    Missing,
    AlreadySynced(String),
}

/// One synchronised collection of `T` records.
pub struct LocalRemoteStore<T> {
    records: Mutex<IndexMap<Uuid, Record<T>>>,
    last_synced_at: Mutex<Option<i64>>,
    cache: Arc<dyn LocalCache>,
    context: Arc<SyncContext>,
    in_flight: Mutex<InFlight>,
    changes: Mutex<Changes>,
    revision: watch::Sender<u64>,
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Entity> LocalRemoteStore<T> {
    /// Empty collection; call [`load`](Self::load) to restore the cache.
    pub fn new(cache: Arc<dyn LocalCache>, context: Arc<SyncContext>) -> Self {
        let (revision, _rx) = watch::channel(0);
        Self {
            records: Mutex::new(IndexMap::new()),
            last_synced_at: Mutex::new(None),
            cache,
            context,
            in_flight: Mutex::new(InFlight::default()),
            changes: Mutex::new(Changes::default()),
            revision,
        }
    }

    /// Collection this store synchronises.
    pub fn kind(&self) -> EntityKind {
        T::KIND
    }

    fn meta_key() -> String {
        format!("{}_sync", T::KIND.collection())
    }

    /// Populate the collection from the local cache.
    ///
    /// A malformed cache entry is logged and the collection starts empty.
    pub fn load(&self) -> CacheResult<usize> {
        let records = match self.cache.get(T::KIND.collection())? {
            None => Vec::new(),
            Some(raw) => serde_json::from_str::<Vec<Record<T>>>(&raw).unwrap_or_else(|err| {
                warn!(
                    collection = %T::KIND,
                    error = %err,
                    "local cache is malformed; resetting collection"
                );
                Vec::new()
            }),
        };
        let meta = match self.cache.get(&Self::meta_key())? {
            None => SyncMeta::default(),
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(collection = %T::KIND, error = %err, "sync metadata is malformed; ignoring");
                SyncMeta::default()
            }),
        };

        let count = records.len();
        *lock(&self.records) = records
            .into_iter()
            .map(|record| (record.local_id, record))
            .collect();
        *lock(&self.last_synced_at) = meta.last_synced_at;
        self.notify();
        Ok(count)
    }

    /// Every record, in insertion order.
    pub fn list(&self) -> Vec<Record<T>> {
        lock(&self.records).values().cloned().collect()
    }

    /// Record by local id.
    pub fn get(&self, local_id: Uuid) -> Option<Record<T>> {
        lock(&self.records).get(&local_id).cloned()
    }

    /// Record by remote id.
    pub fn find_by_remote_id(&self, id: &str) -> Option<Record<T>> {
        lock(&self.records)
            .values()
            .find(|record| record.id.as_deref() == Some(id))
            .cloned()
    }

    /// Start of the last sweep that pushed every pending record.
    pub fn last_synced_at(&self) -> Option<i64> {
        *lock(&self.last_synced_at)
    }

    /// Receiver bumped after every change of the local collection.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn notify(&self) {
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }

    fn persist(&self, records: &IndexMap<Uuid, Record<T>>) -> CacheResult<()> {
        let key = T::KIND.collection();
        let values: Vec<&Record<T>> = records.values().collect();
        let raw = serde_json::to_string(&values).map_err(|source| CacheError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.cache.set(key, &raw)
    }

    /// Create a local-only record from `fields`.
    pub fn insert_local(&self, fields: T) -> CacheResult<Record<T>> {
        self.upsert_local(Record::new(fields))
    }

    /// Stamp `record` with the current time and store it, replacing the record
    /// with the same remote id (or the same local id when it has none).
    ///
    /// The in-memory collection is updated even when persisting fails.
    pub fn upsert_local(&self, mut record: Record<T>) -> CacheResult<Record<T>> {
        record.last_modified = now_ms();

        let mut records = lock(&self.records);
        let by_remote_id = record.id.as_deref().and_then(|id| {
            records
                .values()
                .find(|existing| existing.id.as_deref() == Some(id))
                .map(|existing| existing.local_id)
        });
        if let Some(local_id) = by_remote_id {
            record.local_id = local_id;
        }
        records.insert(record.local_id, record.clone());
        let persisted = self.persist(&records);
        drop(records);

        self.notify();
        persisted.map(|()| record)
    }

    /// Apply `update` to the fields of a stored record and stamp it.
    pub fn update_local<F>(&self, local_id: Uuid, update: F) -> Result<Record<T>, SyncError>
    where
        F: FnOnce(&mut T),
    {
        let mut records = lock(&self.records);
        let record = records
            .get_mut(&local_id)
            .ok_or_else(|| SyncError::NotFound(local_id.to_string()))?;
        update(&mut record.fields);
        record.last_modified = now_ms();
        let updated = record.clone();
        let persisted = self.persist(&records);
        drop(records);

        self.notify();
        persisted?;
        Ok(updated)
    }

    /// Records with no remote id or modified after the last completed sweep.
    pub fn pending(&self) -> Vec<Record<T>> {
        let synced = self.last_synced_at();
        lock(&self.records)
            .values()
            .filter(|record| {
                record.id.is_none() || synced.is_none_or(|at| record.last_modified > at)
            })
            .cloned()
            .collect()
    }

    /// Push the stored record to the remote store.
    ///
    /// Returns [`SyncError::Offline`] without any remote call while the gate
    /// is offline. Deleting the record while the push is in flight aborts it
    /// with [`SyncError::Cancelled`].
    pub async fn push_to_remote(&self, local_id: Uuid) -> Result<PushOutcome, SyncError> {
        let remote = self.context.remote_if_online().ok_or(SyncError::Offline)?;
        let record = self
            .get(local_id)
            .ok_or_else(|| SyncError::NotFound(local_id.to_string()))?;

        let (handle, registration) = AbortHandle::new_pair();
        let token = self.register_push(local_id, handle);
        let outcome = Abortable::new(self.push_record(remote, record), registration).await;
        self.unregister_push(local_id, token);

        match outcome {
            Ok(result) => result,
            Err(_aborted) => {
                debug!(collection = %T::KIND, %local_id, "push aborted by deletion");
                Err(SyncError::Cancelled)
            }
        }
    }

    async fn push_record(
        &self,
        remote: Arc<dyn RemoteStore>,
        record: Record<T>,
    ) -> Result<PushOutcome, SyncError> {
        let body = record.body()?;
        let last_modified = record.last_modified;

        let Some(id) = record.id else {
            let id = self
                .context
                .write_policy()
                .run("create", || remote.create(T::KIND, last_modified, body.clone()))
                .await?;

            return match self.backfill_id(record.local_id, &id)? {
                Backfill::Assigned => Ok(PushOutcome::Created { id }),
                Backfill::Missing => {
                    self.discard_orphan(remote.as_ref(), id).await;
                    Err(SyncError::Cancelled)
                }
                Backfill::AlreadySynced(existing) => {
                    self.discard_orphan(remote.as_ref(), id).await;
                    Ok(PushOutcome::Created { id: existing })
                }
            };
        };

        let current = self
            .context
            .read_policy()
            .run("fetch", || remote.fetch(T::KIND, id.clone()))
            .await?;

        if let Some(current) = current
            && current.last_modified > last_modified
        {
            debug!(
                collection = %T::KIND,
                remote_id = %id,
                local = last_modified,
                remote = current.last_modified,
                "remote copy is newer; leaving it untouched"
            );
            return Ok(PushOutcome::RemoteNewer {
                remote_last_modified: current.last_modified,
            });
        }

        self.context
            .write_policy()
            .run("replace", || {
                remote.replace(
                    T::KIND,
                    RemoteDocument {
                        id: id.clone(),
                        last_modified,
                        body: body.clone(),
                    },
                )
            })
            .await?;
        Ok(PushOutcome::Updated)
    }

    fn backfill_id(&self, local_id: Uuid, id: &str) -> Result<Backfill, SyncError> {
        let mut records = lock(&self.records);
        let Some(record) = records.get_mut(&local_id) else {
            return Ok(Backfill::Missing);
        };
        if let Some(existing) = &record.id {
            return Ok(Backfill::AlreadySynced(existing.clone()));
        }
        record.id = Some(id.to_string());
        {
            let mut changes = lock(&self.changes);
            let epoch = changes.bump();
            changes.assigned.insert(id.to_string(), epoch);
        }
        let persisted = self.persist(&records);
        drop(records);

        self.notify();
        persisted?;
        Ok(Backfill::Assigned)
    }

    /// Remove a remote document created for a record that no longer needs it.
    async fn discard_orphan(&self, remote: &dyn RemoteStore, id: String) {
        debug!(collection = %T::KIND, remote_id = %id, "discarding orphaned remote document");
        if let Err(err) = self
            .context
            .write_policy()
            .run("delete", || remote.delete(T::KIND, id.clone()))
            .await
        {
            warn!(
                collection = %T::KIND,
                remote_id = %id,
                error = %err,
                "failed to delete orphaned remote document"
            );
        }
    }

    fn register_push(&self, local_id: Uuid, handle: AbortHandle) -> u64 {
        let mut in_flight = lock(&self.in_flight);
        in_flight.next_token += 1;
        let token = in_flight.next_token;
        in_flight
            .pushes
            .entry(local_id)
            .or_default()
            .push((token, handle));
        token
    }

    fn unregister_push(&self, local_id: Uuid, token: u64) {
        let mut in_flight = lock(&self.in_flight);
        if let Some(handles) = in_flight.pushes.get_mut(&local_id) {
            handles.retain(|(candidate, _)| *candidate != token);
            if handles.is_empty() {
                in_flight.pushes.remove(&local_id);
            }
        }
    }

    fn abort_pushes(&self, local_id: Uuid) {
        let handles = lock(&self.in_flight).pushes.remove(&local_id);
        for (_, handle) in handles.into_iter().flatten() {
            handle.abort();
        }
    }

    /// Fold a full remote snapshot into the local collection.
    ///
    /// Unknown remote records are adopted, conflicts follow the kind's
    /// [`MergePolicy`], local records with a remote id missing from the
    /// snapshot are dropped and local-only records are kept.
    pub fn reconcile_from_snapshot(
        &self,
        snapshot: RemoteSnapshot,
    ) -> Result<ReconcileSummary, SyncError> {
        let observation = self.observe();
        self.merge_snapshot(snapshot, observation.epoch)
    }

    /// Fetch a snapshot through the read policy and reconcile it.
    ///
    /// Overlapping refreshes may complete in any order.
    pub async fn refresh_from_remote(&self) -> Result<ReconcileSummary, SyncError> {
        let remote = self.context.remote_if_online().ok_or(SyncError::Offline)?;
        let observation = self.observe();
        let snapshot = self
            .context
            .read_policy()
            .run("snapshot", || remote.snapshot(T::KIND))
            .await?;
        self.merge_snapshot(snapshot, observation.epoch)
    }

    fn observe(&self) -> Observation<'_> {
        let epoch = lock(&self.changes).observe();
        Observation {
            changes: &self.changes,
            epoch,
        }
    }

    fn merge_snapshot(
        &self,
        snapshot: RemoteSnapshot,
        observed: u64,
    ) -> Result<ReconcileSummary, SyncError> {
        let mut summary = ReconcileSummary::default();
        let authoritative = match T::MERGE_POLICY {
            MergePolicy::LastWriteWins => false,
            MergePolicy::PreferAuthoritativeSnapshot => {
                let authoritative = !snapshot.documents.is_empty()
                    || !snapshot.from_cache
                    || snapshot.has_pending_writes;
                if !authoritative {
                    debug!(collection = %T::KIND, "ignoring empty cached snapshot");
                    return Ok(summary);
                }
                true
            }
        };

        let mut order = Vec::with_capacity(snapshot.documents.len());
        let mut incoming: HashMap<String, RemoteDocument> =
            HashMap::with_capacity(snapshot.documents.len());
        for document in snapshot.documents {
            if !incoming.contains_key(&document.id) {
                order.push(document.id.clone());
            }
            incoming.insert(document.id.clone(), document);
        }

        let mut records = lock(&self.records);
        let mut changes = lock(&self.changes);
        let mut merged = IndexMap::with_capacity(records.len() + order.len());

        for (local_id, local) in records.iter() {
            let Some(id) = local.id.as_deref() else {
                merged.insert(*local_id, local.clone());
                continue;
            };

            let Some(document) = incoming.remove(id) else {
                if Changes::newer_than(&changes.assigned, id, observed) {
                    merged.insert(*local_id, local.clone());
                } else {
                    debug!(collection = %T::KIND, remote_id = %id, "dropping record deleted remotely");
                    summary.dropped += 1;
                }
                continue;
            };

            let remote_wins = authoritative || document.last_modified >= local.last_modified;
            if !remote_wins {
                debug!(
                    collection = %T::KIND,
                    remote_id = %id,
                    local = local.last_modified,
                    remote = document.last_modified,
                    "local copy is newer; keeping it"
                );
                summary.kept_local += 1;
                merged.insert(*local_id, local.clone());
                continue;
            }

            match serde_json::from_value::<T>(document.body) {
                Ok(fields) if fields == local.fields && document.last_modified == local.last_modified => {
                    summary.unchanged += 1;
                    merged.insert(*local_id, local.clone());
                }
                Ok(fields) => {
                    summary.replaced += 1;
                    merged.insert(
                        *local_id,
                        Record {
                            local_id: *local_id,
                            id: Some(document.id),
                            last_modified: document.last_modified,
                            fields,
                        },
                    );
                }
                Err(err) => {
                    warn!(collection = %T::KIND, remote_id = %id, error = %err, "skipping undecodable remote document");
                    summary.skipped += 1;
                    merged.insert(*local_id, local.clone());
                }
            }
        }

        for id in order {
            let Some(document) = incoming.remove(&id) else {
                continue;
            };
            if Changes::newer_than(&changes.deleted, &id, observed) {
                continue;
            }
            match Record::<T>::from_remote(document) {
                Ok(record) => {
                    summary.adopted += 1;
                    merged.insert(record.local_id, record);
                }
                Err(err) => {
                    warn!(collection = %T::KIND, remote_id = %id, error = %err, "skipping undecodable remote document");
                    summary.skipped += 1;
                }
            }
        }

        changes.forget_settled();
        drop(changes);

        if !summary.changed() {
            return Ok(summary);
        }

        *records = merged;
        let persisted = self.persist(&records);
        drop(records);

        self.notify();
        debug!(collection = %T::KIND, ?summary, "snapshot reconciled");
        persisted?;
        Ok(summary)
    }

    /// Remove a record locally, then remotely when online and it has a remote id.
    ///
    /// Pushes still in flight for the record are aborted.
    pub async fn delete_record(&self, key: RecordKey) -> Result<Deleted<T>, SyncError> {
        let (record, persisted) = {
            let mut records = lock(&self.records);
            let local_id = match &key {
                RecordKey::Local(local_id) => records.contains_key(local_id).then_some(*local_id),
                RecordKey::Remote(id) => records
                    .values()
                    .find(|record| record.id.as_deref() == Some(id.as_str()))
                    .map(|record| record.local_id),
            };
            let Some(record) = local_id.and_then(|local_id| records.shift_remove(&local_id)) else {
                let missing = match key {
                    RecordKey::Local(local_id) => local_id.to_string(),
                    RecordKey::Remote(id) => id,
                };
                return Err(SyncError::NotFound(missing));
            };
            if let Some(id) = &record.id {
                let mut changes = lock(&self.changes);
                changes.assigned.remove(id);
                changes.deleted.insert(id.clone(), DELETE_IN_PROGRESS);
            }
            let persisted = self.persist(&records);
            (record, persisted)
        };

        self.abort_pushes(record.local_id);
        self.notify();
        persisted?;

        let remote = match (&record.id, self.context.remote_if_online()) {
            (None, _) => Ok(RemoteDeletion::NotNeeded),
            (Some(_), None) => Ok(RemoteDeletion::Skipped),
            (Some(id), Some(remote)) => self
                .context
                .write_policy()
                .run("delete", || remote.delete(T::KIND, id.clone()))
                .await
                .map(|()| RemoteDeletion::Deleted)
                .map_err(SyncError::from),
        };
        if let Some(id) = &record.id {
            let mut changes = lock(&self.changes);
            let epoch = changes.bump();
            changes.deleted.insert(id.clone(), epoch);
        }

        Ok(Deleted { record, remote })
    }

    /// Push every pending record.
    ///
    /// `last_synced_at` advances to the start of the sweep only when no push
    /// failed.
    pub async fn sweep(&self) -> Result<SweepReport, SyncError> {
        if self.context.remote_if_online().is_none() {
            return Err(SyncError::Offline);
        }

        let started = now_ms();
        let pending = self.pending();
        let mut report = SweepReport::new(T::KIND, pending.len());

        let results: Vec<(Uuid, Result<PushOutcome, SyncError>)> = stream::iter(pending)
            .map(|record| async move {
                (record.local_id, self.push_to_remote(record.local_id).await)
            })
            .buffer_unordered(SWEEP_CONCURRENCY)
            .collect()
            .await;

        for (local_id, result) in results {
            match result {
                Ok(PushOutcome::Created { .. }) => report.created += 1,
                Ok(PushOutcome::Updated) => report.updated += 1,
                Ok(PushOutcome::RemoteNewer { .. }) => report.remote_newer += 1,
                Err(SyncError::NotFound(_) | SyncError::Cancelled) => report.skipped += 1,
                Err(err) => {
                    warn!(collection = %T::KIND, %local_id, error = %err, "sweep push failed");
                    report.failures.push(SweepFailure {
                        local_id,
                        message: err.user_message(),
                    });
                }
            }
        }

        if report.failures.is_empty() {
            self.mark_synced(started)?;
        }

        info!(
            collection = %T::KIND,
            attempted = report.attempted,
            created = report.created,
            updated = report.updated,
            failed = report.failures.len(),
            "sweep finished"
        );
        Ok(report)
    }

    fn mark_synced(&self, at: i64) -> CacheResult<()> {
        let mut synced = lock(&self.last_synced_at);
        *synced = Some(at);
        let meta = SyncMeta {
            last_synced_at: Some(at),
        };
        let key = Self::meta_key();
        let raw = serde_json::to_string(&meta).map_err(|source| CacheError::Encode {
            key: key.clone(),
            source,
        })?;
        self.cache.set(&key, &raw)
    }
}
