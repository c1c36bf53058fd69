use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::time::{Instant, MissedTickBehavior};

use crate::code::{generate_code, normalize_code};
use crate::config::{StoreConfig, MIN_CLEANUP_INTERVAL};
use crate::entry::ClipEntry;
use crate::error::StoreError;

/// Cap on TTLs (~100 years) so `Instant + ttl` cannot overflow
const MAX_TTL_SECONDS: u64 = 100 * 365 * 24 * 60 * 60;

/// Pending evictions ordered by deadline. The id disambiguates equal
/// deadlines and ties a slot to one specific insertion of a code.
type Schedule = BTreeMap<(Instant, u64), String>;

/// Internal shared state for the store
struct StoreInner {
    data: DashMap<String, ClipEntry>,
    schedule: Mutex<Schedule>,
    next_id: AtomicU64,
    /// Wakes the eviction task when a new earliest deadline is scheduled
    wakeup: Arc<Notify>,
    /// Sender to signal shutdown to the eviction task
    shutdown_tx: watch::Sender<bool>,
    max_code_attempts: usize,
}

/// Thread-safe in-memory clip store with TTL expiry
///
/// Uses `DashMap` for concurrent access: reads never block other reads, and
/// writes only lock the shard holding the code being written.
///
/// Each store spawns one background task that evicts clips exactly when their
/// TTL elapses, driven by a deadline-ordered schedule, plus a periodic full
/// sweep as a safety net. Expired clips are also removed lazily when a read
/// finds them. The task stops on [`Store::shutdown`] or when the last handle
/// is dropped.
///
/// # Example
///
/// ```rust,no_run
/// use quickclip_core::Store;
///
/// #[tokio::main]
/// async fn main() {
///     let store = Store::new();
///
///     let clip = store.create("hello", 60).unwrap();
///     let found = store.get(clip.code()).unwrap();
///     assert_eq!(found.text(), "hello");
///
///     store.delete(clip.code());
/// }
/// ```
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Creates a new store with default configuration
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context. The store requires
    /// a runtime to spawn its background eviction task.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates a new store with custom configuration
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context.
    pub fn with_config(config: StoreConfig) -> Self {
        if tokio::runtime::Handle::try_current().is_err() {
            panic!(
                "quickclip_core::Store requires a Tokio runtime. \
                 Create it from within #[tokio::main], #[tokio::test], \
                 or other code running on a Tokio runtime."
            );
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let wakeup = Arc::new(Notify::new());

        let inner = Arc::new(StoreInner {
            data: DashMap::new(),
            schedule: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            wakeup: Arc::clone(&wakeup),
            shutdown_tx,
            max_code_attempts: config.max_code_attempts.max(1),
        });

        tokio::spawn(Self::eviction_task(
            Arc::downgrade(&inner),
            wakeup,
            config.cleanup_interval.max(MIN_CLEANUP_INTERVAL),
            shutdown_rx,
        ));

        Self { inner }
    }

    /// Background task that evicts clips as their deadlines pass.
    ///
    /// Holds only a weak reference so dropping every `Store` handle ends it.
    async fn eviction_task(
        inner: Weak<StoreInner>,
        wakeup: Arc<Notify>,
        interval: Duration,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let next_deadline = match inner.upgrade() {
                Some(inner) => inner.next_deadline(),
                None => break,
            };

            let until_due = async {
                match next_deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                _ = until_due => {
                    if let Some(inner) = inner.upgrade() {
                        let removed = inner.evict_due(Instant::now());
                        if removed > 0 {
                            tracing::debug!("evicted {} expired clips", removed);
                        }
                    }
                }
                _ = ticker.tick() => {
                    if let Some(inner) = inner.upgrade() {
                        let removed = inner.cleanup(Instant::now());
                        if removed > 0 {
                            tracing::debug!("sweep removed {} expired clips", removed);
                        }
                    }
                }
                _ = wakeup.notified() => {}
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::debug!("eviction task stopped");
    }

    /// Stores `text` under a freshly drawn code for `ttl_seconds`
    ///
    /// Codes colliding with a live clip are re-drawn, up to the configured
    /// attempt budget. A colliding clip that has already expired is replaced.
    /// A live clip is never overwritten.
    ///
    /// The store does not validate `text` or `ttl_seconds`; callers reject
    /// empty text and out-of-range TTLs. TTLs are capped at ~100 years.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Exhausted` if every drawn code was taken.
    pub fn create(
        &self,
        text: impl Into<Arc<str>>,
        ttl_seconds: u64,
    ) -> Result<ClipEntry, StoreError> {
        self.create_with_rng(&mut rand::thread_rng(), text.into(), ttl_seconds)
    }

    fn create_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        text: Arc<str>,
        ttl_seconds: u64,
    ) -> Result<ClipEntry, StoreError> {
        let ttl = Duration::from_secs(ttl_seconds.min(MAX_TTL_SECONDS));

        for _ in 0..self.inner.max_code_attempts {
            let code = generate_code(rng);
            let now = Instant::now();
            let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
            let entry = ClipEntry::new(id, code.clone(), Arc::clone(&text), ttl, now, Utc::now());

            // The shard lock is held until the schedule slot exists, so a
            // concurrent delete of this code always finds the slot to cancel.
            match self.inner.data.entry(code) {
                Entry::Occupied(mut occupied) => {
                    if !occupied.get().is_expired_at(now) {
                        continue;
                    }
                    let stale = occupied.insert(entry.clone());
                    self.inner.reschedule(Some(&stale), &entry);
                }
                Entry::Vacant(vacant) => {
                    let _slot = vacant.insert(entry.clone());
                    self.inner.reschedule(None, &entry);
                }
            }

            return Ok(entry);
        }

        Err(StoreError::Exhausted {
            attempts: self.inner.max_code_attempts,
        })
    }

    /// Stores an entry whose deadline has already passed (for testing purposes)
    #[cfg(test)]
    fn insert_expired(&self, code: &str, text: &str) {
        let now = Instant::now();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let entry = ClipEntry::new(
            id,
            code.to_string(),
            Arc::from(text),
            Duration::ZERO,
            now,
            Utc::now(),
        );
        self.inner.data.insert(code.to_string(), entry);
    }

    /// Looks up a clip by code
    ///
    /// The code is case-insensitive. Returns `None` if no clip exists or it
    /// has expired; an expired clip is removed as a side effect. Reads do not
    /// consume the clip.
    pub fn get(&self, code: &str) -> Option<ClipEntry> {
        let code = normalize_code(code);
        let now = Instant::now();
        let entry = self.inner.data.get(&code)?;

        if entry.is_expired_at(now) {
            let id = entry.id();
            // Drop the read reference before removing
            drop(entry);
            self.inner.remove_if_current(&code, id);
            return None;
        }

        Some(entry.value().clone())
    }

    /// Checks if a live clip exists for the code.
    ///
    /// Expired clips are lazily removed when checked.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Whole seconds until the clip expires, rounded down
    ///
    /// Returns 0 for absent or expired codes. Use [`Store::get`] to tell the
    /// two apart.
    pub fn remaining_seconds(&self, code: &str) -> u64 {
        let now = Instant::now();
        self.get(code).map_or(0, |entry| entry.remaining_seconds_at(now))
    }

    /// Deletes a clip and cancels its scheduled eviction
    ///
    /// Never fails. Returns `true` if a live clip was removed, `false` if the
    /// code was absent or already expired.
    pub fn delete(&self, code: &str) -> bool {
        let code = normalize_code(code);
        match self.inner.data.remove(&code) {
            Some((_, removed)) => {
                self.inner.unschedule(&removed);
                !removed.is_expired()
            }
            None => false,
        }
    }

    /// Removes every expired clip now
    ///
    /// Returns the number of clips removed. This also happens automatically
    /// in the background.
    pub fn cleanup(&self) -> usize {
        self.inner.cleanup(Instant::now())
    }

    /// Returns the number of clips held, including expired ones not yet evicted
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.data.len()
    }

    /// Returns `true` if the store holds no clips
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.data.is_empty()
    }

    /// Stops the background eviction task and drops all pending evictions
    ///
    /// Stored clips stay readable until they expire; expired clips are still
    /// removed lazily on read, and `cleanup` still works. Clips created after
    /// shutdown get no schedule slot. Called automatically when the last
    /// handle is dropped.
    pub fn shutdown(&self) {
        self.inner.shutdown_tx.send_replace(true);
        self.inner.schedule.lock().clear();
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreInner {
    fn next_deadline(&self) -> Option<Instant> {
        self.schedule
            .lock()
            .first_key_value()
            .map(|((deadline, _), _)| *deadline)
    }

    fn is_shut_down(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Replaces `stale`'s slot (if any) with one for `entry`, waking the
    /// eviction task if `entry` is now the first to expire.
    ///
    /// After shutdown nothing drains the schedule, so no slot is added.
    fn reschedule(&self, stale: Option<&ClipEntry>, entry: &ClipEntry) {
        let key = (entry.deadline(), entry.id());
        let is_earliest = {
            let mut schedule = self.schedule.lock();
            if let Some(stale) = stale {
                schedule.remove(&(stale.deadline(), stale.id()));
            }
            if self.is_shut_down() {
                return;
            }
            let is_earliest = schedule
                .first_key_value()
                .map_or(true, |(first, _)| key < *first);
            schedule.insert(key, entry.code().to_string());
            is_earliest
        };

        if is_earliest {
            self.wakeup.notify_one();
        }
    }

    fn unschedule(&self, entry: &ClipEntry) {
        self.schedule.lock().remove(&(entry.deadline(), entry.id()));
    }

    /// Removes the clip under `code` only if it is still insertion `id`.
    ///
    /// A code deleted and re-created in the meantime keeps its new clip.
    fn remove_if_current(&self, code: &str, id: u64) -> bool {
        match self.data.remove_if(code, |_, entry| entry.id() == id) {
            Some((_, removed)) => {
                self.unschedule(&removed);
                true
            }
            None => false,
        }
    }

    /// Evicts every scheduled clip whose deadline is at or before `now`.
    fn evict_due(&self, now: Instant) -> usize {
        let due = {
            let mut schedule = self.schedule.lock();
            let pending = schedule.split_off(&(now, u64::MAX));
            std::mem::replace(&mut *schedule, pending)
        };

        due.into_iter()
            .filter(|((_, id), code)| {
                self.data
                    .remove_if(code, |_, entry| entry.id() == *id)
                    .is_some()
            })
            .count()
    }

    /// Full sweep: scheduled evictions first, then anything else expired.
    fn cleanup(&self, now: Instant) -> usize {
        let mut removed = self.evict_due(now);
        self.data.retain(|_, entry| {
            if entry.is_expired_at(now) {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        // Signal the eviction task to stop when the store is dropped
        self.shutdown_tx.send_replace(true);
    }
}
