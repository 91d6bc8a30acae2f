//! In-memory audio handle cache.
//!
//! Stores synthesized audio keyed by opaque handle so the delivery
//! layer can stream it back by reference. Entries are immutable after
//! insert, so synchronization is insert-only. A miss is `None`, never
//! an error, so the retrieval boundary answers 404 instead of
//! crashing.
//!
//! Growth is bounded: entries expire after a TTL and the cache holds
//! at most `max_entries`, both enforced by an eviction sweep on
//! insert, oldest-inserted first. Handles are minted per synthesis
//! call and never reused, so eviction can never resurrect a stale
//! payload under a live handle.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dashmap::DashMap;

use stagecall_types::speech::{AudioHandle, SynthesizedAudio};

/// Default maximum number of cached clips.
pub const DEFAULT_MAX_ENTRIES: usize = 512;

/// Default time-to-live for a cached clip.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Bounded in-memory store for synthesized audio.
pub struct AudioCache {
    entries: DashMap<AudioHandle, Arc<SynthesizedAudio>>,
    /// Insertion order, for TTL/capacity sweeps.
    order: Mutex<VecDeque<(AudioHandle, Instant)>>,
    max_entries: usize,
    ttl: Duration,
}

impl AudioCache {
    /// Create a cache with the default capacity and TTL.
    pub fn new() -> Self {
        Self::with_policy(DEFAULT_MAX_ENTRIES, DEFAULT_TTL)
    }

    /// Create a cache with an explicit capacity and TTL.
    pub fn with_policy(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            max_entries: max_entries.max(1),
            ttl,
        }
    }

    /// Insert a clip under its handle. First writer for a handle wins;
    /// a duplicate insert is ignored.
    pub fn insert(&self, audio: SynthesizedAudio) -> AudioHandle {
        let handle = audio.handle;
        let mut fresh = false;
        self.entries.entry(handle).or_insert_with(|| {
            fresh = true;
            Arc::new(audio)
        });
        if fresh {
            let mut order = self.order.lock().expect("audio cache order lock poisoned");
            order.push_back((handle, Instant::now()));
            self.sweep(&mut order);
        }
        handle
    }

    /// Fetch a clip by handle. `None` on unknown or expired handles.
    pub fn fetch(&self, handle: &AudioHandle) -> Option<Arc<SynthesizedAudio>> {
        self.entries.get(handle).map(|entry| entry.value().clone())
    }

    /// Number of cached clips.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop expired entries, then oldest-inserted entries over capacity.
    fn sweep(&self, order: &mut VecDeque<(AudioHandle, Instant)>) {
        let now = Instant::now();
        while let Some((handle, inserted)) = order.front() {
            let expired = now.duration_since(*inserted) >= self.ttl;
            let over_cap = order.len() > self.max_entries;
            if !expired && !over_cap {
                break;
            }
            let handle = *handle;
            order.pop_front();
            self.entries.remove(&handle);
            tracing::debug!(%handle, expired, "Evicting cached audio");
        }
    }
}

impl Default for AudioCache {
    fn default() -> Self {
        Self::new()
    }
}
