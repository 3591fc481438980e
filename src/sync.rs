//! Thread-safe memoizer with single-flight semantics.
//!
//! [`SyncMemo`] offers the same operations as [`Memo`][crate::memo::Memo]
//! behind `&self`, usable from many threads at once.
//!
//! Every key owns a slot, a [`OnceCell`] shared through an `Arc`. The key map
//! is a [`DashMap`] and its shard locks are held only to find or create a
//! slot, never while a computation runs. Initialization of a slot is
//! serialized by the cell itself:
//!
//! - Concurrent callers with the same key collapse into one computation; the
//!   others block until it completes and share its result.
//! - Callers with different keys compute in parallel.
//! - A failed computation leaves its slot empty, so a waiting or later caller
//!   retries it. An empty slot nobody waits on is removed from the map.
//!
//! A computation must not call the wrapper with its own key: it would wait
//! on itself.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//! use memo_rs::sync::SyncMemo;
//!
//! let square = Arc::new(SyncMemo::new(|n: &u64| n * n));
//! let handles: Vec<_> = (0..4)
//!     .map(|_| {
//!         let square = Arc::clone(&square);
//!         thread::spawn(move || square.call(12).unwrap())
//!     })
//!     .collect();
//! for handle in handles {
//!     assert_eq!(handle.join().unwrap(), 144);
//! }
//! assert_eq!(square.misses(), 1);
//! ```

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use log::debug;
use once_cell::sync::OnceCell;

use crate::cache::CacheStats;
use crate::config::MemoConfig;
use crate::error::{KeyError, MemoError};
use crate::key::ArgKey;

type Slot<R> = Arc<OnceCell<R>>;

/// Thread-safe memoizing wrapper around a computation taking `&A`.
pub struct SyncMemo<A: ArgKey, R, F> {
    func: F,
    slots: DashMap<A::Key, Slot<R>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
    entries: AtomicUsize,
    config: MemoConfig,
    _phantom: PhantomData<fn(&A)>,
}

impl<A: ArgKey, R, F> SyncMemo<A, R, F> {
    fn build(func: F, config: MemoConfig) -> Self {
        assert!(config.capacity_bits <= 31, "Bits should be in the range 0..=31");
        Self {
            func,
            slots: DashMap::with_capacity(1 << config.capacity_bits),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            entries: AtomicUsize::new(0),
            config,
            _phantom: PhantomData,
        }
    }

    pub fn config(&self) -> &MemoConfig {
        &self.config
    }

    /// Number of calls served from the cache, including callers that waited
    /// for a concurrent computation of the same key.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of computations started.
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.entries.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits(),
            misses: self.misses(),
            entries: self.len(),
        }
    }

    /// Returns whether a result for `args` is cached.
    pub fn contains(&self, args: &A) -> Result<bool, KeyError> {
        let key = args.arg_key(&self.config)?;
        Ok(self.slots.get(&key).map_or(false, |slot| slot.value().get().is_some()))
    }

    /// Returns the cached result for `args` without computing it.
    pub fn peek(&self, args: &A) -> Result<Option<R>, KeyError>
    where
        R: Clone,
    {
        let key = args.arg_key(&self.config)?;
        Ok(self.slots.get(&key).and_then(|slot| slot.value().get().cloned()))
    }

    pub fn into_inner(self) -> F {
        self.func
    }

    /// Finds or creates the slot of `key`. Shard locks are released on return.
    fn slot(&self, key: A::Key) -> Slot<R> {
        let existing = self.slots.get(&key).map(|slot| Arc::clone(slot.value()));
        if let Some(slot) = existing {
            return slot;
        }
        let slot = self.slots.entry(key).or_insert_with(|| Arc::new(OnceCell::new()));
        Arc::clone(slot.value())
    }

    /// Removes the slot of `key` if it is still empty and only held by the
    /// map and the caller.
    fn release(&self, key: &A::Key, slot: &Slot<R>) {
        self.slots.remove_if(key, |_, current| {
            Arc::ptr_eq(current, slot) && current.get().is_none() && Arc::strong_count(current) == 2
        });
    }

    fn record(&self, computed: bool) {
        if computed {
            debug!("call => stored");
            self.entries.fetch_add(1, Ordering::Relaxed);
        } else {
            debug!("call => cached");
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl<A: ArgKey, R: Clone, F> SyncMemo<A, R, F> {
    /// Wraps an infallible computation.
    pub fn new(func: F) -> Self
    where
        F: Fn(&A) -> R,
    {
        Self::build(func, MemoConfig::default())
    }

    /// Wraps an infallible computation with a custom configuration.
    ///
    /// # Panics
    ///
    /// Panics if `config.capacity_bits` exceeds 31.
    pub fn with_config(func: F, config: MemoConfig) -> Self
    where
        F: Fn(&A) -> R,
    {
        Self::build(func, config)
    }

    /// Wraps a fallible computation. Only successful results are cached.
    pub fn fallible<E>(func: F) -> Self
    where
        F: Fn(&A) -> Result<R, E>,
    {
        Self::build(func, MemoConfig::default())
    }

    /// Wraps a fallible computation with a custom configuration.
    ///
    /// # Panics
    ///
    /// Panics if `config.capacity_bits` exceeds 31.
    pub fn fallible_with_config<E>(func: F, config: MemoConfig) -> Self
    where
        F: Fn(&A) -> Result<R, E>,
    {
        Self::build(func, config)
    }

    /// Returns the result for `args`, computing it at most once even when
    /// called concurrently.
    pub fn call(&self, args: A) -> Result<R, KeyError>
    where
        F: Fn(&A) -> R,
    {
        let key = args.arg_key(&self.config)?;
        debug!("call({:?})", key);
        let slot = self.slot(key);
        let mut computed = false;
        let res = slot.get_or_init(|| {
            computed = true;
            self.misses.fetch_add(1, Ordering::Relaxed);
            (self.func)(&args)
        });
        let res = res.clone();
        self.record(computed);
        Ok(res)
    }

    /// Returns the result for `args`, computing it until it first succeeds.
    ///
    /// A failure is returned to the caller whose computation failed; callers
    /// waiting on the same key then retry in turn.
    pub fn try_call<E>(&self, args: A) -> Result<R, MemoError<E>>
    where
        F: Fn(&A) -> Result<R, E>,
    {
        let key = args.arg_key(&self.config)?;
        debug!("call({:?})", key);
        let slot = self.slot(key.clone());
        let mut computed = false;
        let res = slot.get_or_try_init(|| {
            computed = true;
            self.misses.fetch_add(1, Ordering::Relaxed);
            (self.func)(&args)
        });
        match res {
            Ok(res) => {
                let res = res.clone();
                self.record(computed);
                Ok(res)
            }
            Err(e) => {
                debug!("call({:?}) => failed, not cached", key);
                self.release(&key, &slot);
                Err(MemoError::Computation(e))
            }
        }
    }
}

impl<A: ArgKey, R, F> Debug for SyncMemo<A, R, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("SyncMemo")
            .field("entries", &stats.entries)
            .field("hits", &stats.hits)
            .field("misses", &stats.misses)
            .finish()
    }
}
