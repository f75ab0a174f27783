// Once-per-context memoization
//
// This module provides the OnceCache owned by every BuildContext. Each derived value
// (global config, boot image variants, classpaths) is stored in its own slot and computed
// at most once for the lifetime of the context.

use crate::error::{DexpreoptError, Result};
use crate::metrics::Metrics;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Typed identity token for a cached value.
///
/// Keys are compared by name and value type, so two keys with the same name but different
/// value types never share a slot.
pub struct OnceKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> OnceKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for OnceKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for OnceKey<T> {}

impl<T> fmt::Debug for OnceKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OnceKey").field(&self.name).finish()
    }
}

type SlotId = (&'static str, TypeId);
type Slot = Arc<Mutex<Option<Arc<dyn Any + Send + Sync>>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Compute-once table keyed by [`OnceKey`].
///
/// - The table lock is only held long enough to find or create a slot, never while a factory
///   runs, so a factory may resolve other keys.
/// - Each slot has its own lock. Concurrent first callers for one key serialize on it and all
///   observe the single stored value.
/// - A factory that returns an error stores nothing.
///
/// A factory must not resolve its own key; that deadlocks on the slot lock.
pub struct OnceCache {
    slots: Mutex<HashMap<SlotId, Slot>>,
    metrics: Arc<Metrics>,
}

impl OnceCache {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            metrics,
        }
    }

    fn slot<T: Any>(&self, key: OnceKey<T>) -> Slot {
        let mut slots = lock(&self.slots);
        slots
            .entry((key.name, TypeId::of::<T>()))
            .or_default()
            .clone()
    }

    fn downcast<T: Any + Send + Sync>(key: OnceKey<T>, value: Arc<dyn Any + Send + Sync>) -> Arc<T> {
        match value.downcast::<T>() {
            Ok(value) => value,
            // Slots are keyed by TypeId, so a slot only ever holds its key's type.
            Err(_) => unreachable!("once slot {} holds a foreign type", key.name),
        }
    }

    /// Return the value for `key`, running `factory` if no value is stored yet.
    pub fn once<T, F>(&self, key: OnceKey<T>, factory: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        match self.try_once(key, || Ok::<T, std::convert::Infallible>(factory())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible variant of [`once`](Self::once).
    ///
    /// On error the slot stays empty and the error is returned to this caller only.
    pub fn try_once<T, E, F>(&self, key: OnceKey<T>, factory: F) -> std::result::Result<Arc<T>, E>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> std::result::Result<T, E>,
    {
        let slot = self.slot(key);
        let mut guard = lock(&slot);

        if let Some(value) = guard.as_ref() {
            self.metrics.record_cache_hit();
            return Ok(Self::downcast(key, Arc::clone(value)));
        }

        self.metrics.record_computation();
        tracing::trace!("Computing once value {}", key.name);
        let value = Arc::new(factory()?);
        *guard = Some(value.clone() as Arc<dyn Any + Send + Sync>);
        Ok(value)
    }

    /// Store `value` under `key` unless a value is already present.
    pub fn try_insert<T>(&self, key: OnceKey<T>, value: T) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let slot = self.slot(key);
        let mut guard = lock(&slot);

        if guard.is_some() {
            return Err(DexpreoptError::AlreadyResolved(key.name));
        }

        let value = Arc::new(value);
        *guard = Some(value.clone() as Arc<dyn Any + Send + Sync>);
        Ok(value)
    }

    /// Check whether a value is stored under `key`.
    ///
    /// Blocks while another caller is computing the value.
    pub fn contains<T: Any>(&self, key: OnceKey<T>) -> bool {
        let slot = {
            let slots = lock(&self.slots);
            match slots.get(&(key.name, TypeId::of::<T>())) {
                Some(slot) => Arc::clone(slot),
                None => return false,
            }
        };
        let guard = lock(&slot);
        guard.is_some()
    }
}

impl fmt::Debug for OnceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&'static str> = lock(&self.slots).keys().map(|(name, _)| *name).collect();
        f.debug_struct("OnceCache").field("slots", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    const NUMBERS: OnceKey<Vec<u32>> = OnceKey::new("numbers");
    const LABEL: OnceKey<String> = OnceKey::new("label");

    fn create_test_cache() -> OnceCache {
        OnceCache::new(Arc::new(Metrics::new()))
    }

    #[test]
    fn test_once_returns_same_arc() {
        let cache = create_test_cache();
        let first = cache.once(NUMBERS, || vec![1, 2, 3]);
        let second = cache.once(NUMBERS, || vec![4, 5, 6]);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second, vec![1, 2, 3]);
    }

    #[test]
    fn test_same_name_different_type_is_distinct() {
        let cache = create_test_cache();
        const OTHER: OnceKey<String> = OnceKey::new("numbers");

        cache.once(NUMBERS, || vec![1]);
        let other = cache.once(OTHER, || "text".to_string());
        assert_eq!(*other, "text");
    }

    #[test]
    fn test_failed_factory_stores_nothing() {
        let cache = create_test_cache();
        let result: std::result::Result<Arc<String>, &str> = cache.try_once(LABEL, || Err("boom"));
        assert_eq!(result.unwrap_err(), "boom");
        assert!(!cache.contains(LABEL));

        let value: std::result::Result<Arc<String>, &str> =
            cache.try_once(LABEL, || Ok("ok".to_string()));
        assert_eq!(*value.unwrap(), "ok");
    }

    #[test]
    fn test_try_insert_rejects_filled_slot() {
        let cache = create_test_cache();
        cache.try_insert(LABEL, "first".to_string()).unwrap();

        let err = cache.try_insert(LABEL, "second".to_string()).unwrap_err();
        assert!(matches!(err, DexpreoptError::AlreadyResolved("label")));
        assert_eq!(*cache.once(LABEL, || "third".to_string()), "first");
    }

    #[test]
    fn test_nested_resolution_of_other_key() {
        let cache = create_test_cache();
        let label = cache.once(LABEL, || {
            let numbers = cache.once(NUMBERS, || vec![7, 8]);
            format!("{:?}", numbers)
        });
        assert_eq!(*label, "[7, 8]");
    }

    #[test]
    fn test_concurrent_first_access_runs_factory_once() {
        let cache = Arc::new(create_test_cache());
        let runs = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let runs = Arc::clone(&runs);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.once(NUMBERS, || {
                        runs.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(std::time::Duration::from_millis(20));
                        vec![42]
                    })
                })
            })
            .collect();

        let values: Vec<Arc<Vec<u32>>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        for value in &values {
            assert!(Arc::ptr_eq(value, &values[0]));
        }
    }
}
