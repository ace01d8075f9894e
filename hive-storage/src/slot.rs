//! Lazily-initialized cache handles owned by resource packages.

use std::sync::{Arc, OnceLock};

use hive_core::StorageError;

use crate::cache::Cache;

/// Type-erased view of a package's cache handle.
///
/// The mount step only needs to initialize handles and report on them, so it
/// works against this trait rather than against each package's value type.
pub trait CacheHandle: Send + Sync {
    /// Name of the collection this handle stores (for logs and introspection).
    fn name(&self) -> &str;

    /// Create an empty cache if none is set yet. Returns true when one was created.
    fn ensure_initialized(&self) -> bool;

    fn is_initialized(&self) -> bool;

    /// Number of stored items, zero while uninitialized.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Slot holding the cache of one collection.
///
/// The slot is unset until [`CacheHandle::ensure_initialized`] runs (normally
/// when the owning package is mounted). A slot can also be pre-filled with
/// an existing cache, in which case mounting leaves it untouched.
#[derive(Debug)]
pub struct CacheSlot<T> {
    name: String,
    cell: OnceLock<Arc<Cache<T>>>,
}

impl<T> CacheSlot<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an unset slot.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cell: OnceLock::new(),
        }
    }

    /// Create a slot that already holds `cache`.
    pub fn with_cache(name: impl Into<String>, cache: Arc<Cache<T>>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(cache);
        Self {
            name: name.into(),
            cell,
        }
    }

    /// The initialized cache, or an error while the slot is still unset.
    pub fn get(&self) -> Result<Arc<Cache<T>>, StorageError> {
        self.cell
            .get()
            .cloned()
            .ok_or_else(|| StorageError::Uninitialized {
                name: self.name.clone(),
            })
    }

    /// The cache, creating it on first use.
    pub fn cache(&self) -> Arc<Cache<T>> {
        Arc::clone(self.cell.get_or_init(|| Arc::new(Cache::new())))
    }
}

impl<T> CacheHandle for CacheSlot<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn ensure_initialized(&self) -> bool {
        let mut created = false;
        self.cell.get_or_init(|| {
            created = true;
            Arc::new(Cache::new())
        });
        created
    }

    fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    fn len(&self) -> usize {
        self.cell.get().map(|cache| cache.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_starts_unset() {
        let slot: CacheSlot<String> = CacheSlot::new("links");
        assert!(!slot.is_initialized());
        assert_eq!(slot.len(), 0);
        assert_eq!(
            slot.get().err(),
            Some(StorageError::Uninitialized {
                name: "links".to_string()
            })
        );
    }

    #[test]
    fn test_ensure_initialized_creates_once() {
        let slot: CacheSlot<String> = CacheSlot::new("links");
        assert!(slot.ensure_initialized());
        assert!(!slot.ensure_initialized());
        assert!(slot.is_initialized());
    }

    #[test]
    fn test_initialization_keeps_existing_entries() -> Result<(), StorageError> {
        let slot: CacheSlot<String> = CacheSlot::new("links");
        slot.ensure_initialized();
        slot.get()?.set("a", "x".to_string());

        assert!(!slot.ensure_initialized());
        assert_eq!(slot.get()?.get("a"), Some("x".to_string()));
        assert_eq!(slot.len(), 1);
        Ok(())
    }

    #[test]
    fn test_prefilled_slot_is_not_replaced() -> Result<(), StorageError> {
        let cache = Arc::new(Cache::new());
        cache.set("seed", 7u32);
        let slot = CacheSlot::with_cache("numbers", Arc::clone(&cache));

        assert!(slot.is_initialized());
        assert!(!slot.ensure_initialized());
        assert_eq!(slot.get()?.get("seed"), Some(7));
        Ok(())
    }

    #[test]
    fn test_handles_are_object_safe() {
        let handles: Vec<Arc<dyn CacheHandle>> = vec![
            Arc::new(CacheSlot::<String>::new("a")),
            Arc::new(CacheSlot::<u64>::new("b")),
        ];
        for handle in &handles {
            assert!(handle.ensure_initialized());
            assert!(handle.is_empty());
        }
        assert_eq!(handles[1].name(), "b");
    }
}
