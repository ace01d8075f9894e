//! Hive Storage - Concurrent Object Store
//!
//! Every resource package keeps its items in a [`Cache`], a concurrent map
//! from string keys to one concrete value type. Packages declare their caches
//! through [`CacheSlot`]s, which stay unset until the package is mounted.
//!
//! There is no persistence, no eviction and no TTL: a cache lives for the
//! process lifetime and only shrinks through explicit deletes.

pub mod cache;
pub mod slot;

pub use cache::Cache;
pub use slot::{CacheHandle, CacheSlot};
