//! Durable per-user "already delivered" cache.

pub mod entry;
pub mod store;

pub use entry::{CacheEntry, UsedCache};
pub use store::{StoreError, load_cache, save_cache};
