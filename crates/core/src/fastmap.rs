//! Shared concurrent map/set aliases.
//!
//! Every shared-resource table in the engine (parser pool, compiled-query
//! cache, pattern metrics) goes through these aliases so the concurrency
//! discipline described in the spec's resource model lives in one place.

pub type FastMap<K, V> = dashmap::DashMap<K, V>;
pub type FastSet<K> = dashmap::DashSet<K>;
