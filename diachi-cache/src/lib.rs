//! TTL cache for diachi.
//!
//! Generic in-memory key/value store with time-based expiration. Used for
//! administrative names (24h) and street suggestions (5 min).

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;

pub use cache::{CacheStats, TtlCache};
