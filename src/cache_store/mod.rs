//! On-disk cache of fetched pages, keyed by normalized job key

mod artifact;
mod counters;
pub mod key;
mod store;

pub use artifact::SuccessArtifact;
pub use counters::{CounterSnapshot, RunCounters};
pub use key::{NormalizedKey, normalize_key};
pub use store::CacheStore;
