mod counters;
mod sync_counters;

pub use sync_counters::SyncCounters;
