// Application layer - Use cases and the collaborator seams they depend on
pub mod cleaners;
pub mod clock;
pub mod period_cache;
pub mod sample_source;
pub mod snapshot_store;
pub mod statistics_service;
pub mod sun_calendar;

#[cfg(test)]
pub mod testing;
