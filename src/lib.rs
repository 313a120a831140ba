//! Incremental daily, monthly and yearly statistics for home sensors.
//!
//! Each metric keeps two JSON snapshots: finalized days, and finalized days plus
//! today's partial record. A refresh only fetches the days after the last
//! finalized one; rollups are recomputed from the snapshot on every read.
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
