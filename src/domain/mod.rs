// Domain layer - Metrics, daily records and rollups
pub mod daily_record;
pub mod error;
pub mod metric;
pub mod rollup;
