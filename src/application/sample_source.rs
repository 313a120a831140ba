// Repository trait for time-series sample access
use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use std::fmt;

/// A single (timestamp, value) pair. `value` is `None` when the bucket had no data.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub time: DateTime<Utc>,
    pub value: Option<f64>,
}

impl Sample {
    pub fn new(time: DateTime<Utc>, value: Option<f64>) -> Self {
        Self { time, value }
    }
}

/// Which series to read: the MQTT topic plus one or more interchangeable field names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSelector {
    pub topic: String,
    pub fields: Vec<String>,
}

impl FieldSelector {
    pub fn new(topic: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            topic: topic.into(),
            fields,
        }
    }

    pub fn single(topic: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(topic, vec![field.into()])
    }
}

/// Half-open `[start, end)` interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Covers whole UTC days from `first` through `last` inclusive.
    pub fn days(first: NaiveDate, last: NaiveDate) -> Self {
        let end = last.checked_add_days(Days::new(1)).unwrap_or(last);
        Self {
            start: first.and_time(NaiveTime::MIN).and_utc(),
            end: end.and_time(NaiveTime::MIN).and_utc(),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Hour,
    Day,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Mean,
    Sum,
}

/// How samples are reduced before they are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Raw,
    Aggregated { bucket: Bucket, reducer: Reducer },
}

#[async_trait]
pub trait SampleSource: Send + Sync {
    /// Samples for `selector` within `range`, oldest first.
    async fn fetch(
        &self,
        selector: &FieldSelector,
        range: &TimeRange,
        window: Window,
    ) -> anyhow::Result<Vec<Sample>>;
}
