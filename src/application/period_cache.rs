// Period cache - Incremental refresh of one metric's snapshot pair
use crate::application::cleaners::DomainCleaner;
use crate::application::clock::Clock;
use crate::application::sample_source::{SampleSource, TimeRange};
use crate::application::snapshot_store::SnapshotStore;
use crate::domain::daily_record::{DailyRecord, decode_records, encode_records};
use crate::domain::error::{Result, StatisticsError};
use crate::domain::metric::Metric;
use chrono::NaiveDate;
use std::sync::Arc;

/// Store keys of the two persisted sequences of a metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotKeys {
    /// Finalized days only; never contains today.
    pub canonical: String,
    /// Finalized days plus today's partial record, if any.
    pub cache: String,
}

impl SnapshotKeys {
    pub fn new(canonical: impl Into<String>, cache: impl Into<String>) -> Self {
        Self {
            canonical: canonical.into(),
            cache: cache.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefreshSummary {
    pub metric: Metric,
    pub range: TimeRange,
    pub fetched: usize,
    pub watermark: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct PeriodCache {
    cleaner: Arc<dyn DomainCleaner>,
    keys: SnapshotKeys,
    source: Arc<dyn SampleSource>,
    store: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
}

impl PeriodCache {
    pub fn new(
        cleaner: Arc<dyn DomainCleaner>,
        keys: SnapshotKeys,
        source: Arc<dyn SampleSource>,
        store: Arc<dyn SnapshotStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cleaner,
            keys,
            source,
            store,
            clock,
        }
    }

    pub fn metric(&self) -> Metric {
        self.cleaner.metric()
    }

    /// Fetch everything after the watermark, merge it onto the canonical history and
    /// rewrite both snapshots. Nothing is written unless the fetch succeeds.
    pub async fn refresh(&self) -> Result<RefreshSummary> {
        let metric = self.metric();
        let today = self.clock.today();

        let history = self.load(&self.keys.canonical).await?.unwrap_or_default();
        let start = next_fetch_start(metric, &history);
        let range = TimeRange::days(start, today);

        tracing::info!(
            metric = %metric,
            range = %range,
            history = history.len(),
            "refreshing snapshot"
        );

        let fresh = if start > today {
            tracing::warn!(
                metric = %metric,
                %start,
                %today,
                "watermark is ahead of today, skipping fetch"
            );
            Vec::new()
        } else {
            self.fetch(&range).await?
        };
        let fetched = fresh.len();

        let (canonical, cache) = partition(merge(&history, fresh), today);
        let canonical_blob = encode_records(&canonical)?;
        let cache_blob = encode_records(&cache)?;

        self.store
            .save(&self.keys.cache, &cache_blob)
            .await
            .map_err(StatisticsError::Store)?;
        self.store
            .save(&self.keys.canonical, &canonical_blob)
            .await
            .map_err(StatisticsError::Store)?;

        let watermark = canonical.last().map(|r| r.date);
        tracing::info!(
            metric = %metric,
            fetched,
            canonical = canonical.len(),
            cache = cache.len(),
            watermark = ?watermark,
            "snapshot refreshed"
        );

        Ok(RefreshSummary {
            metric,
            range,
            fetched,
            watermark,
        })
    }

    /// The cache sequence, including today's record once it has been fetched.
    pub async fn read(&self) -> Result<Vec<DailyRecord>> {
        self.load(&self.keys.cache).await?.ok_or_else(|| {
            StatisticsError::DataUnavailable(format!(
                "{} snapshot {} has not been written yet",
                self.metric(),
                self.keys.cache
            ))
        })
    }

    async fn fetch(&self, range: &TimeRange) -> Result<Vec<DailyRecord>> {
        let mut series = Vec::new();
        for request in self.cleaner.requests() {
            let samples = self
                .source
                .fetch(&request.selector, range, request.window)
                .await
                .map_err(StatisticsError::SourceUnavailable)?;
            tracing::debug!(
                topic = %request.selector.topic,
                samples = samples.len(),
                "fetched series"
            );
            series.push(samples);
        }
        Ok(self.cleaner.clean(&series))
    }

    async fn load(&self, key: &str) -> Result<Option<Vec<DailyRecord>>> {
        let blob = self.store.load(key).await.map_err(StatisticsError::Store)?;
        blob.map(|blob| decode_records(self.metric(), key, &blob)).transpose()
    }
}

/// The day after the last persisted record, or the metric's epoch for an empty history.
pub fn next_fetch_start(metric: Metric, history: &[DailyRecord]) -> NaiveDate {
    history
        .last()
        .and_then(|record| record.date.succ_opt())
        .unwrap_or_else(|| metric.epoch())
}

/// Append `fresh` to `history`, dropping any fresh record that would break strictly
/// increasing dates.
pub fn merge(history: &[DailyRecord], fresh: Vec<DailyRecord>) -> Vec<DailyRecord> {
    let mut merged = history.to_vec();
    for record in fresh {
        if let Some(last) = merged.last() {
            if record.date <= last.date {
                tracing::warn!(
                    date = %record.date,
                    last = %last.date,
                    "dropping out-of-order record"
                );
                continue;
            }
        }
        merged.push(record);
    }
    merged
}

/// Split into (canonical, cache): canonical drops today's record, cache keeps everything.
pub fn partition(
    records: Vec<DailyRecord>,
    today: NaiveDate,
) -> (Vec<DailyRecord>, Vec<DailyRecord>) {
    let canonical = records.iter().filter(|r| r.date != today).cloned().collect();
    (canonical, records)
}
