// Rainfall: daily tip-bucket totals above the noise threshold
use super::{DomainCleaner, SeriesRequest};
use crate::application::sample_source::{Bucket, FieldSelector, Reducer, Sample, Window};
use crate::domain::daily_record::DailyRecord;
use crate::domain::metric::Metric;

/// Gusts can tip the bucket on a dry day; totals at or below this are noise.
pub const NOISE_THRESHOLD_MM: f64 = 0.28;

#[derive(Debug, Clone)]
pub struct RainfallCleaner {
    gauge: FieldSelector,
}

impl RainfallCleaner {
    pub fn new(gauge: FieldSelector) -> Self {
        Self { gauge }
    }
}

impl DomainCleaner for RainfallCleaner {
    fn metric(&self) -> Metric {
        Metric::Rainfall
    }

    fn requests(&self) -> Vec<SeriesRequest> {
        vec![SeriesRequest {
            selector: self.gauge.clone(),
            window: Window::Aggregated {
                bucket: Bucket::Day,
                reducer: Reducer::Sum,
            },
        }]
    }

    fn clean(&self, series: &[Vec<Sample>]) -> Vec<DailyRecord> {
        let totals = series.first().map(Vec::as_slice).unwrap_or_default();

        totals
            .iter()
            .filter_map(|sample| match sample.value {
                Some(mm) if mm > NOISE_THRESHOLD_MM => {
                    Some(DailyRecord::rainfall(sample.time.date_naive(), mm))
                }
                _ => {
                    tracing::debug!(
                        time = %sample.time,
                        value = ?sample.value,
                        "discarding rainfall noise"
                    );
                    None
                }
            })
            .collect()
    }
}
