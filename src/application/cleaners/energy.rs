// Energy: hourly current x voltage, summed per day
use super::{DomainCleaner, SeriesRequest};
use crate::application::sample_source::{Bucket, FieldSelector, Reducer, Sample, Window};
use crate::domain::daily_record::DailyRecord;
use crate::domain::metric::Metric;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

const HOURLY_MEAN: Window = Window::Aggregated {
    bucket: Bucket::Hour,
    reducer: Reducer::Mean,
};

#[derive(Debug, Clone)]
pub struct EnergyCleaner {
    current: FieldSelector,
    voltage: FieldSelector,
}

impl EnergyCleaner {
    pub fn new(current: FieldSelector, voltage: FieldSelector) -> Self {
        Self { current, voltage }
    }
}

impl DomainCleaner for EnergyCleaner {
    fn metric(&self) -> Metric {
        Metric::Energy
    }

    fn requests(&self) -> Vec<SeriesRequest> {
        vec![
            SeriesRequest {
                selector: self.current.clone(),
                window: HOURLY_MEAN,
            },
            SeriesRequest {
                selector: self.voltage.clone(),
                window: HOURLY_MEAN,
            },
        ]
    }

    fn clean(&self, series: &[Vec<Sample>]) -> Vec<DailyRecord> {
        let current = series.first().map(Vec::as_slice).unwrap_or_default();
        let voltage = series.get(1).map(Vec::as_slice).unwrap_or_default();

        let voltage_by_hour: BTreeMap<DateTime<Utc>, f64> = voltage
            .iter()
            .filter_map(|s| s.value.map(|v| (s.time, v)))
            .collect();

        // Hours missing either reading are skipped, so a day with no complete hour
        // produces no record at all.
        let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for sample in current {
            let (Some(amps), Some(volts)) = (sample.value, voltage_by_hour.get(&sample.time)) else {
                continue;
            };
            *daily.entry(sample.time.date_naive()).or_default() += amps * volts;
        }

        tracing::debug!(
            current = current.len(),
            voltage = voltage.len(),
            days = daily.len(),
            "joined hourly power"
        );

        daily
            .into_iter()
            .map(|(date, consumption)| DailyRecord::energy(date, consumption))
            .collect()
    }
}
