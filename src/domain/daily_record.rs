// Daily record domain model and its persisted text form
use super::error::{Result, StatisticsError};
use super::metric::Metric;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One calendar day of one metric. `date` is the record's identity within a sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub reading: Reading,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reading {
    Energy { consumption: f64 },
    Rainfall { rainfall_mm: f64 },
    Temperature(DayNight),
}

/// Temperature readings for one day, split at sunrise and sunset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayNight {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub daytime: Vec<f64>,
    pub nighttime: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

impl Stats {
    /// Mean, minimum and maximum of `values`; `None` when empty.
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let average = values.iter().sum::<f64>() / values.len() as f64;
        Some(Self { average, min, max })
    }
}

impl DailyRecord {
    pub fn energy(date: NaiveDate, consumption: f64) -> Self {
        Self {
            date,
            reading: Reading::Energy { consumption },
        }
    }

    pub fn rainfall(date: NaiveDate, rainfall_mm: f64) -> Self {
        Self {
            date,
            reading: Reading::Rainfall { rainfall_mm },
        }
    }

    pub fn temperature(date: NaiveDate, day_night: DayNight) -> Self {
        Self {
            date,
            reading: Reading::Temperature(day_night),
        }
    }

    pub fn metric(&self) -> Metric {
        self.reading.metric()
    }

    /// The scalar summed by monthly rollups. Temperature days contribute the mean of
    /// all their readings, or nothing when no reading survived cleaning.
    pub fn daily_value(&self) -> Option<f64> {
        match &self.reading {
            Reading::Energy { consumption } => Some(*consumption),
            Reading::Rainfall { rainfall_mm } => Some(*rainfall_mm),
            Reading::Temperature(day_night) => Stats::of(&day_night.all_day()).map(|s| s.average),
        }
    }
}

impl Reading {
    pub fn metric(&self) -> Metric {
        match self {
            Reading::Energy { .. } => Metric::Energy,
            Reading::Rainfall { .. } => Metric::Rainfall,
            Reading::Temperature(_) => Metric::Temperature,
        }
    }
}

impl DayNight {
    pub fn all_day(&self) -> Vec<f64> {
        self.daytime.iter().chain(&self.nighttime).copied().collect()
    }
}

/// Serialize a record sequence into its persisted form.
pub fn encode_records(records: &[DailyRecord]) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(records).map_err(|e| StatisticsError::Store(e.into()))
}

/// Parse a persisted blob, checking that every record belongs to `metric` and that
/// dates are strictly increasing.
pub fn decode_records(metric: Metric, key: &str, blob: &[u8]) -> Result<Vec<DailyRecord>> {
    let malformed = |reason: String| StatisticsError::MalformedSnapshot {
        key: key.to_string(),
        reason,
    };

    let records: Vec<DailyRecord> =
        serde_json::from_slice(blob).map_err(|e| malformed(e.to_string()))?;

    for (i, record) in records.iter().enumerate() {
        if record.metric() != metric {
            return Err(malformed(format!(
                "record for {} holds {} data",
                record.date,
                record.metric()
            )));
        }
        if i > 0 && records[i - 1].date >= record.date {
            return Err(malformed(format!(
                "{} does not follow {}",
                record.date,
                records[i - 1].date
            )));
        }
    }

    Ok(records)
}
