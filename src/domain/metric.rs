// Metric identity and per-metric constants
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Energy,
    Rainfall,
    Temperature,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Energy, Metric::Rainfall, Metric::Temperature];

    /// First day of recorded history, used as the fetch start when nothing is persisted yet.
    pub fn epoch(self) -> NaiveDate {
        match self {
            Metric::Energy | Metric::Rainfall => NaiveDate::from_ymd_opt(2022, 8, 1),
            Metric::Temperature => NaiveDate::from_ymd_opt(2022, 7, 1),
        }
        .unwrap_or(NaiveDate::MIN)
    }

    pub fn name(self) -> &'static str {
        match self {
            Metric::Energy => "energy",
            Metric::Rainfall => "rainfall",
            Metric::Temperature => "temperature",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
