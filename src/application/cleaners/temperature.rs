// Temperature: raw readings split into daytime and nighttime lists
use super::{DomainCleaner, SeriesRequest};
use crate::application::sample_source::{FieldSelector, Sample, Window};
use crate::application::sun_calendar::SunCalendar;
use crate::domain::daily_record::{DailyRecord, DayNight};
use crate::domain::metric::Metric;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Readings below this are sensor-fault sentinels.
pub const FAULT_FLOOR: f64 = -140.0;

#[derive(Clone)]
pub struct TemperatureCleaner {
    sensor: FieldSelector,
    sun: Arc<dyn SunCalendar>,
}

impl TemperatureCleaner {
    pub fn new(sensor: FieldSelector, sun: Arc<dyn SunCalendar>) -> Self {
        Self { sensor, sun }
    }
}

impl DomainCleaner for TemperatureCleaner {
    fn metric(&self) -> Metric {
        Metric::Temperature
    }

    fn requests(&self) -> Vec<SeriesRequest> {
        vec![SeriesRequest {
            selector: self.sensor.clone(),
            window: Window::Raw,
        }]
    }

    fn clean(&self, series: &[Vec<Sample>]) -> Vec<DailyRecord> {
        let readings = series.first().map(Vec::as_slice).unwrap_or_default();

        let mut by_date: BTreeMap<NaiveDate, Vec<&Sample>> = BTreeMap::new();
        for sample in readings {
            by_date.entry(sample.time.date_naive()).or_default().push(sample);
        }

        by_date
            .into_iter()
            .map(|(date, samples)| {
                let sun = self.sun.sun_times(date);
                let mut day_night = DayNight {
                    sunrise: sun.sunrise,
                    sunset: sun.sunset,
                    daytime: Vec::new(),
                    nighttime: Vec::new(),
                };

                for sample in samples {
                    let Some(value) = sample.value else { continue };
                    if value < FAULT_FLOOR {
                        tracing::debug!(
                            time = %sample.time,
                            value,
                            "discarding sensor fault reading"
                        );
                        continue;
                    }
                    if sun.is_daytime(sample.time) {
                        day_night.daytime.push(value);
                    } else {
                        day_night.nighttime.push(value);
                    }
                }

                DailyRecord::temperature(date, day_night)
            })
            .collect()
    }
}
