// Dashboard endpoints - Public shapes built from daily records and rollups
use crate::application::statistics_service::StatisticsService;
use crate::domain::daily_record::{DailyRecord, DayNight, Reading, Stats};
use crate::domain::error::{Result, StatisticsError};
use crate::domain::metric::Metric;
use crate::domain::rollup::{MonthlyRollups, YearlyRollups};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyEnergy {
    pub date: NaiveDate,
    pub consumption: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRainfall {
    pub date: NaiveDate,
    pub rainfall_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTemperature {
    pub date: NaiveDate,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub day_average: f64,
    pub day_min: f64,
    pub day_max: f64,
    pub night_average: f64,
    pub night_min: f64,
    pub night_max: f64,
}

#[derive(Clone)]
pub struct Endpoints {
    service: StatisticsService,
}

impl Endpoints {
    pub fn new(service: StatisticsService) -> Self {
        Self { service }
    }

    pub async fn daily_energy(&self) -> Result<Vec<DailyEnergy>> {
        Ok(format_daily_energy(&self.service.read(Metric::Energy).await?))
    }

    pub async fn monthly_energy(&self) -> Result<MonthlyRollups> {
        self.service.monthly(Metric::Energy).await
    }

    pub async fn daily_rainfall(&self) -> Result<Vec<DailyRainfall>> {
        Ok(format_daily_rainfall(&self.service.read(Metric::Rainfall).await?))
    }

    pub async fn monthly_rainfall(&self) -> Result<MonthlyRollups> {
        self.service.monthly(Metric::Rainfall).await
    }

    pub async fn yearly_rainfall(&self) -> Result<YearlyRollups> {
        self.service.yearly_rainfall().await
    }

    /// One entry per day; a day without daytime or nighttime readings is an error of its own.
    pub async fn daily_temperature(&self) -> Result<Vec<Result<DailyTemperature>>> {
        Ok(format_daily_temperature(&self.service.read(Metric::Temperature).await?))
    }

    pub async fn monthly_temperature(&self) -> Result<MonthlyRollups> {
        self.service.monthly(Metric::Temperature).await
    }
}

/// Most recent day first.
pub fn format_daily_energy(records: &[DailyRecord]) -> Vec<DailyEnergy> {
    records
        .iter()
        .rev()
        .filter_map(|record| match record.reading {
            Reading::Energy { consumption } => Some(DailyEnergy {
                date: record.date,
                consumption,
            }),
            _ => None,
        })
        .collect()
}

/// Most recent day first.
pub fn format_daily_rainfall(records: &[DailyRecord]) -> Vec<DailyRainfall> {
    records
        .iter()
        .rev()
        .filter_map(|record| match record.reading {
            Reading::Rainfall { rainfall_mm } => Some(DailyRainfall {
                date: record.date,
                rainfall_mm,
            }),
            _ => None,
        })
        .collect()
}

/// Most recent day first.
pub fn format_daily_temperature(records: &[DailyRecord]) -> Vec<Result<DailyTemperature>> {
    records
        .iter()
        .rev()
        .filter_map(|record| match &record.reading {
            Reading::Temperature(day_night) => Some(summarise_temperature(record.date, day_night)),
            _ => None,
        })
        .collect()
}

fn summarise_temperature(date: NaiveDate, day_night: &DayNight) -> Result<DailyTemperature> {
    let missing = |period: &str| {
        StatisticsError::DataUnavailable(format!(
            "no {} temperature readings on {}",
            period, date
        ))
    };
    let day = Stats::of(&day_night.daytime).ok_or_else(|| missing("daytime"))?;
    let night = Stats::of(&day_night.nighttime).ok_or_else(|| missing("nighttime"))?;
    let all = Stats::of(&day_night.all_day()).ok_or_else(|| missing("any"))?;

    Ok(DailyTemperature {
        date,
        sunrise: day_night.sunrise,
        sunset: day_night.sunset,
        average: all.average,
        min: all.min,
        max: all.max,
        day_average: day.average,
        day_min: day.min,
        day_max: day.max,
        night_average: night.average,
        night_min: night.min,
        night_max: night.max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::cleaners::TemperatureCleaner;
    use crate::application::period_cache::{PeriodCache, SnapshotKeys};
    use crate::application::sample_source::{FieldSelector, Sample};
    use crate::application::testing::{FixedClock, FixedSun, MemoryStore, ScriptedSource};
    use chrono::TimeZone;
    use std::sync::Arc;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 7, d).unwrap()
    }

    fn temperature(d: u32, daytime: Vec<f64>, nighttime: Vec<f64>) -> DailyRecord {
        DailyRecord::temperature(
            date(d),
            DayNight {
                sunrise: Utc.with_ymd_and_hms(2023, 7, d, 4, 0, 0).unwrap(),
                sunset: Utc.with_ymd_and_hms(2023, 7, d, 20, 0, 0).unwrap(),
                daytime,
                nighttime,
            },
        )
    }

    #[test]
    fn test_daily_lists_are_newest_first() {
        let records = vec![
            DailyRecord::rainfall(date(1), 1.0),
            DailyRecord::rainfall(date(2), 2.0),
            DailyRecord::rainfall(date(3), 3.0),
        ];
        let dates: Vec<NaiveDate> =
            format_daily_rainfall(&records).iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date(3), date(2), date(1)]);

        let energy = format_daily_energy(&[
            DailyRecord::energy(date(1), 5.0),
            DailyRecord::energy(date(2), 6.0),
        ]);
        assert_eq!(
            energy[0],
            DailyEnergy {
                date: date(2),
                consumption: 6.0
            }
        );
    }

    #[test]
    fn test_daily_temperature_reduces_lists() {
        let records = vec![
            temperature(1, vec![20.0, 24.0], vec![12.0]),
            temperature(2, vec![18.0], vec![10.0, 14.0]),
        ];

        let days: Vec<DailyTemperature> = format_daily_temperature(&records)
            .into_iter()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(days[0].date, date(2));
        assert_eq!(days[1].average, 56.0 / 3.0);
        assert_eq!(days[1].min, 12.0);
        assert_eq!(days[1].max, 24.0);
        assert_eq!(days[1].day_average, 22.0);
        assert_eq!(days[1].night_max, 12.0);

        let json = serde_json::to_value(&days[0]).unwrap();
        assert_eq!(json["date"], "2023-07-02");
        assert_eq!(json["night_average"], 12.0);
    }

    #[test]
    fn test_empty_period_fails_only_that_day() {
        let records = vec![
            temperature(1, vec![20.0], vec![]),
            temperature(2, vec![18.0], vec![11.0]),
        ];
        let days = format_daily_temperature(&records);

        assert_eq!(days[0].as_ref().unwrap().date, date(2));
        let err = days[1].as_ref().unwrap_err();
        assert!(matches!(err, StatisticsError::DataUnavailable(msg) if msg.contains("2023-07-01")));
    }

    #[tokio::test]
    async fn test_refresh_before_sunrise_keeps_finished_days() {
        const SENSOR: &str = "GARDEN/tele/SENSOR";
        let source = Arc::new(ScriptedSource::default());
        let clock = Arc::new(FixedClock::at(2023, 7, 2, 3));
        for (day, hour, value) in [(1, 2, 10.0), (1, 12, 20.0), (2, 2, 9.0)] {
            let time = Utc.with_ymd_and_hms(2023, 7, day, hour, 0, 0).unwrap();
            source.push(SENSOR, Sample::new(time, Some(value)));
        }
        let cache = PeriodCache::new(
            Arc::new(TemperatureCleaner::new(
                FieldSelector::single(SENSOR, "BME280_Temperature"),
                Arc::new(FixedSun::new(6, 20)),
            )),
            SnapshotKeys::new("daily_temperatures.json", "daily_temperatures_cache.json"),
            source,
            Arc::new(MemoryStore::default()),
            clock.clone(),
        );
        let service = StatisticsService::new(vec![cache], clock);
        let endpoints = Endpoints::new(service.clone());

        service.refresh(Metric::Temperature).await.unwrap();
        let days = endpoints.daily_temperature().await.unwrap();
        assert_eq!(days.len(), 2);

        let today = days[0].as_ref().unwrap_err();
        assert!(
            matches!(today, StatisticsError::DataUnavailable(msg) if msg.contains("2023-07-02"))
        );

        let yesterday = days[1].as_ref().unwrap();
        assert_eq!(yesterday.date, date(1));
        assert_eq!(yesterday.day_average, 20.0);
        assert_eq!(yesterday.night_average, 10.0);
        assert_eq!(yesterday.average, 15.0);
    }
}
