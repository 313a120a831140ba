// Monthly and yearly rollups derived from a daily record sequence
use super::daily_record::DailyRecord;
use super::metric::Metric;
use chrono::{Datelike, NaiveDate};
use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Dashboard key, e.g. `" 03/2023"` (the leading space is part of the key).
    pub fn key(&self) -> String {
        format!(" {:02}/{}", self.month, self.year)
    }

    pub fn days_in_month(&self) -> u32 {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|first| first.pred_opt())
            .map(|last| last.day())
            .unwrap_or(31)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MonthlyRollup {
    pub total: f64,
    pub average: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    pub complete_month: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct YearlyRollup {
    pub total: f64,
    pub days: u32,
    pub average: f64,
    pub complete_year: bool,
}

/// Monthly rollups in chronological order plus the `"current"` alias.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRollups {
    months: Vec<(YearMonth, MonthlyRollup)>,
    current: MonthlyRollup,
}

/// Yearly rollups in chronological order plus the `"current"` alias.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyRollups {
    years: Vec<(i32, YearlyRollup)>,
    current: YearlyRollup,
}

impl MonthlyRollups {
    pub fn months(&self) -> &[(YearMonth, MonthlyRollup)] {
        &self.months
    }

    pub fn current(&self) -> &MonthlyRollup {
        &self.current
    }
}

impl YearlyRollups {
    pub fn years(&self) -> &[(i32, YearlyRollup)] {
        &self.years
    }

    pub fn current(&self) -> &YearlyRollup {
        &self.current
    }
}

impl Serialize for MonthlyRollups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.months.len() + 1))?;
        for (year_month, rollup) in &self.months {
            map.serialize_entry(&year_month.key(), rollup)?;
        }
        map.serialize_entry("current", &self.current)?;
        map.end()
    }
}

impl Serialize for YearlyRollups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.years.len() + 1))?;
        for (year, rollup) in &self.years {
            map.serialize_entry(&year.to_string(), rollup)?;
        }
        map.serialize_entry("current", &self.current)?;
        map.end()
    }
}

/// Group `records` (already date ordered) by calendar month.
///
/// Energy and rainfall averages divide the total by the days in the month, or by
/// today's day-of-month for the active month. Temperature averages are the mean of
/// the daily means. Rainfall and temperature also count contributing days.
///
/// The rainfall average divides by calendar days, not rainy days; `days` only feeds
/// the yearly average.
pub fn monthly_rollups(
    metric: Metric,
    records: &[DailyRecord],
    today: NaiveDate,
) -> MonthlyRollups {
    let active = YearMonth::of(today);
    let counts_days = metric != Metric::Energy;

    let months: Vec<(YearMonth, MonthlyRollup)> = records
        .chunk_by(|a, b| YearMonth::of(a.date) == YearMonth::of(b.date))
        .map(|group| {
            let year_month = YearMonth::of(group[0].date);
            let values: Vec<f64> = group.iter().filter_map(DailyRecord::daily_value).collect();
            let total: f64 = values.iter().sum();

            let denominator = match metric {
                Metric::Temperature => values.len() as u32,
                _ if year_month == active => today.day(),
                _ => year_month.days_in_month(),
            };
            let average = if denominator == 0 {
                0.0
            } else {
                total / denominator as f64
            };

            let rollup = MonthlyRollup {
                total,
                average,
                days: counts_days.then_some(values.len() as u32),
                complete_month: year_month != active,
            };
            (year_month, rollup)
        })
        .collect();

    let current = months
        .iter()
        .find(|(ym, _)| *ym == active)
        .map(|(_, rollup)| rollup.clone())
        .unwrap_or(MonthlyRollup {
            total: 0.0,
            average: 0.0,
            days: counts_days.then_some(0),
            complete_month: false,
        });

    MonthlyRollups { months, current }
}

/// Fold monthly rollups into calendar years. The yearly average is the total over
/// the number of counted days.
pub fn yearly_rollups(monthly: &MonthlyRollups, today: NaiveDate) -> YearlyRollups {
    let mut years: Vec<(i32, YearlyRollup)> = Vec::new();

    for (year_month, month) in monthly.months() {
        let index = match years.iter().position(|(year, _)| *year == year_month.year) {
            Some(index) => index,
            None => {
                years.push((
                    year_month.year,
                    YearlyRollup {
                        total: 0.0,
                        days: 0,
                        average: 0.0,
                        complete_year: year_month.year != today.year(),
                    },
                ));
                years.len() - 1
            }
        };

        let year = &mut years[index].1;
        year.total += month.total;
        year.days += month.days.unwrap_or(0);
        year.average = if year.days == 0 {
            0.0
        } else {
            year.total / year.days as f64
        };
    }

    let current = years
        .iter()
        .find(|(year, _)| *year == today.year())
        .map(|(_, rollup)| rollup.clone())
        .unwrap_or(YearlyRollup {
            total: 0.0,
            days: 0,
            average: 0.0,
            complete_year: false,
        });

    YearlyRollups { years, current }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::daily_record::DayNight;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn month(monthly: &MonthlyRollups, year: i32, month: u32) -> &MonthlyRollup {
        monthly
            .months()
            .iter()
            .find(|(ym, _)| *ym == YearMonth { year, month })
            .map(|(_, rollup)| rollup)
            .unwrap()
    }

    #[test]
    fn test_month_key_and_length() {
        let ym = YearMonth::of(date(2023, 3, 9));
        assert_eq!(ym.key(), " 03/2023");
        assert_eq!(ym.days_in_month(), 31);
        assert_eq!(YearMonth { year: 2024, month: 2 }.days_in_month(), 29);
        assert_eq!(YearMonth { year: 2023, month: 2 }.days_in_month(), 28);
        assert_eq!(YearMonth { year: 2023, month: 12 }.days_in_month(), 31);
    }

    #[test]
    fn test_active_month_divides_by_day_of_month() {
        let today = date(2023, 9, 15);
        let records: Vec<DailyRecord> = (1..=15)
            .map(|d| DailyRecord::energy(date(2023, 9, d), 10.0))
            .collect();

        let monthly = monthly_rollups(Metric::Energy, &records, today);
        let current = monthly.current();
        assert_eq!(current.total, 150.0);
        assert_eq!(current.average, 10.0);
        assert!(!current.complete_month);
        assert_eq!(current.days, None);
    }

    #[test]
    fn test_completed_month_divides_by_calendar_days() {
        let today = date(2023, 10, 2);
        let records = vec![
            DailyRecord::energy(date(2023, 9, 1), 100.0),
            DailyRecord::energy(date(2023, 9, 30), 50.0),
        ];

        let monthly = monthly_rollups(Metric::Energy, &records, today);
        let september = month(&monthly, 2023, 9);
        assert_eq!(september.average, 5.0);
        assert!(september.complete_month);
    }

    #[test]
    fn test_same_month_of_previous_year_is_complete() {
        let today = date(2024, 9, 10);
        let records = vec![DailyRecord::energy(date(2023, 9, 1), 30.0)];

        let monthly = monthly_rollups(Metric::Energy, &records, today);
        let last_year = month(&monthly, 2023, 9);
        assert!(last_year.complete_month);
        assert_eq!(last_year.average, 1.0);
        assert_eq!(monthly.current().total, 0.0);
    }

    #[test]
    fn test_rainfall_placeholder_for_dry_month() {
        let today = date(2023, 5, 20);
        let records = vec![DailyRecord::rainfall(date(2023, 4, 3), 2.0)];

        let monthly = monthly_rollups(Metric::Rainfall, &records, today);
        assert_eq!(
            monthly.current(),
            &MonthlyRollup {
                total: 0.0,
                average: 0.0,
                days: Some(0),
                complete_month: false,
            }
        );
        assert_eq!(month(&monthly, 2023, 4).days, Some(1));
    }

    #[test]
    fn test_monthly_serializes_in_order_with_current_last() {
        let today = date(2023, 2, 10);
        let records = vec![
            DailyRecord::rainfall(date(2022, 12, 3), 1.0),
            DailyRecord::rainfall(date(2023, 1, 3), 2.0),
            DailyRecord::rainfall(date(2023, 2, 3), 3.0),
        ];

        let monthly = monthly_rollups(Metric::Rainfall, &records, today);
        let json = serde_json::to_string(&monthly).unwrap();
        let positions: Vec<usize> = [" 12/2022", " 01/2023", " 02/2023", "\"current\""]
            .iter()
            .map(|k| json.find(k).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_yearly_fold() {
        let today = date(2023, 6, 1);
        let mut records = Vec::new();
        for d in 1..=5 {
            records.push(DailyRecord::rainfall(date(2022, 3, d), 2.0));
        }
        for d in 1..=5 {
            records.push(DailyRecord::rainfall(date(2022, 4, d), 4.0));
        }

        let monthly = monthly_rollups(Metric::Rainfall, &records, today);
        let yearly = yearly_rollups(&monthly, today);
        assert_eq!(yearly.years().len(), 1);
        assert_eq!(
            yearly.years()[0],
            (
                2022,
                YearlyRollup {
                    total: 30.0,
                    days: 10,
                    average: 3.0,
                    complete_year: true,
                }
            )
        );
        assert_eq!(yearly.current().days, 0);
        assert!(!yearly.current().complete_year);

        let json = serde_json::to_value(&yearly).unwrap();
        assert_eq!(json["2022"]["total"], 30.0);
        assert_eq!(json["current"]["average"], 0.0);
    }

    #[test]
    fn test_temperature_month_is_mean_of_daily_means() {
        let today = date(2023, 3, 20);
        let sun = |d: u32| DayNight {
            sunrise: Utc.with_ymd_and_hms(2023, 3, d, 6, 0, 0).unwrap(),
            sunset: Utc.with_ymd_and_hms(2023, 3, d, 18, 0, 0).unwrap(),
            daytime: vec![],
            nighttime: vec![],
        };
        let records = vec![
            DailyRecord::temperature(
                date(2023, 3, 1),
                DayNight {
                    daytime: vec![10.0, 12.0],
                    ..sun(1)
                },
            ),
            DailyRecord::temperature(date(2023, 3, 2), sun(2)),
            DailyRecord::temperature(
                date(2023, 3, 3),
                DayNight {
                    nighttime: vec![4.0],
                    ..sun(3)
                },
            ),
        ];

        let monthly = monthly_rollups(Metric::Temperature, &records, today);
        let current = monthly.current();
        assert_eq!(current.days, Some(2));
        assert_eq!(current.total, 15.0);
        assert_eq!(current.average, 7.5);
    }
}
