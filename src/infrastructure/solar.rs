// Sunrise equation for a fixed observer location
use crate::application::sun_calendar::{SunCalendar, SunTimes};
use chrono::{DateTime, NaiveDate, Utc};

const J2000: f64 = 2_451_545.0;
const UNIX_EPOCH_JULIAN: f64 = 2_440_587.5;
const SECONDS_PER_DAY: f64 = 86_400.0;
const EARTH_OBLIQUITY_DEG: f64 = 23.4397;
/// Apparent altitude of the sun's upper limb at rise/set, refraction included.
const HORIZON_DEG: f64 = -0.833;

#[derive(Debug, Clone, Copy)]
pub struct NoaaSunCalendar {
    latitude: f64,
    longitude: f64,
}

impl NoaaSunCalendar {
    /// Latitude north positive, longitude east positive, both in degrees.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

fn from_julian(julian: f64) -> DateTime<Utc> {
    let seconds = ((julian - UNIX_EPOCH_JULIAN) * SECONDS_PER_DAY).round() as i64;
    DateTime::from_timestamp(seconds, 0).unwrap_or_default()
}

impl SunCalendar for NoaaSunCalendar {
    fn sun_times(&self, date: NaiveDate) -> SunTimes {
        let j2000_date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default();
        let day_number = date.signed_duration_since(j2000_date).num_days() as f64;

        let mean_solar_noon = day_number + 0.0009 - self.longitude / 360.0;
        let mean_anomaly = (357.5291 + 0.985_600_28 * mean_solar_noon).rem_euclid(360.0);
        let m = mean_anomaly.to_radians();
        let center = 1.9148 * m.sin() + 0.0200 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin();
        let ecliptic_longitude = (mean_anomaly + center + 180.0 + 102.9372).rem_euclid(360.0);
        let lambda = ecliptic_longitude.to_radians();

        let transit = J2000 + mean_solar_noon + 0.0053 * m.sin() - 0.0069 * (2.0 * lambda).sin();

        let declination = (lambda.sin() * EARTH_OBLIQUITY_DEG.to_radians().sin()).asin();
        let phi = self.latitude.to_radians();
        let cos_hour_angle = (HORIZON_DEG.to_radians().sin() - phi.sin() * declination.sin())
            / (phi.cos() * declination.cos());
        // Outside [-1, 1] the sun never sets (or never rises); clamp to a 24h (or 0h) day.
        let hour_angle = cos_hour_angle.clamp(-1.0, 1.0).acos().to_degrees();

        SunTimes {
            sunrise: from_julian(transit - hour_angle / 360.0),
            sunset: from_julian(transit + hour_angle / 360.0),
        }
    }
}
