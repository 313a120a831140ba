// Sunrise/sunset lookup used to split temperature readings
use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunTimes {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

impl SunTimes {
    /// True between sunrise and sunset, both ends included.
    pub fn is_daytime(&self, at: DateTime<Utc>) -> bool {
        self.sunrise <= at && at <= self.sunset
    }
}

pub trait SunCalendar: Send + Sync {
    fn sun_times(&self, date: NaiveDate) -> SunTimes;
}
