// In-memory collaborators for unit tests
use crate::application::clock::Clock;
use crate::application::sample_source::{FieldSelector, Sample, SampleSource, TimeRange, Window};
use crate::application::snapshot_store::SnapshotStore;
use crate::application::sun_calendar::{SunCalendar, SunTimes};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.lock().unwrap().get(key).cloned()
    }

    pub fn put(&self, key: &str, blob: &[u8]) {
        self.blobs.lock().unwrap().insert(key.to_string(), blob.to_vec());
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.get(key))
    }

    async fn save(&self, key: &str, blob: &[u8]) -> anyhow::Result<()> {
        self.put(key, blob);
        Ok(())
    }
}

/// Serves canned samples per topic, filtered to the requested range.
#[derive(Default)]
pub struct ScriptedSource {
    series: Mutex<HashMap<String, Vec<Sample>>>,
    requests: Mutex<Vec<(FieldSelector, TimeRange, Window)>>,
    offline: AtomicBool,
}

impl ScriptedSource {
    pub fn push(&self, topic: &str, sample: Sample) {
        self.series
            .lock()
            .unwrap()
            .entry(topic.to_string())
            .or_default()
            .push(sample);
    }

    pub fn clear(&self) {
        self.series.lock().unwrap().clear();
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<(FieldSelector, TimeRange, Window)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SampleSource for ScriptedSource {
    async fn fetch(
        &self,
        selector: &FieldSelector,
        range: &TimeRange,
        window: Window,
    ) -> anyhow::Result<Vec<Sample>> {
        self.requests
            .lock()
            .unwrap()
            .push((selector.clone(), *range, window));

        if self.offline.load(Ordering::SeqCst) {
            anyhow::bail!("connection refused");
        }

        Ok(self
            .series
            .lock()
            .unwrap()
            .get(&selector.topic)
            .map(|samples| {
                samples
                    .iter()
                    .filter(|s| range.start <= s.time && s.time < range.end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(y: i32, m: u32, d: u32, h: u32) -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Sunrise and sunset at the same UTC hours every day.
pub struct FixedSun {
    sunrise_hour: u32,
    sunset_hour: u32,
}

impl FixedSun {
    pub fn new(sunrise_hour: u32, sunset_hour: u32) -> Self {
        Self {
            sunrise_hour,
            sunset_hour,
        }
    }
}

impl SunCalendar for FixedSun {
    fn sun_times(&self, date: NaiveDate) -> SunTimes {
        let at = |hour: u32| date.and_hms_opt(hour, 0, 0).unwrap().and_utc();
        SunTimes {
            sunrise: at(self.sunrise_hour),
            sunset: at(self.sunset_hour),
        }
    }
}
