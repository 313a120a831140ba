// Per-metric rules that turn raw samples into daily records
pub mod energy;
pub mod rainfall;
pub mod temperature;

use crate::application::sample_source::{FieldSelector, Sample, Window};
use crate::domain::daily_record::DailyRecord;
use crate::domain::metric::Metric;

pub use energy::EnergyCleaner;
pub use rainfall::RainfallCleaner;
pub use temperature::TemperatureCleaner;

/// One series a cleaner needs from the sample source.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRequest {
    pub selector: FieldSelector,
    pub window: Window,
}

pub trait DomainCleaner: Send + Sync {
    fn metric(&self) -> Metric;

    /// Series to fetch for a refresh. `clean` receives them in the same order.
    fn requests(&self) -> Vec<SeriesRequest>;

    /// Build date-ordered daily records from the fetched series.
    fn clean(&self, series: &[Vec<Sample>]) -> Vec<DailyRecord>;
}
