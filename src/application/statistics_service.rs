// Statistics service - Refresh and read use cases across metrics
use crate::application::clock::Clock;
use crate::application::period_cache::{PeriodCache, RefreshSummary};
use crate::domain::daily_record::DailyRecord;
use crate::domain::error::{Result, StatisticsError};
use crate::domain::metric::Metric;
use crate::domain::rollup::{MonthlyRollups, YearlyRollups, monthly_rollups, yearly_rollups};
use std::sync::Arc;

#[derive(Clone)]
pub struct StatisticsService {
    caches: Vec<PeriodCache>,
    clock: Arc<dyn Clock>,
}

impl StatisticsService {
    pub fn new(caches: Vec<PeriodCache>, clock: Arc<dyn Clock>) -> Self {
        Self { caches, clock }
    }

    pub fn metrics(&self) -> Vec<Metric> {
        self.caches.iter().map(PeriodCache::metric).collect()
    }

    pub async fn refresh(&self, metric: Metric) -> Result<RefreshSummary> {
        self.cache(metric)?.refresh().await
    }

    pub async fn read(&self, metric: Metric) -> Result<Vec<DailyRecord>> {
        self.cache(metric)?.read().await
    }

    pub async fn monthly(&self, metric: Metric) -> Result<MonthlyRollups> {
        let records = self.read(metric).await?;
        Ok(monthly_rollups(metric, &records, self.clock.today()))
    }

    /// Yearly totals are only kept for rainfall.
    pub async fn yearly_rainfall(&self) -> Result<YearlyRollups> {
        let monthly = self.monthly(Metric::Rainfall).await?;
        Ok(yearly_rollups(&monthly, self.clock.today()))
    }

    fn cache(&self, metric: Metric) -> Result<&PeriodCache> {
        self.caches
            .iter()
            .find(|cache| cache.metric() == metric)
            .ok_or_else(|| {
                StatisticsError::DataUnavailable(format!("{} is not configured", metric))
            })
    }
}
