// Main entry point - Dependency injection and a single refresh pass
use std::sync::Arc;

use home_statistics::application::cleaners::{
    DomainCleaner, EnergyCleaner, RainfallCleaner, TemperatureCleaner,
};
use home_statistics::application::clock::{Clock, SystemClock};
use home_statistics::application::period_cache::{PeriodCache, SnapshotKeys};
use home_statistics::application::sample_source::{FieldSelector, SampleSource};
use home_statistics::application::snapshot_store::SnapshotStore;
use home_statistics::application::statistics_service::StatisticsService;
use home_statistics::domain::metric::Metric;
use home_statistics::infrastructure::config::{
    StatisticsConfig, load_influx_config, load_statistics_config,
};
use home_statistics::infrastructure::influx_repository::InfluxRepository;
use home_statistics::infrastructure::json_store::JsonFileStore;
use home_statistics::infrastructure::solar::NoaaSunCalendar;
use home_statistics::presentation::endpoints::Endpoints;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let influx_config = load_influx_config()?;
    let statistics_config = load_statistics_config()?;

    // Create adapters (infrastructure layer)
    let source: Arc<dyn SampleSource> = Arc::new(InfluxRepository::new(&influx_config.influx)?);
    let store: Arc<dyn SnapshotStore> = Arc::new(JsonFileStore::new(&statistics_config.data_dir));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Create services (application layer)
    let caches = cleaners(&statistics_config)
        .into_iter()
        .map(|(cleaner, keys)| {
            PeriodCache::new(cleaner, keys, source.clone(), store.clone(), clock.clone())
        })
        .collect();
    let service = StatisticsService::new(caches, clock);
    let endpoints = Endpoints::new(service.clone());

    // Refresh every metric; one failing must not stop the others
    let mut failed = Vec::new();
    for metric in service.metrics() {
        match service.refresh(metric).await {
            Ok(_) => {
                if let Err(e) = log_current(&endpoints, metric).await {
                    tracing::warn!(
                        metric = %metric,
                        error = %e,
                        "could not summarise refreshed data"
                    );
                }
            }
            Err(e) => {
                tracing::error!(metric = %metric, error = %e, "refresh failed");
                failed.push(metric);
            }
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("refresh failed for {:?}", failed);
    }

    Ok(())
}

fn cleaners(config: &StatisticsConfig) -> Vec<(Arc<dyn DomainCleaner>, SnapshotKeys)> {
    let mut cleaners = Vec::new();

    if let Some(energy) = &config.energy {
        let cleaner: Arc<dyn DomainCleaner> = Arc::new(EnergyCleaner::new(
            FieldSelector::single(&energy.current_topic, &energy.current_field),
            FieldSelector::single(energy.voltage_topic(), &energy.voltage_field),
        ));
        cleaners.push((cleaner, SnapshotKeys::new(&energy.output_key, &energy.cache_key)));
    }

    if let Some(rainfall) = &config.rainfall {
        let cleaner: Arc<dyn DomainCleaner> =
            Arc::new(RainfallCleaner::new(FieldSelector::single(&rainfall.topic, &rainfall.field)));
        cleaners.push((cleaner, SnapshotKeys::new(&rainfall.output_key, &rainfall.cache_key)));
    }

    if let Some(temperature) = &config.temperature {
        let cleaner: Arc<dyn DomainCleaner> = Arc::new(TemperatureCleaner::new(
            FieldSelector::new(temperature.topic(), temperature.fields.clone()),
            Arc::new(NoaaSunCalendar::new(temperature.latitude, temperature.longitude)),
        ));
        let keys = SnapshotKeys::new(&temperature.output_key, &temperature.cache_key);
        cleaners.push((cleaner, keys));
    }

    cleaners
}

async fn log_current(endpoints: &Endpoints, metric: Metric) -> anyhow::Result<()> {
    match metric {
        Metric::Energy => {
            let latest = endpoints.daily_energy().await?.into_iter().next();
            let month = serde_json::to_string(endpoints.monthly_energy().await?.current())?;
            tracing::info!(latest = ?latest, current_month = %month, "energy");
        }
        Metric::Rainfall => {
            let latest = endpoints.daily_rainfall().await?.into_iter().next();
            let month = serde_json::to_string(endpoints.monthly_rainfall().await?.current())?;
            let year = serde_json::to_string(endpoints.yearly_rainfall().await?.current())?;
            tracing::info!(
                latest = ?latest,
                current_month = %month,
                current_year = %year,
                "rainfall"
            );
        }
        Metric::Temperature => {
            let latest = endpoints
                .daily_temperature()
                .await?
                .into_iter()
                .find_map(Result::ok);
            let month = serde_json::to_string(endpoints.monthly_temperature().await?.current())?;
            tracing::info!(latest = ?latest, current_month = %month, "temperature");
        }
    }
    Ok(())
}
