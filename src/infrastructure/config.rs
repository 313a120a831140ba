use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxConfig {
    pub influx: InfluxSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
    pub retention_policy: String,
    #[serde(default = "default_measurement")]
    pub measurement: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Which metrics to maintain and where their snapshots live. A metric without a
/// section is not refreshed.
#[derive(Debug, Deserialize, Clone)]
pub struct StatisticsConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    pub energy: Option<EnergySettings>,
    pub rainfall: Option<RainfallSettings>,
    pub temperature: Option<TemperatureSettings>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EnergySettings {
    #[serde(default = "default_current_topic")]
    pub current_topic: String,
    #[serde(default = "default_current_field")]
    pub current_field: String,
    /// Device whose `tele/SENSOR` topic reports mains voltage.
    pub voltage_source: String,
    #[serde(default = "default_voltage_field")]
    pub voltage_field: String,
    #[serde(default = "default_energy_output_key")]
    pub output_key: String,
    #[serde(default = "default_energy_cache_key")]
    pub cache_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RainfallSettings {
    #[serde(default = "default_rainfall_topic")]
    pub topic: String,
    #[serde(default = "default_rainfall_field")]
    pub field: String,
    #[serde(default = "default_rainfall_output_key")]
    pub output_key: String,
    #[serde(default = "default_rainfall_cache_key")]
    pub cache_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TemperatureSettings {
    /// Device whose `tele/SENSOR` topic reports temperature.
    pub temperature_source: String,
    #[serde(default = "default_temperature_fields")]
    pub fields: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_temperature_output_key")]
    pub output_key: String,
    #[serde(default = "default_temperature_cache_key")]
    pub cache_key: String,
}

impl EnergySettings {
    pub fn voltage_topic(&self) -> String {
        format!("{}/tele/SENSOR", self.voltage_source)
    }
}

impl TemperatureSettings {
    pub fn topic(&self) -> String {
        format!("{}/tele/SENSOR", self.temperature_source)
    }
}

fn default_measurement() -> String {
    "mqtt_consumer".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_current_topic() -> String {
    "CT_CLAMP/tele/SENSOR".to_string()
}

fn default_current_field() -> String {
    "Current".to_string()
}

fn default_voltage_field() -> String {
    "ENERGY_Voltage".to_string()
}

fn default_energy_output_key() -> String {
    "daily_energy.json".to_string()
}

fn default_energy_cache_key() -> String {
    "daily_energy_cache.json".to_string()
}

fn default_rainfall_topic() -> String {
    "WEATHER_TEST/SENSOR".to_string()
}

fn default_rainfall_field() -> String {
    "Rainfall".to_string()
}

fn default_rainfall_output_key() -> String {
    "daily_rainfall.json".to_string()
}

fn default_rainfall_cache_key() -> String {
    "daily_rainfall_cache.json".to_string()
}

fn default_temperature_fields() -> Vec<String> {
    vec!["BMP280_Temperature".to_string(), "BME280_Temperature".to_string()]
}

fn default_temperature_output_key() -> String {
    "daily_temperatures.json".to_string()
}

fn default_temperature_cache_key() -> String {
    "daily_temperatures_cache.json".to_string()
}

/// Reads `config/influx`, letting `STATISTICS_INFLUX__TOKEN` and friends override it.
pub fn load_influx_config() -> anyhow::Result<InfluxConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/influx"))
        .add_source(
            config::Environment::with_prefix("STATISTICS")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_statistics_config() -> anyhow::Result<StatisticsConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/statistics"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Parse configuration from TOML text.
pub fn parse_toml<T: DeserializeOwned>(toml: &str) -> anyhow::Result<T> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    Ok(settings.try_deserialize()?)
}
