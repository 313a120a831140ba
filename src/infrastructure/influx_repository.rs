// InfluxDB sample source implementation
use crate::application::sample_source::{
    Bucket, FieldSelector, Reducer, Sample, SampleSource, TimeRange, Window,
};
use crate::infrastructure::config::InfluxSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    client: reqwest::Client,
    host: String,
    token: String,
    database: String,
    retention_policy: String,
    measurement: String,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    columns: Vec<String>,
    values: Vec<Vec<serde_json::Value>>,
}

impl InfluxRepository {
    pub fn new(settings: &InfluxSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build InfluxDB HTTP client")?;

        Ok(Self {
            client,
            host: settings.host.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
            database: settings.database.clone(),
            retention_policy: settings.retention_policy.clone(),
            measurement: settings.measurement.clone(),
        })
    }

    fn build_query_url(&self, query: &str) -> String {
        let encoded_query = urlencoding::encode(query);
        format!(
            "{}/query?db={}&rp={}&q={}",
            self.host, self.database, self.retention_policy, encoded_query
        )
    }

    fn build_sample_query(
        &self,
        selector: &FieldSelector,
        range: &TimeRange,
        window: Window,
    ) -> String {
        let columns: Vec<String> = selector
            .fields
            .iter()
            .map(|field| match window {
                Window::Raw => quote_identifier(field),
                Window::Aggregated { reducer, .. } => format!(
                    "{}({}) AS {}",
                    reducer_function(reducer),
                    quote_identifier(field),
                    quote_identifier(field)
                ),
            })
            .collect();

        let mut query = format!(
            "SELECT {} FROM {} WHERE \"topic\" = '{}' AND time >= '{}' AND time < '{}'",
            columns.join(", "),
            quote_identifier(&self.measurement),
            escape_literal(&selector.topic),
            range.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            range.end.to_rfc3339_opts(SecondsFormat::Secs, true),
        );

        if let Window::Aggregated { bucket, .. } = window {
            query.push_str(&format!(" GROUP BY time({}) fill(none)", bucket_interval(bucket)));
        }

        query
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse> {
        let url = self.build_query_url(query);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB query failed with status {}: {}", status, body);
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .context("Failed to parse InfluxDB response")?;

        // Check for errors in the response
        if let Some(result) = data.results.first() {
            if let Some(error) = &result.error {
                anyhow::bail!("InfluxDB query error: {}", error);
            }
        }

        Ok(data)
    }
}

#[async_trait]
impl SampleSource for InfluxRepository {
    async fn fetch(
        &self,
        selector: &FieldSelector,
        range: &TimeRange,
        window: Window,
    ) -> Result<Vec<Sample>> {
        let query = self.build_sample_query(selector, range, window);
        tracing::debug!("Executing sample query: {}", query);

        let response = self.execute_query(&query).await?;
        Ok(parse_samples(&response))
    }
}

/// Flatten every series into samples ordered by time. A row's value is the first
/// numeric column after `time`, so interchangeable fields collapse into one series.
fn parse_samples(response: &InfluxQLResponse) -> Vec<Sample> {
    let mut samples = Vec::new();

    for result in &response.results {
        let Some(series) = &result.series else { continue };
        for s in series {
            let time_idx = s.columns.iter().position(|c| c == "time").unwrap_or(0);

            for row in &s.values {
                let Some(time_str) = row.get(time_idx).and_then(|v| v.as_str()) else {
                    continue;
                };
                let Ok(time) = chrono::DateTime::parse_from_rfc3339(time_str) else {
                    tracing::debug!("Skipping row with unparseable time {}", time_str);
                    continue;
                };
                let value = row
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| *idx != time_idx)
                    .find_map(|(_, v)| v.as_f64());

                samples.push(Sample::new(time.with_timezone(&Utc), value));
            }
        }
    }

    samples.sort_by_key(|s| s.time);
    samples
}

fn reducer_function(reducer: Reducer) -> &'static str {
    match reducer {
        Reducer::Mean => "mean",
        Reducer::Sum => "sum",
    }
}

fn bucket_interval(bucket: Bucket) -> &'static str {
    match bucket {
        Bucket::Hour => "1h",
        Bucket::Day => "1d",
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
