//! Training-metric series.

use crate::client::PlatformClient;
use crate::error::{CloudError, CloudResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One row of a metric series.
///
/// Rows fetched from the platform always carry a timestamp; rows extracted
/// locally from saved logs do not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricPoint {
    pub metric: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub value: f64,
}

/// Read side of the platform metrics system.
#[async_trait]
pub trait MetricsService: Send + Sync {
    /// Fetch the series for each configured metric name, in the given order.
    ///
    /// A name with no recorded series contributes no rows; an empty result is
    /// a valid outcome, not an error.
    async fn fetch_series(
        &self,
        job_name: &str,
        metric_names: &[String],
    ) -> CloudResult<Vec<MetricPoint>>;
}

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    #[serde(default)]
    points: Vec<SeriesPoint>,
}

#[derive(Debug, Deserialize)]
struct SeriesPoint {
    timestamp: DateTime<Utc>,
    value: f64,
}

/// Metrics backed by the platform API.
#[derive(Debug, Clone)]
pub struct HttpMetricsService {
    client: PlatformClient,
}

impl HttpMetricsService {
    pub fn new(client: PlatformClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetricsService for HttpMetricsService {
    async fn fetch_series(
        &self,
        job_name: &str,
        metric_names: &[String],
    ) -> CloudResult<Vec<MetricPoint>> {
        let mut rows = Vec::new();
        for name in metric_names {
            let path = format!("/v1/metrics/jobs/{job_name}/series/{name}");
            let response: SeriesResponse = match self.client.get_json(&path).await {
                Ok(response) => response,
                Err(CloudError::NotFound(_)) => {
                    debug!(job = %job_name, metric = %name, "no series recorded");
                    continue;
                }
                Err(e) => return Err(e),
            };
            rows.extend(response.points.into_iter().map(|p| MetricPoint {
                metric: name.clone(),
                timestamp: Some(p.timestamp),
                value: p.value,
            }));
        }
        Ok(rows)
    }
}
