//! Metric extraction rules and series retrieval.

use crate::error::{PipelineError, PipelineResult};
use crate::services::CloudServices;
use gantry_cloud::MetricPoint;
use gantry_core::MetricRuleConfig;
use regex::Regex;
use tracing::warn;

/// A compiled metric-extraction rule.
#[derive(Debug, Clone)]
pub struct MetricRule {
    pub name: String,
    pattern: Regex,
}

impl MetricRule {
    /// Compiles one configured rule.
    ///
    /// The pattern must contain exactly one capture group: the numeric value.
    pub fn parse(config: &MetricRuleConfig) -> PipelineResult<Self> {
        let pattern =
            Regex::new(&config.pattern).map_err(|e| PipelineError::InvalidMetricRule {
                name: config.name.clone(),
                reason: e.to_string(),
            })?;
        if pattern.captures_len() != 2 {
            return Err(PipelineError::InvalidMetricRule {
                name: config.name.clone(),
                reason: "pattern must contain exactly one capture group".to_string(),
            });
        }
        Ok(Self { name: config.name.clone(), pattern })
    }

    /// Applies the rule to one log line, returning the captured value.
    ///
    /// Lines whose capture is not numeric are skipped with a warning rather
    /// than failing the whole extraction.
    pub fn apply(&self, line: &str) -> Option<f64> {
        let captures = self.pattern.captures(line)?;
        let raw = captures.get(1)?.as_str();
        match raw.parse::<f64>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(rule = %self.name, raw, "Captured value is not numeric, skipping");
                None
            }
        }
    }
}

/// Compiles every configured rule, failing on the first invalid one.
pub fn compile_rules(configs: &[MetricRuleConfig]) -> PipelineResult<Vec<MetricRule>> {
    configs.iter().map(MetricRule::parse).collect()
}

/// Applies `rules` to saved log text, one row per matching line.
///
/// Rows come out grouped by rule, in rule order. Offline extraction has no
/// platform timestamps, so each row's timestamp stays empty.
pub fn extract_series(rules: &[MetricRule], log_text: &str) -> Vec<MetricPoint> {
    let mut rows = Vec::new();
    for rule in rules {
        for line in log_text.lines() {
            if let Some(value) = rule.apply(line) {
                rows.push(MetricPoint { metric: rule.name.clone(), timestamp: None, value });
            }
        }
    }
    rows
}

/// Fetches the named series for a job from the platform.
///
/// Partial or empty series are accepted as-is; a failed job legitimately
/// reports fewer points than a completed one.
pub async fn fetch_job_metrics(
    services: &CloudServices,
    rules: &[MetricRuleConfig],
    job_name: &str,
) -> PipelineResult<Vec<MetricPoint>> {
    let names: Vec<String> = rules.iter().map(|r| r.name.clone()).collect();
    Ok(services.metrics.fetch_series(job_name, &names).await?)
}
