//! The five pipeline stages as standalone async functions.
//!
//! Each stage takes the resolved [`SessionIdentity`](gantry_core::SessionIdentity)
//! it needs as an argument rather than resolving it internally, so an identity
//! failure surfaces before any remote work starts.

mod compile;
mod dataset;
mod images;
mod metrics;
mod prepare;
mod serve;
mod train;

pub use compile::{compile_model, require_training};
pub use dataset::stage_dataset;
pub use images::{build_and_publish, prepare_build, publish_variant, PreparedBuild};
pub use metrics::{compile_rules, extract_series, fetch_job_metrics, MetricRule};
pub use prepare::prepare_environment;
pub use serve::{delete_endpoint, deploy_endpoint, predict};
pub use train::run_training;

use chrono::Utc;

/// A unique, platform-legal resource name: `{base}-{timestamp}-{suffix}`.
pub(crate) fn timestamped_name(base: &str) -> String {
    let stamp = Utc::now().format("%Y%m%d-%H%M%S");
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{base}-{stamp}-{}", &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::timestamped_name;

    #[test]
    fn names_carry_base_and_differ() {
        let a = timestamped_name("gantry-classifier");
        let b = timestamped_name("gantry-classifier");
        assert!(a.starts_with("gantry-classifier-"));
        assert_ne!(a, b);
    }

    #[test]
    fn suffix_is_eight_chars() {
        let name = timestamped_name("x");
        let suffix = name.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 8);
    }
}
