use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Observability
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `[observability]`: optional OTLP export of the per-feed tick spans.
///
/// Without an endpoint `serve` writes JSON logs only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// OTLP/gRPC collector, e.g. `http://localhost:4317`.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,

    #[serde(default = "d_service_name")]
    pub service_name: String,

    /// Fraction of traces kept, `0.0..=1.0`.
    #[serde(default = "d_sample_rate")]
    pub sample_rate: f64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            otlp_endpoint: None,
            service_name: d_service_name(),
            sample_rate: d_sample_rate(),
        }
    }
}

impl ObservabilityConfig {
    pub fn sample_rate_in_range(&self) -> bool {
        (0.0..=1.0).contains(&self.sample_rate)
    }
}

fn d_service_name() -> String {
    "daypost".into()
}

fn d_sample_rate() -> f64 {
    1.0
}
