use crate::error::{CapError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decode-latency reference at which every benchmark knot was measured.
pub const REFERENCE_TPOT_MS: f64 = 100.0;

/// Batch sizes with benchmarked reference knots.
pub const BATCH_SIZE_PRESETS: [u32; 4] = [1, 32, 64, 128];

/// Common TPOT targets, in milliseconds. Any positive SLO is accepted.
pub const SLO_PRESETS_MS: [f64; 6] = [10.0, 20.0, 50.0, 100.0, 200.0, 250.0];

/// Context-length scenario a reference curve was benchmarked under
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ContextScenario {
    /// 4K input + 1K output
    #[default]
    #[serde(rename = "5k")]
    FiveK,
    /// 13K input + 1K output
    #[serde(rename = "14k")]
    FourteenK,
}

impl ContextScenario {
    pub const ALL: [ContextScenario; 2] = [ContextScenario::FiveK, ContextScenario::FourteenK];

    /// Fixed (input_len, output_len) pair for this scenario
    pub fn token_lengths(self) -> (u32, u32) {
        match self {
            ContextScenario::FiveK => (4000, 1000),
            ContextScenario::FourteenK => (13000, 1000),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContextScenario::FiveK => "5k",
            ContextScenario::FourteenK => "14k",
        }
    }
}

impl fmt::Display for ContextScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextScenario {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "5k" | "5k-ref" => Ok(ContextScenario::FiveK),
            "14k" | "14k-ref" => Ok(ContextScenario::FourteenK),
            other => Err(format!("Unknown context scenario: {}. Available: [\"5k\", \"14k\"]", other)),
        }
    }
}

/// One evaluation request. Built per query and never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryContext {
    pub batch_size: u32,
    pub input_len: u32,
    pub output_len: u32,
    pub slo_ms: f64,
    pub scenario: ContextScenario,
}

impl QueryContext {
    /// Context using the scenario's fixed token lengths
    pub fn new(batch_size: u32, scenario: ContextScenario, slo_ms: f64) -> Self {
        let (input_len, output_len) = scenario.token_lengths();
        Self {
            batch_size,
            input_len,
            output_len,
            slo_ms,
            scenario,
        }
    }

    pub fn with_batch_size(self, batch_size: u32) -> Self {
        Self { batch_size, ..self }
    }

    pub fn with_slo_ms(self, slo_ms: f64) -> Self {
        Self { slo_ms, ..self }
    }

    pub fn with_token_lengths(self, input_len: u32, output_len: u32) -> Self {
        Self {
            input_len,
            output_len,
            ..self
        }
    }

    /// Total sequence length held in the KV cache
    pub fn seq_len(&self) -> u64 {
        self.input_len as u64 + self.output_len as u64
    }

    pub fn slo_seconds(&self) -> f64 {
        self.slo_ms / 1000.0
    }

    /// Factor converting a bandwidth measured at the 100 ms reference into one for this SLO
    pub fn slo_scale(&self) -> f64 {
        REFERENCE_TPOT_MS / self.slo_ms
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size < 1 {
            return Err(CapError::InvalidBatchSize(self.batch_size));
        }
        if !self.slo_ms.is_finite() || self.slo_ms <= 0.0 {
            return Err(CapError::InvalidSlo(self.slo_ms));
        }
        Ok(())
    }
}

impl Default for QueryContext {
    fn default() -> Self {
        Self::new(1, ContextScenario::FiveK, REFERENCE_TPOT_MS)
    }
}

/// Query defaults as stored in a config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub model: String,
    pub batch_size: u32,
    pub scenario: ContextScenario,
    pub slo_ms: f64,
    /// Each length, when set, overrides the scenario's fixed value on its own
    pub input_len: Option<u32>,
    pub output_len: Option<u32>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            model: "deepseek-r1".to_string(),
            batch_size: 1,
            scenario: ContextScenario::FiveK,
            slo_ms: REFERENCE_TPOT_MS,
            input_len: None,
            output_len: None,
        }
    }
}

impl QueryConfig {
    pub fn to_context(&self) -> QueryContext {
        let context = QueryContext::new(self.batch_size, self.scenario, self.slo_ms);
        context.with_token_lengths(
            self.input_len.unwrap_or(context.input_len),
            self.output_len.unwrap_or(context.output_len),
        )
    }
}
