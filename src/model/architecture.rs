//! Per-model constants and benchmarked reference curves

use crate::config::ContextScenario;
use crate::error::{CapError, Result};
use crate::estimators::interpolation::KnotCurve;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const BYTES_PER_GB: f64 = 1e9;
const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

fn default_tpot_calibration() -> f64 {
    1.0
}

/// Reference bandwidths for one (architecture, scenario) pair, measured at
/// the 100 ms reference TPOT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCurve {
    pub knots: KnotCurve,
    /// Bandwidth with every expert loaded per token
    #[serde(default)]
    pub dense_bandwidth_gbs: Option<f64>,
}

/// Static description of a MoE model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArchitecture {
    pub id: String,
    pub name: String,
    pub layers: u32,
    pub hidden_dim: u32,
    pub num_heads: u32,
    pub head_dim: u32,
    pub num_kv_heads: u32,
    pub num_experts: u32,
    pub top_k: u32,
    pub bytes_per_param: f64,
    /// Activated parameters per token, in billions
    pub activated_params_b: f64,
    /// All parameters, in billions
    pub total_params_b: f64,
    /// Decode-time KV cache bytes per token
    pub kv_bytes_per_token: f64,
    /// Sequence length the dense fallback assumes
    pub ref_seq_len: u32,
    /// Prefill compute per token (2 x activated params)
    pub per_token_gflops: f64,
    /// Prefill KV write volume per token, in bytes
    pub per_token_kv_bytes: f64,
    /// Divisor reconciling projected TPOT with measured runs
    #[serde(default = "default_tpot_calibration")]
    pub tpot_calibration: f64,
    #[serde(default)]
    pub curves: BTreeMap<ContextScenario, ReferenceCurve>,
}

impl ModelArchitecture {
    pub fn curve(&self, scenario: ContextScenario) -> Option<&ReferenceCurve> {
        self.curves.get(&scenario)
    }

    pub fn active_param_gb(&self) -> f64 {
        self.activated_params_b * self.bytes_per_param
    }

    pub fn total_param_gb(&self) -> f64 {
        self.total_params_b * self.bytes_per_param
    }

    /// KV cache held for `batch_size` sequences of `seq_len` tokens, in GB
    pub fn kv_cache_gb(&self, seq_len: u64, batch_size: u32) -> f64 {
        self.kv_bytes_per_token / BYTES_PER_GB * seq_len as f64 * batch_size as f64
    }

    /// Prefill KV write volume per token, in GiB
    pub fn per_token_kv_gib(&self) -> f64 {
        self.per_token_kv_bytes / BYTES_PER_GIB
    }

    pub fn validate(&self) -> Result<()> {
        let entry = self.id.as_str();
        if self.id.trim().is_empty() {
            return Err(CapError::invalid_data("<unnamed model>", "id", "must not be empty"));
        }

        let counts = [
            ("layers", self.layers),
            ("hidden_dim", self.hidden_dim),
            ("num_heads", self.num_heads),
            ("head_dim", self.head_dim),
            ("num_kv_heads", self.num_kv_heads),
            ("num_experts", self.num_experts),
            ("top_k", self.top_k),
            ("ref_seq_len", self.ref_seq_len),
        ];
        for (field, value) in counts {
            if value == 0 {
                return Err(CapError::invalid_data(entry, field, "must be positive"));
            }
        }
        if self.top_k > self.num_experts {
            return Err(CapError::invalid_data(
                entry,
                "top_k",
                format!("exceeds num_experts ({} > {})", self.top_k, self.num_experts),
            ));
        }

        let quantities = [
            ("bytes_per_param", self.bytes_per_param),
            ("activated_params_b", self.activated_params_b),
            ("total_params_b", self.total_params_b),
            ("kv_bytes_per_token", self.kv_bytes_per_token),
            ("per_token_gflops", self.per_token_gflops),
            ("per_token_kv_bytes", self.per_token_kv_bytes),
            ("tpot_calibration", self.tpot_calibration),
        ];
        for (field, value) in quantities {
            if !value.is_finite() || value <= 0.0 {
                return Err(CapError::invalid_data(
                    entry,
                    field,
                    format!("must be positive and finite, got {}", value),
                ));
            }
        }

        for (scenario, curve) in &self.curves {
            curve
                .knots
                .check()
                .map_err(|reason| CapError::invalid_data(entry, format!("curves.{}", scenario), reason))?;
            if let Some(dense) = curve.dense_bandwidth_gbs {
                if !dense.is_finite() || dense <= 0.0 {
                    return Err(CapError::invalid_data(
                        entry,
                        format!("curves.{}.dense_bandwidth_gbs", scenario),
                        format!("must be positive and finite, got {}", dense),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimators::interpolation::Knot;

    fn sample() -> ModelArchitecture {
        let mut curves = BTreeMap::new();
        curves.insert(
            ContextScenario::FiveK,
            ReferenceCurve {
                knots: KnotCurve::new(vec![Knot::new(1, 264.5536), Knot::new(32, 926.3536)]).unwrap(),
                dense_bandwidth_gbs: Some(946.5536),
            },
        );
        ModelArchitecture {
            id: "mixtral-8x7b".to_string(),
            name: "Mixtral-8x7B".to_string(),
            layers: 32,
            hidden_dim: 4096,
            num_heads: 32,
            head_dim: 128,
            num_kv_heads: 8,
            num_experts: 8,
            top_k: 2,
            bytes_per_param: 2.0,
            activated_params_b: 12.9,
            total_params_b: 46.7,
            kv_bytes_per_token: 65536.0,
            ref_seq_len: 5000,
            per_token_gflops: 14.0,
            per_token_kv_bytes: 131072.0,
            tpot_calibration: 1.0,
            curves,
        }
    }

    #[test]
    fn test_derived_sizes() {
        let arch = sample();
        assert!((arch.active_param_gb() - 25.8).abs() < 1e-9);
        assert!((arch.total_param_gb() - 93.4).abs() < 1e-9);
        // 65536 B/token x 5000 tokens x 1 sequence
        assert!((arch.kv_cache_gb(5000, 1) - 0.32768).abs() < 1e-12);
        assert!((arch.per_token_kv_gib() - 131072.0 / 1073741824.0).abs() < 1e-15);
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_gaps() {
        let mut arch = sample();
        arch.top_k = 0;
        assert!(arch.validate().unwrap_err().is_configuration());

        let mut arch = sample();
        arch.top_k = 9;
        assert!(arch.validate().is_err());

        let mut arch = sample();
        arch.tpot_calibration = 0.0;
        assert!(arch.validate().is_err());

        let mut arch = sample();
        arch.curves.get_mut(&ContextScenario::FiveK).unwrap().dense_bandwidth_gbs = Some(f64::NAN);
        assert!(arch.validate().is_err());
    }

    #[test]
    fn test_missing_calibration_defaults_to_one() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value.as_object_mut().unwrap().remove("tpot_calibration");
        let arch: ModelArchitecture = serde_json::from_value(value).unwrap();
        assert_eq!(arch.tpot_calibration, 1.0);
    }
}
