//! Sorted-knot piecewise-linear curves
//!
//! Reference bandwidths are benchmarked only at a handful of batch sizes.
//! A [`KnotCurve`] answers for any batch size: exact at a knot, linear
//! between neighbouring knots, and held flat outside the benchmarked range.

use serde::{Deserialize, Serialize};

/// One benchmarked (batch size, bandwidth) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Knot {
    pub batch_size: u32,
    pub bandwidth_gbs: f64,
}

impl Knot {
    pub fn new(batch_size: u32, bandwidth_gbs: f64) -> Self {
        Self {
            batch_size,
            bandwidth_gbs,
        }
    }
}

/// How a curve value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurvePoint {
    Knot,
    Interpolated,
    HeldFlat,
}

/// Always holds at least one knot; deserialization runs the same checks as [`KnotCurve::new`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Knot>", into = "Vec<Knot>")]
pub struct KnotCurve {
    knots: Vec<Knot>,
}

impl TryFrom<Vec<Knot>> for KnotCurve {
    type Error = String;

    fn try_from(knots: Vec<Knot>) -> Result<Self, Self::Error> {
        Self::new(knots)
    }
}

impl From<KnotCurve> for Vec<Knot> {
    fn from(curve: KnotCurve) -> Self {
        curve.knots
    }
}

impl KnotCurve {
    /// Build a curve, rejecting empty, unsorted or non-positive knot sets
    pub fn new(knots: Vec<Knot>) -> Result<Self, String> {
        let curve = Self { knots };
        curve.check()?;
        Ok(curve)
    }

    /// Knots must be non-empty, strictly ascending, with positive finite bandwidth
    pub fn check(&self) -> Result<(), String> {
        if self.knots.is_empty() {
            return Err("curve has no knots".to_string());
        }
        for knot in &self.knots {
            if knot.batch_size == 0 {
                return Err("knot batch_size must be >= 1".to_string());
            }
            if !knot.bandwidth_gbs.is_finite() || knot.bandwidth_gbs <= 0.0 {
                return Err(format!(
                    "knot at batch_size {} has non-positive bandwidth {}",
                    knot.batch_size, knot.bandwidth_gbs
                ));
            }
        }
        for pair in self.knots.windows(2) {
            if pair[1].batch_size <= pair[0].batch_size {
                return Err(format!(
                    "knots not strictly ascending: {} follows {}",
                    pair[1].batch_size, pair[0].batch_size
                ));
            }
        }
        Ok(())
    }

    pub fn knots(&self) -> &[Knot] {
        &self.knots
    }

    pub fn first(&self) -> Knot {
        self.knots[0]
    }

    pub fn last(&self) -> Knot {
        self.knots[self.knots.len() - 1]
    }

    /// Exact knot value, if `batch_size` was benchmarked
    pub fn lookup(&self, batch_size: u32) -> Option<f64> {
        self.knots
            .binary_search_by_key(&batch_size, |k| k.batch_size)
            .ok()
            .map(|i| self.knots[i].bandwidth_gbs)
    }

    /// Linear interpolation between the nearest lower and upper knots.
    /// `None` outside the benchmarked range.
    pub fn interpolate(&self, x: f64) -> Option<f64> {
        let first = self.first();
        let last = self.last();
        if x < first.batch_size as f64 || x > last.batch_size as f64 {
            return None;
        }
        let upper = self
            .knots
            .iter()
            .position(|k| k.batch_size as f64 >= x)
            .unwrap_or(self.knots.len() - 1);
        let hi = self.knots[upper];
        if upper == 0 || hi.batch_size as f64 == x {
            return Some(hi.bandwidth_gbs);
        }
        let lo = self.knots[upper - 1];
        let ratio = (x - lo.batch_size as f64) / (hi.batch_size as f64 - lo.batch_size as f64);
        Some(lo.bandwidth_gbs + ratio * (hi.bandwidth_gbs - lo.bandwidth_gbs))
    }

    /// Flat extrapolation: the nearest end knot's value is reused as-is
    pub fn extrapolate(&self, x: f64) -> f64 {
        if x <= self.first().batch_size as f64 {
            self.first().bandwidth_gbs
        } else {
            self.last().bandwidth_gbs
        }
    }

    /// Value at `batch_size` together with how it was obtained
    pub fn evaluate(&self, batch_size: u32) -> (f64, CurvePoint) {
        if let Some(value) = self.lookup(batch_size) {
            return (value, CurvePoint::Knot);
        }
        let x = batch_size as f64;
        match self.interpolate(x) {
            Some(value) => (value, CurvePoint::Interpolated),
            None => (self.extrapolate(x), CurvePoint::HeldFlat),
        }
    }
}
