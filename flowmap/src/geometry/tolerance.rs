// Centralized tolerances and helpers for robust geometry

pub const EPS_POS: f64 = 1e-9;            // point coincidence threshold (px)
pub const EPS_LEN: f64 = 1e-9;            // zero-length vector threshold
pub const EPS_DENOM: f64 = 1e-12;         // denominator guard for ratios
pub const ARC_LENGTH_TOL: f64 = 1e-3;     // adaptive arc length flatness (px)

// Curve reduction
pub const SIMPLE_ANGLE: f64 = std::f64::consts::PI / 3.0;
pub const MAX_REDUCE_DEPTH: u32 = 8;
pub const MAX_ARC_DEPTH: u32 = 16;

#[inline] pub fn clamp01(x: f64) -> f64 { if x.is_nan() { 0.0 } else { x.max(0.0).min(1.0) } }
#[inline] pub fn near_zero(x: f64, eps: f64) -> bool { x.abs() <= eps }

#[inline]
pub fn safe_div(num: f64, den: f64, fallback: f64) -> f64 {
    if den.abs() <= EPS_DENOM || !den.is_finite() { fallback } else { num / den }
}

/// Round half up like `Math.round`.
#[inline]
pub fn round_half_up(x: f64) -> f64 { (x + 0.5).floor() }
