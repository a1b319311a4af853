//! Value encodings: flow width and flow colour.

use crate::geometry::tolerance::{clamp01, safe_div};
use serde::{Deserialize, Serialize};

/// Monotonic value → pixel size mapping supplied to the geometry builder.
pub trait SizeScale {
    fn size(&self, value: f64) -> f64;
}

impl<F: Fn(f64) -> f64> SizeScale for F {
    fn size(&self, value: f64) -> f64 {
        self(value)
    }
}

/// Square-root scale: linear interpolation in √-space, sign preserving.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SqrtScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
    #[serde(default)]
    pub clamp: bool,
}

impl SqrtScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range, clamp: false }
    }

    /// Domain `[1, max(values)]`, the usual setup for flow widths.
    pub fn for_values(values: impl IntoIterator<Item = f64>, range: [f64; 2]) -> Self {
        let max = values.into_iter().filter(|v| v.is_finite()).fold(1.0_f64, f64::max);
        Self::new([1.0, max], range)
    }

    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }
}

fn signed_sqrt(x: f64) -> f64 {
    if x < 0.0 {
        -(-x).sqrt()
    } else {
        x.sqrt()
    }
}

impl SizeScale for SqrtScale {
    fn size(&self, value: f64) -> f64 {
        let d0 = signed_sqrt(self.domain[0]);
        let d1 = signed_sqrt(self.domain[1]);
        let mut f = safe_div(signed_sqrt(value) - d0, d1 - d0, 0.5);
        if self.clamp {
            f = clamp01(f);
        }
        self.range[0] + (self.range[1] - self.range[0]) * f
    }
}

/// Categorical lookup: the i-th domain key maps to the i-th colour,
/// cycling through the range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrdinalColor {
    pub domain: Vec<String>,
    pub range: Vec<String>,
}

impl OrdinalColor {
    pub fn new<D: Into<String>, R: Into<String>>(domain: impl IntoIterator<Item = D>, range: impl IntoIterator<Item = R>) -> Self {
        Self {
            domain: domain.into_iter().map(Into::into).collect(),
            range: range.into_iter().map(Into::into).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        if self.range.is_empty() {
            return None;
        }
        let ix = self.domain.iter().position(|d| d == key)?;
        Some(&self.range[ix % self.range.len()])
    }

    /// `(key, colour)` pairs in domain order.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        self.domain
            .iter()
            .filter_map(|d| self.get(d).map(|c| (d.as_str(), c)))
            .collect()
    }
}

/// Colour channels for the two gradient families.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowColors {
    pub inbounds: OrdinalColor,
    pub outbounds: OrdinalColor,
}

impl Default for FlowColors {
    fn default() -> Self {
        let palette = || OrdinalColor::new(["outbound", "inbound"], ["#ed3b9c", "#02a9e7"]);
        Self { inbounds: palette(), outbounds: palette() }
    }
}
