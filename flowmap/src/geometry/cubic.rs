//! Cubic Bézier curve utilities for evaluation, subdivision and measurement.
//!
//! Flow geometry is built from a single cubic per flow; everything derived
//! from it (arrow, animation path, outline) goes through these helpers.

use crate::geometry::tolerance::{
    clamp01, near_zero, ARC_LENGTH_TOL, EPS_LEN, EPS_POS, MAX_ARC_DEPTH, MAX_REDUCE_DEPTH, SIMPLE_ANGLE,
};
use crate::model::Vec2;
use serde::{Deserialize, Serialize};

/// Control points of a cubic Bézier curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub p0: Vec2, // Start point
    pub p1: Vec2, // First control point
    pub p2: Vec2, // Second control point
    pub p3: Vec2, // End point
}

impl CubicBezier {
    pub fn new(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Zero-length curve collapsed onto `p`.
    pub fn point(p: Vec2) -> Self {
        Self::new(p, p, p, p)
    }

    /// Straight segment with control points at thirds of the chord.
    pub fn line(a: Vec2, b: Vec2) -> Self {
        Self::new(a, a.lerp(b, 1.0 / 3.0), a.lerp(b, 2.0 / 3.0), b)
    }

    pub fn points(&self) -> [Vec2; 4] {
        [self.p0, self.p1, self.p2, self.p3]
    }

    pub fn start(&self) -> Vec2 {
        self.p0
    }

    pub fn end(&self) -> Vec2 {
        self.p3
    }

    pub fn reversed(&self) -> CubicBezier {
        CubicBezier::new(self.p3, self.p2, self.p1, self.p0)
    }

    /// All control points coincide.
    pub fn is_degenerate(&self) -> bool {
        self.p1.distance(self.p0) <= EPS_POS
            && self.p2.distance(self.p0) <= EPS_POS
            && self.p3.distance(self.p0) <= EPS_POS
    }

    /// Evaluate the curve at parameter t ∈ [0, 1].
    pub fn point_at(&self, t: f64) -> Vec2 {
        if t <= 0.0 {
            return self.p0;
        }
        if t >= 1.0 {
            return self.p3;
        }
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        Vec2 {
            x: mt3 * self.p0.x + 3.0 * mt2 * t * self.p1.x + 3.0 * mt * t2 * self.p2.x + t3 * self.p3.x,
            y: mt3 * self.p0.y + 3.0 * mt2 * t * self.p1.y + 3.0 * mt * t2 * self.p2.y + t3 * self.p3.y,
        }
    }

    /// First derivative at parameter t. Not normalized.
    pub fn tangent_at(&self, t: f64) -> Vec2 {
        let t2 = t * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;

        Vec2 {
            x: 3.0 * mt2 * (self.p1.x - self.p0.x)
                + 6.0 * mt * t * (self.p2.x - self.p1.x)
                + 3.0 * t2 * (self.p3.x - self.p2.x),
            y: 3.0 * mt2 * (self.p1.y - self.p0.y)
                + 6.0 * mt * t * (self.p2.y - self.p1.y)
                + 3.0 * t2 * (self.p3.y - self.p2.y),
        }
    }

    /// Unit direction of travel at t, falling back to neighbouring control
    /// points when the derivative vanishes (coincident handles).
    pub fn direction_at(&self, t: f64) -> Vec2 {
        let d = self.tangent_at(t);
        let len = d.length();
        if len > EPS_LEN {
            return d * (1.0 / len);
        }
        let candidates = if t < 0.5 {
            [self.p1 - self.p0, self.p2 - self.p0, self.p3 - self.p0]
        } else {
            [self.p3 - self.p2, self.p3 - self.p1, self.p3 - self.p0]
        };
        for c in candidates {
            let len = c.length();
            if len > EPS_LEN {
                return c * (1.0 / len);
            }
        }
        Vec2::ZERO
    }

    /// Unit normal at t (direction rotated a quarter turn).
    pub fn normal_at(&self, t: f64) -> Vec2 {
        self.direction_at(t).perp()
    }

    /// Split the curve at parameter t using de Casteljau subdivision.
    ///
    /// Returns two cubic curves: the first from 0..t, the second from t..1.
    /// `t` is clamped to [0, 1]; the end cases are exact.
    pub fn split_at(&self, t: f64) -> (CubicBezier, CubicBezier) {
        let t = clamp01(t);
        if t == 0.0 {
            return (CubicBezier::point(self.p0), *self);
        }
        if t == 1.0 {
            return (*self, CubicBezier::point(self.p3));
        }
        let p01 = self.p0.lerp(self.p1, t);
        let p12 = self.p1.lerp(self.p2, t);
        let p23 = self.p2.lerp(self.p3, t);

        let p012 = p01.lerp(p12, t);
        let p123 = p12.lerp(p23, t);

        let p0123 = p012.lerp(p123, t); // The split point

        let first = CubicBezier::new(self.p0, p01, p012, p0123);
        let second = CubicBezier::new(p0123, p123, p23, self.p3);

        (first, second)
    }

    /// Extract a portion of the curve from t0 to t1.
    pub fn subcurve(&self, t0: f64, t1: f64) -> CubicBezier {
        let (t0, t1) = (clamp01(t0), clamp01(t1));
        if t0 >= t1 {
            return CubicBezier::point(self.point_at(t0));
        }

        // First split at t1, take first part
        let (curve_to_t1, _) = self.split_at(t1);

        // Then split at t0 relative to [0, t1]
        let (_, result) = curve_to_t1.split_at(t0 / t1);

        result
    }

    /// Approximate arc length using adaptive subdivision.
    pub fn length(&self) -> f64 {
        self.arc_length(ARC_LENGTH_TOL)
    }

    pub fn arc_length(&self, tolerance: f64) -> f64 {
        arc_length_recursive(self.p0, self.p1, self.p2, self.p3, tolerance, 0)
    }

    /// Parameters in (0, 1) where either coordinate has a local extremum.
    pub fn extrema(&self) -> Vec<f64> {
        let a = self.p1 - self.p0;
        let b = self.p2 - self.p1;
        let c = self.p3 - self.p2;
        let mut ts = Vec::new();
        for (a, b, c) in [(a.x, b.x, c.x), (a.y, b.y, c.y)] {
            // derivative / 3 = A t² + B t + C
            let qa = a - 2.0 * b + c;
            let qb = 2.0 * (b - a);
            let qc = a;
            for t in quadratic_roots(qa, qb, qc) {
                if t > 1e-6 && t < 1.0 - 1e-6 {
                    ts.push(t);
                }
            }
        }
        ts.sort_by(|x, y| x.total_cmp(y));
        ts.dedup_by(|x, y| (*x - *y).abs() < 1e-6);
        ts
    }

    /// A curve is simple when its control points sit on one side of the
    /// chord and its end normals differ by less than 60°. Simple curves
    /// offset cleanly by moving control points along the end normals.
    pub fn is_simple(&self) -> bool {
        let chord = self.p3 - self.p0;
        let scale = chord.length().max(EPS_LEN);
        let s1 = chord.cross(self.p1 - self.p0) / scale;
        let s2 = chord.cross(self.p2 - self.p0) / scale;
        if (s1 > EPS_POS && s2 < -EPS_POS) || (s1 < -EPS_POS && s2 > EPS_POS) {
            return false;
        }
        let n0 = self.normal_at(0.0);
        let n1 = self.normal_at(1.0);
        let cos = n0.dot(n1).clamp(-1.0, 1.0);
        cos.acos() < SIMPLE_ANGLE
    }

    /// Break the curve into simple pieces, in order. Degenerate input
    /// yields no pieces.
    pub fn reduce(&self) -> Vec<CubicBezier> {
        if self.is_degenerate() {
            return Vec::new();
        }
        let mut bounds = vec![0.0];
        bounds.extend(self.extrema());
        bounds.push(1.0);

        let mut out = Vec::new();
        for w in bounds.windows(2) {
            push_simple(self.subcurve(w[0], w[1]), 0, &mut out);
        }
        out
    }
}

fn push_simple(piece: CubicBezier, depth: u32, out: &mut Vec<CubicBezier>) {
    if piece.is_degenerate() {
        return;
    }
    if depth >= MAX_REDUCE_DEPTH || piece.is_simple() {
        out.push(piece);
        return;
    }
    let (left, right) = piece.split_at(0.5);
    push_simple(left, depth + 1, out);
    push_simple(right, depth + 1, out);
}

fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    let scale = a.abs().max(b.abs()).max(c.abs());
    if near_zero(scale, EPS_LEN) {
        return Vec::new();
    }
    if near_zero(a / scale, 1e-12) {
        if near_zero(b / scale, 1e-12) {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    let sq = disc.sqrt();
    vec![(-b + sq) / (2.0 * a), (-b - sq) / (2.0 * a)]
}

/// Recursive arc length computation with adaptive subdivision.
fn arc_length_recursive(
    p0: Vec2,
    p1: Vec2,
    p2: Vec2,
    p3: Vec2,
    tolerance: f64,
    depth: u32,
) -> f64 {
    let chord = p0.distance(p3);
    let poly_len = p0.distance(p1) + p1.distance(p2) + p2.distance(p3);

    // If flat enough or max depth reached, use average of chord and polygon
    if depth >= MAX_ARC_DEPTH || (poly_len - chord).abs() < tolerance {
        return (chord + poly_len) * 0.5;
    }

    // Subdivide at t=0.5 using de Casteljau
    let p01 = p0.lerp(p1, 0.5);
    let p12 = p1.lerp(p2, 0.5);
    let p23 = p2.lerp(p3, 0.5);
    let p012 = p01.lerp(p12, 0.5);
    let p123 = p12.lerp(p23, 0.5);
    let mid = p012.lerp(p123, 0.5);

    arc_length_recursive(p0, p01, p012, mid, tolerance, depth + 1)
        + arc_length_recursive(mid, p123, p23, p3, tolerance, depth + 1)
}
