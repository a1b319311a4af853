//! Tapered outlines around a curve.
//!
//! The curve is reduced into simple pieces, each piece is offset to both
//! sides with a radius interpolated by arc length, and the two sides are
//! joined by straight caps into one closed band.

use crate::geometry::cubic::CubicBezier;
use crate::geometry::path::to_path_command;
use crate::geometry::tolerance::safe_div;
use crate::model::Vec2;

/// Closed band around a curve.
///
/// Segment order is `[start cap, forward.., end cap, backward..]`, so the end
/// cap sits at index `ceil(len / 2)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Outline {
    pub segments: Vec<CubicBezier>,
}

impl Outline {
    /// Zero-area outline collapsed onto a point.
    pub fn point(p: Vec2) -> Self {
        Outline { segments: vec![CubicBezier::point(p), CubicBezier::point(p)] }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn end_cap_index(&self) -> usize {
        self.segments.len().div_ceil(2)
    }

    pub fn end_cap_mut(&mut self) -> Option<&mut CubicBezier> {
        let ix = self.end_cap_index();
        self.segments.get_mut(ix)
    }

    /// One compound path; only the first segment carries a moveto.
    pub fn to_path(&self) -> String {
        self.segments
            .iter()
            .enumerate()
            .map(|(i, s)| to_path_command(&s.points(), i == 0))
            .collect()
    }
}

/// Outline `curve` with a radius growing linearly from `radius_start` to
/// `radius_end` along its length.
pub fn outline(curve: &CubicBezier, radius_start: f64, radius_end: f64) -> Outline {
    let pieces = curve.reduce();
    if pieces.is_empty() {
        return Outline::point(curve.start());
    }

    let lengths: Vec<f64> = pieces.iter().map(|p| p.length()).collect();
    let total: f64 = lengths.iter().sum();
    let radius_at = |along: f64| {
        let f = safe_div(along, total, 0.0);
        radius_start + (radius_end - radius_start) * f
    };

    let mut forward = Vec::with_capacity(pieces.len());
    let mut backward = Vec::with_capacity(pieces.len());
    let mut along = 0.0;
    for (piece, len) in pieces.iter().zip(&lengths) {
        let r0 = radius_at(along);
        let r1 = radius_at(along + len);
        forward.push(offset_piece(piece, r0, r1));
        backward.push(offset_piece(piece, -r0, -r1));
        along += len;
    }
    let backward: Vec<CubicBezier> = backward.iter().rev().map(|c| c.reversed()).collect();

    let fs = forward[0].p0;
    let fe = forward[forward.len() - 1].p3;
    let bs = backward[backward.len() - 1].p3;
    let be = backward[0].p0;

    let mut segments = Vec::with_capacity(2 * pieces.len() + 2);
    segments.push(CubicBezier::line(bs, fs));
    segments.extend(forward);
    segments.push(CubicBezier::line(fe, be));
    segments.extend(backward);
    Outline { segments }
}

/// Offset a simple piece: endpoints move along their normals, control
/// points along the normal of the endpoint they belong to, with the radius
/// taken at the matching third of the piece.
fn offset_piece(piece: &CubicBezier, r0: f64, r1: f64) -> CubicBezier {
    let n0 = piece.normal_at(0.0);
    let n1 = piece.normal_at(1.0);
    let r_at = |s: f64| r0 + (r1 - r0) * s;
    CubicBezier::new(
        piece.p0 + n0 * r0,
        piece.p1 + n0 * r_at(1.0 / 3.0),
        piece.p2 + n1 * r_at(2.0 / 3.0),
        piece.p3 + n1 * r1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::arc::build_arc;

    fn vec2(x: f64, y: f64) -> Vec2 {
        Vec2 { x, y }
    }

    fn assert_closed(o: &Outline) {
        for w in o.segments.windows(2) {
            assert!(w[0].p3.distance(w[1].p0) < 1e-6, "gap between {:?} and {:?}", w[0], w[1]);
        }
        let first = o.segments[0].p0;
        let last = o.segments[o.len() - 1].p3;
        assert!(first.distance(last) < 1e-6);
    }

    #[test]
    fn straight_line_band() {
        let line = CubicBezier::line(vec2(0.0, 0.0), vec2(100.0, 0.0));
        let o = outline(&line, 0.0, 10.0);
        assert_eq!(o.len(), 4);
        assert_closed(&o);
        // pointed start
        assert!(o.segments[0].p0.distance(vec2(0.0, 0.0)) < 1e-9);
        assert!(o.segments[0].p3.distance(vec2(0.0, 0.0)) < 1e-9);
        // end cap spans the full width
        let cap = o.segments[o.end_cap_index()];
        assert!((cap.p0.distance(cap.p3) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn arc_band_is_closed_and_tapered() {
        let arc = build_arc(vec2(0.0, 0.0), vec2(200.0, 50.0));
        let o = outline(&arc, 0.0, 8.0);
        assert!(o.len() >= 4);
        assert_eq!(o.len() % 2, 0);
        assert_closed(&o);
        let cap = o.segments[o.end_cap_index()];
        assert!((cap.p0.distance(cap.p3) - 16.0).abs() < 1e-6);
        assert!(cap.p0.distance(arc.end()) - 8.0 < 1e-6);
    }

    #[test]
    fn degenerate_curve_gives_point_outline() {
        let o = outline(&CubicBezier::point(vec2(3.0, 4.0)), 0.0, 5.0);
        assert_eq!(o.len(), 2);
        assert_eq!(o.end_cap_index(), 1);
        assert!(o.segments.iter().all(|s| s.is_degenerate()));
    }

    #[test]
    fn path_has_single_moveto() {
        let line = CubicBezier::line(vec2(0.0, 0.0), vec2(50.0, 0.0));
        let d = outline(&line, 0.0, 4.0).to_path();
        assert!(d.starts_with("M "));
        assert_eq!(d.matches('M').count(), 1);
        assert_eq!(d.matches('C').count(), 4);
    }
}
