//! Circular-arc flow curves.
//!
//! A flow between two points follows the SVG elliptical arc with both radii
//! equal to the chord length, no rotation, small arc and counter-sweep. The
//! chord then subtends 60°, so the arc is always exactly one cubic segment.

use crate::geometry::cubic::CubicBezier;
use crate::geometry::tolerance::EPS_POS;
use crate::model::Vec2;
use std::f64::consts::{FRAC_PI_2, TAU};

/// Build the bulging cubic arc from `p1` to `p2`. Coincident points give a
/// zero-length curve at `p1`.
pub fn build_arc(p1: Vec2, p2: Vec2) -> CubicBezier {
    let r = p1.distance(p2);
    if r <= EPS_POS || !r.is_finite() {
        return CubicBezier::point(p1);
    }
    match arc_to_cubics(p1, p2, r, r, false, false).first() {
        Some(&(c1, c2, end)) => CubicBezier::new(p1, c1, c2, end),
        None => CubicBezier::point(p1),
    }
}

/// Convert an unrotated SVG arc into cubic segments `(c1, c2, end)`.
/// Each segment spans at most a quarter turn.
pub fn arc_to_cubics(
    from: Vec2,
    to: Vec2,
    rx: f64,
    ry: f64,
    large_arc: bool,
    sweep: bool,
) -> Vec<(Vec2, Vec2, Vec2)> {
    if rx <= 0.0 || ry <= 0.0 {
        return Vec::new();
    }
    let pxp = (from.x - to.x) / 2.0;
    let pyp = (from.y - to.y) / 2.0;
    if pxp == 0.0 && pyp == 0.0 {
        return Vec::new();
    }

    let (mut rx, mut ry) = (rx.abs(), ry.abs());
    let lambda = (pxp * pxp) / (rx * rx) + (pyp * pyp) / (ry * ry);
    if lambda > 1.0 {
        rx *= lambda.sqrt();
        ry *= lambda.sqrt();
    }

    let (center, ang1, ang2) = arc_center(from, to, rx, ry, large_arc, sweep, pxp, pyp);

    let segments = ((ang2.abs() / (TAU / 4.0)).ceil() as usize).max(1);
    let step = ang2 / segments as f64;
    let mut out = Vec::with_capacity(segments);
    let mut a = ang1;
    for _ in 0..segments {
        let (c1, c2, end) = unit_arc(a, step);
        out.push((
            map_to_ellipse(c1, rx, ry, center),
            map_to_ellipse(c2, rx, ry, center),
            map_to_ellipse(end, rx, ry, center),
        ));
        a += step;
    }
    out
}

#[allow(clippy::too_many_arguments)]
fn arc_center(
    from: Vec2,
    to: Vec2,
    rx: f64,
    ry: f64,
    large_arc: bool,
    sweep: bool,
    pxp: f64,
    pyp: f64,
) -> (Vec2, f64, f64) {
    let rxsq = rx * rx;
    let rysq = ry * ry;
    let pxpsq = pxp * pxp;
    let pypsq = pyp * pyp;

    let mut radicant = (rxsq * rysq) - (rxsq * pypsq) - (rysq * pxpsq);
    if radicant < 0.0 {
        radicant = 0.0;
    }
    radicant /= (rxsq * pypsq) + (rysq * pxpsq);
    radicant = radicant.sqrt() * if large_arc == sweep { -1.0 } else { 1.0 };

    let centerxp = radicant * rx / ry * pyp;
    let centeryp = radicant * -ry / rx * pxp;

    let center = Vec2::new(centerxp + (from.x + to.x) / 2.0, centeryp + (from.y + to.y) / 2.0);

    let vx1 = (pxp - centerxp) / rx;
    let vy1 = (pyp - centeryp) / ry;
    let vx2 = (-pxp - centerxp) / rx;
    let vy2 = (-pyp - centeryp) / ry;

    let ang1 = vector_angle(1.0, 0.0, vx1, vy1);
    let mut ang2 = vector_angle(vx1, vy1, vx2, vy2);

    if !sweep && ang2 > 0.0 {
        ang2 -= TAU;
    }
    if sweep && ang2 < 0.0 {
        ang2 += TAU;
    }
    (center, ang1, ang2)
}

fn vector_angle(ux: f64, uy: f64, vx: f64, vy: f64) -> f64 {
    let sign = if ux * vy - uy * vx < 0.0 { -1.0 } else { 1.0 };
    let dot = (ux * vx + uy * vy).clamp(-1.0, 1.0);
    sign * dot.acos()
}

/// Control points of a unit-circle arc starting at `ang1` spanning `ang2`.
fn unit_arc(ang1: f64, ang2: f64) -> (Vec2, Vec2, Vec2) {
    // exact constant for quarter turns
    let a = if ang2 == FRAC_PI_2 {
        0.551915024494
    } else if ang2 == -FRAC_PI_2 {
        -0.551915024494
    } else {
        4.0 / 3.0 * (ang2 / 4.0).tan()
    };

    let x1 = ang1.cos();
    let y1 = ang1.sin();
    let x2 = (ang1 + ang2).cos();
    let y2 = (ang1 + ang2).sin();

    (
        Vec2::new(x1 - y1 * a, y1 + x1 * a),
        Vec2::new(x2 + y2 * a, y2 - x2 * a),
        Vec2::new(x2, y2),
    )
}

fn map_to_ellipse(p: Vec2, rx: f64, ry: f64, center: Vec2) -> Vec2 {
    Vec2::new(p.x * rx + center.x, p.y * ry + center.y)
}
