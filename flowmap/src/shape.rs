//! Per-flow geometry: arrow, draw-in path, tapered body and gradient angle.

use crate::config::FlowMapConfig;
use crate::geometry::arc::build_arc;
use crate::geometry::cubic::CubicBezier;
use crate::geometry::outline::outline;
use crate::geometry::path::to_path_command;
use crate::geometry::tolerance::{clamp01, round_half_up, safe_div};
use crate::model::Vec2;
use crate::scale::SizeScale;
use log::trace;
use serde::Serialize;
use std::f64::consts::FRAC_PI_2;

/// Everything a flow needs to be drawn.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FlowShape {
    pub arrow_path: String,
    pub animation_path: String,
    pub flow_path: String,
    /// Same shape as `flow_path`; keeps the draw-in stroke inside the body.
    pub clip_path: String,
    pub arrow_curve: CubicBezier,
    /// Midpoint of the arrow curve, where a value label sits.
    pub value_anchor: Vec2,
    /// Whole degrees, source → target.
    pub gradient_angle: f64,
    pub flow_radius: f64,
    pub arrow_length: f64,
    pub animation_length: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowGeometryBuilder {
    pub offset: f64,
    pub arrow_offset: f64,
    pub animation_extension: f64,
}

impl Default for FlowGeometryBuilder {
    fn default() -> Self {
        Self { offset: 12.0, arrow_offset: 4.0, animation_extension: 20.0 }
    }
}

/// Split fraction leaving `trim` pixels off the end of a curve of `length`.
fn trim_fraction(length: f64, trim: f64) -> f64 {
    clamp01(safe_div(length - trim, length, 0.0))
}

/// Rotation of the gradient from source to target, rounded half-up.
pub fn gradient_angle(source: Vec2, target: Vec2) -> f64 {
    let d = target - source;
    let angle = round_half_up(d.y.atan2(d.x).to_degrees());
    if angle.is_finite() {
        angle
    } else {
        0.0
    }
}

impl FlowGeometryBuilder {
    pub fn from_config(config: &FlowMapConfig) -> Self {
        Self {
            offset: config.offset,
            arrow_offset: config.arrow_offset,
            animation_extension: config.animation_extension,
        }
    }

    pub fn build(&self, source: Vec2, target: Vec2, value: f64, scale: &dyn SizeScale) -> FlowShape {
        let curve = build_arc(source, target);
        let length = curve.length();
        // too short for the arrow gap: everything collapses to the start
        let short = length < self.offset + self.arrow_offset;
        if short {
            trace!("flow {:?} -> {:?} shorter than arrow gap ({})", source, target, length);
        }

        let arrow_t = if short { 0.0 } else { trim_fraction(length, self.offset + self.arrow_offset) };
        let arrow_curve = curve.split_at(arrow_t).0;

        let anim_t = trim_fraction(length, self.offset + self.arrow_offset - self.animation_extension);
        let animation_curve = curve.split_at(anim_t).0;

        let radius = scale.size(value) / 2.0;
        let flow_radius = if radius.is_finite() && radius > 0.0 { radius } else { 0.0 };
        let body_t = if short { 0.0 } else { trim_fraction(length, self.offset + flow_radius) };
        let body = curve.split_at(body_t).0;
        let flow_path = self.body_path(&body, flow_radius);

        FlowShape {
            arrow_path: to_path_command(&arrow_curve.points(), true),
            animation_path: to_path_command(&animation_curve.points(), true),
            clip_path: flow_path.clone(),
            flow_path,
            value_anchor: arrow_curve.point_at(0.5),
            gradient_angle: gradient_angle(source, target),
            flow_radius,
            arrow_length: arrow_curve.length(),
            animation_length: animation_curve.length(),
            arrow_curve,
        }
    }

    /// Outline the body from a point to `radius`, then round the end cap by
    /// pushing its control points out along the end tangent.
    fn body_path(&self, body: &CubicBezier, radius: f64) -> String {
        let mut band = outline(body, 0.0, radius);
        let push = body.direction_at(1.0) * (radius * FRAC_PI_2);
        if let Some(cap) = band.end_cap_mut() {
            cap.p1 = cap.p0 + push;
            cap.p2 = cap.p3 + push;
        }
        band.to_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::path::{parse_path, path_points};

    fn fixed(r: f64) -> impl Fn(f64) -> f64 {
        move |_| r * 2.0
    }

    #[test]
    fn arrow_stops_short_of_target() {
        let b = FlowGeometryBuilder::default();
        let s = b.build(Vec2::new(0.0, 0.0), Vec2::new(300.0, 0.0), 10.0, &fixed(3.0));
        let full = build_arc(Vec2::new(0.0, 0.0), Vec2::new(300.0, 0.0)).length();
        // parameter and arc length differ slightly near the ends
        assert!((s.arrow_length - (full - 16.0)).abs() < 1.0, "{} vs {}", s.arrow_length, full);
        assert!(s.animation_length > s.arrow_length);
        // +20 px overshoots the end, so the draw-in path is the whole arc
        assert!((s.animation_length - full).abs() < 1e-9);
        assert_eq!(s.flow_radius, 3.0);
        assert_eq!(s.clip_path, s.flow_path);
        assert!(s.arrow_path.starts_with("M 0 0 C "));
    }

    #[test]
    fn body_path_is_one_compound_path() {
        let b = FlowGeometryBuilder::default();
        let s = b.build(Vec2::new(10.0, 10.0), Vec2::new(200.0, 120.0), 1.0, &fixed(4.0));
        assert_eq!(s.flow_path.matches('M').count(), 1);
        let pts = path_points(&parse_path(&s.flow_path).unwrap());
        assert!(pts.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn gradient_angle_rounds_half_up() {
        assert_eq!(gradient_angle(Vec2::ZERO, Vec2::new(1.0, 0.0)), 0.0);
        assert_eq!(gradient_angle(Vec2::ZERO, Vec2::new(0.0, 1.0)), 90.0);
        assert_eq!(gradient_angle(Vec2::ZERO, Vec2::new(-1.0, 0.0)), 180.0);
        assert_eq!(gradient_angle(Vec2::ZERO, Vec2::new(0.0, -1.0)), -90.0);
        assert_eq!(gradient_angle(Vec2::ZERO, Vec2::ZERO), 0.0);
    }

    #[test]
    fn bad_scale_output_gives_zero_radius() {
        let b = FlowGeometryBuilder::default();
        let s = b.build(Vec2::ZERO, Vec2::new(100.0, 0.0), 1.0, &|_: f64| f64::NAN);
        assert_eq!(s.flow_radius, 0.0);
        let s = b.build(Vec2::ZERO, Vec2::new(100.0, 0.0), 1.0, &|_: f64| -8.0);
        assert_eq!(s.flow_radius, 0.0);
    }
}
