//! Equirectangular world projection, viewport fitting and region centroids.

use crate::geometry::path::fmt_num;
use crate::geometry::tolerance::EPS_LEN;
use crate::model::Vec2;
use geo::{BoundingRect, Centroid, Coord, MapCoords, MultiPolygon};
use serde::{Deserialize, Serialize};

/// Plate carrée: `x = λ·k + tx`, `y = −φ·k + ty` with λ, φ in radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Equirectangular {
    pub scale: f64,
    pub translate: Vec2,
}

impl Default for Equirectangular {
    fn default() -> Self {
        Self { scale: 152.63, translate: Vec2::new(480.0, 250.0) }
    }
}

fn raw(c: Coord<f64>) -> Coord<f64> {
    Coord { x: c.x.to_radians(), y: -c.y.to_radians() }
}

impl Equirectangular {
    pub fn project(&self, lon: f64, lat: f64) -> Vec2 {
        let r = raw(Coord { x: lon, y: lat });
        Vec2::new(r.x * self.scale + self.translate.x, r.y * self.scale + self.translate.y)
    }

    /// The region in screen space.
    pub fn project_polygon(&self, polygon: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        polygon.map_coords(|c| {
            let p = self.project(c.x, c.y);
            Coord { x: p.x, y: p.y }
        })
    }

    /// Scale and translate so the features fill `width × height`, centred
    /// on the shorter-fitting axis. Empty or pointlike input leaves the
    /// projection unchanged.
    pub fn fit_size<'a>(
        &mut self,
        width: f64,
        height: f64,
        features: impl IntoIterator<Item = &'a MultiPolygon<f64>>,
    ) {
        let bounds = features
            .into_iter()
            .filter_map(|polygon| polygon.map_coords(raw).bounding_rect())
            .reduce(|a, b| {
                geo::Rect::new(
                    Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                    Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
                )
            });
        let Some(bounds) = bounds else {
            return;
        };
        let (min, max) = (bounds.min(), bounds.max());
        if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()) {
            return;
        }
        let kx = if bounds.width() > EPS_LEN { width / bounds.width() } else { f64::INFINITY };
        let ky = if bounds.height() > EPS_LEN { height / bounds.height() } else { f64::INFINITY };
        let k = kx.min(ky);
        if !k.is_finite() || k <= 0.0 {
            return;
        }
        self.scale = k;
        self.translate = Vec2::new((width - k * (max.x + min.x)) / 2.0, (height - k * (max.y + min.y)) / 2.0);
    }

    /// Area-weighted planar centroid of the projected region. Zero-area
    /// input falls back to the centroid of its outline; no vertices gives `None`.
    pub fn centroid(&self, polygon: &MultiPolygon<f64>) -> Option<Vec2> {
        self.project_polygon(polygon).centroid().map(|p| Vec2::new(p.x(), p.y()))
    }

    /// `M…L…Z` path data for every ring.
    pub fn path(&self, polygon: &MultiPolygon<f64>) -> String {
        let projected = self.project_polygon(polygon);
        let mut d = String::new();
        for part in projected.0.iter() {
            for ring in std::iter::once(part.exterior()).chain(part.interiors()) {
                if ring.0.len() < 2 {
                    continue;
                }
                for (i, c) in ring.coords().enumerate() {
                    d.push(if i == 0 { 'M' } else { 'L' });
                    d.push_str(&fmt_num(c.x));
                    d.push(',');
                    d.push_str(&fmt_num(c.y));
                }
                d.push('Z');
            }
        }
        d
    }
}
