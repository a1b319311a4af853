use geo::{LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Deserializer, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

/// Points and vectors share one representation.
pub type Point = Vec2;

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (other - self).length()
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn cross(self, other: Vec2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Counter-clockwise perpendicular in screen space (y down).
    pub fn perp(self) -> Vec2 {
        Vec2 { x: -self.y, y: self.x }
    }

    pub fn lerp(self, other: Vec2, t: f64) -> Vec2 {
        // (1-t)a + tb is exact at both t=0 and t=1
        let mt = 1.0 - t;
        Vec2 {
            x: mt * self.x + t * other.x,
            y: mt * self.y + t * other.y,
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2 { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2 { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2 { x: self.x * rhs, y: self.y * rhs }
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2 { x: -self.x, y: -self.y }
    }
}

pub type LocationId = String;

/// A directional flow between two locations as loaded from the data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub source: LocationId,
    pub target: LocationId,
    pub value: f64,
}

/// One row of the tabular flow data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowRow {
    pub source_id: LocationId,
    #[serde(default)]
    pub source_name: String,
    pub target_id: LocationId,
    #[serde(default)]
    pub target_name: String,
    pub value: f64,
}

/// Node seed used when the caller already aggregated the graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSeed {
    pub id: LocationId,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub abbr: Option<String>,
}

/// GeoJSON geometry as it arrives on the wire, `[lon, lat]` degrees.
#[derive(Deserialize)]
#[serde(tag = "type")]
enum GeoJsonGeometry {
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<[f64; 2]>>> },
}

/// First ring is the exterior, the rest are holes. No rings, no polygon.
fn polygon_from_rings(rings: Vec<Vec<[f64; 2]>>) -> Option<Polygon<f64>> {
    let mut rings = rings.into_iter().map(LineString::from);
    let exterior = rings.next()?;
    Some(Polygon::new(exterior, rings.collect()))
}

impl GeoJsonGeometry {
    fn into_multipolygon(self) -> MultiPolygon<f64> {
        match self {
            GeoJsonGeometry::Polygon { coordinates } => MultiPolygon(polygon_from_rings(coordinates).into_iter().collect()),
            GeoJsonGeometry::MultiPolygon { coordinates } => {
                MultiPolygon(coordinates.into_iter().filter_map(polygon_from_rings).collect())
            }
        }
    }
}

fn geojson_geometry<'de, D: Deserializer<'de>>(d: D) -> Result<MultiPolygon<f64>, D::Error> {
    GeoJsonGeometry::deserialize(d).map(GeoJsonGeometry::into_multipolygon)
}

/// A region outline keyed by location id. Polygons are read as one-part
/// multipolygons.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GeoFeature {
    pub id: LocationId,
    #[serde(default)]
    pub properties: FeatureProperties,
    #[serde(deserialize_with = "geojson_geometry")]
    pub geometry: MultiPolygon<f64>,
}

/// A map region taking part in flows.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    #[serde(skip)]
    pub feature: Option<GeoFeature>,
    pub x: f64,
    pub y: f64,
    /// False until a centroid has been computed from `feature`.
    pub positioned: bool,
    pub inbounds: Vec<FlowRecord>,
    pub outbounds: Vec<FlowRecord>,
}

impl Location {
    pub fn new(id: impl Into<LocationId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            feature: None,
            x: 0.0,
            y: 0.0,
            positioned: false,
            inbounds: Vec::new(),
            outbounds: Vec::new(),
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn abbr(&self) -> Option<&str> {
        self.feature.as_ref().and_then(|f| f.properties.abbr.as_deref())
    }

    /// Feature name when known, else the data name.
    pub fn display_name(&self) -> &str {
        match &self.feature {
            Some(f) if !f.properties.name.is_empty() => &f.properties.name,
            _ => &self.name,
        }
    }
}

/// A flow in the current view. `source`/`target` are location ids; the
/// `*_ix` fields index into the graph's locations and stay on the Rust side.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Flow {
    pub id: String,
    pub source: LocationId,
    pub target: LocationId,
    #[serde(skip)]
    pub source_ix: usize,
    #[serde(skip)]
    pub target_ix: usize,
    pub value: f64,
}

impl Flow {
    pub fn id_for(source: &str, target: &str) -> String {
        format!("{}-{}", source, target)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Label {
    pub id: LocationId,
    #[serde(skip)]
    pub location: usize,
    pub selected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geojson_polygons_become_multipolygons() {
        let f: GeoFeature = serde_json::from_str(
            r#"{"id": "A", "geometry": {"type": "Polygon", "coordinates": [
                [[0,0],[10,0],[10,10],[0,10],[0,0]],
                [[2,2],[3,2],[3,3],[2,2]]
            ]}}"#,
        )
        .unwrap();
        assert_eq!(f.geometry.0.len(), 1);
        assert_eq!(f.geometry.0[0].interiors().len(), 1);
        assert_eq!(f.properties, FeatureProperties::default());

        let f: GeoFeature = serde_json::from_str(
            r#"{"id": "B", "geometry": {"type": "MultiPolygon", "coordinates": [
                [[[0,0],[1,0],[1,1],[0,0]]],
                []
            ]}}"#,
        )
        .unwrap();
        // parts without rings are dropped
        assert_eq!(f.geometry.0.len(), 1);
    }
}
