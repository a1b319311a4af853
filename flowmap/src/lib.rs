pub mod model;
pub mod config;
pub mod error;
pub mod geometry {
    pub mod arc;
    pub mod cubic;
    pub mod outline;
    pub mod path;
    pub mod tolerance;
}
pub mod graph;
pub mod map;
pub mod projection;
pub mod scale;
pub mod scene;
pub mod selection;
pub mod shape;
pub mod svg;

pub use config::{FlowMapConfig, LabelOffset};
pub use error::{Error, Result};
pub use geometry::arc::build_arc;
pub use geometry::cubic::CubicBezier;
pub use geometry::outline::{outline, Outline};
pub use geometry::path::{parse_path, to_path_command, PathCommand};
pub use graph::FlowGraph;
pub use map::{FlowMap, FlowMapOptions, NoTooltip, Tooltip};
pub use model::{Flow, FlowRecord, FlowRow, GeoFeature, Label, Location, Point, Vec2};
pub use projection::Equirectangular;
pub use scale::{FlowColors, OrdinalColor, SizeScale, SqrtScale};
pub use scene::{EntryState, HoverInfo, Scene};
pub use selection::{derive, Direction, Display, FlowView, Selection, SelectionEvent};
pub use shape::{FlowGeometryBuilder, FlowShape};
