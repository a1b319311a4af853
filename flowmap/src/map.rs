//! The flow map controller: owns the data, the selection and the scene,
//! and turns UI events into re-derivation and re-binding.

use crate::config::FlowMapConfig;
use crate::error::{Error, Result};
use crate::graph::FlowGraph;
use crate::model::{FlowRecord, FlowRow, GeoFeature, NodeSeed};
use crate::projection::Equirectangular;
use crate::scale::SqrtScale;
use crate::scene::{BackgroundPath, FillDatum, FlowDatum, HoverInfo, LabelDatum, Scene};
use crate::selection::{derive, Direction, Display, FlowView, Selection, SelectionEvent};
use crate::shape::FlowGeometryBuilder;
use crate::svg::to_svg;
use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::HashMap;

/// Receives hover notifications for a flow.
pub trait Tooltip {
    fn show(&mut self, flow: &HoverInfo, outbound: bool);
    fn move_to(&mut self, x: f64, y: f64);
    fn hide(&mut self);
}

/// Tooltip that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTooltip;

impl Tooltip for NoTooltip {
    fn show(&mut self, _flow: &HoverInfo, _outbound: bool) {}
    fn move_to(&mut self, _x: f64, _y: f64) {}
    fn hide(&mut self) {}
}

/// Everything needed to build a map. Either `rows` or `nodes` + `links`
/// supplies the flows.
#[derive(Clone, Debug, Deserialize)]
pub struct FlowMapOptions {
    #[serde(default)]
    pub rows: Vec<FlowRow>,
    #[serde(default)]
    pub nodes: Option<Vec<NodeSeed>>,
    #[serde(default)]
    pub links: Vec<FlowRecord>,
    /// Simplified regions: centroids, labels, projection fit.
    #[serde(default)]
    pub regions: Vec<GeoFeature>,
    /// Detailed regions: background and fills.
    #[serde(default)]
    pub detailed: Vec<GeoFeature>,
    pub selection: Selection,
    #[serde(default)]
    pub config: FlowMapConfig,
    pub width: f64,
}

fn check_width(width: f64) -> Result<f64> {
    if width.is_finite() && width > 0.0 {
        Ok(width)
    } else {
        Err(Error::InvalidViewport { width })
    }
}

pub struct FlowMap {
    config: FlowMapConfig,
    graph: FlowGraph,
    regions: Vec<GeoFeature>,
    detailed: HashMap<String, GeoFeature>,
    detailed_order: Vec<String>,
    projection: Equirectangular,
    scale: SqrtScale,
    builder: FlowGeometryBuilder,
    selection: Selection,
    view: FlowView,
    scene: Scene,
    tooltip: Box<dyn Tooltip>,
    width: f64,
    height: f64,
}

impl FlowMap {
    pub fn new(options: FlowMapOptions) -> Result<Self> {
        let width = check_width(options.width)?;
        let mut graph = match options.nodes {
            Some(nodes) => FlowGraph::new(nodes, options.links)?,
            None => FlowGraph::from_rows(&options.rows),
        };
        let view = derive(&graph, &options.selection, options.config.top_n)?;
        graph.attach_features(&options.regions);

        let values = graph.locations().iter().flat_map(|l| l.outbounds.iter().map(|r| r.value));
        let scale = SqrtScale::for_values(values, options.config.size_range);
        let detailed_order = options.detailed.iter().map(|f| f.id.clone()).collect();
        let detailed = options.detailed.into_iter().map(|f| (f.id.clone(), f)).collect();

        let mut map = FlowMap {
            builder: FlowGeometryBuilder::from_config(&options.config),
            scene: Scene::new(&options.config),
            config: options.config,
            graph,
            regions: options.regions,
            detailed,
            detailed_order,
            projection: Equirectangular::default(),
            scale,
            selection: options.selection,
            view,
            tooltip: Box::new(NoTooltip),
            width,
            height: 0.0,
        };
        map.layout(width);
        info!(
            "flow map ready: {} locations, {} flows in view, {}x{}",
            map.graph.len(),
            map.view.flows.len(),
            map.width,
            map.height
        );
        Ok(map)
    }

    pub fn set_tooltip(&mut self, tooltip: Box<dyn Tooltip>) {
        self.tooltip = tooltip;
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn view(&self) -> &FlowView {
        &self.view
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &FlowMapConfig {
        &self.config
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn on_location_change(&mut self, id: &str) -> Result<&FlowView> {
        self.dispatch(SelectionEvent::LocationChanged(id.to_string()))
    }

    pub fn on_direction_change(&mut self, direction: Direction) -> Result<&FlowView> {
        self.dispatch(SelectionEvent::DirectionChanged(direction))
    }

    pub fn on_display_change(&mut self, display: Display) -> Result<&FlowView> {
        self.dispatch(SelectionEvent::DisplayChanged(display))
    }

    /// Reduce, derive, rebind. A failed derivation leaves everything as it was.
    pub fn dispatch(&mut self, event: SelectionEvent) -> Result<&FlowView> {
        let next = self.selection.apply(event);
        let view = derive(&self.graph, &next, self.config.top_n)?;
        self.selection = next;
        self.view = view;
        self.redraw();
        Ok(&self.view)
    }

    /// Refit to a new width and recompute every position and shape.
    pub fn resize(&mut self, width: f64) -> Result<()> {
        let width = check_width(width)?;
        self.layout(width);
        Ok(())
    }

    fn layout(&mut self, width: f64) {
        self.width = width;
        self.height = self.config.viewport_height(width);
        self.projection
            .fit_size(self.width, self.height, self.regions.iter().map(|f| &f.geometry));
        self.graph.update_positions(&self.projection, &self.config);
        let background = self
            .detailed_order
            .iter()
            .filter_map(|id| self.detailed.get(id))
            .map(|f| BackgroundPath { id: f.id.clone(), d: self.projection.path(&f.geometry) })
            .collect();
        self.scene.set_background(background);
        debug!("layout {}x{}, scale {}", self.width, self.height, self.projection.scale);
        self.redraw();
    }

    fn redraw(&mut self) {
        let had_hover = self.scene.hovered().is_some();
        let focal = self.selection.location.as_str();

        let mut flows = Vec::with_capacity(self.view.flows.len());
        for f in &self.view.flows {
            let source = self.graph.location(f.source_ix);
            let target = self.graph.location(f.target_ix);
            if !source.positioned || !target.positioned {
                warn!("flow {} skipped: endpoint without position", f.id);
                continue;
            }
            flows.push(FlowDatum {
                id: f.id.clone(),
                source: source.id.clone(),
                target: target.id.clone(),
                value: f.value,
                outbound: source.id == focal,
                shape: self.builder.build(source.position(), target.position(), f.value, &self.scale),
            });
        }

        let mut labels = Vec::with_capacity(self.view.labels.len());
        let mut fills = Vec::with_capacity(self.view.labels.len());
        for l in &self.view.labels {
            let loc = self.graph.location(l.location);
            if loc.feature.is_none() || !loc.positioned {
                warn!("label {} skipped: no region feature", l.id);
            } else {
                labels.push(LabelDatum {
                    id: l.id.clone(),
                    text: self.config.display_name(loc.display_name()).to_string(),
                    position: loc.position(),
                    selected: l.selected,
                });
            }
            match self.detailed.get(&l.id) {
                Some(f) => fills.push(FillDatum { id: l.id.clone(), d: self.projection.path(&f.geometry) }),
                None => warn!("fill {} skipped: no detailed feature", l.id),
            }
        }

        self.scene.bind_flows(&flows);
        self.scene.bind_labels(&labels);
        self.scene.bind_fills(&fills);
        if had_hover && self.scene.hovered().is_none() {
            self.tooltip.hide();
        }
    }

    /// Highlight a flow and show the tooltip. Unknown ids are ignored.
    pub fn hover(&mut self, flow_id: &str) -> Option<HoverInfo> {
        let info = self.scene.hover(flow_id)?;
        self.tooltip.show(&info, info.outbound);
        Some(info)
    }

    pub fn hover_move(&mut self, x: f64, y: f64) {
        if self.scene.hovered().is_some() {
            self.tooltip.move_to(x, y);
        }
    }

    pub fn hover_end(&mut self) {
        self.scene.hover_end();
        self.tooltip.hide();
    }

    pub fn tick(&mut self, dt_ms: f64) -> bool {
        self.scene.tick(dt_ms)
    }

    pub fn to_svg(&self) -> String {
        to_svg(&self.scene, self.width, self.height)
    }
}
