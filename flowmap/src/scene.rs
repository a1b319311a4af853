//! Retained scene: one entry per flow, label and region fill id.
//!
//! Each bind is a keyed join against the previous entries. New ids enter
//! with a draw-in or fade-in, common ids update in place, missing ids exit.
//! Transitions only move forward through [`Scene::tick`].

use crate::config::FlowMapConfig;
use crate::geometry::path::fmt_num;
use crate::geometry::tolerance::clamp01;
use crate::model::Vec2;
use crate::scale::OrdinalColor;
use crate::shape::FlowShape;
use log::debug;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// d3's default transition easing.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = clamp01(t) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// A scalar attribute animated from `from` to `to`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Transition {
    pub from: f64,
    pub to: f64,
    pub elapsed: f64,
    pub duration: f64,
}

impl Transition {
    pub fn new(from: f64, to: f64, duration: f64) -> Self {
        Self { from, to, elapsed: 0.0, duration: duration.max(0.0) }
    }

    /// Already at rest on `value`.
    pub fn settled(value: f64) -> Self {
        Self::new(value, value, 0.0)
    }

    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn value(&self) -> f64 {
        if self.is_done() {
            self.to
        } else {
            self.from + (self.to - self.from) * ease_cubic_in_out(self.elapsed / self.duration)
        }
    }

    /// Returns true when this step completed the transition.
    pub fn advance(&mut self, dt_ms: f64) -> bool {
        if self.is_done() {
            return false;
        }
        self.elapsed += dt_ms.max(0.0);
        self.is_done()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    Entering,
    Present,
    Highlighted,
    Exiting,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BindReport {
    pub entered: Vec<String>,
    pub updated: Vec<String>,
    pub exited: Vec<String>,
}

/// What the keyed join needs from an entry.
pub trait SceneEntry {
    fn key(&self) -> &str;
    fn state(&self) -> EntryState;
    fn begin_exit(&mut self, duration_ms: f64);
}

/// Keyed join of `data` onto `entries`. Entries end up in data order;
/// entries still fading out follow them.
pub fn join<D, E: SceneEntry>(
    entries: &mut Vec<E>,
    data: &[D],
    key: impl Fn(&D) -> &str,
    mut enter: impl FnMut(&D) -> E,
    mut update: impl FnMut(&mut E, &D),
    exit_ms: f64,
) -> BindReport {
    let mut report = BindReport::default();
    let mut old: Vec<Option<E>> = std::mem::take(entries).into_iter().map(Some).collect();
    let index: HashMap<String, usize> = old
        .iter()
        .enumerate()
        .filter_map(|(i, e)| e.as_ref().map(|e| (e.key().to_string(), i)))
        .collect();

    let mut next = Vec::with_capacity(data.len());
    let mut seen = HashSet::new();
    for d in data {
        let k = key(d);
        if !seen.insert(k) {
            debug!("duplicate key {} skipped", k);
            continue;
        }
        match index.get(k).and_then(|&i| old[i].take()) {
            Some(mut e) if e.state() != EntryState::Exiting => {
                update(&mut e, d);
                report.updated.push(k.to_string());
                next.push(e);
            }
            _ => {
                next.push(enter(d));
                report.entered.push(k.to_string());
            }
        }
    }

    for mut e in old.into_iter().flatten() {
        if e.state() == EntryState::Exiting {
            next.push(e);
            continue;
        }
        report.exited.push(e.key().to_string());
        if exit_ms > 0.0 {
            e.begin_exit(exit_ms);
            next.push(e);
        }
    }
    *entries = next;
    report
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeKind {
    Inbound,
    Outbound,
}

impl StrokeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StrokeKind::Inbound => "inbound",
            StrokeKind::Outbound => "outbound",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GradientStop {
    pub offset: String,
    pub color: String,
}

/// Horizontal linear gradient rotated about its centre.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Gradient {
    pub id: String,
    pub angle: f64,
    pub stops: Vec<GradientStop>,
}

impl Gradient {
    fn new(kind: StrokeKind, flow_id: &str, angle: f64, colors: &OrdinalColor, config: &FlowMapConfig) -> Self {
        Self {
            id: format!("flow-{}-gradient-{}", kind.as_str(), flow_id),
            angle,
            stops: colors
                .entries()
                .into_iter()
                .enumerate()
                .map(|(i, (_, color))| GradientStop {
                    offset: config.stop_offset(i).to_string(),
                    color: color.to_string(),
                })
                .collect(),
        }
    }

    pub fn transform(&self) -> String {
        format!("rotate({}, 0.5, 0.5)", fmt_num(self.angle))
    }
}

/// Flow prepared for binding.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowDatum {
    pub id: String,
    pub source: String,
    pub target: String,
    pub value: f64,
    /// Source is the focal location.
    pub outbound: bool,
    pub shape: FlowShape,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FlowEntry {
    pub id: String,
    pub source: String,
    pub target: String,
    pub value: f64,
    pub shape: FlowShape,
    pub stroke: StrokeKind,
    pub inbound_gradient: Gradient,
    pub outbound_gradient: Gradient,
    /// Dash offset of the draw-in stroke.
    pub draw: Transition,
    /// Dash offset of the arrow.
    pub arrow_draw: Transition,
    pub marker_visible: bool,
    pub value_fade: Transition,
    pub opacity: f64,
    pub exit_fade: Option<Transition>,
    pub state: EntryState,
    pub hovered: bool,
}

impl FlowEntry {
    pub fn stroke_url(&self) -> String {
        match self.stroke {
            StrokeKind::Inbound => format!("url(#{})", self.inbound_gradient.id),
            StrokeKind::Outbound => format!("url(#{})", self.outbound_gradient.id),
        }
    }

    pub fn effective_opacity(&self) -> f64 {
        self.opacity * self.exit_fade.map_or(1.0, |t| t.value())
    }

    fn advance(&mut self, dt_ms: f64) {
        self.draw.advance(dt_ms);
        if self.arrow_draw.advance(dt_ms) {
            self.marker_visible = true;
        }
        self.value_fade.advance(dt_ms);
        if let Some(fade) = &mut self.exit_fade {
            fade.advance(dt_ms);
        }
        if self.state == EntryState::Entering && self.draw.is_done() && self.arrow_draw.is_done() {
            self.state = if self.hovered { EntryState::Highlighted } else { EntryState::Present };
        }
    }

    fn is_animating(&self) -> bool {
        !self.draw.is_done()
            || !self.arrow_draw.is_done()
            || !self.value_fade.is_done()
            || self.exit_fade.is_some_and(|t| !t.is_done())
    }

    fn is_gone(&self) -> bool {
        self.exit_fade.is_some_and(|t| t.is_done())
    }
}

impl SceneEntry for FlowEntry {
    fn key(&self) -> &str {
        &self.id
    }

    fn state(&self) -> EntryState {
        self.state
    }

    fn begin_exit(&mut self, duration_ms: f64) {
        self.exit_fade = Some(Transition::new(1.0, 0.0, duration_ms));
        self.state = EntryState::Exiting;
        self.hovered = false;
    }
}

/// Label prepared for binding.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelDatum {
    pub id: String,
    pub text: String,
    pub position: Vec2,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabelEntry {
    pub id: String,
    pub text: String,
    pub position: Vec2,
    pub selected: bool,
    pub fill: String,
    pub fade: Transition,
    pub exit_fade: Option<Transition>,
    pub state: EntryState,
}

impl LabelEntry {
    pub fn class(&self) -> &'static str {
        if self.selected {
            "label-specialtext"
        } else {
            "label-text"
        }
    }

    pub fn halo_class(&self) -> &'static str {
        if self.selected {
            "label-specialtext label-specialtext--halo"
        } else {
            "label-text label-text--halo"
        }
    }

    pub fn opacity(&self) -> f64 {
        self.fade.value() * self.exit_fade.map_or(1.0, |t| t.value())
    }
}

impl SceneEntry for LabelEntry {
    fn key(&self) -> &str {
        &self.id
    }

    fn state(&self) -> EntryState {
        self.state
    }

    fn begin_exit(&mut self, duration_ms: f64) {
        self.exit_fade = Some(Transition::new(1.0, 0.0, duration_ms));
        self.state = EntryState::Exiting;
    }
}

/// Region fill prepared for binding.
#[derive(Clone, Debug, PartialEq)]
pub struct FillDatum {
    pub id: String,
    pub d: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FillEntry {
    pub id: String,
    pub d: String,
    pub fade: Transition,
    pub exit_fade: Option<Transition>,
    pub state: EntryState,
}

impl FillEntry {
    pub fn fill_opacity(&self) -> f64 {
        self.fade.value() * self.exit_fade.map_or(1.0, |t| t.value())
    }
}

impl SceneEntry for FillEntry {
    fn key(&self) -> &str {
        &self.id
    }

    fn state(&self) -> EntryState {
        self.state
    }

    fn begin_exit(&mut self, duration_ms: f64) {
        self.exit_fade = Some(Transition::new(1.0, 0.0, duration_ms));
        self.state = EntryState::Exiting;
    }
}

/// Background region outline.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BackgroundPath {
    pub id: String,
    pub d: String,
}

/// Tooltip payload for a hovered flow.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HoverInfo {
    pub id: String,
    pub source: String,
    pub target: String,
    pub value: f64,
    pub outbound: bool,
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    config: FlowMapConfig,
    flows: Vec<FlowEntry>,
    labels: Vec<LabelEntry>,
    fills: Vec<FillEntry>,
    background: Vec<BackgroundPath>,
    hovered: Option<String>,
}

impl Scene {
    pub fn new(config: &FlowMapConfig) -> Self {
        Self { config: config.clone(), ..Default::default() }
    }

    pub fn config(&self) -> &FlowMapConfig {
        &self.config
    }

    pub fn flows(&self) -> &[FlowEntry] {
        &self.flows
    }

    pub fn labels(&self) -> &[LabelEntry] {
        &self.labels
    }

    pub fn fills(&self) -> &[FillEntry] {
        &self.fills
    }

    pub fn background(&self) -> &[BackgroundPath] {
        &self.background
    }

    pub fn flow(&self, id: &str) -> Option<&FlowEntry> {
        self.flows.iter().find(|f| f.id == id)
    }

    pub fn label(&self, id: &str) -> Option<&LabelEntry> {
        self.labels.iter().find(|l| l.id == id)
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn set_background(&mut self, paths: Vec<BackgroundPath>) {
        self.background = paths;
    }

    fn flow_opacity(&self, id: &str) -> f64 {
        match &self.hovered {
            Some(h) if h != id => self.config.dim_opacity,
            _ => 1.0,
        }
    }

    pub fn bind_flows(&mut self, data: &[FlowDatum]) -> BindReport {
        if let Some(h) = &self.hovered {
            if !data.iter().any(|d| &d.id == h) {
                self.hover_end();
            }
        }
        let config = self.config.clone();
        let hovered = self.hovered.clone();
        let opacity_for = |id: &str| match &hovered {
            Some(h) if h != id => config.dim_opacity,
            _ => 1.0,
        };
        let stroke_for = |d: &FlowDatum| if d.outbound { StrokeKind::Outbound } else { StrokeKind::Inbound };

        let report = join(
            &mut self.flows,
            data,
            |d| d.id.as_str(),
            |d| {
                let arrow_draw = Transition::new(d.shape.arrow_length, 0.0, config.flow_draw_ms);
                FlowEntry {
                    id: d.id.clone(),
                    source: d.source.clone(),
                    target: d.target.clone(),
                    value: d.value,
                    stroke: stroke_for(d),
                    inbound_gradient: Gradient::new(StrokeKind::Inbound, &d.id, d.shape.gradient_angle, &config.colors.inbounds, &config),
                    outbound_gradient: Gradient::new(StrokeKind::Outbound, &d.id, d.shape.gradient_angle, &config.colors.outbounds, &config),
                    draw: Transition::new(d.shape.animation_length, 0.0, config.flow_draw_ms),
                    marker_visible: arrow_draw.is_done(),
                    arrow_draw,
                    value_fade: Transition::new(0.0, 1.0, config.label_fade_ms),
                    opacity: opacity_for(&d.id),
                    exit_fade: None,
                    state: EntryState::Entering,
                    hovered: hovered.as_deref() == Some(d.id.as_str()),
                    shape: d.shape.clone(),
                }
            },
            |e, d| {
                if e.shape.animation_path != d.shape.animation_path {
                    e.draw = Transition::new(d.shape.animation_length, 0.0, config.flow_draw_ms);
                }
                if e.shape.arrow_path != d.shape.arrow_path {
                    e.arrow_draw = Transition::new(d.shape.arrow_length, 0.0, config.flow_draw_ms);
                    e.marker_visible = e.arrow_draw.is_done();
                }
                if e.value != d.value || e.shape.value_anchor != d.shape.value_anchor {
                    e.value_fade = Transition::new(0.0, 1.0, config.label_fade_ms);
                }
                e.value = d.value;
                e.stroke = stroke_for(d);
                e.inbound_gradient.angle = d.shape.gradient_angle;
                e.outbound_gradient.angle = d.shape.gradient_angle;
                e.shape = d.shape.clone();
            },
            config.exit_ms,
        );
        debug!(
            "flows: {} entered, {} updated, {} exited",
            report.entered.len(),
            report.updated.len(),
            report.exited.len()
        );
        report
    }

    pub fn bind_labels(&mut self, data: &[LabelDatum]) -> BindReport {
        let config = &self.config;
        let fill_for = |selected: bool| {
            if selected {
                config.selected_label_fill.clone()
            } else {
                config.label_fill.clone()
            }
        };
        let report = join(
            &mut self.labels,
            data,
            |d| d.id.as_str(),
            |d| LabelEntry {
                id: d.id.clone(),
                text: d.text.clone(),
                position: d.position,
                selected: d.selected,
                fill: fill_for(d.selected),
                fade: Transition::new(0.0, 1.0, config.label_fade_ms),
                exit_fade: None,
                state: EntryState::Entering,
            },
            |e, d| {
                if e.position != d.position || e.selected != d.selected || e.text != d.text {
                    e.fade = Transition::new(0.0, 1.0, config.label_fade_ms);
                }
                e.text = d.text.clone();
                e.position = d.position;
                e.selected = d.selected;
                e.fill = fill_for(d.selected);
            },
            config.exit_ms,
        );
        debug!("labels: {} entered, {} exited", report.entered.len(), report.exited.len());
        report
    }

    pub fn bind_fills(&mut self, data: &[FillDatum]) -> BindReport {
        let config = &self.config;
        join(
            &mut self.fills,
            data,
            |d| d.id.as_str(),
            |d| FillEntry {
                id: d.id.clone(),
                d: d.d.clone(),
                fade: Transition::new(0.0, 1.0, config.fill_fade_ms),
                exit_fade: None,
                state: EntryState::Entering,
            },
            |e, d| {
                if e.d != d.d {
                    e.fade = Transition::new(0.0, 1.0, config.fill_fade_ms);
                    e.d = d.d.clone();
                }
            },
            config.exit_ms,
        )
    }

    /// Highlight one flow and dim the rest. Unknown ids change nothing.
    pub fn hover(&mut self, id: &str) -> Option<HoverInfo> {
        let entry = self.flows.iter().find(|f| f.id == id && f.state != EntryState::Exiting)?;
        let info = HoverInfo {
            id: entry.id.clone(),
            source: entry.source.clone(),
            target: entry.target.clone(),
            value: entry.value,
            outbound: entry.stroke == StrokeKind::Outbound,
        };
        self.hovered = Some(id.to_string());
        for i in 0..self.flows.len() {
            let opacity = self.flow_opacity(&self.flows[i].id);
            let f = &mut self.flows[i];
            if f.state == EntryState::Exiting {
                continue;
            }
            f.hovered = f.id == id;
            f.opacity = opacity;
            f.state = match (f.state, f.hovered) {
                (EntryState::Present, true) => EntryState::Highlighted,
                (EntryState::Highlighted, false) => EntryState::Present,
                (s, _) => s,
            };
        }
        Some(info)
    }

    pub fn hover_end(&mut self) {
        self.hovered = None;
        for f in &mut self.flows {
            f.hovered = false;
            f.opacity = 1.0;
            if f.state == EntryState::Highlighted {
                f.state = EntryState::Present;
            }
        }
    }

    /// Advance every transition by `dt_ms`. Returns whether anything is
    /// still animating.
    pub fn tick(&mut self, dt_ms: f64) -> bool {
        for f in &mut self.flows {
            f.advance(dt_ms);
        }
        self.flows.retain(|f| !f.is_gone());

        for l in &mut self.labels {
            l.fade.advance(dt_ms);
            if let Some(t) = &mut l.exit_fade {
                t.advance(dt_ms);
            }
            if l.state == EntryState::Entering && l.fade.is_done() {
                l.state = EntryState::Present;
            }
        }
        self.labels.retain(|l| !l.exit_fade.is_some_and(|t| t.is_done()));

        for f in &mut self.fills {
            f.fade.advance(dt_ms);
            if let Some(t) = &mut f.exit_fade {
                t.advance(dt_ms);
            }
            if f.state == EntryState::Entering && f.fade.is_done() {
                f.state = EntryState::Present;
            }
        }
        self.fills.retain(|f| !f.exit_fade.is_some_and(|t| t.is_done()));

        self.is_animating()
    }

    pub fn is_animating(&self) -> bool {
        self.flows.iter().any(FlowEntry::is_animating)
            || self.labels.iter().any(|l| !l.fade.is_done() || l.exit_fade.is_some())
            || self.fills.iter().any(|f| !f.fade.is_done() || f.exit_fade.is_some())
    }
}
