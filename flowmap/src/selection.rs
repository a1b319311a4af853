//! Selection state, its reducer, and derivation of the visible flow and label sets.

use crate::error::{Error, Result};
use crate::graph::FlowGraph;
use crate::model::{Flow, FlowRecord, Label};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
    #[default]
    Both,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
            Direction::Both => "both",
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "inbound" => Ok(Direction::Inbound),
            "outbound" => Ok(Direction::Outbound),
            "both" => Ok(Direction::Both),
            _ => Err(Error::InvalidDirection { got: s.to_string() }),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Display {
    All,
    #[default]
    Top10,
}

impl Display {
    pub fn as_str(self) -> &'static str {
        match self {
            Display::All => "all",
            Display::Top10 => "top10",
        }
    }
}

impl FromStr for Display {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Display::All),
            "top10" => Ok(Display::Top10),
            _ => Err(Error::InvalidDisplay { got: s.to_string() }),
        }
    }
}

impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the user is looking at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub location: String,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub display: Display,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum SelectionEvent {
    LocationChanged(String),
    DirectionChanged(Direction),
    DisplayChanged(Display),
}

impl Selection {
    pub fn new(location: impl Into<String>, direction: Direction, display: Display) -> Self {
        Self { location: location.into(), direction, display }
    }

    /// The next state after `event`. `self` is left untouched.
    pub fn apply(&self, event: SelectionEvent) -> Selection {
        let mut next = self.clone();
        match event {
            SelectionEvent::LocationChanged(id) => next.location = id,
            SelectionEvent::DirectionChanged(d) => next.direction = d,
            SelectionEvent::DisplayChanged(d) => next.display = d,
        }
        next
    }
}

/// The flows and labels visible under one selection.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FlowView {
    pub flows: Vec<Flow>,
    pub labels: Vec<Label>,
}

impl FlowView {
    pub fn flow(&self, id: &str) -> Option<&Flow> {
        self.flows.iter().find(|f| f.id == id)
    }
}

fn top(records: &[FlowRecord], n: usize) -> Vec<&FlowRecord> {
    let mut sorted: Vec<&FlowRecord> = records.iter().collect();
    // stable, so equal values keep data order
    sorted.sort_by(|a, b| b.value.total_cmp(&a.value));
    sorted.truncate(n);
    sorted
}

/// Derive the visible flows and their deduplicated labels.
pub fn derive(graph: &FlowGraph, selection: &Selection, top_n: usize) -> Result<FlowView> {
    let focal_ix = graph.ix(&selection.location)?;
    let focal = graph.location(focal_ix);

    let records: Vec<&FlowRecord> = match (selection.display, selection.direction) {
        (Display::All, Direction::Both) => focal.inbounds.iter().chain(focal.outbounds.iter()).collect(),
        (Display::All, Direction::Inbound) => focal.inbounds.iter().collect(),
        (Display::All, Direction::Outbound) => focal.outbounds.iter().collect(),
        (Display::Top10, Direction::Both) => {
            let mut out = top(&focal.outbounds, top_n);
            out.extend(top(&focal.inbounds, top_n));
            out
        }
        (Display::Top10, Direction::Inbound) => top(&focal.inbounds, top_n),
        (Display::Top10, Direction::Outbound) => top(&focal.outbounds, top_n),
    };

    let mut flows = Vec::with_capacity(records.len());
    for r in records {
        flows.push(Flow {
            id: Flow::id_for(&r.source, &r.target),
            source: r.source.clone(),
            target: r.target.clone(),
            source_ix: graph.ix(&r.source)?,
            target_ix: graph.ix(&r.target)?,
            value: r.value,
        });
    }

    let mut seen = HashSet::new();
    let labels: Vec<Label> = flows
        .iter()
        .map(|f| f.source_ix)
        .chain(flows.iter().map(|f| f.target_ix))
        .filter(|&ix| seen.insert(ix))
        .map(|ix| Label {
            id: graph.location(ix).id.clone(),
            location: ix,
            selected: ix == focal_ix,
        })
        .collect();

    debug!(
        "derived {} flows, {} labels for {} ({}, {})",
        flows.len(),
        labels.len(),
        selection.location,
        selection.direction,
        selection.display
    );
    Ok(FlowView { flows, labels })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_and_print() {
        for d in [Direction::Inbound, Direction::Outbound, Direction::Both] {
            assert_eq!(d.as_str().parse::<Direction>().unwrap(), d);
        }
        for d in [Display::All, Display::Top10] {
            assert_eq!(d.to_string().parse::<Display>().unwrap(), d);
        }
        assert_eq!("sideways".parse::<Direction>().unwrap_err().code(), "invalid_direction");
        assert_eq!("top5".parse::<Display>().unwrap_err().code(), "invalid_display");
    }

    #[test]
    fn reducer_changes_one_field() {
        let s = Selection::new("CHN", Direction::Both, Display::Top10);
        let t = s.apply(SelectionEvent::DirectionChanged(Direction::Inbound));
        assert_eq!(t, Selection::new("CHN", Direction::Inbound, Display::Top10));
        let u = t.apply(SelectionEvent::LocationChanged("USA".into()));
        assert_eq!(u.location, "USA");
        assert_eq!(u.direction, Direction::Inbound);
        assert_eq!(s.direction, Direction::Both);
    }

    #[test]
    fn events_use_tagged_json() {
        let e: SelectionEvent = serde_json::from_str(r#"{"type":"DisplayChanged","value":"all"}"#).unwrap();
        assert_eq!(e, SelectionEvent::DisplayChanged(Display::All));
    }

    #[test]
    fn view_serializes_location_ids() {
        use crate::model::{FlowRecord, NodeSeed};
        let node = |id: &str| NodeSeed { id: id.into(), name: id.into() };
        let g = FlowGraph::new(
            vec![node("US-CA"), node("MX-BC")],
            vec![FlowRecord { source: "US-CA".into(), target: "MX-BC".into(), value: 2.0 }],
        )
        .unwrap();
        let view = derive(&g, &Selection::new("US-CA", Direction::Both, Display::All), 10).unwrap();
        let json = serde_json::to_value(&view).unwrap();
        let flow = &json["flows"][0];
        assert_eq!(flow["id"], "US-CA-MX-BC");
        assert_eq!(flow["source"], "US-CA");
        assert_eq!(flow["target"], "MX-BC");
        assert!(flow.get("source_ix").is_none());
        assert!(json["labels"][0].get("location").is_none());
    }
}
