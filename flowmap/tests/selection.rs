use flowmap::model::NodeSeed;
use flowmap::{derive, Direction, Display, Error, FlowGraph, FlowRecord, Selection};

fn node(id: &str) -> NodeSeed {
    NodeSeed { id: id.into(), name: id.into() }
}

fn link(s: &str, t: &str, value: f64) -> FlowRecord {
    FlowRecord { source: s.into(), target: t.into(), value }
}

/// `A` sends to T0..T14 (value = index) and receives from S0..S2.
fn hub() -> FlowGraph {
    let mut nodes = vec![node("A")];
    let mut links = Vec::new();
    for i in 0..15 {
        let id = format!("T{}", i);
        nodes.push(node(&id));
        links.push(link("A", &id, i as f64));
    }
    for i in 0..3 {
        let id = format!("S{}", i);
        nodes.push(node(&id));
        links.push(link(&id, "A", 100.0 + i as f64));
    }
    FlowGraph::new(nodes, links).unwrap()
}

#[test]
fn top10_both_keeps_ten_outbound_and_all_inbound() {
    let g = hub();
    let view = derive(&g, &Selection::new("A", Direction::Both, Display::Top10), 10).unwrap();
    assert_eq!(view.flows.len(), 13);
    let ids: Vec<&str> = view.flows.iter().map(|f| f.id.as_str()).collect();
    // outbound first, highest value first
    assert_eq!(&ids[..3], ["A-T14", "A-T13", "A-T12"]);
    assert_eq!(ids[9], "A-T5");
    assert_eq!(&ids[10..], ["S2-A", "S1-A", "S0-A"]);
}

#[test]
fn all_both_is_inbound_then_outbound_unsorted() {
    let g = hub();
    let view = derive(&g, &Selection::new("A", Direction::Both, Display::All), 10).unwrap();
    assert_eq!(view.flows.len(), 18);
    assert_eq!(view.flows[0].id, "S0-A");
    assert_eq!(view.flows[3].id, "A-T0");
    assert_eq!(view.flows[17].id, "A-T14");
}

#[test]
fn outbound_all_keeps_data_order() {
    let g = FlowGraph::new(
        vec![node("A"), node("B"), node("C"), node("D")],
        vec![link("A", "B", 5.0), link("A", "C", 50.0), link("A", "D", 1.0)],
    )
    .unwrap();
    let view = derive(&g, &Selection::new("A", Direction::Outbound, Display::All), 10).unwrap();
    let values: Vec<f64> = view.flows.iter().map(|f| f.value).collect();
    assert_eq!(values, [5.0, 50.0, 1.0]);

    let view = derive(&g, &Selection::new("A", Direction::Outbound, Display::Top10), 2).unwrap();
    let values: Vec<f64> = view.flows.iter().map(|f| f.value).collect();
    assert_eq!(values, [50.0, 5.0]);
}

#[test]
fn labels_are_deduplicated_sources_first() {
    let g = FlowGraph::new(
        vec![node("A"), node("B"), node("C")],
        vec![link("A", "B", 1.0), link("A", "C", 2.0)],
    )
    .unwrap();
    let view = derive(&g, &Selection::new("A", Direction::Outbound, Display::All), 10).unwrap();
    let labels: Vec<(&str, bool)> = view.labels.iter().map(|l| (l.id.as_str(), l.selected)).collect();
    assert_eq!(labels, [("A", true), ("B", false), ("C", false)]);
    assert!(view.labels.len() <= 2 * view.flows.len());
}

#[test]
fn ties_keep_data_order_when_sorted() {
    let g = FlowGraph::new(
        vec![node("A"), node("B"), node("C"), node("D")],
        vec![link("A", "B", 7.0), link("A", "C", 9.0), link("A", "D", 7.0)],
    )
    .unwrap();
    let view = derive(&g, &Selection::new("A", Direction::Outbound, Display::Top10), 10).unwrap();
    let ids: Vec<&str> = view.flows.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, ["A-C", "A-B", "A-D"]);
}

#[test]
fn inbound_only_view() {
    let g = hub();
    let view = derive(&g, &Selection::new("A", Direction::Inbound, Display::Top10), 10).unwrap();
    assert_eq!(view.flows.len(), 3);
    assert_eq!(view.labels[0].id, "S2");
    assert_eq!(view.labels.last().map(|l| l.id.as_str()), Some("A"));
    assert!(view.labels.last().unwrap().selected);
}

#[test]
fn unknown_focal_location_is_an_error() {
    let g = hub();
    let err = derive(&g, &Selection::new("ZZZ", Direction::Both, Display::All), 10).unwrap_err();
    assert!(matches!(err, Error::UnknownLocation { ref id } if id == "ZZZ"));
    assert_eq!(err.to_string(), "unknown location id: ZZZ");
}

#[test]
fn location_without_flows_gives_empty_view() {
    let g = FlowGraph::new(vec![node("A")], vec![]).unwrap();
    let view = derive(&g, &Selection::new("A", Direction::Both, Display::Top10), 10).unwrap();
    assert!(view.flows.is_empty());
    assert!(view.labels.is_empty());
}
