use flowmap::scene::{FlowDatum, LabelDatum};
use flowmap::{EntryState, FlowGeometryBuilder, FlowMapConfig, Scene, Vec2};

fn flow(src: &str, tgt: &str, from: Vec2, to: Vec2, outbound: bool) -> FlowDatum {
    let scale = |v: f64| v.sqrt();
    FlowDatum {
        id: format!("{}-{}", src, tgt),
        source: src.into(),
        target: tgt.into(),
        value: 16.0,
        outbound,
        shape: FlowGeometryBuilder::default().build(from, to, 16.0, &scale),
    }
}

fn three() -> Vec<FlowDatum> {
    let a = Vec2::new(100.0, 100.0);
    vec![
        flow("A", "B", a, Vec2::new(400.0, 120.0), true),
        flow("A", "C", a, Vec2::new(300.0, 400.0), true),
        flow("D", "A", Vec2::new(700.0, 300.0), a, false),
    ]
}

fn opacities(scene: &Scene) -> Vec<(String, f64)> {
    scene.flows().iter().map(|f| (f.id.clone(), f.opacity)).collect()
}

#[test]
fn enter_update_exit() {
    let mut scene = Scene::new(&FlowMapConfig::default());
    let data = three();
    let r = scene.bind_flows(&data);
    assert_eq!(r.entered, ["A-B", "A-C", "D-A"]);
    assert!(scene.flows().iter().all(|f| f.state == EntryState::Entering));

    let r = scene.bind_flows(&data[1..]);
    assert_eq!(r.updated, ["A-C", "D-A"]);
    assert_eq!(r.exited, ["A-B"]);
    assert!(scene.flow("A-B").is_none(), "exit is immediate by default");

    let r = scene.bind_flows(&data);
    assert_eq!(r.entered, ["A-B"]);
    let ids: Vec<&str> = scene.flows().iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, ["A-B", "A-C", "D-A"]);
}

#[test]
fn draw_in_runs_then_marker_appears() {
    let mut scene = Scene::new(&FlowMapConfig::default());
    scene.bind_flows(&three());
    let f = scene.flow("A-B").unwrap();
    assert_eq!(f.draw.value(), f.shape.animation_length);
    assert!(!f.marker_visible);

    assert!(scene.tick(500.0));
    let f = scene.flow("A-B").unwrap();
    assert!(f.draw.value() > 0.0 && f.draw.value() < f.shape.animation_length);
    assert!(!f.marker_visible);

    // labels and values fade for 1500 ms, so still animating at 1000
    assert!(scene.tick(500.0));
    let f = scene.flow("A-B").unwrap();
    assert_eq!(f.draw.value(), 0.0);
    assert!(f.marker_visible);
    assert_eq!(f.state, EntryState::Present);

    assert!(!scene.tick(600.0));
}

#[test]
fn rebinding_same_data_keeps_transitions() {
    let mut scene = Scene::new(&FlowMapConfig::default());
    let data = three();
    scene.bind_flows(&data);
    scene.tick(300.0);
    let before: Vec<_> = scene.flows().iter().map(|f| f.draw).collect();
    scene.bind_flows(&data);
    let after: Vec<_> = scene.flows().iter().map(|f| f.draw).collect();
    assert_eq!(before, after);

    // moved geometry restarts the draw-in
    let mut moved = data.clone();
    moved[0] = flow("A", "B", Vec2::new(110.0, 100.0), Vec2::new(400.0, 120.0), true);
    scene.bind_flows(&moved);
    assert_eq!(scene.flow("A-B").unwrap().draw.elapsed, 0.0);
    assert_eq!(scene.flow("A-C").unwrap().draw.elapsed, 300.0);
}

#[test]
fn hover_dims_everything_else() {
    let mut scene = Scene::new(&FlowMapConfig::default());
    scene.bind_flows(&three());
    scene.tick(2000.0);

    let info = scene.hover("A-C").unwrap();
    assert!(info.outbound);
    assert_eq!(info.target, "C");
    assert_eq!(
        opacities(&scene),
        [("A-B".to_string(), 0.1), ("A-C".to_string(), 1.0), ("D-A".to_string(), 0.1)]
    );
    assert_eq!(scene.flow("A-C").unwrap().state, EntryState::Highlighted);

    let info = scene.hover("D-A").unwrap();
    assert!(!info.outbound);
    assert_eq!(scene.flow("A-C").unwrap().state, EntryState::Present);
    assert_eq!(scene.flow("D-A").unwrap().opacity, 1.0);

    scene.hover_end();
    assert!(opacities(&scene).iter().all(|(_, o)| *o == 1.0));
    assert!(scene.flows().iter().all(|f| f.state == EntryState::Present));
}

#[test]
fn hover_unknown_flow_changes_nothing() {
    let mut scene = Scene::new(&FlowMapConfig::default());
    scene.bind_flows(&three());
    assert!(scene.hover("X-Y").is_none());
    assert!(opacities(&scene).iter().all(|(_, o)| *o == 1.0));
}

#[test]
fn hovered_flow_leaving_resets_highlight() {
    let mut scene = Scene::new(&FlowMapConfig::default());
    let data = three();
    scene.bind_flows(&data);
    scene.hover("A-B");
    scene.bind_flows(&data[1..]);
    assert!(scene.hovered().is_none());
    assert!(opacities(&scene).iter().all(|(_, o)| *o == 1.0));
}

#[test]
fn stroke_follows_focal_direction() {
    let mut scene = Scene::new(&FlowMapConfig::default());
    scene.bind_flows(&three());
    assert_eq!(scene.flow("A-B").unwrap().stroke_url(), "url(#flow-outbound-gradient-A-B)");
    assert_eq!(scene.flow("D-A").unwrap().stroke_url(), "url(#flow-inbound-gradient-D-A)");

    // same geometry, focal side flipped: stroke is refreshed on update
    let mut flipped = three();
    flipped[2].outbound = true;
    scene.bind_flows(&flipped);
    assert_eq!(scene.flow("D-A").unwrap().stroke_url(), "url(#flow-outbound-gradient-D-A)");

    let g = &scene.flow("A-B").unwrap().outbound_gradient;
    assert_eq!(g.stops.len(), 2);
    assert_eq!(g.stops[0].offset, "25%");
    assert_eq!(g.stops[0].color, "#ed3b9c");
    assert_eq!(g.stops[1].offset, "100%");
    assert_eq!(g.stops[1].color, "#02a9e7");
    assert_eq!(g.transform(), "rotate(4, 0.5, 0.5)");
}

#[test]
fn exit_fade_when_configured() {
    let config = FlowMapConfig { exit_ms: 200.0, ..FlowMapConfig::default() };
    let mut scene = Scene::new(&config);
    let data = three();
    scene.bind_flows(&data);
    scene.tick(2000.0);
    scene.bind_flows(&data[..1]);
    assert_eq!(scene.flows().len(), 3);
    assert_eq!(scene.flow("A-C").unwrap().state, EntryState::Exiting);
    assert!(scene.hover("A-C").is_none());

    scene.tick(100.0);
    let o = scene.flow("A-C").unwrap().effective_opacity();
    assert!(o > 0.0 && o < 1.0);

    // an exiting id that comes back re-enters
    let r = scene.bind_flows(&data[..2]);
    assert_eq!(r.entered, ["A-C"]);
    assert_eq!(scene.flow("A-C").unwrap().state, EntryState::Entering);

    scene.tick(200.0);
    assert!(scene.flow("D-A").is_none());
}

#[test]
fn labels_fade_and_restyle() {
    let mut scene = Scene::new(&FlowMapConfig::default());
    let a = LabelDatum { id: "A".into(), text: "Alpha".into(), position: Vec2::new(1.0, 2.0), selected: true };
    let b = LabelDatum { id: "B".into(), text: "Beta".into(), position: Vec2::new(3.0, 4.0), selected: false };
    scene.bind_labels(&[a.clone(), b.clone()]);
    assert_eq!(scene.label("A").unwrap().opacity(), 0.0);
    assert_eq!(scene.label("A").unwrap().fill, "#a61629");
    assert_eq!(scene.label("B").unwrap().fill, "black");
    scene.tick(1500.0);
    assert_eq!(scene.label("A").unwrap().opacity(), 1.0);

    // unchanged labels keep their opacity
    scene.bind_labels(&[a.clone(), b.clone()]);
    assert_eq!(scene.label("A").unwrap().opacity(), 1.0);

    // selection moved to B: both restyle and fade again
    let a2 = LabelDatum { selected: false, ..a };
    let b2 = LabelDatum { selected: true, ..b };
    scene.bind_labels(&[a2, b2]);
    assert_eq!(scene.label("A").unwrap().class(), "label-text");
    assert_eq!(scene.label("B").unwrap().halo_class(), "label-specialtext label-specialtext--halo");
    assert_eq!(scene.label("B").unwrap().fill, "#a61629");
    assert_eq!(scene.label("B").unwrap().opacity(), 0.0);
}
