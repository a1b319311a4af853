//! Serialize the retained scene as a standalone SVG document.

use crate::geometry::path::fmt_num;
use crate::scene::{FlowEntry, Gradient, Scene};

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn push_gradient(out: &mut String, g: &Gradient) {
    out.push_str(&format!(
        "<linearGradient id=\"{}\" x1=\"0\" y1=\"0\" x2=\"1\" y2=\"0\" gradientTransform=\"{}\">",
        escape(&g.id),
        g.transform()
    ));
    for stop in &g.stops {
        out.push_str(&format!(
            "<stop offset=\"{}\" stop-color=\"{}\"/>",
            escape(&stop.offset),
            escape(&stop.color)
        ));
    }
    out.push_str("</linearGradient>");
}

fn push_flow_defs(out: &mut String, f: &FlowEntry, stroke_width: f64) {
    let id = escape(&f.id);
    out.push_str(&format!("<clipPath id=\"flow-clip-{}\"><path d=\"{}\"/></clipPath>", id, f.shape.clip_path));
    out.push_str(&format!("<path class=\"flow-flow-path\" id=\"flow-flow-path-{}\" d=\"{}\"/>", id, f.shape.flow_path));
    out.push_str(&format!(
        "<path class=\"flow-animation-path\" id=\"flow-animation-path-{}\" d=\"{}\" fill=\"none\" stroke-width=\"{}\" clip-path=\"url(#flow-clip-{})\" stroke-dasharray=\"{}\" stroke-dashoffset=\"{}\"/>",
        id,
        f.shape.animation_path,
        fmt_num(stroke_width),
        id,
        fmt_num(f.shape.animation_length),
        fmt_num(f.draw.value())
    ));
    out.push_str(&format!(
        "<path class=\"flow-arrow-path\" id=\"flow-arrow-path-{}\" d=\"{}\" fill=\"none\" stroke-dasharray=\"{}\" stroke-dashoffset=\"{}\"{}/>",
        id,
        f.shape.arrow_path,
        fmt_num(f.shape.arrow_length),
        fmt_num(f.arrow_draw.value()),
        if f.marker_visible { " marker-end=\"url(#flow-arrowhead)\"" } else { "" }
    ));
}

/// Full SVG document for the scene at `width × height`.
pub fn to_svg(scene: &Scene, width: f64, height: f64) -> String {
    let config = scene.config();
    let mut out = String::new();
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" class=\"flow-map\" viewBox=\"0 0 {} {}\" width=\"{}\" height=\"{}\">",
        fmt_num(width),
        fmt_num(height),
        fmt_num(width),
        fmt_num(height)
    ));

    out.push_str("<defs>");
    out.push_str("<marker id=\"flow-arrowhead\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"5\" markerHeight=\"5\" orient=\"auto\" markerUnits=\"userSpaceOnUse\"><path d=\"M0,0L10,5L0,10\"/></marker>");
    out.push_str("<g class=\"inbound-gradients-defs\">");
    for f in scene.flows() {
        push_gradient(&mut out, &f.inbound_gradient);
    }
    out.push_str("</g><g class=\"outbound-gradients-defs\">");
    for f in scene.flows() {
        push_gradient(&mut out, &f.outbound_gradient);
    }
    out.push_str("</g><g class=\"flows-defs\">");
    for f in scene.flows() {
        push_flow_defs(&mut out, f, config.animation_stroke_width);
    }
    out.push_str("</g></defs>");

    out.push_str("<g class=\"locations-g\">");
    for b in scene.background() {
        out.push_str(&format!(
            "<path class=\"locations-features-path\" data-id=\"{}\" d=\"{}\"/>",
            escape(&b.id),
            b.d
        ));
    }
    out.push_str("</g><g class=\"fills-g\">");
    for f in scene.fills() {
        out.push_str(&format!(
            "<path class=\"locations-fills-path\" data-id=\"{}\" d=\"{}\" fill-opacity=\"{}\"/>",
            escape(&f.id),
            f.d,
            fmt_num(f.fill_opacity())
        ));
    }
    out.push_str("</g><g class=\"flow-flows-g\">");
    for f in scene.flows() {
        out.push_str(&format!(
            "<use class=\"flow-flow-use\" href=\"#flow-animation-path-{}\" stroke=\"{}\" style=\"opacity: {}\"/>",
            escape(&f.id),
            escape(&f.stroke_url()),
            fmt_num(f.effective_opacity())
        ));
    }
    out.push_str("</g><g class=\"flow-arrows-g\">");
    for f in scene.flows() {
        out.push_str(&format!(
            "<use class=\"flow-arrow-use\" href=\"#flow-arrow-path-{}\" style=\"opacity: {}\"/>",
            escape(&f.id),
            fmt_num(f.effective_opacity())
        ));
    }
    out.push_str("</g><g class=\"flow-hits-g\">");
    for f in scene.flows() {
        out.push_str(&format!(
            "<use class=\"flow-hit-use\" href=\"#flow-arrow-path-{}\" data-id=\"{}\"/>",
            escape(&f.id),
            escape(&f.id)
        ));
    }
    out.push_str("</g><g class=\"labels-g\">");
    for l in scene.labels() {
        let text = escape(&l.text);
        out.push_str(&format!(
            "<g id=\"label-{}\" transform=\"translate({},{})\" opacity=\"{}\">",
            escape(&l.id),
            fmt_num(l.position.x),
            fmt_num(l.position.y),
            fmt_num(l.opacity())
        ));
        out.push_str(&format!(
            "<text class=\"{}\" text-anchor=\"middle\" dy=\"0.32em\">{}</text>",
            l.halo_class(),
            text
        ));
        out.push_str(&format!(
            "<text class=\"{}\" text-anchor=\"middle\" dy=\"0.32em\" style=\"fill: {}\">{}</text>",
            l.class(),
            escape(&l.fill),
            text
        ));
        out.push_str("</g>");
    }
    out.push_str("</g>");

    if config.show_values {
        out.push_str("<g class=\"values-g\">");
        for f in scene.flows() {
            let value = fmt_num(f.value);
            out.push_str(&format!(
                "<g id=\"value-{}\" transform=\"translate({},{})\" opacity=\"{}\"><text class=\"label-text label-text--halo\" text-anchor=\"middle\">{}</text><text class=\"label-text\" text-anchor=\"middle\">{}</text></g>",
                escape(&f.id),
                fmt_num(f.shape.value_anchor.x),
                fmt_num(f.shape.value_anchor.y),
                fmt_num(f.value_fade.value() * f.effective_opacity()),
                value,
                value
            ));
        }
        out.push_str("</g>");
    }

    out.push_str("</svg>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlowMapConfig;
    use crate::model::Vec2;
    use crate::scene::{BackgroundPath, LabelDatum};

    #[test]
    fn escapes_label_text() {
        let mut scene = Scene::new(&FlowMapConfig::default());
        scene.set_background(vec![BackgroundPath { id: "X".into(), d: "M0,0L1,1Z".into() }]);
        scene.bind_labels(&[LabelDatum {
            id: "TT".into(),
            text: "Trinidad & Tobago".into(),
            position: Vec2::new(10.0, 20.0),
            selected: true,
        }]);
        let svg = to_svg(&scene, 975.0, 610.0);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Trinidad &amp; Tobago"));
        assert!(svg.contains("translate(10,20)"));
        assert!(svg.contains("fill: #a61629"));
        assert!(svg.contains("label-specialtext label-specialtext--halo"));
        assert!(svg.contains("locations-features-path"));
        assert!(!svg.contains("values-g"));
    }

    #[test]
    fn values_sit_on_the_arrow_and_fade_in() {
        use crate::scene::FlowDatum;
        use crate::shape::FlowGeometryBuilder;

        let config = FlowMapConfig { show_values: true, ..FlowMapConfig::default() };
        let mut scene = Scene::new(&config);
        let scale = |v: f64| v.sqrt();
        let shape = FlowGeometryBuilder::default().build(Vec2::new(100.0, 100.0), Vec2::new(400.0, 160.0), 25.0, &scale);
        let anchor = shape.value_anchor;
        scene.bind_flows(&[FlowDatum {
            id: "A-B".into(),
            source: "A".into(),
            target: "B".into(),
            value: 25.0,
            outbound: true,
            shape,
        }]);

        let group = |svg: &str| {
            let start = svg.find("<g id=\"value-A-B\"").expect("value group");
            svg[start..].split('>').next().unwrap_or_default().to_string()
        };
        let translate = format!("transform=\"translate({},{})\"", fmt_num(anchor.x), fmt_num(anchor.y));

        let svg = to_svg(&scene, 975.0, 610.0);
        assert!(svg.contains("<g class=\"values-g\">"));
        let g = group(&svg);
        assert!(g.contains(&translate), "{}", g);
        assert!(g.contains("opacity=\"0\""), "{}", g);
        assert!(svg.contains(">25</text>"));

        scene.tick(1500.0);
        let g = group(&to_svg(&scene, 975.0, 610.0));
        assert!(g.contains(&translate), "{}", g);
        assert!(g.contains("opacity=\"1\""), "{}", g);
    }
}
