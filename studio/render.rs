//! Template renderer for the netviz studio.
//!
//! The page is a single HTML template (`studio/assets/studio.html`) with
//! placeholder tokens like `{{TOKEN}}`. The graph itself and the status panel
//! are rendered here as fragments, so the SSE stream can push the exact same
//! markup the first page load shows.

use std::fmt::Write;

use netviz::graph::{Node, NodeKind};
use netviz::{Edge, Session};
use serde_json::{json, Value};

use crate::state::{FlashKind, FlashMessage};

const TEMPLATE: &str = include_str!("assets/studio.html");

const NODE_RADIUS: f64 = 18.0;
const VIEW_PADDING: f64 = 60.0;

/// Renders the full studio page.
pub fn render_page(session: &Session, flash: Option<&FlashMessage>) -> String {
    let hp = session.hyperparams();
    let html = TEMPLATE
        .replace("{{FLASH}}", &render_flash_html(flash))
        .replace("{{LAYERS}}", &html_escape(&session.layers().to_string()))
        .replace("{{LEARNING_RATE}}", &hp.learning_rate.to_string())
        .replace("{{TRAINING_SPEED}}", &hp.training_speed.to_string())
        .replace("{{REVISION}}", &session.revision().to_string())
        .replace("{{PANEL}}", &render_panel(session))
        .replace("{{GRAPH_SVG}}", &render_svg(session));
    blank_remaining(html)
}

/// The payload of one `graph` SSE event.
pub fn graph_event(session: &Session) -> Value {
    json!({
        "revision": session.revision(),
        "svg": render_svg(session),
        "panel": render_panel(session),
    })
}

/// Structured snapshot for `GET /graph`.
pub fn graph_json(session: &Session) -> Value {
    let layout = session.layout();
    json!({
        "revision": session.revision(),
        "state": session.state(),
        "layers": session.layers(),
        "hyperparams": {
            "learningRate": session.hyperparams().learning_rate,
            "trainingSpeed": session.hyperparams().training_speed,
        },
        "progress": session.progress(),
        "notice": session.notice(),
        "predictable": session.is_predictable(),
        "droppedUpdates": session.dropped_updates(),
        "nodes": layout.nodes,
        "edges": session.edges(),
    })
}

// ---------------------------------------------------------------------------
// SVG
// ---------------------------------------------------------------------------

/// Draws edges first, then nodes on top. Nodes carry no drag handles.
pub fn render_svg(session: &Session) -> String {
    let layout = session.layout();
    let nodes = &layout.nodes;

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (0.0_f64, 0.0_f64, 0.0_f64, 0.0_f64);
    for n in nodes {
        min_x = min_x.min(n.position.x);
        min_y = min_y.min(n.position.y);
        max_x = max_x.max(n.position.x);
        max_y = max_y.max(n.position.y);
    }
    let view = format!(
        "{} {} {} {}",
        min_x - VIEW_PADDING,
        min_y - VIEW_PADDING,
        max_x - min_x + 2.0 * VIEW_PADDING,
        max_y - min_y + 2.0 * VIEW_PADDING,
    );

    let mut svg = format!(
        r#"<svg id="graph-svg" xmlns="http://www.w3.org/2000/svg" viewBox="{view}" data-view="{view}">"#
    );
    svg.push_str(r#"<g class="edges">"#);
    for edge in session.edges() {
        push_edge(&mut svg, edge, nodes);
    }
    svg.push_str(r#"</g><g class="nodes">"#);
    for node in nodes {
        push_node(&mut svg, node);
    }
    svg.push_str("</g></svg>");
    svg
}

fn node_at(nodes: &[Node], id: netviz::graph::NodeId) -> Option<&Node> {
    // IDs are dense and start at 1
    let idx = (id.0 as usize).checked_sub(1)?;
    nodes.get(idx).filter(|n| n.id == id)
}

fn push_edge(svg: &mut String, edge: &Edge, nodes: &[Node]) {
    let (Some(a), Some(b)) = (node_at(nodes, edge.source), node_at(nodes, edge.target)) else {
        return;
    };
    let class = if edge.animated { "edge animated" } else { "edge" };
    let _ = write!(
        svg,
        r#"<line id="e{id}" class="{class}" x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="{color}"/>"#,
        id = edge.id,
        x1 = a.position.x,
        y1 = a.position.y,
        x2 = b.position.x,
        y2 = b.position.y,
        color = edge.stroke,
    );
}

fn push_node(svg: &mut String, node: &Node) {
    let class = match node.kind {
        NodeKind::Input  => "node input",
        NodeKind::Bias   => "node bias",
        NodeKind::Hidden => "node hidden",
        NodeKind::Output => "node output",
    };
    let _ = write!(
        svg,
        r#"<g class="{class}"><circle id="n{id}" cx="{x}" cy="{y}" r="{r}"/><text x="{x}" y="{ty}">{label}</text></g>"#,
        id = node.id,
        x = node.position.x,
        y = node.position.y,
        r = NODE_RADIUS,
        ty = node.position.y + 5.0,
        label = if node.kind == NodeKind::Bias { "b".to_owned() } else { node.id.to_string() },
    );
}

// ---------------------------------------------------------------------------
// Status panel
// ---------------------------------------------------------------------------

/// Status, action buttons, downloads and the pending notice.
pub fn render_panel(session: &Session) -> String {
    let state = session.state();
    let progress = session.progress();
    let training = state.is_training();
    let ready = state.worker_ready();
    let disabled = |off: bool| if off { " disabled" } else { "" };

    let mut html = format!(
        r#"<div class="status"><span class="badge badge-{state}">{state}</span>
        <span class="stat">Epochs <b>{epochs}</b></span>
        <span class="stat">Error <b>{error:.6}</b></span></div>"#,
        epochs = progress.epochs,
        error = progress.error,
    );

    let _ = write!(
        html,
        r#"<div class="actions">
        <form method="post" action="/train/start"><button class="btn"{start}>Start training</button></form>
        <form method="post" action="/train/stop"><button class="btn btn-secondary"{stop}>Stop</button></form>
        <form method="post" action="/predict"><button class="btn btn-secondary"{predict}>Run prediction</button></form>
        </div>"#,
        start = disabled(!ready || training),
        stop = disabled(!training),
        predict = disabled(!ready || training || !session.is_predictable()),
    );

    html.push_str(r#"<div class="downloads">"#);
    if session.weights_downloadable() && session.weights_export().is_some() {
        html.push_str(r#"<a class="btn btn-secondary" href="/download/weights">Download weights</a>"#);
    }
    if session.has_predicted() && session.outputs_export().is_some() {
        html.push_str(r#"<a class="btn btn-secondary" href="/download/outputs">Download outputs</a>"#);
    }
    html.push_str("</div>");

    if let Some(notice) = session.notice() {
        let _ = write!(
            html,
            r#"<div class="modal"><div class="modal-box"><h3>{code}</h3><p>{text}</p>
            <form method="post" action="/notice/dismiss"><button class="btn">Dismiss</button></form></div></div>"#,
            code = notice.code,
            text = html_escape(&notice.text),
        );
    }
    html
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn render_flash_html(flash: Option<&FlashMessage>) -> String {
    match flash {
        Some(f) => {
            let class = match f.kind {
                FlashKind::Success => "flash-success",
                FlashKind::Error   => "flash-error",
            };
            format!(r#"<div class="flash {}">{}</div>"#, class, html_escape(&f.text))
        }
        None => String::new(),
    }
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Replaces any `{{TOKEN}}` that wasn't substituted with an empty string.
fn blank_remaining(mut html: String) -> String {
    while let Some(start) = html.find("{{") {
        if let Some(end) = html[start..].find("}}") {
            let abs_end = start + end + 2;
            html.replace_range(start..abs_end, "");
        } else {
            break;
        }
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use netviz::{Hyperparams, LayerSpec};

    fn session() -> Session {
        Session::new(LayerSpec::new(vec![3, 2, 5, 3, 1]), Hyperparams::default()).unwrap()
    }

    #[test]
    fn svg_draws_every_node_and_edge() {
        let svg = render_svg(&session());
        assert_eq!(svg.matches("<circle").count(), 15);
        assert_eq!(svg.matches("<line").count(), 36);
        assert_eq!(svg.matches("node bias").count(), 1);
        assert!(!svg.contains("animated"));
    }

    #[test]
    fn page_has_no_leftover_tokens() {
        let page = render_page(&session(), Some(&FlashMessage::error("<bad>")));
        assert!(!page.contains("{{"));
        assert!(page.contains("&lt;bad&gt;"));
        assert!(page.contains("3, 2, 5, 3, 1"));
    }

    #[test]
    fn graph_json_shape() {
        let v = graph_json(&session());
        assert_eq!(v["nodes"].as_array().map(Vec::len), Some(15));
        assert_eq!(v["edges"].as_array().map(Vec::len), Some(36));
        assert_eq!(v["state"], "idle");
        assert_eq!(v["edges"][0]["strokeColor"], "#ffffff");
    }
}
