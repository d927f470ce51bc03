use crate::graph::{DependencyEdge, DependencyGraph, DependencyNode, LayoutConfig};
use crate::jobs::JobStatus;

/// Labels longer than this are cut to `LABEL_KEEP` chars plus "...".
const LABEL_MAX: usize = 18;
const LABEL_KEEP: usize = 15;

const FOCAL_FILL: &str = "#1a365d";
const EDGE_COLOR: &str = "#94a3b8";

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Navigation target for non-focal nodes; `{id}` is replaced by the job id.
    pub link_template: Option<String>,
    /// Space around the drawing.
    pub padding: f64,
    pub min_width: f64,
    pub min_height: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            link_template: None,
            padding: 40.0,
            min_width: 300.0,
            min_height: 150.0,
        }
    }
}

impl RenderOptions {
    /// Link for a node click, or None when clicks go nowhere.
    pub fn link_for(&self, id: &str) -> Option<String> {
        self.link_template
            .as_ref()
            .map(|t| t.replace("{id}", &encode_path_segment(id)))
    }
}

pub fn status_color(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Success => "#22c55e",
        JobStatus::Failed => "#ef4444",
        JobStatus::Running => "#f59e0b",
        JobStatus::Untriggered => "#94a3b8",
    }
}

pub fn truncate_label(label: &str) -> String {
    if label.chars().count() > LABEL_MAX {
        let head: String = label.chars().take(LABEL_KEEP).collect();
        format!("{head}...")
    } else {
        label.to_string()
    }
}

/// Canvas size: nodes plus room under the focal caption, with padding.
pub fn canvas_size(graph: &DependencyGraph, config: &LayoutConfig, options: &RenderOptions) -> (f64, f64) {
    let (right, bottom) = graph.extent(config);
    let max_x = right.max(options.min_width);
    let max_y = if graph.is_empty() {
        options.min_height
    } else {
        (bottom + 30.0).max(options.min_height)
    };
    (max_x + options.padding * 2.0, max_y + options.padding)
}

pub fn render_svg(graph: &DependencyGraph, config: &LayoutConfig, options: &RenderOptions) -> String {
    let (width, height) = canvas_size(graph, config, options);
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrowhead\" markerWidth=\"10\" markerHeight=\"7\" refX=\"9\" refY=\"3.5\" orient=\"auto\"><polygon points=\"0 0, 10 3.5, 0 7\" fill=\"{EDGE_COLOR}\"/></marker>"
    ));
    svg.push_str("</defs>");
    svg.push_str(&format!("<g transform=\"translate({}, 0)\">", options.padding));

    // Edges first so nodes paint over their ends.
    for edge in &graph.edges {
        svg.push_str(&edge_svg(edge));
    }
    for node in &graph.nodes {
        svg.push_str(&node_svg(node, config, options));
    }

    svg.push_str("</g></svg>");
    svg
}

fn edge_svg(edge: &DependencyEdge) -> String {
    let mid_y = (edge.from_y + edge.to_y) / 2.0;
    format!(
        "<path d=\"M {sx} {sy} C {sx} {my}, {ex} {my}, {ex} {ey}\" fill=\"none\" stroke=\"{EDGE_COLOR}\" stroke-width=\"2\" marker-end=\"url(#arrowhead)\" data-from=\"{from}\" data-to=\"{to}\"/>",
        sx = edge.from_x,
        sy = edge.from_y,
        ex = edge.to_x,
        ey = edge.to_y,
        my = mid_y,
        from = escape_xml(&edge.from_id),
        to = escape_xml(&edge.to_id),
    )
}

fn node_svg(node: &DependencyNode, config: &LayoutConfig, options: &RenderOptions) -> String {
    let w = config.node_width;
    let h = config.node_height;
    let cx = w / 2.0;

    let (fill, stroke, stroke_width, title_fill, status_fill) = if node.is_focal {
        (FOCAL_FILL, FOCAL_FILL, 3, "#ffffff", "#94a3b8")
    } else {
        ("#ffffff", "#e2e8f0", 2, FOCAL_FILL, "#64748b")
    };

    let mut s = String::new();
    s.push_str(&format!(
        "<g class=\"job-node\" data-id=\"{}\" transform=\"translate({}, {})\">",
        escape_xml(&node.id),
        node.x,
        node.y
    ));
    s.push_str(&format!(
        "<rect x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" rx=\"8\" ry=\"8\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{stroke_width}\"/>"
    ));
    s.push_str(&format!(
        "<rect x=\"0\" y=\"0\" width=\"4\" height=\"{h}\" rx=\"8\" fill=\"{}\"/>",
        status_color(node.status)
    ));
    s.push_str(&format!(
        "<text x=\"{cx}\" y=\"{}\" text-anchor=\"middle\" font-size=\"13\" font-weight=\"600\" fill=\"{title_fill}\"><title>{}</title>{}</text>",
        h / 2.0 - 8.0,
        escape_xml(&node.display_name),
        escape_xml(&truncate_label(&node.display_name))
    ));
    s.push_str(&format!(
        "<text x=\"{cx}\" y=\"{}\" text-anchor=\"middle\" font-size=\"11\" fill=\"{status_fill}\">{}</text>",
        h / 2.0 + 12.0,
        node.status
    ));
    if node.is_focal {
        s.push_str(&format!(
            "<text x=\"{cx}\" y=\"{}\" text-anchor=\"middle\" font-size=\"10\" font-weight=\"500\" fill=\"#3182ce\">(current job)</text>",
            h + 18.0
        ));
    }
    s.push_str("</g>");

    // The focal node is never a link.
    match options.link_for(&node.id).filter(|_| !node.is_focal) {
        Some(href) => format!("<a href=\"{}\" style=\"cursor:pointer\">{}</a>", escape_xml(&href), s),
        None => s,
    }
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Percent-encode everything outside RFC 3986 unreserved characters.
fn encode_path_segment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_dependency_graph;
    use crate::jobs::Job;
    use pretty_assertions::assert_eq;

    fn sample() -> DependencyGraph {
        let jobs = vec![
            Job::new("a").with_dependents(["b"]),
            Job::new("b")
                .with_parent("a")
                .with_display_name("a <very> long display name")
                .with_status(JobStatus::Failed),
        ];
        build_dependency_graph(Some(&jobs[0]), &jobs)
    }

    #[test]
    fn truncates_long_labels() {
        assert_eq!(truncate_label("short"), "short");
        assert_eq!(truncate_label("exactly-18-chars!!"), "exactly-18-chars!!");
        assert_eq!(truncate_label("nineteen-characters"), "nineteen-charac...");
    }

    #[test]
    fn canvas_has_minimum_size() {
        let config = LayoutConfig::default();
        let options = RenderOptions::default();
        assert_eq!(
            canvas_size(&DependencyGraph::default(), &config, &options),
            (380.0, 190.0)
        );
        // bottom of level 1 is 190, plus 30 caption room
        assert_eq!(canvas_size(&sample(), &config, &options), (380.0, 260.0));
    }

    #[test]
    fn renders_curves_status_and_escaped_labels() {
        let svg = render_svg(&sample(), &LayoutConfig::default(), &RenderOptions::default());

        assert!(svg.starts_with("<svg "));
        assert!(svg.ends_with("</g></svg>"));
        assert!(svg.contains("d=\"M 80 90 C 80 110, 80 110, 80 130\""));
        assert!(svg.contains("<title>a &lt;very&gt; long display name</title>"));
        assert!(svg.contains("a &lt;very&gt; long d..."));
        assert!(svg.contains(status_color(JobStatus::Failed)));
        assert!(svg.contains(">failed</text>"));
        assert_eq!(svg.matches("(current job)").count(), 1);
    }

    #[test]
    fn only_non_focal_nodes_link() {
        let options = RenderOptions {
            link_template: Some("#/jobs/{id}/show".to_string()),
            ..RenderOptions::default()
        };
        let svg = render_svg(&sample(), &LayoutConfig::default(), &options);
        assert_eq!(svg.matches("<a href=").count(), 1);
        assert!(svg.contains("<a href=\"#/jobs/b/show\""));
    }

    #[test]
    fn link_ids_are_percent_encoded() {
        let options = RenderOptions {
            link_template: Some("/jobs/{id}".to_string()),
            ..RenderOptions::default()
        };
        assert_eq!(options.link_for("a b/c").as_deref(), Some("/jobs/a%20b%2Fc"));
        assert_eq!(RenderOptions::default().link_for("a"), None);
    }
}
