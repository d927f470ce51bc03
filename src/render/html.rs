use crate::graph::{DependencyGraph, LayoutConfig};
use crate::jobs::JobStatus;
use crate::render::svg::{RenderOptions, escape_xml, render_svg, status_color};

/// Render a self-contained HTML page: legend, diagram, and the graph data
/// embedded as JSON for scripting.
///
/// The page is built by placeholder replacement rather than `format!()`, since
/// the CSS and script bodies are full of braces. Replacement is a single pass
/// over the template, so placeholder text inside job labels stays inert.
pub fn render_html(
    graph: &DependencyGraph,
    config: &LayoutConfig,
    options: &RenderOptions,
    title: &str,
) -> anyhow::Result<String> {
    let json = script_safe_json(&serde_json::to_string(graph)?);

    const TEMPLATE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>__TITLE__ - Job Dependencies</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; color: #1a202c; }
  header { padding: 12px 16px; border-bottom: 1px solid #e2e8f0; }
  h1 { font-size: 18px; margin: 0; }
  .content { padding: 16px; }
  .legend { display: flex; gap: 8px; flex-wrap: wrap; margin-bottom: 16px; }
  .chip { display: inline-flex; align-items: center; gap: 6px; padding: 2px 10px; border-radius: 999px; font-size: 13px; background: #f1f5f9; }
  .dot { width: 8px; height: 8px; border-radius: 50%; }
  .diagram { overflow-x: auto; background: #f8fafc; border: 1px solid #e2e8f0; border-radius: 8px; padding: 16px; }
  .diagram svg { display: block; margin: 0 auto; }
  .empty { padding: 32px 0; text-align: center; color: #64748b; }
  .caption { margin-top: 16px; text-align: center; font-size: 12px; color: #64748b; }
</style>
</head>
<body>
<header><h1>Job Dependencies: __TITLE__</h1></header>
<div class="content">
__BODY__
</div>
<script>
// Embedded graph data (JSON object literal)
const GRAPH = __DATA__;
</script>
</body>
</html>
"#;

    let body = if graph.is_empty() {
        r#"<div class="empty">No job data loaded.</div>"#.to_string()
    } else if !graph.has_relationships() {
        r#"<div class="empty"><p>This job has no parent or dependent jobs.</p><p>Set a <strong>parent_job</strong> to create a dependency relationship.</p></div>"#.to_string()
    } else {
        let mut body = String::new();
        body.push_str(&legend());
        body.push_str("\n<div class=\"diagram\">");
        body.push_str(&render_svg(graph, config, options));
        body.push_str("</div>\n");
        body.push_str("<div class=\"caption\">");
        if options.link_template.is_some() {
            body.push_str("Click on a node to navigate to that job. ");
        }
        body.push_str("Arrows indicate execution order (parent &#8594; child).</div>");
        body
    };

    let title = escape_xml(title);
    Ok(fill_template(
        TEMPLATE,
        &[
            ("__TITLE__", title.as_str()),
            ("__BODY__", body.as_str()),
            ("__DATA__", json.as_str()),
        ],
    ))
}

/// Substitute placeholders left to right. Inserted values are never rescanned.
fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some((at, key, value)) = vars
        .iter()
        .filter_map(|&(key, value)| rest.find(key).map(|at| (at, key, value)))
        .min_by_key(|&(at, _, _)| at)
    {
        out.push_str(&rest[..at]);
        out.push_str(value);
        rest = &rest[at + key.len()..];
    }
    out.push_str(rest);
    out
}

/// JSON that cannot open or close markup inside a `<script>` element. The
/// characters only occur inside JSON strings, where `\uXXXX` is equivalent.
fn script_safe_json(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

fn legend() -> String {
    let mut s = String::from("<div class=\"legend\">");
    for status in [
        JobStatus::Success,
        JobStatus::Failed,
        JobStatus::Running,
        JobStatus::Untriggered,
    ] {
        s.push_str(&format!(
            "<span class=\"chip\"><span class=\"dot\" style=\"background:{}\"></span>{}</span>",
            status_color(status),
            status_label(status)
        ));
    }
    s.push_str("</div>");
    s
}

fn status_label(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Success => "Success",
        JobStatus::Failed => "Failed",
        JobStatus::Running => "Running",
        JobStatus::Untriggered => "Untriggered",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_dependency_graph;
    use crate::jobs::Job;

    fn page(jobs: &[Job], focal: Option<&Job>) -> String {
        let graph = build_dependency_graph(focal, jobs);
        render_html(
            &graph,
            &LayoutConfig::default(),
            &RenderOptions::default(),
            "demo",
        )
        .unwrap()
    }

    #[test]
    fn empty_graph_shows_loading_state() {
        let html = page(&[], None);
        assert!(html.contains("No job data loaded."));
        assert!(!html.contains("<svg"));
        assert!(html.contains(r#"const GRAPH = {"nodes":[],"edges":[]};"#));
    }

    #[test]
    fn single_node_shows_no_relationships() {
        let jobs = vec![Job::new("a")];
        let html = page(&jobs, Some(&jobs[0]));
        assert!(html.contains("This job has no parent or dependent jobs."));
        assert!(!html.contains("<svg"));
    }

    #[test]
    fn related_jobs_render_legend_and_diagram() {
        let jobs = vec![
            Job::new("a").with_dependents(["b"]),
            Job::new("b").with_parent("a"),
        ];
        let html = page(&jobs, Some(&jobs[0]));
        assert!(html.contains("<svg"));
        assert_eq!(html.matches("class=\"chip\"").count(), 4);
        assert!(!html.contains("__DATA__"));
        assert!(!html.contains("Click on a node"));
    }

    #[test]
    fn embedded_json_cannot_close_script() {
        let jobs = vec![Job::new("a").with_display_name("</script><b>")];
        let html = page(&jobs, Some(&jobs[0]));
        assert!(!html.contains("</script><b>"));
        assert!(html.contains(r#"\u003c/script\u003e\u003cb\u003e"#));
    }

    #[test]
    fn placeholder_text_in_labels_stays_inert() {
        let jobs = vec![
            Job::new("a")
                .with_display_name("__DATA__")
                .with_dependents(["b"]),
            Job::new("b")
                .with_parent("a")
                .with_display_name("<img src=x onerror=alert(1)>"),
        ];
        let html = page(&jobs, Some(&jobs[0]));

        let body = &html[..html.find("<script>").unwrap()];
        assert!(!body.contains("<img"));
        assert!(!body.contains("const GRAPH"));
        assert!(body.contains("__DATA__"));
        assert_eq!(html.matches("const GRAPH = ").count(), 1);
        assert!(!html.contains("<img"));
    }

    #[test]
    fn fill_template_does_not_rescan_values() {
        assert_eq!(
            fill_template("[__A__|__B__]", &[("__A__", "__B__"), ("__B__", "x")]),
            "[__B__|x]"
        );
        assert_eq!(fill_template("no vars", &[("__A__", "y")]), "no vars");
    }
}
