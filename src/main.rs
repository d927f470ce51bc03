use clap::{Parser, Subcommand, ValueEnum};

use job_dep_viz::graph::{LayoutConfig, build_dependency_graph_with};
use job_dep_viz::render::{RenderOptions, render_html, render_svg};
use job_dep_viz::{Result, diagnostics, jobs};

use anyhow::bail;

#[derive(Parser)]
#[command(name = "job-dep-viz")]
#[command(about = "Job dependency diagram for a job scheduler", long_about = None)]
struct Cli {
    /// Suppress data-quality warnings.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dependency diagram around one job.
    Graph {
        /// Jobs JSON file (array or {"data": [...]} envelope); `-` for stdin.
        #[arg(long)]
        jobs: String,

        /// Name of the focal job.
        #[arg(long)]
        focal: String,

        /// Output file; stdout when omitted.
        #[arg(short = 'o', long)]
        out: Option<String>,

        /// Output format; inferred from the output extension when omitted.
        #[arg(long, value_enum)]
        format: Option<Format>,

        #[command(flatten)]
        geometry: GeometryArgs,

        /// Link for non-focal nodes; `{id}` is replaced by the job name.
        #[arg(long)]
        link_template: Option<String>,
    },

    /// Report data-quality issues in a jobs file.
    Check {
        #[arg(long)]
        jobs: String,

        /// Exit with an error if any issue is found.
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Svg,
    Html,
}

impl Format {
    fn from_path(path: Option<&str>) -> Self {
        let ext = path
            .and_then(|p| std::path::Path::new(p).extension())
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("svg") => Format::Svg,
            Some("html") | Some("htm") => Format::Html,
            _ => Format::Json,
        }
    }
}

#[derive(clap::Args)]
struct GeometryArgs {
    #[arg(long)]
    node_width: Option<f64>,
    #[arg(long)]
    node_height: Option<f64>,
    /// Horizontal gap between nodes on one level.
    #[arg(long)]
    node_gap: Option<f64>,
    /// Vertical distance between levels.
    #[arg(long)]
    level_pitch: Option<f64>,
    #[arg(long)]
    top_margin: Option<f64>,
}

impl GeometryArgs {
    fn into_config(self) -> LayoutConfig {
        let d = LayoutConfig::default();
        LayoutConfig {
            node_width: self.node_width.unwrap_or(d.node_width),
            node_height: self.node_height.unwrap_or(d.node_height),
            node_gap: self.node_gap.unwrap_or(d.node_gap),
            level_pitch: self.level_pitch.unwrap_or(d.level_pitch),
            top_margin: self.top_margin.unwrap_or(d.top_margin),
        }
        .sanitized()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    diagnostics::set_quiet(cli.quiet);

    match cli.cmd {
        Commands::Graph {
            jobs: jobs_path,
            focal,
            out,
            format,
            geometry,
            link_template,
        } => {
            // 1) Load + report data quality (warnings only).
            let all_jobs = jobs::load_jobs(&jobs_path)?;
            jobs::inspect(&all_jobs).warn_all();

            // 2) Resolve the focal job. Asking for an unknown job is a user error,
            //    not the library's "nothing loaded yet" state.
            let dir = jobs::JobDirectory::new(&all_jobs);
            let Some(focal_job) = dir.get(&focal) else {
                bail!(
                    "{}",
                    diagnostics::error_message(format!("focal job not found: {}", focal))
                );
            };

            // 3) Build.
            let config = geometry.into_config();
            let graph = build_dependency_graph_with(Some(focal_job), &all_jobs, &config);

            // 4) Render.
            let options = RenderOptions {
                link_template,
                ..RenderOptions::default()
            };
            let rendered = match format.unwrap_or_else(|| Format::from_path(out.as_deref())) {
                Format::Json => serde_json::to_string_pretty(&graph)?,
                Format::Svg => render_svg(&graph, &config, &options),
                Format::Html => render_html(&graph, &config, &options, focal_job.display_name())?,
            };

            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    println!("Wrote {}", path);
                }
                None => println!("{}", rendered),
            }
        }

        Commands::Check { jobs: jobs_path, strict } => {
            let all_jobs = jobs::load_jobs(&jobs_path)?;
            let report = jobs::inspect(&all_jobs);

            println!("jobs: {}", report.jobs);
            println!("unnamed: {}", report.unnamed);
            println!("duplicate names: {}", report.duplicate_names.len());
            for name in &report.duplicate_names {
                println!("  {}", name);
            }
            println!("dangling references: {}", report.dangling_references.len());
            for (job, missing) in &report.dangling_references {
                println!("  {} -> {}", job, missing);
            }
            println!("parent cycles: {}", report.parent_cycles.len());
            for cycle in &report.parent_cycles {
                println!("  {}", cycle.join(" -> "));
            }
            if report.jobs > jobs::MAX_DIAGRAM_JOBS {
                println!(
                    "note: more than {} jobs; diagrams may be slow to read",
                    jobs::MAX_DIAGRAM_JOBS
                );
            }

            if strict && report.has_issues() {
                bail!("{}", diagnostics::error_message("job data has issues"));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(Format::from_path(Some("out/graph.SVG")), Format::Svg);
        assert_eq!(Format::from_path(Some("graph.htm")), Format::Html);
        assert_eq!(Format::from_path(Some("graph.json")), Format::Json);
        assert_eq!(Format::from_path(None), Format::Json);
    }

    #[test]
    fn cli_parses_graph_command() {
        let cli = Cli::try_parse_from([
            "job-dep-viz",
            "graph",
            "--jobs",
            "jobs.json",
            "--focal",
            "export",
            "--node-gap",
            "8",
            "-q",
        ])
        .unwrap();
        assert!(cli.quiet);
        match cli.cmd {
            Commands::Graph { focal, geometry, .. } => {
                assert_eq!(focal, "export");
                let config = geometry.into_config();
                assert_eq!(config.node_gap, 8.0);
                assert_eq!(config.node_width, 160.0);
            }
            Commands::Check { .. } => panic!("expected graph"),
        }
    }
}
