//! CLI driver: reads a serialized type graph, renders it with a chosen target,
//! and writes the result to a file or stdout.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rendergen::config::RenderConfig;
use rendergen::diagnostics::Diagnostics;
use rendergen::ir::TypeGraph;
use rendergen::render::ruby::RubyDryTypes;

#[derive(Parser)]
#[command(name = "rendergen")]
#[command(about = "Render a type graph into target-language source")]
struct Cli {
    /// Path to the serialized type graph (JSON).
    graph: PathBuf,

    /// Path to a config file, on top of the default search locations.
    #[arg(short, long)]
    config: Option<String>,

    /// Override the configured output path.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = RenderConfig::load_from(cli.config.as_deref())?;
    if let Some(output) = cli.output {
        config.output.path = Some(output);
    }

    tracing::info!(graph = ?cli.graph, target = %config.output.target, "loading type graph");
    let raw = fs::read_to_string(&cli.graph)?;
    let graph: TypeGraph = serde_json::from_str(&raw)?;

    let mut diagnostics = Diagnostics::new();
    let lines = match config.output.target.as_str() {
        "ruby" => {
            let target = RubyDryTypes::new();
            rendergen::render::render(&graph, &target, config.output.leading_comment.as_deref(), &mut diagnostics)?
        }
        other => anyhow::bail!("unknown render target '{other}'"),
    };

    if diagnostics.has_warnings() {
        for item in diagnostics.warnings() {
            tracing::warn!("{item}");
        }
        if config.diagnostics.fail_on_warnings {
            anyhow::bail!("render produced {} warning(s) and fail_on_warnings is set", diagnostics.len());
        }
    }

    let mut rendered = lines.join("\n");
    rendered.push('\n');

    match &config.output.path {
        Some(path) => {
            if config.output.create_output_dir {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, rendered)?;
            tracing::info!(path = ?path, "wrote render output");
        }
        None => print!("{rendered}"),
    }

    Ok(())
}
