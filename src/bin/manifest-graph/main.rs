//! manifest-graph CLI tool
//!
//! Command-line interface for turning Kubernetes manifests into Mermaid diagrams.
//!
//! ## Commands
//!
//! - `render <input>`: Build the relationship graph, write the diagram to a file and echo it
//! - `inspect <input>`: Print the resolved resources and edges as JSON
//!
//! Settings come from an optional TOML file (`--config`), and flags override it.

use clap::{Parser, Subcommand};
use manifest_graph::{
    compiler::{render, set_content, ManifestCompiler},
    config::RenderConfig,
    graph::ResolveMode,
    render::DiagramFormat,
    ManifestGraphError,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "manifest-graph")]
#[command(author, version, about = "Render Kubernetes manifest relationships as Mermaid diagrams", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a manifest stream as a diagram
    Render {
        /// Path to the multi-document YAML file
        input: PathBuf,

        /// Output file (default: output_er.mmd, or the config value)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Diagram format: er or class
        #[arg(short, long)]
        format: Option<DiagramFormat>,

        /// Fail when a reference cannot be resolved
        #[arg(long)]
        strict: bool,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print resolved resources and edges as JSON
    Inspect {
        /// Path to the multi-document YAML file
        input: PathBuf,

        /// Fail when a reference cannot be resolved
        #[arg(long)]
        strict: bool,
    },
}

fn run(cli: Cli) -> Result<(), ManifestGraphError> {
    match cli.command {
        Commands::Render {
            input,
            output,
            format,
            strict,
            config,
            verbose,
        } => {
            let mut settings = match config {
                Some(path) => RenderConfig::load(path)?,
                None => RenderConfig::default(),
            };
            if let Some(output) = output {
                settings.output = output;
            }
            if let Some(format) = format {
                settings.format = format;
            }
            settings.strict |= strict;

            let resolution = ManifestCompiler::new(settings.resolve_mode()).compile_path(&input)?;
            if verbose {
                for diagnostic in &resolution.diagnostics {
                    eprintln!("{diagnostic}");
                }
            }

            let text = render(&resolution, &settings)?;
            set_content(&settings.output, &text)?;
            tracing::info!("Wrote {} diagram to {:?}", settings.format, settings.output);
            print!("{text}");
            Ok(())
        }

        Commands::Inspect { input, strict } => {
            let mode = if strict {
                ResolveMode::Strict
            } else {
                ResolveMode::Lenient
            };
            let resolution = ManifestCompiler::new(mode).compile_path(&input)?;
            println!("{}", serde_json::to_string_pretty(&resolution.snapshot())?);
            Ok(())
        }
    }
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code());
    }
}
