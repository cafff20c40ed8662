//! Semantic-model builder CLI
//!
//! # Usage
//!
//! ```bash
//! # Scan ./omni and write semantic-model.json
//! build-semantic-model
//!
//! # Custom root, single-line JSON
//! build-semantic-model --root ../models/omni --output public/semantic-model.json --compact
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use semviz_builder::{build_from_dir, to_json, BuildSummary};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "build-semantic-model")]
#[command(version)]
#[command(about = "Build the semantic-model JSON document from view and topic YAML files")]
struct Cli {
    /// Directory holding *.view.yaml and *.topic.yaml files
    #[arg(long, default_value = "omni")]
    root: PathBuf,

    /// Where to write the document
    #[arg(long, short = 'o', default_value = "semantic-model.json")]
    output: PathBuf,

    /// Write single-line JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if !cli.root.is_dir() {
        bail!("model root directory not found: {}", cli.root.display());
    }

    println!("Scanning: {}", cli.root.display());
    let document = build_from_dir(&cli.root)
        .with_context(|| format!("failed to build model from {}", cli.root.display()))?;
    println!("{}", BuildSummary::compute(&document));

    let json = to_json(&document, !cli.compact)?;
    std::fs::write(&cli.output, json)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    println!("Written: {}", cli.output.display());
    Ok(())
}
