//! Native Semantic Viewer
//!
//! # Usage
//!
//! ```bash
//! # Fetch the model over HTTP
//! semantic-viewer --url http://localhost:3000/semantic-model.json --view sunburst
//!
//! # Open a model produced by build-semantic-model
//! semantic-viewer --file semantic-model.json --dark
//! ```

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::sync::Arc;

    use anyhow::{anyhow, bail, Context};
    use clap::Parser;
    use semviz_graph::ViewKind;
    use semviz_ui::{DocumentSource, FileSource, HttpSource, SemanticViewerApp, ViewerConfig};
    use tracing_subscriber::EnvFilter;

    #[derive(Parser)]
    #[command(name = "semantic-viewer")]
    #[command(version)]
    #[command(about = "Interactive treemap / sunburst / tree viewer for a semantic-model document")]
    struct Cli {
        /// URL of the semantic-model JSON document
        #[arg(long, env = "SEMVIZ_MODEL_URL", conflicts_with = "file")]
        url: Option<String>,

        /// Local semantic-model JSON document
        #[arg(long)]
        file: Option<PathBuf>,

        /// Initial view: treemap, sunburst or tree
        #[arg(long, default_value = "treemap")]
        view: ViewKind,

        /// Start with the dark color scheme
        #[arg(long)]
        dark: bool,
    }

    pub fn run() -> anyhow::Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();

        let cli = Cli::parse();

        let source: Arc<dyn DocumentSource> = match (cli.url, cli.file) {
            (_, Some(path)) => Arc::new(FileSource::new(path)),
            (Some(url), None) => Arc::new(HttpSource::from_url(&url)),
            (None, None) => bail!("no model given: pass --url, --file or set SEMVIZ_MODEL_URL"),
        };

        let runtime = Arc::new(
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("failed to create tokio runtime")?,
        );

        let config = ViewerConfig {
            source,
            view: cli.view,
            dark_mode: cli.dark,
        };

        let native_options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_title("Semantic Viewer")
                .with_inner_size([1280.0, 860.0])
                .with_min_inner_size([640.0, 480.0]),
            ..Default::default()
        };

        tracing::info!(view = %config.view, "Starting semantic viewer");
        eframe::run_native(
            "Semantic Viewer",
            native_options,
            Box::new(move |cc| Ok(Box::new(SemanticViewerApp::new(cc, config, runtime)))),
        )
        .map_err(|e| anyhow!("application error: {e}"))
    }
}
