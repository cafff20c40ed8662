//! Semantic Viewer UI - semantic-model visualization host

pub mod api;
pub mod app;
pub mod loader;

pub use api::ApiClient;
pub use app::{SemanticViewerApp, ViewerConfig};
pub use loader::{DocumentSource, HttpSource, LoadError, LoadStatus, ModelLoader};

#[cfg(not(target_arch = "wasm32"))]
pub use loader::FileSource;

/// Document path served next to the web build
pub const DEFAULT_MODEL_PATH: &str = "/semantic-model.json";

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    use std::sync::Arc;
    use wasm_bindgen::JsCast;

    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    let base_url = web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_else(|| "http://localhost:3000".to_string());
    let dark_mode = web_sys::window()
        .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
        .map(|m| m.matches())
        .unwrap_or(true);

    let config = ViewerConfig {
        source: Arc::new(HttpSource::new(ApiClient::new(&base_url), DEFAULT_MODEL_PATH)),
        view: semviz_graph::ViewKind::default(),
        dark_mode,
    };

    let Some(canvas) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("semviz_canvas"))
        .and_then(|e| e.dyn_into::<web_sys::HtmlCanvasElement>().ok())
    else {
        tracing::error!("Canvas element semviz_canvas not found");
        return;
    };

    wasm_bindgen_futures::spawn_local(async move {
        let result = eframe::WebRunner::new()
            .start(
                canvas,
                eframe::WebOptions::default(),
                Box::new(|cc| Ok(Box::new(SemanticViewerApp::new(cc, config)))),
            )
            .await;
        if let Err(e) = result {
            tracing::error!(error = ?e, "Failed to start eframe");
        }
    });
}
