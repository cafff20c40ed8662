//! Semantic Viewer Application
//!
//! Layout:
//! ┌──────────────────────────────────────────┐
//! │ header: view selector, dark, source      │
//! ├──────────────────────────────────────────┤
//! │                                          │
//! │  mounted view (treemap/sunburst/tree)    │
//! │  or spinner / inline load error          │
//! │                                          │
//! ├──────────────────────────────────────────┤
//! │ status: model summary                    │
//! └──────────────────────────────────────────┘
//!
//! Switching views unmounts the current one and fetches the document again
//! for the new mount; a fetch still in flight is cancelled first.

use std::sync::Arc;

use egui::{Align, Layout, RichText};
use semviz_graph::{prepare_graph, ColorScheme, GraphView, ModelSummary, ViewKind};

use crate::loader::{DocumentSource, LoadError, LoadStatus, ModelLoader};

/// Startup options supplied by the host (CLI or web page)
pub struct ViewerConfig {
    pub source: Arc<dyn DocumentSource>,
    pub view: ViewKind,
    pub dark_mode: bool,
}

/// Main application state
pub struct SemanticViewerApp {
    source: Arc<dyn DocumentSource>,
    loader: ModelLoader,

    // Mounted view
    view_kind: ViewKind,
    view: Option<GraphView>,

    // Status bar
    summary: Option<ModelSummary>,

    // Terminal for the current mount
    error: Option<LoadError>,

    dark_mode: bool,

    // Tokio runtime for native builds
    #[cfg(not(target_arch = "wasm32"))]
    _runtime: Arc<tokio::runtime::Runtime>,
}

impl SemanticViewerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: ViewerConfig,
        #[cfg(not(target_arch = "wasm32"))] runtime: Arc<tokio::runtime::Runtime>,
    ) -> Self {
        cc.egui_ctx.set_visuals(visuals(config.dark_mode));

        #[cfg(not(target_arch = "wasm32"))]
        let loader = ModelLoader::new(runtime.handle().clone());
        #[cfg(target_arch = "wasm32")]
        let loader = ModelLoader::new();

        let mut app = Self {
            source: config.source,
            loader,
            view_kind: config.view,
            view: None,
            summary: None,
            error: None,
            dark_mode: config.dark_mode,
            #[cfg(not(target_arch = "wasm32"))]
            _runtime: runtime,
        };
        app.mount(config.view);
        app
    }

    /// Unmount whatever is shown and start loading for `kind`
    fn mount(&mut self, kind: ViewKind) {
        tracing::info!(view = %kind, source = %self.source.describe(), "Mounting view");
        self.view = None;
        self.error = None;
        self.view_kind = kind;
        self.loader.start(self.source.clone());
    }

    fn check_pending_load(&mut self) {
        match self.loader.poll() {
            LoadStatus::Idle | LoadStatus::Loading => {}
            LoadStatus::Ready(document) => {
                let (graph, report) = prepare_graph(&document);
                let summary = ModelSummary::compute(&graph, &report);
                tracing::info!(view = %self.view_kind, %summary, "Semantic model ready");
                self.summary = Some(summary);
                self.view = Some(GraphView::mount(self.view_kind, graph));
            }
            LoadStatus::Failed(error) => {
                self.error = Some(error);
            }
        }
    }
}

fn visuals(dark_mode: bool) -> egui::Visuals {
    if dark_mode {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    }
}

fn render_load_error(ui: &mut egui::Ui, error: &LoadError, scheme: &ColorScheme) {
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.35);
        ui.label(
            RichText::new("Could not load the semantic model")
                .heading()
                .color(scheme.error),
        );
        ui.add_space(6.0);
        ui.label(RichText::new(error.to_string()).color(scheme.muted_text));
    });
}

impl eframe::App for SemanticViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_pending_load();

        if self.loader.is_loading() {
            ctx.request_repaint();
        }

        let mut new_view: Option<ViewKind> = None;
        let mut reload = false;
        let mut dark_changed = false;

        // =====================================================================
        // HEADER
        // =====================================================================
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("Semantic model");
                ui.separator();
                for &kind in ViewKind::all() {
                    if ui
                        .selectable_label(self.view_kind == kind, kind.display_name())
                        .clicked()
                        && kind != self.view_kind
                    {
                        new_view = Some(kind);
                    }
                }
                ui.separator();
                dark_changed = ui.checkbox(&mut self.dark_mode, "Dark").changed();

                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.button("Reload").clicked() {
                        reload = true;
                    }
                    ui.label(RichText::new(self.source.describe()).small().weak());
                });
            });
        });

        // =====================================================================
        // STATUS BAR
        // =====================================================================
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(summary) = &self.summary {
                    ui.label(RichText::new(summary.to_string()).small());
                }
                if self.loader.is_loading() {
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(RichText::new("Loading…").small().weak());
                    });
                }
            });
        });

        // =====================================================================
        // VIEW
        // =====================================================================
        let scheme = ColorScheme::from_dark_mode(self.dark_mode);
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(scheme.background))
            .show(ctx, |ui| {
                if let Some(error) = &self.error {
                    render_load_error(ui, error, &scheme);
                } else if let Some(view) = &mut self.view {
                    view.ui(ui, &scheme);
                } else {
                    ui.centered_and_justified(|ui| {
                        ui.spinner();
                    });
                }
            });

        if dark_changed {
            ctx.set_visuals(visuals(self.dark_mode));
        }
        if let Some(kind) = new_view {
            self.mount(kind);
        } else if reload {
            self.mount(self.view_kind);
        }
    }
}
