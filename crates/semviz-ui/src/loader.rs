//! Document loading with cancellation
//!
//! A [`ModelLoader`] runs one fetch at a time. Starting a new load, calling
//! [`ModelLoader::cancel`], or dropping the loader (view unmount) cancels the
//! in-flight fetch; its result is discarded and never reaches [`LoadStatus`].
//!
//! The fetch future is wrapped in an abortable handle on every target, so a
//! cancel drops the request itself rather than only ignoring its answer.
//! Results come back through a shared slot polled once per frame, the same
//! way the app's other async results do.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::future::{abortable, AbortHandle, Aborted};
use semviz_types::SemanticNode;
use thiserror::Error;

use crate::api::ApiClient;

// =============================================================================
// ERRORS
// =============================================================================

/// Why the document could not be shown. Terminal for the view instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("HTTP {status}")]
    Http { status: u16 },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("invalid semantic model: {0}")]
    InvalidJson(String),

    #[error("failed to read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("load cancelled")]
    Cancelled,
}

// =============================================================================
// SOURCES
// =============================================================================

/// Where a document comes from
#[cfg(not(target_arch = "wasm32"))]
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self) -> Result<SemanticNode, LoadError>;

    /// Shown in the header and in logs
    fn describe(&self) -> String;
}

/// Where a document comes from
#[cfg(target_arch = "wasm32")]
#[async_trait(?Send)]
pub trait DocumentSource {
    async fn fetch(&self) -> Result<SemanticNode, LoadError>;

    /// Shown in the header and in logs
    fn describe(&self) -> String;
}

/// GET a JSON document over HTTP
pub struct HttpSource {
    api: ApiClient,
    path: String,
}

impl HttpSource {
    pub fn new(api: ApiClient, path: impl Into<String>) -> Self {
        Self {
            api,
            path: path.into(),
        }
    }

    /// Full URL as a single string
    pub fn from_url(url: &str) -> Self {
        Self::new(ApiClient::new(""), url)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl DocumentSource for HttpSource {
    async fn fetch(&self) -> Result<SemanticNode, LoadError> {
        self.api.get_document(&self.path).await
    }

    fn describe(&self) -> String {
        self.api.url_for(&self.path)
    }
}

/// Read a JSON document from disk
#[cfg(not(target_arch = "wasm32"))]
pub struct FileSource {
    path: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait]
impl DocumentSource for FileSource {
    async fn fetch(&self) -> Result<SemanticNode, LoadError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| LoadError::Io {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        tracing::info!(path = %self.path.display(), bytes = bytes.len(), "Read semantic model");
        crate::api::parse_document(&bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// =============================================================================
// LOADER
// =============================================================================

type LoadSlot = Arc<Mutex<Option<Result<SemanticNode, LoadError>>>>;

struct PendingLoad {
    generation: u64,
    slot: LoadSlot,
    /// Drops the fetch future (and its request) on cancel
    abort: AbortHandle,
    #[cfg(not(target_arch = "wasm32"))]
    task: tokio::task::JoinHandle<()>,
}

/// Result of polling the loader
#[derive(Debug)]
pub enum LoadStatus {
    Idle,
    Loading,
    Ready(SemanticNode),
    Failed(LoadError),
}

pub struct ModelLoader {
    /// Bumped on every start and cancel; a finishing fetch only publishes
    /// its result if the counter still matches the value it started with
    generation: Arc<AtomicU64>,
    pending: Option<PendingLoad>,
    #[cfg(not(target_arch = "wasm32"))]
    runtime: tokio::runtime::Handle,
}

impl ModelLoader {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
            runtime,
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Start fetching from `source`, cancelling any load in flight
    pub fn start(&mut self, source: Arc<dyn DocumentSource>) -> u64 {
        self.cancel();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let slot: LoadSlot = Arc::new(Mutex::new(None));
        tracing::debug!(generation, source = %source.describe(), "Starting document load");

        let (fetch, abort) = abortable(async move { source.fetch().await });
        let task = {
            let slot = slot.clone();
            let current = self.generation.clone();
            async move {
                let result = match fetch.await {
                    Ok(result) => result,
                    Err(Aborted) => Err(LoadError::Cancelled),
                };
                if current.load(Ordering::SeqCst) != generation {
                    tracing::debug!(generation, "Discarding result of cancelled load");
                    return;
                }
                if let Ok(mut guard) = slot.lock() {
                    *guard = Some(result);
                }
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        let pending = PendingLoad {
            generation,
            slot,
            abort,
            task: self.runtime.spawn(task),
        };

        #[cfg(target_arch = "wasm32")]
        let pending = {
            wasm_bindgen_futures::spawn_local(task);
            PendingLoad {
                generation,
                slot,
                abort,
            }
        };

        self.pending = Some(pending);
        generation
    }

    /// Abandon the load in flight. Returns false if nothing was loading.
    pub fn cancel(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        self.generation.fetch_add(1, Ordering::SeqCst);
        pending.abort.abort();
        #[cfg(not(target_arch = "wasm32"))]
        pending.task.abort();
        tracing::debug!(generation = pending.generation, "Cancelled document load");
        true
    }

    /// Take the finished result, if any
    pub fn poll(&mut self) -> LoadStatus {
        let Some(pending) = &self.pending else {
            return LoadStatus::Idle;
        };
        // Read before the slot: a finished task has already published
        #[cfg(not(target_arch = "wasm32"))]
        let finished = pending.task.is_finished() || pending.abort.is_aborted();
        #[cfg(target_arch = "wasm32")]
        let finished = pending.abort.is_aborted();

        let taken = pending.slot.lock().ok().and_then(|mut guard| guard.take());
        let result = match taken {
            Some(result) => result,
            None if finished => Err(LoadError::Cancelled),
            None => return LoadStatus::Loading,
        };
        self.pending = None;
        match result {
            Ok(document) => LoadStatus::Ready(document),
            Err(error) => {
                tracing::warn!(%error, "Semantic model load failed");
                LoadStatus::Failed(error)
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ModelLoader {
    fn drop(&mut self) {
        self.cancel();
    }
}
