//! Background worker for AI replace suggestions.
//!
//! One worker thread serves one session. Each request carries the epoch it
//! was issued under, a generation number and a [`CancelToken`]; submitting a
//! new request cancels the previous one and bumps the generation. Outcomes
//! come back over a channel and are applied (or dropped as stale) by the
//! segment manager on the caller's thread.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use tracing::debug;

use tsuzuri_core::settings::{AiBackendPreference, Settings};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SuggestionError {
    #[error("suggestion request was cancelled")]
    Cancelled,
    #[error("suggestion backend failed: {0}")]
    Backend(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("the backend rejected the API key")]
    Unauthorized,
    #[error("AI backend is off")]
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    /// Text left of the cursor.
    pub prompt: String,
    /// The composing text to be replaced.
    pub target: String,
    pub model_name: String,
    pub backend: AiBackendPreference,
    pub api_key: String,
    pub endpoint: String,
}

impl SuggestionRequest {
    pub fn new(settings: &Settings, prompt: String, target: String) -> Self {
        SuggestionRequest {
            prompt,
            target,
            model_name: settings.ai.model_name.clone(),
            backend: settings.ai.backend,
            api_key: settings.ai.api_key.clone(),
            endpoint: settings.ai.endpoint.clone(),
        }
    }
}

/// The AI backend. Implementations should poll `cancel` when they can and
/// return [`SuggestionError::Cancelled`] early.
pub trait SuggestionBackend: Send + Sync {
    fn send_request(
        &self,
        request: &SuggestionRequest,
        cancel: &CancelToken,
    ) -> Result<Vec<String>, SuggestionError>;
}

/// Cooperative cancellation flag shared with the worker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

struct SuggestionWork {
    epoch: u64,
    generation: u64,
    request: SuggestionRequest,
    cancel: CancelToken,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionOutcome {
    pub epoch: u64,
    /// Compare with [`SuggestionWorker::is_current`].
    pub generation: u64,
    pub target: String,
    pub result: Result<Vec<String>, SuggestionError>,
}

/// What the host should show after a suggestion completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionEvent {
    Ready(Vec<String>),
    /// A genuine backend failure, to be surfaced once.
    Failed(String),
}

pub struct SuggestionWorker {
    work_tx: mpsc::Sender<SuggestionWork>,
    result_rx: mpsc::Receiver<SuggestionOutcome>,
    in_flight: Option<CancelToken>,
    generation: Arc<AtomicU64>,
}

impl SuggestionWorker {
    pub fn spawn(backend: Arc<dyn SuggestionBackend>) -> io::Result<Self> {
        let (work_tx, work_rx) = mpsc::channel::<SuggestionWork>();
        let (result_tx, result_rx) = mpsc::channel::<SuggestionOutcome>();
        let generation = Arc::new(AtomicU64::new(0));
        let gen = Arc::clone(&generation);
        thread::Builder::new()
            .name("tsuzuri-suggest".into())
            .spawn(move || suggestion_worker(work_rx, result_tx, backend, gen))?;
        Ok(SuggestionWorker {
            work_tx,
            result_rx,
            in_flight: None,
            generation,
        })
    }

    /// Queue a request, cancelling whatever is outstanding.
    pub fn submit(&mut self, epoch: u64, request: SuggestionRequest) -> CancelToken {
        self.cancel();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancelToken::new();
        self.in_flight = Some(cancel.clone());
        let work = SuggestionWork {
            epoch,
            generation,
            request,
            cancel: cancel.clone(),
        };
        if self.work_tx.send(work).is_err() {
            debug!("suggestion worker is gone");
        }
        cancel
    }

    /// Cancel the outstanding request. Outcomes already queued for it
    /// become stale too.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }

    /// Whether `generation` belongs to the latest, uncancelled request.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation.load(Ordering::SeqCst)
    }

    pub fn try_recv(&self) -> Option<SuggestionOutcome> {
        self.result_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<SuggestionOutcome> {
        self.result_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for SuggestionWorker {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn suggestion_worker(
    rx: mpsc::Receiver<SuggestionWork>,
    tx: mpsc::Sender<SuggestionOutcome>,
    backend: Arc<dyn SuggestionBackend>,
    gen: Arc<AtomicU64>,
) {
    while let Ok(work) = rx.recv() {
        // Only the newest queued request can still be live.
        let mut latest = work;
        while let Ok(newer) = rx.try_recv() {
            latest = newer;
        }
        if latest.cancel.is_cancelled() || latest.generation != gen.load(Ordering::SeqCst) {
            debug!(epoch = latest.epoch, "suggestion skipped before start");
            continue;
        }

        let result = backend.send_request(&latest.request, &latest.cancel);
        let result = if latest.cancel.is_cancelled() || latest.generation != gen.load(Ordering::SeqCst) {
            Err(SuggestionError::Cancelled)
        } else {
            result
        };
        let outcome = SuggestionOutcome {
            epoch: latest.epoch,
            generation: latest.generation,
            target: latest.request.target,
            result,
        };
        if tx.send(outcome).is_err() {
            break;
        }
    }
}
