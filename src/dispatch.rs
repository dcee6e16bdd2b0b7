//! Single-worker dispatch between the interactive thread and the generator.
//!
//! The presentation shell owns a [`Dispatcher`] on its interactive thread.
//! [`Dispatcher::submit`] hands a request to one background worker thread
//! and returns immediately; the shell keeps its trigger control disabled
//! while [`Dispatcher::is_busy`] holds and drains the completion from its
//! event loop via [`Dispatcher::poll`]. The outcome therefore always
//! surfaces on the interactive thread, never on the worker.

use crate::error::{ImageForgeError, Result};
use crate::orchestrator::{GenerationOutcome, GenerationRequest, Orchestrator};
use async_trait::async_trait;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;

/// Trait for anything that can run a generation request to completion.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Runs one request, reporting the outcome (never an error).
    async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome;
}

#[async_trait]
impl ImageGenerator for Orchestrator {
    async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        Orchestrator::generate(self, request).await
    }
}

/// Hands requests to a background worker, one at a time, and delivers
/// completions back on the interactive thread.
pub struct Dispatcher<G> {
    generator: Arc<G>,
    in_flight: bool,
    completion_tx: Sender<GenerationOutcome>,
    completion_rx: Receiver<GenerationOutcome>,
}

impl<G: ImageGenerator + 'static> Dispatcher<G> {
    /// Creates a dispatcher around the given generator.
    pub fn new(generator: Arc<G>) -> Self {
        let (completion_tx, completion_rx) = channel();
        Self {
            generator,
            in_flight: false,
            completion_tx,
            completion_rx,
        }
    }

    /// Returns true while a request is running on the worker.
    ///
    /// The shell mirrors this into its trigger control's enabled state.
    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Spawns a worker thread for `request`.
    ///
    /// Errors with [`ImageForgeError::Busy`] while a previous request is
    /// still in flight; duplicate concurrent submissions are impossible.
    /// Once dispatched the request runs to completion, there is no
    /// cancellation.
    pub fn submit(&mut self, request: GenerationRequest) -> Result<()> {
        if self.in_flight {
            return Err(ImageForgeError::Busy);
        }

        let generator = Arc::clone(&self.generator);
        let tx = self.completion_tx.clone();

        std::thread::spawn(move || {
            let outcome = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime.block_on(generator.generate(&request)),
                Err(e) => GenerationOutcome::Failed(format!("Error: {e}")),
            };
            // The interactive side may have been dropped; nothing to do then
            let _ = tx.send(outcome);
        });

        self.in_flight = true;
        Ok(())
    }

    /// Non-blocking check for a completed request.
    ///
    /// Call from the interactive loop only. Yields each outcome exactly
    /// once and clears the busy state when it does, so the shell re-enables
    /// its trigger exactly once per request.
    pub fn poll(&mut self) -> Option<GenerationOutcome> {
        match self.completion_rx.try_recv() {
            Ok(outcome) => {
                self.in_flight = false;
                Some(outcome)
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}
