//! Background thread for remote calls.
//!
//! The owning thread submits jobs and later collects [`FetchOutcome`]s
//! without blocking. Each job carries a [`RequestToken`] so the owner can
//! tell whether the result is still wanted once it arrives.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use crate::error::SyncError;
use crate::service::{
    AlignmentRequest, AlignmentResponse, ChainAnnotationsResponse, DataService,
};
use crate::structure::{ChainRef, ObservedSequence};

/// Identifies the session state a request was issued under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken {
    /// Session generation at submit time.
    pub generation: u64,
    /// Chain the request is for.
    pub chain: ChainRef,
}

/// Work for the fetch thread.
pub(crate) enum FetchJob {
    Align {
        token: RequestToken,
        observed: ObservedSequence,
        request: AlignmentRequest,
    },
    Annotations {
        token: RequestToken,
    },
    Shutdown,
}

/// A finished remote call.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Alignment of an observed chain.
    Alignment {
        /// Token of the request.
        token: RequestToken,
        /// The residues that were submitted.
        observed: ObservedSequence,
        /// Service result.
        result: Result<AlignmentResponse, SyncError>,
    },
    /// Annotation fetch of a chain.
    Annotations {
        /// Token of the request.
        token: RequestToken,
        /// Service result.
        result: Result<ChainAnnotationsResponse, SyncError>,
    },
}

impl FetchOutcome {
    /// Token of the request this answers.
    #[must_use]
    pub fn token(&self) -> &RequestToken {
        match self {
            Self::Alignment { token, .. } | Self::Annotations { token, .. } => {
                token
            }
        }
    }
}

/// Owns the fetch thread and both channel ends.
pub(crate) struct FetchWorker {
    job_tx: mpsc::Sender<FetchJob>,
    outcome_rx: mpsc::Receiver<FetchOutcome>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl FetchWorker {
    /// Spawn the fetch thread.
    pub(crate) fn new(
        service: Arc<dyn DataService>,
    ) -> Result<Self, std::io::Error> {
        let (job_tx, job_rx) = mpsc::channel::<FetchJob>();
        let (outcome_tx, outcome_rx) = mpsc::channel::<FetchOutcome>();

        let thread = std::thread::Builder::new()
            .name("fetch-worker".into())
            .spawn(move || {
                Self::thread_loop(service.as_ref(), &job_rx, &outcome_tx);
            })?;

        Ok(Self {
            job_tx,
            outcome_rx,
            thread: Some(thread),
        })
    }

    /// Queue a job (non-blocking).
    pub(crate) fn submit(&self, job: FetchJob) {
        let _ = self.job_tx.send(job);
    }

    /// Next finished outcome, if any.
    pub(crate) fn try_recv(&self) -> Option<FetchOutcome> {
        self.outcome_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next outcome.
    pub(crate) fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> Option<FetchOutcome> {
        self.outcome_rx.recv_timeout(timeout).ok()
    }

    /// Stop the thread after the job in progress and wait for it.
    pub(crate) fn shutdown(&mut self) {
        let _ = self.job_tx.send(FetchJob::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    fn thread_loop(
        service: &dyn DataService,
        job_rx: &mpsc::Receiver<FetchJob>,
        outcome_tx: &mpsc::Sender<FetchOutcome>,
    ) {
        while let Ok(job) = job_rx.recv() {
            let outcome = match job {
                FetchJob::Shutdown => break,
                FetchJob::Align {
                    token,
                    observed,
                    request,
                } => {
                    log::debug!("aligning {} in background", token.chain);
                    let result = service.align(&request);
                    FetchOutcome::Alignment {
                        token,
                        observed,
                        result,
                    }
                }
                FetchJob::Annotations { token } => {
                    log::debug!(
                        "fetching annotations for {} in background",
                        token.chain
                    );
                    let result = service.chain_annotations(&token.chain);
                    FetchOutcome::Annotations { token, result }
                }
            };
            if outcome_tx.send(outcome).is_err() {
                break;
            }
        }
    }
}

impl Drop for FetchWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
