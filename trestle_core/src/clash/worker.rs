//! Background clash runs.
//!
//! [`ClashWorker`] owns one in-flight slot. Starting a run cancels the one in
//! flight, so at most one run's result is ever delivered: events of superseded
//! or cancelled runs are dropped on receipt. Results come back over a
//! crossbeam channel and the caller applies them on its own thread.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::detector::detect_clashes_cancellable;
use super::ClashRecord;
use crate::errors::EngineError;
use crate::snapshot::ClashRequest;

/// Outcome of a background run.
#[derive(Debug, Clone, PartialEq)]
pub enum ClashEvent {
    Completed { run_id: Uuid, records: Vec<ClashRecord> },
    Failed { run_id: Uuid, error: EngineError },
}

impl ClashEvent {
    pub fn run_id(&self) -> Uuid {
        match self {
            ClashEvent::Completed { run_id, .. } | ClashEvent::Failed { run_id, .. } => *run_id,
        }
    }
}

struct InFlight {
    run_id: Uuid,
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Runs clash detection off the caller's thread.
pub struct ClashWorker {
    tolerance: f64,
    tx: Sender<ClashEvent>,
    rx: Receiver<ClashEvent>,
    in_flight: Option<InFlight>,
}

impl ClashWorker {
    pub fn new(tolerance: f64) -> Self {
        let (tx, rx) = unbounded();
        ClashWorker {
            tolerance,
            tx,
            rx,
            in_flight: None,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Start a run over `request`, cancelling any run in flight.
    pub fn start(&mut self, request: ClashRequest) -> Uuid {
        self.cancel();

        let run_id = Uuid::new_v4();
        let cancel = Arc::new(AtomicBool::new(false));
        let tolerance = self.tolerance;
        let tx = self.tx.clone();
        let flag = Arc::clone(&cancel);

        info!(%run_id, elements = request.element_count(), "starting clash run");
        let handle = thread::spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                detect_clashes_cancellable(&request, tolerance, &flag)
            }));

            let event = match outcome {
                Ok(Ok(Some(records))) => ClashEvent::Completed { run_id, records },
                Ok(Ok(None)) => {
                    debug!(%run_id, "clash run cancelled");
                    return;
                }
                Ok(Err(error)) => ClashEvent::Failed { run_id, error },
                Err(_) => ClashEvent::Failed {
                    run_id,
                    error: EngineError::detector_failed("computation fault"),
                },
            };
            if flag.load(Ordering::Relaxed) {
                debug!(%run_id, "dropping result of cancelled run");
                return;
            }
            // The receiver lives as long as the worker; a send error means it is gone.
            let _ = tx.send(event);
        });

        self.in_flight = Some(InFlight { run_id, cancel, handle });
        run_id
    }

    /// Cancel the run in flight, if any. Its result will never be delivered.
    pub fn cancel(&mut self) {
        if let Some(run) = self.in_flight.take() {
            run.cancel.store(true, Ordering::Relaxed);
            debug!(run_id = %run.run_id, "cancelled clash run");
        }
    }

    /// Id of the run whose result is still awaited
    pub fn current_run(&self) -> Option<Uuid> {
        self.in_flight.as_ref().map(|run| run.run_id)
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.as_ref().is_some_and(|run| !run.handle.is_finished())
    }

    /// Poll for the current run's result without blocking.
    pub fn try_next(&mut self) -> Option<ClashEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    if let Some(event) = self.accept(event) {
                        return Some(event);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return None,
            }
        }
    }

    /// Block until the current run reports or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> Option<ClashEvent> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(event) => {
                    if let Some(event) = self.accept(event) {
                        return Some(event);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Block until the current run reports, polling every `poll`.
    ///
    /// `None` when no run is in flight, or when the run's thread ended without
    /// reporting; the slot is cleared in that case.
    pub fn wait_until_done(&mut self, poll: Duration) -> Option<ClashEvent> {
        while self.in_flight.is_some() {
            if let Some(event) = self.wait(poll) {
                return Some(event);
            }
            if self.is_running() {
                continue;
            }
            // The thread is done; anything it sent is already queued.
            if let Some(event) = self.try_next() {
                return Some(event);
            }
            if let Some(run) = self.in_flight.take() {
                warn!(run_id = %run.run_id, "clash thread ended without a result");
                if run.handle.join().is_err() {
                    warn!(run_id = %run.run_id, "clash thread panicked");
                }
            }
        }
        None
    }

    fn accept(&mut self, event: ClashEvent) -> Option<ClashEvent> {
        if self.current_run() != Some(event.run_id()) {
            debug!(run_id = %event.run_id(), "discarding stale clash event");
            return None;
        }
        if let Some(run) = self.in_flight.take() {
            if run.handle.join().is_err() {
                warn!(run_id = %run.run_id, "clash thread panicked after reporting");
            }
        }
        match &event {
            ClashEvent::Completed { run_id, records } => {
                info!(%run_id, clashes = records.len(), "clash run completed")
            }
            ClashEvent::Failed { run_id, error } => warn!(%run_id, %error, "clash run failed"),
        }
        Some(event)
    }
}

impl Drop for ClashWorker {
    fn drop(&mut self) {
        self.cancel();
    }
}
