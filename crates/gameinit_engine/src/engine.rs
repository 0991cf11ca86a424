use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::fetch::{ChannelProgressSink, Fetcher};
use crate::handle::FetchHandle;
use crate::picker::{DirectoryPicker, PickRequest};
use crate::shutdown::ShutdownRegistry;
use crate::{
    EngineError, EngineEvent, FailureKind, FetchError, FetchId, FetchRequest, PickId,
    TransferOutcome,
};

enum EngineCommand {
    Fetch {
        handle: FetchHandle,
        request: FetchRequest,
    },
    Pick {
        pick_id: PickId,
        request: PickRequest,
    },
    Shutdown,
}

/// UI-side handle to the background IO runtime.
///
/// Commands go in over one channel; every result comes back as an
/// [`EngineEvent`] on another, to be drained from the UI thread with
/// [`EngineHandle::try_recv`].
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
    event_rx: mpsc::Receiver<EngineEvent>,
    registry: Arc<dyn ShutdownRegistry>,
    worker: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        picker: Arc<dyn DirectoryPicker>,
        registry: Arc<dyn ShutdownRegistry>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("gameinit-engine")
            .enable_all()
            .build()?;

        let worker_events = event_tx.clone();
        let worker = thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let event_tx = worker_events.clone();
                match command {
                    EngineCommand::Fetch { handle, request } => {
                        let fetcher = fetcher.clone();
                        runtime.spawn(async move {
                            run_fetch(fetcher.as_ref(), handle, request, event_tx).await;
                        });
                    }
                    EngineCommand::Pick { pick_id, request } => {
                        let picker = picker.clone();
                        runtime.spawn(async move {
                            let result = picker.pick(&request).await;
                            let _ = event_tx.send(EngineEvent::DirectoryPicked { pick_id, result });
                        });
                    }
                    EngineCommand::Shutdown => break,
                }
            }
            engine_debug!("engine worker stopping");
            runtime.shutdown_timeout(Duration::from_secs(1));
        });

        Ok(Self {
            cmd_tx,
            event_tx,
            event_rx,
            registry,
            worker: Some(worker),
        })
    }

    /// Starts a download right away and returns its handle.
    ///
    /// The handle is registered for auto-cancel on shutdown until it finishes
    /// or is cancelled. Exactly one [`EngineEvent::FetchFinished`] follows.
    pub fn start_fetch(&self, fetch_id: FetchId, request: FetchRequest) -> FetchHandle {
        let handle = FetchHandle::new(fetch_id, self.registry.clone());
        engine_info!("fetch {} start {} -> {:?}", fetch_id, request.url, request.destination);
        let command = EngineCommand::Fetch {
            handle: handle.clone(),
            request,
        };
        if self.cmd_tx.send(command).is_err() {
            engine_warn!("fetch {} rejected: engine stopped", fetch_id);
            let outcome = if handle.begin_finish() {
                handle.finish(false);
                TransferOutcome::Failed(FetchError::new(
                    FailureKind::EngineStopped,
                    "engine is not running",
                ))
            } else {
                TransferOutcome::Cancelled
            };
            let _ = self
                .event_tx
                .send(EngineEvent::FetchFinished { fetch_id, outcome });
        }
        handle
    }

    pub fn pick_directory(&self, pick_id: PickId, request: PickRequest) {
        if self
            .cmd_tx
            .send(EngineCommand::Pick { pick_id, request })
            .is_err()
        {
            let _ = self.event_tx.send(EngineEvent::DirectoryPicked {
                pick_id,
                result: Err(crate::PickerError::Launch("engine is not running".to_string())),
            });
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Stops the worker. Transfers still running are dropped without a
    /// completion event; run the shutdown hooks first to cancel them cleanly.
    pub fn shutdown(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                engine_warn!("engine worker panicked");
            }
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_fetch(
    fetcher: &dyn Fetcher,
    handle: FetchHandle,
    request: FetchRequest,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let fetch_id = handle.id();
    let sink = ChannelProgressSink::new(event_tx.clone(), handle.clone());
    let token = handle.cancellation().clone();

    let result = tokio::select! {
        biased;
        _ = token.cancelled() => None,
        result = fetcher.fetch(fetch_id, &request, &sink) => Some(result),
    };

    let outcome = match result {
        Some(result) if handle.begin_finish() => {
            let finished = result.and_then(|staged| staged.commit(&request.destination));
            handle.finish(finished.is_ok());
            match finished {
                Ok(file) => TransferOutcome::Completed(file),
                Err(err) => {
                    engine_warn!("fetch {} failed: {}", fetch_id, err);
                    TransferOutcome::Failed(err)
                }
            }
        }
        // Cancelled, either while in flight or just as it finished.
        _ => TransferOutcome::Cancelled,
    };

    engine_info!("fetch {} finished: {}", fetch_id, outcome_label(&outcome));
    let _ = event_tx.send(EngineEvent::FetchFinished { fetch_id, outcome });
}

fn outcome_label(outcome: &TransferOutcome) -> &'static str {
    match outcome {
        TransferOutcome::Completed(_) => "completed",
        TransferOutcome::Cancelled => "cancelled",
        TransferOutcome::Failed(_) => "failed",
    }
}
