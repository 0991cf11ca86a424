use std::collections::HashMap;
use std::path::Path;

use engine_logging::{engine_debug, engine_info, engine_warn};
use gameinit_core::{Effect, FetchOutcome, FetchProgress, InstallError, Msg};
use gameinit_engine::{
    EngineEvent, EngineHandle, FetchHandle, FetchId, FetchRequest, PickId, PickRequest,
    TransferOutcome,
};

use super::window::{WindowManager, WindowSlot};

/// Continuations the install flow hands control to.
pub trait InstallHooks {
    /// The game content is present; load the shell map.
    fn load_shell_map(&mut self);
    /// The user picked an install medium.
    fn media_selected(&mut self, path: &Path);
}

/// Only logs. Used by the console driver.
#[derive(Debug, Default)]
pub struct LoggingHooks;

impl InstallHooks for LoggingHooks {
    fn load_shell_map(&mut self) {
        engine_info!("loading shell map");
    }

    fn media_selected(&mut self, path: &Path) {
        engine_info!("install medium selected: {:?}", path);
    }
}

/// Executes core effects against the engine and the window slot, and turns
/// engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    fetches: HashMap<FetchId, FetchHandle>,
    next_pick: PickId,
    pending_pick: Option<PickId>,
    expected_sha256: Option<String>,
    hooks: Box<dyn InstallHooks>,
    quit_requested: bool,
}

impl EffectRunner {
    pub fn new(
        engine: EngineHandle,
        hooks: Box<dyn InstallHooks>,
        expected_sha256: Option<String>,
    ) -> Self {
        Self {
            engine,
            fetches: HashMap::new(),
            next_pick: 1,
            pending_pick: None,
            expected_sha256,
            hooks,
            quit_requested: false,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn active_fetches(&self) -> usize {
        self.fetches.len()
    }

    pub fn run<W: WindowManager>(&mut self, effects: Vec<Effect>, windows: &mut WindowSlot<W>) {
        for effect in effects {
            match effect {
                Effect::Ui(command) => {
                    if let Err(err) = windows.apply(&command) {
                        engine_warn!("ui command {:?} failed: {}", command, err);
                    }
                }
                Effect::LoadShellMap => self.hooks.load_shell_map(),
                Effect::StartFetch {
                    fetch_id,
                    url,
                    destination,
                } => {
                    let mut request = FetchRequest::new(url, destination);
                    request.expected_sha256 = self.expected_sha256.clone();
                    let handle = self.engine.start_fetch(fetch_id, request);
                    self.fetches.insert(fetch_id, handle);
                }
                Effect::CancelFetch { fetch_id } => match self.fetches.get(&fetch_id) {
                    Some(handle) => {
                        let cancelled = handle.cancel();
                        engine_info!("cancel fetch {} (effective={})", fetch_id, cancelled);
                    }
                    None => engine_debug!("cancel for unknown fetch {}", fetch_id),
                },
                Effect::PickMedia { title, message } => {
                    let pick_id = self.next_pick;
                    self.next_pick += 1;
                    self.pending_pick = Some(pick_id);
                    engine_info!("pick {} launching directory picker", pick_id);
                    self.engine
                        .pick_directory(pick_id, PickRequest { title, message });
                }
                Effect::MediaSelected { path } => self.hooks.media_selected(&path),
                Effect::Quit => {
                    engine_info!("quit requested");
                    self.quit_requested = true;
                }
            }
        }
    }

    /// Drains everything the engine has produced so far.
    pub fn poll_engine(&mut self) -> Vec<Msg> {
        let mut msgs = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            if let Some(msg) = self.map_event(event) {
                msgs.push(msg);
            }
        }
        msgs
    }

    /// Stops the engine worker. Run the shutdown hooks before this.
    pub fn shutdown(&mut self) {
        self.fetches.clear();
        self.engine.shutdown();
    }

    fn map_event(&mut self, event: EngineEvent) -> Option<Msg> {
        match event {
            EngineEvent::Progress(progress) => Some(Msg::FetchProgress {
                fetch_id: progress.fetch_id,
                progress: FetchProgress::new(progress.bytes_received, progress.total_bytes),
            }),
            EngineEvent::FetchFinished { fetch_id, outcome } => {
                self.fetches.remove(&fetch_id);
                let outcome = match outcome {
                    TransferOutcome::Completed(file) => {
                        engine_info!(
                            "fetch {} stored {} bytes at {:?} sha256={}",
                            fetch_id,
                            file.byte_len,
                            file.path,
                            file.sha256
                        );
                        FetchOutcome::Completed {
                            bytes: file.byte_len,
                        }
                    }
                    TransferOutcome::Cancelled => FetchOutcome::Cancelled,
                    TransferOutcome::Failed(err) => {
                        engine_warn!("fetch {} failed: {}", fetch_id, err);
                        FetchOutcome::Failed(InstallError::TransferFailed(err.to_string()))
                    }
                };
                Some(Msg::FetchFinished { fetch_id, outcome })
            }
            EngineEvent::DirectoryPicked { pick_id, result } => {
                if self.pending_pick != Some(pick_id) {
                    engine_debug!("dropping stale pick {}", pick_id);
                    return None;
                }
                self.pending_pick = None;
                Some(Msg::MediaPicked(result.map_err(|err| {
                    engine_warn!("pick {} failed: {}", pick_id, err);
                    InstallError::HelperProcessFailed(err.to_string())
                })))
            }
        }
    }
}
