use std::path::PathBuf;

use crate::view_model::AppViewModel;
use crate::{FetchId, FetchOutcome, FetchProgress, InstallError};

pub const STATUS_INITIALIZING: &str = "Initializing...";
pub const STATUS_COMPLETE: &str = "Download Complete";

/// What the install package is and where it goes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstallSettings {
    pub package_url: String,
    pub package_path: PathBuf,
    pub game_title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Initializing,
    ChoosingInstall,
    PickingMedia,
    Downloading,
    DownloadComplete,
    InstallError,
    MainMenu,
    Quitting,
}

/// Core-side view of a fetch. Mirrors the engine's phase, plus `Cancelling`
/// for the gap between the user's cancel and the engine's final event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Active,
    Cancelling,
    Completed,
    Failed,
    Cancelled,
}

impl FetchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            FetchStatus::Completed | FetchStatus::Failed | FetchStatus::Cancelled
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedFetch {
    pub fetch_id: FetchId,
    pub status: FetchStatus,
    pub last_progress: Option<FetchProgress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    settings: InstallSettings,
    screen: Screen,
    fetch: Option<TrackedFetch>,
    next_fetch_id: FetchId,
    status_text: String,
    error: Option<InstallError>,
    last_outcome: Option<FetchOutcome>,
    finished_fetches: usize,
    dirty: bool,
}

impl AppState {
    pub fn new(settings: InstallSettings) -> Self {
        Self {
            settings,
            next_fetch_id: 1,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            screen: self.screen,
            status_text: self.status_text.clone(),
            progress: self.fetch.and_then(|fetch| fetch.last_progress),
            fetch_status: self.fetch.map(|fetch| fetch.status),
            error: self.error.as_ref().map(ToString::to_string),
            last_outcome: self.last_outcome.clone(),
            finished_fetches: self.finished_fetches,
            dirty: self.dirty,
        }
    }

    pub fn settings(&self) -> &InstallSettings {
        &self.settings
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn fetch(&self) -> Option<&TrackedFetch> {
        self.fetch.as_ref()
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_screen(&mut self, screen: Screen) {
        if self.screen != screen {
            self.screen = screen;
            self.dirty = true;
        }
    }

    pub(crate) fn set_status(&mut self, text: impl Into<String>) {
        self.status_text = text.into();
        self.dirty = true;
    }

    pub(crate) fn set_error(&mut self, error: Option<InstallError>) {
        self.error = error;
        self.dirty = true;
    }

    pub(crate) fn begin_fetch(&mut self) -> FetchId {
        let fetch_id = self.next_fetch_id.max(1);
        self.next_fetch_id = fetch_id + 1;
        self.fetch = Some(TrackedFetch {
            fetch_id,
            status: FetchStatus::Active,
            last_progress: None,
        });
        self.set_status(STATUS_INITIALIZING);
        fetch_id
    }

    /// Moves an active fetch to `Cancelling` and returns its id, or `None`
    /// when there is nothing left to cancel.
    pub(crate) fn request_cancel(&mut self) -> Option<FetchId> {
        let fetch = self.fetch.as_mut()?;
        if fetch.status != FetchStatus::Active {
            return None;
        }
        fetch.status = FetchStatus::Cancelling;
        Some(fetch.fetch_id)
    }

    /// Records a snapshot. Stale ids, non-active fetches and snapshots that
    /// would move `bytes_received` backwards are dropped.
    pub(crate) fn apply_progress(&mut self, fetch_id: FetchId, progress: FetchProgress) -> bool {
        let Some(fetch) = self.fetch.as_mut() else {
            return false;
        };
        if fetch.fetch_id != fetch_id || fetch.status != FetchStatus::Active {
            return false;
        }
        if let Some(previous) = fetch.last_progress {
            if progress.bytes_received < previous.bytes_received {
                return false;
            }
        }
        fetch.last_progress = Some(progress);
        self.set_status(progress.status_text());
        true
    }

    /// Applies the single completion for a fetch and returns the status it had
    /// before, or `None` if the event is stale or a repeat.
    pub(crate) fn apply_finished(
        &mut self,
        fetch_id: FetchId,
        outcome: &FetchOutcome,
    ) -> Option<FetchStatus> {
        let fetch = self.fetch.as_mut()?;
        if fetch.fetch_id != fetch_id || fetch.status.is_terminal() {
            return None;
        }
        let previous = fetch.status;
        fetch.status = match outcome {
            FetchOutcome::Completed { .. } => FetchStatus::Completed,
            FetchOutcome::Failed(_) => FetchStatus::Failed,
            FetchOutcome::Cancelled => FetchStatus::Cancelled,
        };
        self.last_outcome = Some(outcome.clone());
        self.finished_fetches += 1;
        self.dirty = true;
        Some(previous)
    }
}
