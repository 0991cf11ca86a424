use std::path::PathBuf;

use crate::{FetchId, FetchProgress, InstallError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Result of the marker check done once at start-up.
    Startup { marker_present: bool },
    /// User clicked Download on the install chooser.
    DownloadClicked,
    /// User clicked the install-from-media button.
    FromMediaClicked,
    /// User clicked Quit.
    QuitClicked,
    /// User clicked Cancel on the download window.
    CancelClicked,
    /// User dismissed the error dialog.
    RetryClicked,
    /// Engine progress for a fetch.
    FetchProgress {
        fetch_id: FetchId,
        progress: FetchProgress,
    },
    /// Engine completion for a fetch. Sent exactly once per fetch.
    FetchFinished {
        fetch_id: FetchId,
        outcome: FetchOutcome,
    },
    /// The directory picker returned.
    MediaPicked(Result<PathBuf, InstallError>),
    /// UI tick.
    Tick,
    /// Fallback for unmapped input.
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Completed { bytes: u64 },
    Cancelled,
    Failed(InstallError),
}
