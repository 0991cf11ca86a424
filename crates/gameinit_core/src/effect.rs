use std::path::PathBuf;

use crate::{FetchId, UiCommand};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Ui(UiCommand),
    /// Hand over to the game's shell-map loader.
    LoadShellMap,
    StartFetch {
        fetch_id: FetchId,
        url: String,
        destination: PathBuf,
    },
    CancelFetch { fetch_id: FetchId },
    PickMedia { title: String, message: String },
    /// Forward the chosen install medium to the caller's continuation.
    MediaSelected { path: PathBuf },
    Quit,
}
