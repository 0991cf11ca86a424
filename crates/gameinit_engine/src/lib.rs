//! Game-init engine: cancellable package download, media picker process and
//! shutdown hooks, run on a background runtime.
mod engine;
mod fetch;
mod handle;
mod persist;
mod picker;
mod shutdown;
mod types;

pub use engine::EngineHandle;
pub use fetch::{
    ChannelProgressSink, FetchSettings, Fetcher, ProgressCounter, ProgressSink, ReqwestFetcher,
    StagedDownload,
};
pub use handle::{FetchHandle, FetchPhase};
pub use persist::{ensure_parent_dir, marker_present, CommittedFile, PartialDownload, PersistError};
pub use picker::{DirectoryPicker, PickRequest, PickerError, PickerSettings, ProcessPicker};
pub use shutdown::{HookToken, ShutdownHook, ShutdownHooks, ShutdownRegistry};
pub use types::{
    EngineError, EngineEvent, FailureKind, FetchError, FetchId, FetchRequest, FetchedFile,
    PickId, TransferOutcome, TransferProgress,
};
