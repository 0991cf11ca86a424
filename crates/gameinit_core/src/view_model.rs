use crate::{FetchOutcome, FetchProgress, FetchStatus, Screen};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub screen: Screen,
    pub status_text: String,
    pub progress: Option<FetchProgress>,
    pub fetch_status: Option<FetchStatus>,
    pub error: Option<String>,
    pub last_outcome: Option<FetchOutcome>,
    /// How many completion events have been accepted so far.
    pub finished_fetches: usize,
    pub dirty: bool,
}
