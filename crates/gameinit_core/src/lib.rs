//! Game-init core: pure state machine for window routing and the first-run
//! install flow.
mod connection;
mod effect;
mod error;
mod msg;
mod progress;
mod state;
mod update;
mod view_model;
mod window;

pub use connection::{route, ConnectionEvent, ConnectionState, Session, SessionId};
pub use effect::Effect;
pub use error::InstallError;
pub use msg::{FetchOutcome, Msg};
pub use progress::{FetchId, FetchProgress};
pub use state::{
    AppState, FetchStatus, InstallSettings, Screen, TrackedFetch, STATUS_COMPLETE,
    STATUS_INITIALIZING,
};
pub use update::update;
pub use view_model::AppViewModel;
pub use window::{controls, windows, ParamValue, UiCommand, WindowRequest};
