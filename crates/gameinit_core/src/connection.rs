//! Connection-state routing: every state maps to exactly one top-level window.
use std::fmt;

use crate::window::{controls, windows, ParamValue, UiCommand, WindowRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    PreConnecting,
    Connecting,
    NotConnected,
    Connected,
}

impl ConnectionState {
    pub const ALL: [ConnectionState; 4] = [
        ConnectionState::PreConnecting,
        ConnectionState::Connecting,
        ConnectionState::NotConnected,
        ConnectionState::Connected,
    ];
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::PreConnecting => write!(f, "pre-connecting"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::NotConnected => write!(f, "not connected"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}

/// Identifies the network connection a session wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

/// The session/context passed through UI transitions. Only `host`, `port` and
/// the id are read here; the rest belongs to the network layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub host: String,
    pub port: u16,
}

impl Session {
    pub fn new(id: SessionId, host: impl Into<String>, port: u16) -> Self {
        Self {
            id,
            host: host.into(),
            port,
        }
    }
}

/// A single connection-state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEvent {
    pub state: ConnectionState,
    pub session: Session,
}

impl ConnectionEvent {
    pub fn new(state: ConnectionState, session: Session) -> Self {
        Self { state, session }
    }
}

/// Resolves a state to the window commands that show it.
///
/// The first command always closes the current top-level window, so applying
/// the result never leaves two windows open. Adding a state to
/// [`ConnectionState`] forces a new arm here.
pub fn route(state: ConnectionState, session: &Session) -> Vec<UiCommand> {
    let mut commands = vec![UiCommand::CloseTopWindow];
    match state {
        ConnectionState::PreConnecting => {
            commands.push(UiCommand::open(windows::MAIN_MENU));
        }
        ConnectionState::Connecting => {
            let request = WindowRequest::new(windows::CONNECTING)
                .with_param("host", ParamValue::Text(session.host.clone()))
                .with_param("port", ParamValue::Integer(i64::from(session.port)));
            commands.push(UiCommand::OpenWindow(request));
        }
        ConnectionState::NotConnected => {
            let request = WindowRequest::new(windows::CONNECTION_FAILED)
                .with_param("session", ParamValue::Session(session.id));
            commands.push(UiCommand::OpenWindow(request));
        }
        ConnectionState::Connected => {
            commands.push(UiCommand::open(windows::SERVER_LOBBY));
            commands.push(UiCommand::ClearChat {
                control: controls::CHAT_DISPLAY,
            });
            for control in [
                controls::CHANGEMAP_BUTTON,
                controls::LOCKTEAMS_CHECKBOX,
                controls::DISCONNECT_BUTTON,
            ] {
                commands.push(UiCommand::SetVisible {
                    control,
                    visible: true,
                });
            }
        }
    }
    commands
}
