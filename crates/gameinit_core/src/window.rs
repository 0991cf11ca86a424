use std::collections::BTreeMap;

use crate::SessionId;

/// Window keys known to the start-up shell.
pub mod windows {
    pub const MAIN_MENU: &str = "MAINMENU_BG";
    pub const CONNECTING: &str = "CONNECTING_BG";
    pub const CONNECTION_FAILED: &str = "CONNECTION_FAILED_BG";
    pub const SERVER_LOBBY: &str = "SERVER_LOBBY";
    pub const CHOOSE_INSTALL: &str = "INIT_CHOOSEINSTALL";
    pub const DOWNLOAD: &str = "INIT_DOWNLOAD";
    pub const INSTALL_ERROR: &str = "INIT_ERROR";
}

/// Control keys, looked up on the currently open window.
pub mod controls {
    pub const CHAT_DISPLAY: &str = "CHAT_DISPLAY";
    pub const CHANGEMAP_BUTTON: &str = "CHANGEMAP_BUTTON";
    pub const LOCKTEAMS_CHECKBOX: &str = "LOCKTEAMS_CHECKBOX";
    pub const DISCONNECT_BUTTON: &str = "DISCONNECT_BUTTON";

    pub const DOWNLOAD_BUTTON: &str = "DOWNLOAD";
    pub const FROM_MEDIA_BUTTON: &str = "FROMCD";
    pub const QUIT_BUTTON: &str = "QUIT";

    pub const STATUS_LABEL: &str = "STATUS";
    pub const CANCEL_BUTTON: &str = "CANCEL";

    pub const MESSAGE_LABEL: &str = "MESSAGE";
    pub const RETRY_BUTTON: &str = "RETRY";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    /// Reference back to the session, e.g. so a failure window can retry.
    Session(SessionId),
}

/// A window key plus the parameters it is opened with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRequest {
    pub id: String,
    pub params: BTreeMap<String, ParamValue>,
}

impl WindowRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }
}

/// Instructions for the window manager. Control commands target the window
/// opened most recently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    CloseTopWindow,
    OpenWindow(WindowRequest),
    /// Drop the bootstrap widget shown while the shell starts.
    RemoveInitWidget,
    ClearChat { control: &'static str },
    SetVisible { control: &'static str, visible: bool },
    SetLabelText { control: &'static str, text: String },
}

impl UiCommand {
    pub fn open(id: &str) -> Self {
        UiCommand::OpenWindow(WindowRequest::new(id))
    }
}
