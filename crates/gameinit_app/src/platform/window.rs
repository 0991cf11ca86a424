//! The window manager seam and the single active-window slot in front of it.
use engine_logging::{engine_debug, engine_info, engine_warn};
use gameinit_core::{UiCommand, WindowRequest};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(pub u64);

/// A widget inside an open window.
pub trait Control {
    fn set_visible(&mut self, visible: bool);
    fn set_text(&mut self, text: &str);
    /// Drops accumulated content, e.g. chat history.
    fn clear(&mut self);
}

/// Provided by the UI toolkit.
pub trait WindowManager {
    fn open_window(&mut self, request: &WindowRequest) -> WindowHandle;
    fn close_top_window(&mut self);
    fn control(&mut self, window: WindowHandle, control_id: &str) -> Option<&mut dyn Control>;
    /// Removes the bootstrap widget from the root once the shell is loaded.
    fn remove_init_widget(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UiError {
    #[error("no window is open to receive control {control}")]
    NoActiveWindow { control: String },
    #[error("window {window} has no control {control}")]
    MissingControl { window: String, control: String },
}

struct ActiveWindow {
    handle: WindowHandle,
    id: String,
}

/// Owns the window manager and tracks the one top-level window that is open.
///
/// All window traffic goes through [`WindowSlot::apply`], which makes this
/// the single writer of the active slot.
pub struct WindowSlot<W: WindowManager> {
    manager: W,
    active: Option<ActiveWindow>,
}

impl<W: WindowManager> WindowSlot<W> {
    pub fn new(manager: W) -> Self {
        Self {
            manager,
            active: None,
        }
    }

    pub fn manager(&self) -> &W {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut W {
        &mut self.manager
    }

    pub fn active(&self) -> Option<WindowHandle> {
        self.active.as_ref().map(|window| window.handle)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_ref().map(|window| window.id.as_str())
    }

    pub fn apply(&mut self, command: &UiCommand) -> Result<(), UiError> {
        match command {
            UiCommand::CloseTopWindow => {
                if let Some(window) = self.active.take() {
                    engine_debug!("close window {}", window.id);
                    self.manager.close_top_window();
                }
                Ok(())
            }
            UiCommand::OpenWindow(request) => {
                if let Some(window) = self.active.take() {
                    engine_warn!("opening {} over {}; closing it first", request.id, window.id);
                    self.manager.close_top_window();
                }
                let handle = self.manager.open_window(request);
                engine_info!("open window {} ({} params)", request.id, request.params.len());
                self.active = Some(ActiveWindow {
                    handle,
                    id: request.id.clone(),
                });
                Ok(())
            }
            UiCommand::RemoveInitWidget => {
                self.manager.remove_init_widget();
                Ok(())
            }
            UiCommand::ClearChat { control } => self.with_control(control, |c| c.clear()),
            UiCommand::SetVisible { control, visible } => {
                self.with_control(control, |c| c.set_visible(*visible))
            }
            UiCommand::SetLabelText { control, text } => {
                self.with_control(control, |c| c.set_text(text))
            }
        }
    }

    /// Applies every command, logging and collecting failures instead of
    /// stopping at the first one.
    pub fn apply_all<'a>(&mut self, commands: impl IntoIterator<Item = &'a UiCommand>) -> Vec<UiError> {
        let mut errors = Vec::new();
        for command in commands {
            if let Err(err) = self.apply(command) {
                engine_warn!("ui command failed: {}", err);
                errors.push(err);
            }
        }
        errors
    }

    fn with_control(
        &mut self,
        control: &str,
        op: impl FnOnce(&mut dyn Control),
    ) -> Result<(), UiError> {
        let window = self.active.as_ref().ok_or_else(|| UiError::NoActiveWindow {
            control: control.to_string(),
        })?;
        match self.manager.control(window.handle, control) {
            Some(target) => {
                op(target);
                Ok(())
            }
            None => Err(UiError::MissingControl {
                window: window.id.clone(),
                control: control.to_string(),
            }),
        }
    }
}
