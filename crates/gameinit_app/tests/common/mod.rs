#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Once};

use gameinit_app::{Control, InstallHooks, WindowHandle, WindowManager};
use gameinit_core::WindowRequest;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowCall {
    Open(WindowRequest),
    Close,
    RemoveInit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedControl {
    pub visible: bool,
    pub text: String,
    pub clears: usize,
}

impl Default for RecordedControl {
    fn default() -> Self {
        Self {
            visible: true,
            text: String::new(),
            clears: 0,
        }
    }
}

impl Control for RecordedControl {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    fn clear(&mut self) {
        self.text.clear();
        self.clears += 1;
    }
}

/// Records window traffic. Controls are keyed by window id and keep their
/// state across openings, like widget templates do.
#[derive(Debug, Default)]
pub struct RecordingWindows {
    pub calls: Vec<WindowCall>,
    pub controls: BTreeMap<(String, String), RecordedControl>,
    stack: Vec<(WindowHandle, String)>,
    next_handle: u64,
    pub max_depth: usize,
    /// Only pre-seeded controls exist.
    strict: bool,
}

impl RecordingWindows {
    pub fn with_control(mut self, window: &str, control: &str, state: RecordedControl) -> Self {
        self.controls
            .insert((window.to_string(), control.to_string()), state);
        self
    }

    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn control_state(&self, window: &str, control: &str) -> Option<&RecordedControl> {
        self.controls.get(&(window.to_string(), control.to_string()))
    }

    pub fn opened(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                WindowCall::Open(request) => Some(request.id.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl WindowManager for RecordingWindows {
    fn open_window(&mut self, request: &WindowRequest) -> WindowHandle {
        self.next_handle += 1;
        let handle = WindowHandle(self.next_handle);
        self.stack.push((handle, request.id.clone()));
        self.max_depth = self.max_depth.max(self.stack.len());
        self.calls.push(WindowCall::Open(request.clone()));
        handle
    }

    fn close_top_window(&mut self) {
        self.stack.pop();
        self.calls.push(WindowCall::Close);
    }

    fn control(&mut self, window: WindowHandle, control_id: &str) -> Option<&mut dyn Control> {
        let (_, id) = self.stack.iter().find(|(handle, _)| *handle == window)?;
        let key = (id.clone(), control_id.to_string());
        if self.strict && !self.controls.contains_key(&key) {
            return None;
        }
        let control = self.controls.entry(key).or_default();
        Some(control as &mut dyn Control)
    }

    fn remove_init_widget(&mut self) {
        self.calls.push(WindowCall::RemoveInit);
    }
}

#[derive(Debug, Default)]
pub struct HookLog {
    pub shell_map_loads: usize,
    pub media: Vec<PathBuf>,
}

/// Hooks whose calls can be inspected after the app took ownership.
#[derive(Debug, Clone, Default)]
pub struct RecordingHooks {
    pub log: Arc<Mutex<HookLog>>,
}

impl InstallHooks for RecordingHooks {
    fn load_shell_map(&mut self) {
        self.log.lock().unwrap().shell_map_loads += 1;
    }

    fn media_selected(&mut self, path: &Path) {
        self.log.lock().unwrap().media.push(path.to_path_buf());
    }
}
