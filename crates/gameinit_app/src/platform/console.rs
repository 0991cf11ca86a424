//! Text-mode window manager and input parsing for the headless driver.
use std::collections::BTreeMap;

use gameinit_core::{ConnectionEvent, ConnectionState, ParamValue, Session, SessionId, WindowRequest};

use super::window::{Control, WindowHandle, WindowManager};

#[derive(Debug, Default)]
struct ConsoleControl {
    name: String,
    visible: bool,
    text: String,
}

impl Control for ConsoleControl {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        println!("  [{}] visible={}", self.name, visible);
    }

    fn set_text(&mut self, text: &str) {
        if self.text != text {
            self.text = text.to_string();
            println!("  [{}] {}", self.name, text);
        }
    }

    fn clear(&mut self) {
        self.text.clear();
        println!("  [{}] cleared", self.name);
    }
}

/// Prints window transitions to stdout.
#[derive(Debug, Default)]
pub struct ConsoleWindowManager {
    stack: Vec<(WindowHandle, String)>,
    controls: BTreeMap<(WindowHandle, String), ConsoleControl>,
    next_handle: u64,
}

impl ConsoleWindowManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WindowManager for ConsoleWindowManager {
    fn open_window(&mut self, request: &WindowRequest) -> WindowHandle {
        self.next_handle += 1;
        let handle = WindowHandle(self.next_handle);
        let params: Vec<String> = request
            .params
            .iter()
            .map(|(key, value)| match value {
                ParamValue::Text(text) => format!("{key}={text}"),
                ParamValue::Integer(n) => format!("{key}={n}"),
                ParamValue::Session(id) => format!("{key}=session#{}", id.0),
            })
            .collect();
        println!("[open] {} {}", request.id, params.join(" "));
        self.stack.push((handle, request.id.clone()));
        handle
    }

    fn close_top_window(&mut self) {
        if let Some((handle, id)) = self.stack.pop() {
            self.controls.retain(|(owner, _), _| *owner != handle);
            println!("[close] {}", id);
        }
    }

    fn control(&mut self, window: WindowHandle, control_id: &str) -> Option<&mut dyn Control> {
        let name = self
            .stack
            .iter()
            .find(|(handle, _)| *handle == window)
            .map(|(_, id)| format!("{id}/{control_id}"))?;
        let control = self
            .controls
            .entry((window, control_id.to_string()))
            .or_insert_with(|| ConsoleControl {
                name,
                ..ConsoleControl::default()
            });
        Some(control as &mut dyn Control)
    }

    fn remove_init_widget(&mut self) {
        println!("[init] removed");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Click(String),
    Publish(ConnectionEvent),
    Quit,
}

/// Parses one input line.
///
/// `state <name> [host port]` publishes a connection event; `quit` stops;
/// any other single word is taken as a button id.
pub fn parse_command(line: &str, session: SessionId) -> Result<Option<ConsoleCommand>, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] => Ok(None),
        ["quit"] | ["exit"] => Ok(Some(ConsoleCommand::Quit)),
        ["state", name, rest @ ..] => {
            let state = parse_state(name)?;
            let (host, port) = match rest {
                [] => ("localhost".to_string(), 1234),
                [host, port] => (
                    host.to_string(),
                    port.parse::<u16>()
                        .map_err(|err| format!("bad port {port:?}: {err}"))?,
                ),
                _ => return Err("usage: state <name> [host port]".to_string()),
            };
            Ok(Some(ConsoleCommand::Publish(ConnectionEvent::new(
                state,
                Session::new(session, host, port),
            ))))
        }
        [control] => Ok(Some(ConsoleCommand::Click(control.to_string()))),
        _ => Err(format!("unrecognised input: {line}")),
    }
}

fn parse_state(name: &str) -> Result<ConnectionState, String> {
    let wanted = squash(name);
    ConnectionState::ALL
        .into_iter()
        .find(|state| squash(&state.to_string()) == wanted)
        .ok_or_else(|| format!("unknown connection state {name:?}"))
}

/// "not connected", "NotConnected" and "not-connected" all compare equal.
fn squash(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
