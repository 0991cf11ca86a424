use engine_logging::{engine_debug, engine_info};
use gameinit_core::{route, ConnectionEvent, ConnectionState};

use super::event_bus::{ConnectionBus, Subscription};
use super::window::{UiError, WindowManager, WindowSlot};

/// Outcome of one [`ConnectionStateRouter::pump`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PumpReport {
    pub handled: usize,
    pub errors: Vec<UiError>,
}

/// Keeps the top-level window in step with the connection state.
///
/// Subscribes on construction and unsubscribes when dropped. Events queue up
/// until [`ConnectionStateRouter::pump`] runs on the UI thread.
pub struct ConnectionStateRouter {
    subscription: Subscription<ConnectionEvent>,
    last_state: Option<ConnectionState>,
}

impl ConnectionStateRouter {
    pub fn new(bus: &ConnectionBus) -> Self {
        Self {
            subscription: bus.subscribe(),
            last_state: None,
        }
    }

    pub fn last_state(&self) -> Option<ConnectionState> {
        self.last_state
    }

    /// Applies every queued event in publish order.
    pub fn pump<W: WindowManager>(&mut self, windows: &mut WindowSlot<W>) -> PumpReport {
        let mut report = PumpReport::default();
        while let Some(event) = self.subscription.try_recv() {
            report.errors.extend(self.handle(&event, windows));
            report.handled += 1;
        }
        report
    }

    pub fn handle<W: WindowManager>(
        &mut self,
        event: &ConnectionEvent,
        windows: &mut WindowSlot<W>,
    ) -> Vec<UiError> {
        let session = &event.session;
        engine_info!(
            "connection {} session={} {}:{}",
            event.state,
            session.id.0,
            session.host,
            session.port
        );
        self.last_state = Some(event.state);
        let commands = route(event.state, session);
        engine_debug!("router emits {} ui commands", commands.len());
        windows.apply_all(&commands)
    }
}
