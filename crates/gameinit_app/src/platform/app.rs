use std::path::PathBuf;
use std::sync::{mpsc, Arc};

use engine_logging::{engine_debug, engine_info};
use gameinit_core::{update, AppState, AppViewModel, Effect, Msg};
use gameinit_engine::{
    marker_present, EngineError, EngineHandle, ProcessPicker, ReqwestFetcher, ShutdownHooks,
};
use thiserror::Error;

use super::config::GameInitConfig;
use super::effects::{EffectRunner, InstallHooks};
use super::event_bus::ConnectionBus;
use super::router::ConnectionStateRouter;
use super::ui;
use super::window::{WindowManager, WindowSlot};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("engine failed to start: {0}")]
    Engine(#[from] EngineError),
}

/// UI-thread owner of the install flow and the connection router.
///
/// Everything that touches windows runs inside [`InstallApp::tick`],
/// [`InstallApp::click`] or [`InstallApp::dispatch`]; other threads talk to
/// it through the message sender and the connection bus.
pub struct InstallApp<W: WindowManager> {
    state: AppState,
    windows: WindowSlot<W>,
    runner: EffectRunner,
    router: ConnectionStateRouter,
    shutdown_hooks: Arc<ShutdownHooks>,
    msg_tx: mpsc::Sender<Msg>,
    msg_rx: mpsc::Receiver<Msg>,
    marker_path: PathBuf,
    tick: u64,
}

impl<W: WindowManager> InstallApp<W> {
    pub fn new(
        config: &GameInitConfig,
        manager: W,
        bus: &ConnectionBus,
        hooks: Box<dyn InstallHooks>,
    ) -> Result<Self, AppError> {
        let shutdown_hooks = Arc::new(ShutdownHooks::new());
        let engine = EngineHandle::new(
            Arc::new(ReqwestFetcher::new(config.fetch_settings())),
            Arc::new(ProcessPicker::new(config.picker_settings())),
            shutdown_hooks.clone(),
        )?;
        let (msg_tx, msg_rx) = mpsc::channel();
        Ok(Self {
            state: AppState::new(config.install_settings()),
            windows: WindowSlot::new(manager),
            runner: EffectRunner::new(engine, hooks, config.package_sha256.clone()),
            router: ConnectionStateRouter::new(bus),
            shutdown_hooks,
            msg_tx,
            msg_rx,
            marker_path: config.marker_path.clone(),
            tick: 0,
        })
    }

    /// Checks for installed content and opens the first window.
    pub fn start(&mut self) {
        let marker_present = marker_present(&self.marker_path);
        engine_info!(
            "startup: marker {:?} present={}",
            self.marker_path,
            marker_present
        );
        self.dispatch(Msg::Startup { marker_present });
    }

    /// One UI-thread turn: connection events, engine events, queued messages.
    pub fn tick(&mut self) {
        self.tick += 1;
        engine_logging::set_ui_tick(self.tick);

        let routed = self.router.pump(&mut self.windows);
        if routed.handled > 0 {
            engine_debug!(
                "routed {} connection events, {} ui errors",
                routed.handled,
                routed.errors.len()
            );
        }
        for msg in self.runner.poll_engine() {
            self.dispatch(msg);
        }
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.dispatch(msg);
        }
        self.dispatch(Msg::Tick);
    }

    pub fn click(&mut self, control_id: &str) {
        engine_debug!("click {}", control_id);
        self.dispatch(ui::render::msg_for_button(control_id));
    }

    /// For threads that need to feed the update loop.
    pub fn sender(&self) -> mpsc::Sender<Msg> {
        self.msg_tx.clone()
    }

    /// Window effects of the install flow only apply while its own window
    /// is on top; once the router has replaced it they are dropped.
    pub fn dispatch(&mut self, msg: Msg) {
        let owns_window = ui::render::owns_window(self.state.screen(), self.windows.active_id());
        let state = std::mem::take(&mut self.state);
        let (state, mut effects) = update(state, msg);
        self.state = state;
        if !owns_window {
            let before = effects.len();
            effects.retain(|effect| !matches!(effect, Effect::Ui(_)));
            if effects.len() < before {
                engine_debug!(
                    "dropped {} install window effects; {:?} is on top",
                    before - effects.len(),
                    self.windows.active_id()
                );
            }
        }
        self.runner.run(effects, &mut self.windows);
        if self.state.consume_dirty()
            && ui::render::owns_window(self.state.screen(), self.windows.active_id())
        {
            let view = self.state.view();
            self.windows.apply_all(&ui::render::render(&view));
        }
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn windows(&self) -> &WindowSlot<W> {
        &self.windows
    }

    pub fn should_quit(&self) -> bool {
        self.runner.quit_requested()
    }

    pub fn pending_shutdown_hooks(&self) -> usize {
        self.shutdown_hooks.len()
    }

    /// Runs the shutdown hooks, which cancel live transfers, then stops the
    /// engine.
    pub fn shutdown(&mut self) {
        let ran = self.shutdown_hooks.run_all();
        engine_info!("shutdown: ran {} hooks", ran);
        self.runner.shutdown();
    }
}
