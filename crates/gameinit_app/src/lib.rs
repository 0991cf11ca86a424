//! Game-init app: UI-thread glue between the window manager, connection
//! events and the engine.
pub mod platform;

pub use platform::app::{AppError, InstallApp};
pub use platform::config::{ConfigError, GameInitConfig, DEFAULT_CONFIG_FILE};
pub use platform::console::{parse_command, ConsoleCommand, ConsoleWindowManager};
pub use platform::effects::{EffectRunner, InstallHooks, LoggingHooks};
pub use platform::event_bus::{ConnectionBus, EventBus, Subscription};
pub use platform::logging::LogDestination;
pub use platform::router::{ConnectionStateRouter, PumpReport};
pub use platform::window::{Control, UiError, WindowHandle, WindowManager, WindowSlot};
