pub mod app;
pub mod config;
pub mod console;
pub mod effects;
pub mod event_bus;
pub mod logging;
pub mod router;
pub mod ui;
pub mod window;
