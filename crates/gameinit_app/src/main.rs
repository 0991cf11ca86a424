use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use gameinit_app::platform::logging;
use gameinit_app::{
    parse_command, ConnectionBus, ConsoleCommand, ConsoleWindowManager, GameInitConfig,
    InstallApp, LoggingHooks, DEFAULT_CONFIG_FILE,
};
use gameinit_core::SessionId;

const TICK_INTERVAL: Duration = Duration::from_millis(75);

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = GameInitConfig::load(&config_path)?;
    logging::initialize(config.log_destination);
    engine_info!("gameinit starting with {:?}", config_path);

    let bus = ConnectionBus::new();
    let mut app = InstallApp::new(
        &config,
        ConsoleWindowManager::new(),
        &bus,
        Box::new(LoggingHooks),
    )?;

    let (input_tx, input_rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut next_session = 1;
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_command(&line, SessionId(next_session)) {
                Ok(Some(command)) => {
                    if matches!(command, ConsoleCommand::Publish(_)) {
                        next_session += 1;
                    }
                    if input_tx.send(command).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(message) => eprintln!("{message}"),
            }
        }
        let _ = input_tx.send(ConsoleCommand::Quit);
    });

    app.start();
    loop {
        while let Ok(command) = input_rx.try_recv() {
            match command {
                ConsoleCommand::Click(control) => app.click(&control),
                ConsoleCommand::Publish(event) => {
                    if bus.publish(event) == 0 {
                        engine_warn!("connection event had no subscribers");
                    }
                }
                ConsoleCommand::Quit => app.click(gameinit_core::controls::QUIT_BUTTON),
            }
        }
        app.tick();
        if app.should_quit() {
            break;
        }
        thread::sleep(TICK_INTERVAL);
    }

    app.shutdown();
    engine_info!("gameinit stopped");
    Ok(())
}
