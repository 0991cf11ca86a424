mod common;

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use common::{RecordingHooks, RecordingWindows, WindowCall};
use gameinit_app::{ConnectionBus, GameInitConfig, InstallApp};
use gameinit_core::{
    controls, windows, ConnectionEvent, ConnectionState, FetchOutcome, Screen, Session, SessionId,
    WindowRequest, STATUS_COMPLETE,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type App = InstallApp<RecordingWindows>;

fn test_config(temp: &TempDir, package_url: String) -> GameInitConfig {
    GameInitConfig {
        marker_path: temp.path().join("packages").join("conquer.mix"),
        package_url,
        package_path: temp.path().join("packages").join("ra-packages.zip"),
        picker_program: PathBuf::from("/bin/sh"),
        picker_args: picker_script("echo /media/cdrom"),
        picker_timeout_secs: 5,
        ..GameInitConfig::default()
    }
}

fn picker_script(script: &str) -> Vec<String> {
    vec!["-c".to_string(), script.to_string(), "picker".to_string()]
}

fn start_app(config: &GameInitConfig) -> (App, RecordingHooks) {
    common::init_logging();
    let hooks = RecordingHooks::default();
    let app = InstallApp::new(
        config,
        RecordingWindows::default(),
        &ConnectionBus::new(),
        Box::new(hooks.clone()),
    )
    .expect("app starts");
    (app, hooks)
}

async fn tick_until(app: &mut App, what: &str, done: impl Fn(&App) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        app.tick();
        if done(app) {
            return;
        }
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

async fn settle(app: &mut App) {
    for _ in 0..20 {
        app.tick();
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

async fn package_server(route: &str, response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

fn label(app: &App, window: &str, control: &str) -> String {
    app.windows()
        .manager()
        .control_state(window, control)
        .map(|state| state.text.clone())
        .unwrap_or_default()
}

#[test]
fn installed_content_goes_straight_to_main_menu() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp, "http://127.0.0.1:9/unused.zip".to_string());
    fs::create_dir_all(config.marker_path.parent().unwrap()).unwrap();
    fs::write(&config.marker_path, "").unwrap();
    let (mut app, hooks) = start_app(&config);

    app.start();
    app.start();
    app.tick();

    assert_eq!(
        app.windows().manager().calls,
        vec![
            WindowCall::RemoveInit,
            WindowCall::Open(WindowRequest::new(windows::MAIN_MENU)),
        ]
    );
    assert_eq!(hooks.log.lock().unwrap().shell_map_loads, 1);
    assert_eq!(app.view().screen, Screen::MainMenu);
    app.shutdown();
}

#[test]
fn missing_content_opens_install_chooser() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp, "http://127.0.0.1:9/unused.zip".to_string());
    let (mut app, hooks) = start_app(&config);

    app.start();

    assert_eq!(app.windows().manager().opened(), vec![windows::CHOOSE_INSTALL]);
    assert_eq!(hooks.log.lock().unwrap().shell_map_loads, 0);
    app.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn download_completes_and_reports_status() {
    let server =
        package_server("/ra.zip", ResponseTemplate::new(200).set_body_string("package")).await;
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp, format!("{}/ra.zip", server.uri()));
    let (mut app, _hooks) = start_app(&config);

    app.start();
    app.click(controls::DOWNLOAD_BUTTON);
    tick_until(&mut app, "download complete", |app| {
        app.view().screen == Screen::DownloadComplete
    })
    .await;

    assert_eq!(fs::read_to_string(&config.package_path).unwrap(), "package");
    assert_eq!(label(&app, windows::DOWNLOAD, controls::STATUS_LABEL), STATUS_COMPLETE);
    assert_eq!(
        app.view().last_outcome,
        Some(FetchOutcome::Completed { bytes: 7 })
    );
    assert_eq!(app.pending_shutdown_hooks(), 0);

    // Dismissing the finished download goes back to the chooser.
    app.click(controls::CANCEL_BUTTON);
    assert_eq!(
        app.windows().manager().opened(),
        vec![windows::CHOOSE_INSTALL, windows::DOWNLOAD, windows::CHOOSE_INSTALL]
    );
    assert_eq!(app.windows().manager().max_depth, 1);
    app.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn cancel_mid_download_finishes_once() {
    let server = package_server(
        "/slow.zip",
        ResponseTemplate::new(200)
            .set_delay(Duration::from_secs(5))
            .set_body_string("too late"),
    )
    .await;
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp, format!("{}/slow.zip", server.uri()));
    let (mut app, _hooks) = start_app(&config);

    app.start();
    app.click(controls::DOWNLOAD_BUTTON);
    app.tick();
    app.click(controls::CANCEL_BUTTON);
    app.click(controls::CANCEL_BUTTON);
    assert_eq!(app.view().screen, Screen::ChoosingInstall);
    assert_eq!(app.pending_shutdown_hooks(), 0);

    tick_until(&mut app, "cancel confirmation", |app| {
        app.view().finished_fetches == 1
    })
    .await;
    settle(&mut app).await;

    let view = app.view();
    assert_eq!(view.finished_fetches, 1);
    assert_eq!(view.last_outcome, Some(FetchOutcome::Cancelled));
    assert_eq!(view.screen, Screen::ChoosingInstall);
    assert_eq!(
        app.windows().manager().opened(),
        vec![windows::CHOOSE_INSTALL, windows::DOWNLOAD, windows::CHOOSE_INSTALL]
    );
    assert!(!config.package_path.exists());
    app.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_download_opens_error_dialog_and_retry_returns() {
    let server = package_server("/gone.zip", ResponseTemplate::new(404)).await;
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp, format!("{}/gone.zip", server.uri()));
    let (mut app, _hooks) = start_app(&config);

    app.start();
    app.click(controls::DOWNLOAD_BUTTON);
    tick_until(&mut app, "error dialog", |app| {
        app.view().screen == Screen::InstallError
    })
    .await;

    assert_eq!(app.windows().active_id(), Some(windows::INSTALL_ERROR));
    let message = label(&app, windows::INSTALL_ERROR, controls::MESSAGE_LABEL);
    assert!(message.contains("404"), "unexpected message {message:?}");
    assert!(matches!(
        app.view().last_outcome,
        Some(FetchOutcome::Failed(_))
    ));

    app.click(controls::RETRY_BUTTON);
    assert_eq!(app.windows().active_id(), Some(windows::CHOOSE_INSTALL));
    assert_eq!(app.view().error, None);
    app.shutdown();
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn picked_medium_goes_to_the_continuation() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp, "http://127.0.0.1:9/unused.zip".to_string());
    let (mut app, hooks) = start_app(&config);

    app.start();
    app.click(controls::FROM_MEDIA_BUTTON);
    assert_eq!(app.view().screen, Screen::PickingMedia);
    tick_until(&mut app, "media selection", |_| {
        !hooks.log.lock().unwrap().media.is_empty()
    })
    .await;

    assert_eq!(
        hooks.log.lock().unwrap().media,
        vec![PathBuf::from("/media/cdrom")]
    );
    assert_eq!(app.view().screen, Screen::ChoosingInstall);
    assert_eq!(app.windows().manager().opened(), vec![windows::CHOOSE_INSTALL]);
    app.shutdown();
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn picker_failure_is_surfaced() {
    let temp = TempDir::new().unwrap();
    let config = GameInitConfig {
        picker_args: picker_script("exit 2"),
        ..test_config(&temp, "http://127.0.0.1:9/unused.zip".to_string())
    };
    let (mut app, hooks) = start_app(&config);

    app.start();
    app.click(controls::FROM_MEDIA_BUTTON);
    tick_until(&mut app, "picker error", |app| {
        app.view().screen == Screen::InstallError
    })
    .await;

    assert!(hooks.log.lock().unwrap().media.is_empty());
    assert_eq!(app.windows().active_id(), Some(windows::INSTALL_ERROR));
    assert!(!label(&app, windows::INSTALL_ERROR, controls::MESSAGE_LABEL).is_empty());
    app.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn quit_cancels_the_running_download() {
    let server = package_server(
        "/slow.zip",
        ResponseTemplate::new(200).set_delay(Duration::from_secs(5)),
    )
    .await;
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp, format!("{}/slow.zip", server.uri()));
    let (mut app, _hooks) = start_app(&config);

    app.start();
    app.click(controls::DOWNLOAD_BUTTON);
    assert!(!app.should_quit());
    app.click(controls::QUIT_BUTTON);

    assert!(app.should_quit());
    assert_eq!(app.pending_shutdown_hooks(), 0);
    app.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_runs_hooks_for_live_downloads() {
    let server = package_server(
        "/slow.zip",
        ResponseTemplate::new(200).set_delay(Duration::from_secs(5)),
    )
    .await;
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp, format!("{}/slow.zip", server.uri()));
    let (mut app, _hooks) = start_app(&config);

    app.start();
    app.click(controls::DOWNLOAD_BUTTON);
    assert_eq!(app.pending_shutdown_hooks(), 1);

    app.shutdown();
    assert_eq!(app.pending_shutdown_hooks(), 0);
    assert!(!config.package_path.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn lobby_opened_mid_download_is_left_alone() {
    let server = package_server(
        "/late.zip",
        ResponseTemplate::new(404).set_delay(Duration::from_millis(300)),
    )
    .await;
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp, format!("{}/late.zip", server.uri()));
    common::init_logging();
    let bus = ConnectionBus::new();
    let mut app = InstallApp::new(
        &config,
        RecordingWindows::default(),
        &bus,
        Box::new(RecordingHooks::default()),
    )
    .expect("app starts");

    app.start();
    app.click(controls::DOWNLOAD_BUTTON);
    bus.publish(ConnectionEvent::new(
        ConnectionState::Connected,
        Session::new(SessionId(1), "h", 1234),
    ));
    tick_until(&mut app, "transfer failure", |app| {
        app.view().screen == Screen::InstallError
    })
    .await;
    settle(&mut app).await;

    let manager = app.windows().manager();
    assert_eq!(app.windows().active_id(), Some(windows::SERVER_LOBBY));
    assert_eq!(
        manager.opened(),
        vec![windows::CHOOSE_INSTALL, windows::DOWNLOAD, windows::SERVER_LOBBY]
    );
    assert_eq!(manager.control_state(windows::SERVER_LOBBY, controls::STATUS_LABEL), None);
    assert_eq!(manager.control_state(windows::SERVER_LOBBY, controls::MESSAGE_LABEL), None);
    app.shutdown();
}
