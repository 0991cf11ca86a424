#![cfg(unix)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gameinit_engine::{
    DirectoryPicker, EngineEvent, EngineHandle, FetchSettings, PickRequest, PickerError,
    PickerSettings, ProcessPicker, ReqwestFetcher, ShutdownHooks,
};
use pretty_assertions::assert_eq;

fn request() -> PickRequest {
    PickRequest {
        title: "Select CD".to_string(),
        message: "Select the Red Alert CD".to_string(),
    }
}

/// Runs `script` through `sh -c`; the picker flags land in `$1..`.
fn shell_picker(script: &str) -> ProcessPicker {
    ProcessPicker::new(shell_picker_settings(script))
}

fn shell_picker_settings(script: &str) -> PickerSettings {
    PickerSettings {
        program: PathBuf::from("/bin/sh"),
        leading_args: vec!["-c".to_string(), script.to_string(), "picker".to_string()],
        timeout: Duration::from_secs(5),
        max_output_bytes: 4096,
    }
}

#[test]
fn picker_arguments_are_fixed() {
    let picker = ProcessPicker::new(PickerSettings::default());
    assert_eq!(
        picker.args(&request()),
        vec![
            "--filepicker",
            "--title",
            "Select CD",
            "--message",
            "Select the Red Alert CD",
            "--require-directory",
            "--button-text",
            "Select",
        ]
    );
}

#[tokio::test]
async fn picker_returns_trimmed_stdout() {
    let picker = shell_picker("echo /media/cdrom");
    assert_eq!(picker.pick(&request()).await, Ok(PathBuf::from("/media/cdrom")));
}

#[tokio::test]
async fn picker_receives_title_and_message() {
    let picker = shell_picker(r#"printf '%s|%s' "$3" "$5""#);
    assert_eq!(
        picker.pick(&request()).await,
        Ok(PathBuf::from("Select CD|Select the Red Alert CD"))
    );
}

#[tokio::test]
async fn non_utf8_path_bytes_are_kept() {
    use std::os::unix::ffi::OsStrExt;

    let picker = shell_picker(r"printf '/media/cd\377rom\n'");
    let path = picker.pick(&request()).await.expect("picked");
    assert_eq!(path.as_os_str().as_bytes(), b"/media/cd\xffrom");
}

#[tokio::test]
async fn empty_output_means_no_selection() {
    let picker = shell_picker("true");
    assert_eq!(picker.pick(&request()).await, Err(PickerError::NoSelection));
}

#[tokio::test]
async fn non_zero_exit_is_an_error() {
    let picker = shell_picker("echo /media/cdrom; exit 3");
    assert_eq!(picker.pick(&request()).await, Err(PickerError::Exit(Some(3))));
}

#[tokio::test]
async fn missing_program_fails_to_launch() {
    let picker = ProcessPicker::new(PickerSettings {
        program: PathBuf::from("/nonexistent/gameinit-picker"),
        ..PickerSettings::default()
    });
    assert!(matches!(
        picker.pick(&request()).await,
        Err(PickerError::Launch(_))
    ));
}

#[tokio::test]
async fn hung_picker_times_out() {
    let picker = ProcessPicker::new(PickerSettings {
        timeout: Duration::from_millis(100),
        ..shell_picker_settings("sleep 5")
    });
    let started = Instant::now();
    assert_eq!(
        picker.pick(&request()).await,
        Err(PickerError::Timeout(Duration::from_millis(100)))
    );
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn oversized_output_is_rejected() {
    let picker = ProcessPicker::new(PickerSettings {
        max_output_bytes: 16,
        ..shell_picker_settings("head -c 100 /dev/zero | tr '\\0' a")
    });
    assert_eq!(
        picker.pick(&request()).await,
        Err(PickerError::OutputTooLarge { limit: 16 })
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn engine_delivers_pick_result_as_event() {
    let engine = EngineHandle::new(
        Arc::new(ReqwestFetcher::new(FetchSettings::default())),
        Arc::new(shell_picker("echo /mnt/cd")),
        Arc::new(ShutdownHooks::new()),
    )
    .expect("engine starts");

    engine.pick_directory(11, request());
    let deadline = Instant::now() + Duration::from_secs(5);
    let event = loop {
        if let Some(event) = engine.try_recv() {
            break event;
        }
        assert!(Instant::now() < deadline, "no picker event");
        tokio::time::sleep(Duration::from_millis(10)).await;
    };
    assert_eq!(
        event,
        EngineEvent::DirectoryPicked {
            pick_id: 11,
            result: Ok(PathBuf::from("/mnt/cd")),
        }
    );
}
