use gameinit_core::{controls, windows, AppViewModel, Msg, Screen, UiCommand};

/// Label updates for whichever window the current screen shows.
pub fn render(view: &AppViewModel) -> Vec<UiCommand> {
    match view.screen {
        Screen::Downloading | Screen::DownloadComplete => vec![UiCommand::SetLabelText {
            control: controls::STATUS_LABEL,
            text: view.status_text.clone(),
        }],
        Screen::InstallError => view
            .error
            .iter()
            .map(|message| UiCommand::SetLabelText {
                control: controls::MESSAGE_LABEL,
                text: message.clone(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// The window a screen is shown in, if it has one of its own.
pub fn expected_window(screen: Screen) -> Option<&'static str> {
    match screen {
        Screen::ChoosingInstall | Screen::PickingMedia => Some(windows::CHOOSE_INSTALL),
        Screen::Downloading | Screen::DownloadComplete => Some(windows::DOWNLOAD),
        Screen::InstallError => Some(windows::INSTALL_ERROR),
        Screen::MainMenu => Some(windows::MAIN_MENU),
        Screen::Initializing | Screen::Quitting => None,
    }
}

/// False when something else, e.g. a connection change, replaced the
/// screen's window.
pub fn owns_window(screen: Screen, active: Option<&str>) -> bool {
    expected_window(screen).map_or(true, |expected| active == Some(expected))
}

/// Maps a clicked control to its message.
pub fn msg_for_button(control_id: &str) -> Msg {
    match control_id {
        controls::DOWNLOAD_BUTTON => Msg::DownloadClicked,
        controls::FROM_MEDIA_BUTTON => Msg::FromMediaClicked,
        controls::QUIT_BUTTON => Msg::QuitClicked,
        controls::CANCEL_BUTTON => Msg::CancelClicked,
        controls::RETRY_BUTTON => Msg::RetryClicked,
        _ => Msg::NoOp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gameinit_core::FetchProgress;
    use pretty_assertions::assert_eq;

    #[test]
    fn download_screen_shows_status_text() {
        let view = AppViewModel {
            screen: Screen::Downloading,
            status_text: "50% 5/10 bytes".to_string(),
            progress: Some(FetchProgress::new(5, Some(10))),
            ..AppViewModel::default()
        };
        assert_eq!(
            render(&view),
            vec![UiCommand::SetLabelText {
                control: controls::STATUS_LABEL,
                text: "50% 5/10 bytes".to_string(),
            }]
        );
    }

    #[test]
    fn error_screen_shows_message() {
        let view = AppViewModel {
            screen: Screen::InstallError,
            error: Some("download failed: 404".to_string()),
            ..AppViewModel::default()
        };
        assert_eq!(
            render(&view),
            vec![UiCommand::SetLabelText {
                control: controls::MESSAGE_LABEL,
                text: "download failed: 404".to_string(),
            }]
        );
    }

    #[test]
    fn other_screens_render_nothing() {
        let view = AppViewModel {
            screen: Screen::ChoosingInstall,
            ..AppViewModel::default()
        };
        assert!(render(&view).is_empty());
    }

    #[test]
    fn screen_loses_its_window_to_the_lobby() {
        assert!(owns_window(Screen::Downloading, Some(windows::DOWNLOAD)));
        assert!(!owns_window(Screen::Downloading, Some(windows::SERVER_LOBBY)));
        assert!(owns_window(Screen::Initializing, None));
    }

    #[test]
    fn unknown_buttons_are_ignored() {
        assert_eq!(msg_for_button(controls::CANCEL_BUTTON), Msg::CancelClicked);
        assert_eq!(msg_for_button("NOPE"), Msg::NoOp);
    }
}
