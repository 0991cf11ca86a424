use crate::window::windows;
use crate::{
    AppState, Effect, FetchOutcome, FetchStatus, Msg, Screen, UiCommand, STATUS_COMPLETE,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Startup { marker_present } => {
            if state.screen() != Screen::Initializing {
                return (state, Vec::new());
            }
            if marker_present {
                state.set_screen(Screen::MainMenu);
                vec![
                    Effect::LoadShellMap,
                    Effect::Ui(UiCommand::RemoveInitWidget),
                    Effect::Ui(UiCommand::CloseTopWindow),
                    Effect::Ui(UiCommand::open(windows::MAIN_MENU)),
                ]
            } else {
                show_chooser(&mut state)
            }
        }
        Msg::DownloadClicked => {
            if state.screen() != Screen::ChoosingInstall {
                return (state, Vec::new());
            }
            let fetch_id = state.begin_fetch();
            state.set_error(None);
            state.set_screen(Screen::Downloading);
            let settings = state.settings();
            vec![
                Effect::Ui(UiCommand::CloseTopWindow),
                Effect::Ui(UiCommand::open(windows::DOWNLOAD)),
                Effect::StartFetch {
                    fetch_id,
                    url: settings.package_url.clone(),
                    destination: settings.package_path.clone(),
                },
            ]
        }
        Msg::FromMediaClicked => {
            // A second click while the picker is up is ignored.
            if state.screen() != Screen::ChoosingInstall {
                return (state, Vec::new());
            }
            state.set_screen(Screen::PickingMedia);
            vec![Effect::PickMedia {
                title: "Select CD".to_string(),
                message: format!("Select the {} CD", state.settings().game_title),
            }]
        }
        Msg::QuitClicked => {
            if state.screen() == Screen::Quitting {
                return (state, Vec::new());
            }
            let mut effects = Vec::new();
            if let Some(fetch_id) = state.request_cancel() {
                effects.push(Effect::CancelFetch { fetch_id });
            }
            state.set_screen(Screen::Quitting);
            effects.push(Effect::Quit);
            effects
        }
        Msg::CancelClicked => match state.screen() {
            Screen::Downloading | Screen::DownloadComplete => {
                let mut effects = Vec::new();
                if let Some(fetch_id) = state.request_cancel() {
                    effects.push(Effect::CancelFetch { fetch_id });
                }
                effects.extend(show_chooser(&mut state));
                effects
            }
            _ => Vec::new(),
        },
        Msg::RetryClicked => {
            if state.screen() != Screen::InstallError {
                return (state, Vec::new());
            }
            state.set_error(None);
            show_chooser(&mut state)
        }
        Msg::FetchProgress { fetch_id, progress } => {
            state.apply_progress(fetch_id, progress);
            Vec::new()
        }
        Msg::FetchFinished { fetch_id, outcome } => {
            match state.apply_finished(fetch_id, &outcome) {
                // User already moved on; the engine is only confirming.
                Some(FetchStatus::Cancelling) | None => Vec::new(),
                Some(_) => on_fetch_finished(&mut state, outcome),
            }
        }
        Msg::MediaPicked(result) => {
            if state.screen() != Screen::PickingMedia {
                return (state, Vec::new());
            }
            match result {
                Ok(path) => {
                    state.set_screen(Screen::ChoosingInstall);
                    vec![Effect::MediaSelected { path }]
                }
                Err(error) => show_error(&mut state, error),
            }
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn on_fetch_finished(state: &mut AppState, outcome: FetchOutcome) -> Vec<Effect> {
    match outcome {
        FetchOutcome::Completed { .. } => {
            state.set_status(STATUS_COMPLETE);
            state.set_screen(Screen::DownloadComplete);
            Vec::new()
        }
        FetchOutcome::Failed(error) => show_error(state, error),
        // Cancelled from outside the UI, e.g. by a shutdown hook.
        FetchOutcome::Cancelled => {
            if state.screen() == Screen::Downloading {
                show_chooser(state)
            } else {
                Vec::new()
            }
        }
    }
}

fn show_chooser(state: &mut AppState) -> Vec<Effect> {
    state.set_screen(Screen::ChoosingInstall);
    vec![
        Effect::Ui(UiCommand::CloseTopWindow),
        Effect::Ui(UiCommand::open(windows::CHOOSE_INSTALL)),
    ]
}

fn show_error(state: &mut AppState, error: crate::InstallError) -> Vec<Effect> {
    state.set_error(Some(error));
    state.set_screen(Screen::InstallError);
    vec![
        Effect::Ui(UiCommand::CloseTopWindow),
        Effect::Ui(UiCommand::open(windows::INSTALL_ERROR)),
    ]
}
