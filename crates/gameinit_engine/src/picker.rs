//! External directory picker, used to locate the install medium.
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickRequest {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickerError {
    #[error("could not launch picker: {0}")]
    Launch(String),
    #[error("picker did not finish within {0:?}")]
    Timeout(Duration),
    #[error("picker exited with status {0:?}")]
    Exit(Option<i32>),
    #[error("no directory selected")]
    NoSelection,
    #[error("picker output exceeded {limit} bytes")]
    OutputTooLarge { limit: usize },
    #[error("picker io error: {0}")]
    Io(String),
    #[error("picker returned an unusable path: {0}")]
    InvalidPath(String),
}

#[async_trait::async_trait]
pub trait DirectoryPicker: Send + Sync {
    async fn pick(&self, request: &PickRequest) -> Result<PathBuf, PickerError>;
}

#[derive(Debug, Clone)]
pub struct PickerSettings {
    pub program: PathBuf,
    /// Inserted before the picker flags, e.g. for a launcher sub-command.
    pub leading_args: Vec<String>,
    pub timeout: Duration,
    pub max_output_bytes: usize,
}

impl Default for PickerSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("launcher/gameinit-launcher"),
            leading_args: Vec::new(),
            timeout: Duration::from_secs(300),
            max_output_bytes: 4096,
        }
    }
}

/// Runs the launcher binary in file-picker mode and reads the chosen path
/// from its stdout.
#[derive(Debug, Clone)]
pub struct ProcessPicker {
    settings: PickerSettings,
}

impl ProcessPicker {
    pub fn new(settings: PickerSettings) -> Self {
        Self { settings }
    }

    pub fn args(&self, request: &PickRequest) -> Vec<String> {
        let mut args = self.settings.leading_args.clone();
        args.extend([
            "--filepicker".to_string(),
            "--title".to_string(),
            request.title.clone(),
            "--message".to_string(),
            request.message.clone(),
            "--require-directory".to_string(),
            "--button-text".to_string(),
            "Select".to_string(),
        ]);
        args
    }
}

#[async_trait::async_trait]
impl DirectoryPicker for ProcessPicker {
    async fn pick(&self, request: &PickRequest) -> Result<PathBuf, PickerError> {
        let limit = self.settings.max_output_bytes;
        engine_info!("launching picker {:?}", self.settings.program);

        let mut child = Command::new(&self.settings.program)
            .args(self.args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| PickerError::Launch(err.to_string()))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| PickerError::Io("stdout not captured".to_string()))?;

        let run = async {
            let mut output = Vec::new();
            (&mut stdout)
                .take(limit as u64 + 1)
                .read_to_end(&mut output)
                .await?;
            if output.len() > limit {
                let _ = child.start_kill();
            }
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, output))
        };

        // On timeout `child` is dropped here and killed.
        let (status, output) = tokio::time::timeout(self.settings.timeout, run)
            .await
            .map_err(|_| PickerError::Timeout(self.settings.timeout))?
            .map_err(|err| PickerError::Io(err.to_string()))?;

        if output.len() > limit {
            return Err(PickerError::OutputTooLarge { limit });
        }
        if !status.success() {
            engine_warn!("picker exited with {}", status);
            return Err(PickerError::Exit(status.code()));
        }
        let path = path_from_output(output)?;
        engine_info!("picker returned {:?}", path);
        Ok(path)
    }
}

/// Turns picker stdout into a path. Only the trailing line ending is
/// stripped; the bytes in between are kept as the OS gave them.
fn path_from_output(mut output: Vec<u8>) -> Result<PathBuf, PickerError> {
    if output.last() == Some(&b'\n') {
        output.pop();
        if output.last() == Some(&b'\r') {
            output.pop();
        }
    }
    if output.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(PickerError::NoSelection);
    }
    os_path(output)
}

#[cfg(unix)]
fn os_path(bytes: Vec<u8>) -> Result<PathBuf, PickerError> {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;

    Ok(PathBuf::from(OsString::from_vec(bytes)))
}

#[cfg(not(unix))]
fn os_path(bytes: Vec<u8>) -> Result<PathBuf, PickerError> {
    String::from_utf8(bytes)
        .map(PathBuf::from)
        .map_err(|err| PickerError::InvalidPath(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_line_ending_is_stripped() {
        assert_eq!(
            path_from_output(b"/media/cd rom \r\n".to_vec()),
            Ok(PathBuf::from("/media/cd rom "))
        );
        assert_eq!(path_from_output(b"\n".to_vec()), Err(PickerError::NoSelection));
        assert_eq!(path_from_output(b"  \n".to_vec()), Err(PickerError::NoSelection));
    }
}
