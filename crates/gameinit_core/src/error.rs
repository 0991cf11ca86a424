use thiserror::Error;

/// Recoverable install failures shown to the user with a retry option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallError {
    #[error("download failed: {0}")]
    TransferFailed(String),
    #[error("media selection failed: {0}")]
    HelperProcessFailed(String),
}
