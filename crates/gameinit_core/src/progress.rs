pub type FetchId = u64;

/// Snapshot of a running download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchProgress {
    pub percent: u8,
    pub bytes_received: u64,
    /// `None` when the server did not announce a length.
    pub total_bytes: Option<u64>,
}

impl FetchProgress {
    pub fn new(bytes_received: u64, total_bytes: Option<u64>) -> Self {
        let percent = match total_bytes {
            Some(0) => 100,
            Some(total) => {
                (u128::from(bytes_received.min(total)) * 100 / u128::from(total)) as u8
            }
            None => 0,
        };
        Self {
            percent,
            bytes_received,
            total_bytes,
        }
    }

    /// Label text shown under the download bar.
    pub fn status_text(&self) -> String {
        match self.total_bytes {
            Some(total) => format!("{}% {}/{} bytes", self.percent, self.bytes_received, total),
            None => format!("?% {}/? bytes", self.bytes_received),
        }
    }
}
