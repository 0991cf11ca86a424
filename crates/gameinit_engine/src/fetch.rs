use std::path::Path;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use futures_util::StreamExt;

use crate::handle::FetchHandle;
use crate::persist::{CommittedFile, PartialDownload, PersistError};
use crate::{EngineEvent, FailureKind, FetchError, FetchId, FetchRequest, FetchedFile, TransferProgress};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    /// Maximum silence between two reads. Package downloads are large, so
    /// there is no overall deadline unless `request_timeout` is set.
    pub read_timeout: Duration,
    pub request_timeout: Option<Duration>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
            request_timeout: None,
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

/// Forwards events to the UI thread while the fetch is still active.
///
/// Once the handle is cancelled nothing more goes out, so the UI never sees
/// progress for a transfer it already abandoned.
pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
    handle: FetchHandle,
}

impl ChannelProgressSink {
    pub(crate) fn new(tx: std::sync::mpsc::Sender<EngineEvent>, handle: FetchHandle) -> Self {
        Self { tx, handle }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        if self.handle.is_active() {
            let _ = self.tx.send(event);
        }
    }
}

/// Running byte count for one transfer.
#[derive(Debug, Clone, Copy)]
pub struct ProgressCounter {
    fetch_id: FetchId,
    received: u64,
    total: Option<u64>,
}

impl ProgressCounter {
    pub fn new(fetch_id: FetchId, total: Option<u64>) -> Self {
        Self {
            fetch_id,
            received: 0,
            total,
        }
    }

    pub fn snapshot(&self) -> TransferProgress {
        TransferProgress {
            fetch_id: self.fetch_id,
            bytes_received: self.received,
            total_bytes: self.total,
        }
    }

    pub fn advance(&mut self, chunk_len: usize) -> TransferProgress {
        self.received = self.received.saturating_add(chunk_len as u64);
        self.snapshot()
    }
}

/// A fully received download that has not been moved into place yet.
pub struct StagedDownload {
    partial: PartialDownload,
    final_url: String,
}

impl StagedDownload {
    pub fn byte_len(&self) -> u64 {
        self.partial.written()
    }

    pub fn commit(self, destination: &Path) -> Result<FetchedFile, FetchError> {
        let CommittedFile {
            path,
            byte_len,
            sha256,
        } = self.partial.commit(destination).map_err(map_persist_error)?;
        Ok(FetchedFile {
            path,
            final_url: self.final_url,
            byte_len,
            sha256,
        })
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Streams `request.url` into a temp file beside `request.destination`.
    /// Dropping the returned future or the staged download discards the data.
    async fn fetch(
        &self,
        fetch_id: FetchId,
        request: &FetchRequest,
        sink: &dyn ProgressSink,
    ) -> Result<StagedDownload, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, FetchError> {
        let mut builder = reqwest::Client::builder()
            .no_proxy()
            .connect_timeout(self.settings.connect_timeout)
            .read_timeout(self.settings.read_timeout);
        if let Some(timeout) = self.settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(
        &self,
        fetch_id: FetchId,
        request: &FetchRequest,
        sink: &dyn ProgressSink,
    ) -> Result<StagedDownload, FetchError> {
        let parsed = url::Url::parse(&request.url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = self.build_client()?;

        let response = client
            .get(parsed.as_str())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let final_url = response.url().to_string();
        let mut counter = ProgressCounter::new(fetch_id, response.content_length());
        let mut partial = PartialDownload::create(&request.destination).map_err(map_persist_error)?;
        engine_debug!(
            "fetch {} streaming {} -> {:?} (length {:?})",
            fetch_id,
            final_url,
            request.destination,
            response.content_length()
        );

        sink.emit(EngineEvent::Progress(counter.snapshot()));

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            partial.write_chunk(&chunk).map_err(map_persist_error)?;
            sink.emit(EngineEvent::Progress(counter.advance(chunk.len())));
        }

        if let Some(expected) = request.expected_sha256.as_deref() {
            let actual = partial.sha256_hex();
            if !expected.eq_ignore_ascii_case(&actual) {
                engine_warn!("fetch {} checksum mismatch", fetch_id);
                return Err(FetchError::new(
                    FailureKind::ChecksumMismatch {
                        expected: expected.to_ascii_lowercase(),
                        actual,
                    },
                    "downloaded package does not match the expected digest",
                ));
            }
        }

        Ok(StagedDownload { partial, final_url })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

fn map_persist_error(err: PersistError) -> FetchError {
    FetchError::new(FailureKind::Io, err.to_string())
}
