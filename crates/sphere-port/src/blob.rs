//! Blob upload collaborator and upload progress.

use async_trait::async_trait;
use futures::Stream;
use sphere_core::{ExternalBlob, SphereError, SphereResult};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::debug;

/// External store that turns bytes into a retrievable blob.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Uploads `bytes`, reporting percentages through `progress`.
    ///
    /// Implementations should stop early once `progress.is_cancelled()`.
    async fn upload(&self, bytes: Vec<u8>, progress: ProgressReporter)
        -> SphereResult<ExternalBlob>;
}

/// Sending half of an upload progress stream.
///
/// Reported values are clamped to 100 and never decrease; the stream closes
/// after 100 is sent or when the reporter is dropped.
pub struct ProgressReporter {
    sender: Option<mpsc::UnboundedSender<u8>>,
    last: Option<u8>,
}

impl ProgressReporter {
    /// Creates a connected reporter and stream.
    #[must_use]
    pub fn channel() -> (Self, UploadProgress) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender: Some(sender),
                last: None,
            },
            UploadProgress {
                receiver: UnboundedReceiverStream::new(receiver),
                latest: 0,
            },
        )
    }

    /// Reports a percentage.
    ///
    /// Returns `false` once nobody listens any more or 100 was reached.
    pub fn report(&mut self, percentage: u8) -> bool {
        let percentage = percentage.min(100);
        let Some(sender) = &self.sender else {
            return false;
        };
        if self.last.is_some_and(|last| percentage <= last) {
            return !sender.is_closed();
        }
        if sender.send(percentage).is_err() {
            self.sender = None;
            return false;
        }
        self.last = Some(percentage);
        if percentage == 100 {
            self.sender = None;
        }
        true
    }

    /// Checks if the listening side went away.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.sender.as_ref().is_some_and(mpsc::UnboundedSender::is_closed)
    }
}

/// Stream of upload percentages (0..=100).
///
/// Dropping it cancels progress reporting.
pub struct UploadProgress {
    receiver: UnboundedReceiverStream<u8>,
    latest: u8,
}

impl UploadProgress {
    /// The most recent percentage received.
    #[must_use]
    pub fn latest(&self) -> u8 {
        self.latest
    }
}

impl Stream for UploadProgress {
    type Item = u8;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = Pin::new(&mut self.receiver).poll_next(cx);
        if let Poll::Ready(Some(percentage)) = polled {
            self.latest = percentage;
        }
        polled
    }
}

/// An upload running on the blob store.
pub struct BlobUpload {
    progress: UploadProgress,
    task: JoinHandle<SphereResult<ExternalBlob>>,
}

/// Starts uploading `bytes` in the background.
pub fn start_upload(store: Arc<dyn BlobStore>, bytes: Vec<u8>) -> BlobUpload {
    let (reporter, progress) = ProgressReporter::channel();
    debug!(bytes = bytes.len(), "Starting blob upload");
    let task = tokio::spawn(async move { store.upload(bytes, reporter).await });
    BlobUpload { progress, task }
}

impl BlobUpload {
    /// The progress stream of this upload.
    pub fn progress(&mut self) -> &mut UploadProgress {
        &mut self.progress
    }

    /// Waits for the upload to finish.
    pub async fn finish(self) -> SphereResult<ExternalBlob> {
        let Self { progress, task } = self;
        let result = task
            .await
            .map_err(|e| SphereError::Upload(format!("Upload task failed: {}", e)))?;
        drop(progress);
        result
    }

    /// Stops listening and aborts the upload.
    pub fn cancel(self) {
        debug!("Cancelling blob upload");
        self.task.abort();
    }
}
