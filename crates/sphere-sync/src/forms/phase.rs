//! Form phases and the shared submit machinery.

use futures::StreamExt;
use sphere_core::{ExternalBlob, SphereError, SphereResult};
use sphere_port::{start_upload, BlobStore};
use std::sync::Arc;
use tokio::sync::watch;
use validator::{Validate, ValidationErrors};

/// Where a form is in its submit cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormPhase {
    /// Accepting input.
    #[default]
    Editing,
    /// Local validation failed; no remote call was made.
    Invalid(String),
    /// An image is uploading; the value is the percentage (0..=100).
    Uploading(u8),
    /// The mutation is in flight.
    Submitting,
    /// The mutation succeeded.
    Submitted,
    /// The upload or the backend failed.
    Rejected(String),
}

impl FormPhase {
    /// Uploading or submitting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Uploading(_) | Self::Submitting)
    }

    /// Re-submission is disabled only while pending.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.is_pending()
    }

    /// Leaving the form is allowed in every phase, uploads included.
    #[must_use]
    pub fn can_cancel(&self) -> bool {
        true
    }

    /// Message to show next to the form, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Invalid(message) | Self::Rejected(message) => Some(message),
            _ => None,
        }
    }
}

/// Phase holder shared by all forms.
pub(crate) struct FormStatus {
    phase: watch::Sender<FormPhase>,
}

impl FormStatus {
    pub(crate) fn new() -> Self {
        let (phase, _) = watch::channel(FormPhase::Editing);
        Self { phase }
    }

    pub(crate) fn phase(&self) -> FormPhase {
        self.phase.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<FormPhase> {
        self.phase.subscribe()
    }

    pub(crate) fn set(&self, next: FormPhase) {
        self.phase.send_if_modified(|phase| {
            if *phase == next {
                return false;
            }
            *phase = next;
            true
        });
    }

    /// New input makes a failed or finished form editable again.
    pub(crate) fn touch(&self) {
        if !self.phase().is_pending() {
            self.set(FormPhase::Editing);
        }
    }

    /// Refuses to start while another submit is pending.
    pub(crate) fn begin(&self) -> SphereResult<()> {
        if self.phase().is_pending() {
            return Err(SphereError::SubmissionPending);
        }
        Ok(())
    }

    /// Runs local validation, moving to `Invalid` on failure.
    pub(crate) fn validate<T: Validate>(&self, draft: &T) -> SphereResult<()> {
        draft.validate().map_err(|errors| {
            let message = first_message(&errors);
            self.set(FormPhase::Invalid(message.clone()));
            SphereError::validation(message)
        })
    }

    /// Moves to `Invalid` with a message that does not come from a validator.
    pub(crate) fn invalid(&self, message: &str) -> SphereError {
        self.set(FormPhase::Invalid(message.to_string()));
        SphereError::validation(message)
    }

    /// Uploads `bytes`, mirroring progress into `Uploading`.
    pub(crate) async fn upload(
        &self,
        blobs: Arc<dyn BlobStore>,
        bytes: Vec<u8>,
    ) -> SphereResult<ExternalBlob> {
        self.set(FormPhase::Uploading(0));
        let mut upload = start_upload(blobs, bytes);
        while let Some(percentage) = upload.progress().next().await {
            self.set(FormPhase::Uploading(percentage));
        }
        upload.finish().await.map_err(|err| self.rejected(err))
    }

    /// Records a failed upload or mutation and hands the error back.
    pub(crate) fn rejected(&self, err: SphereError) -> SphereError {
        if matches!(err, SphereError::PortUnavailable) {
            self.set(FormPhase::Editing);
        } else {
            self.set(FormPhase::Rejected(err.display_message()));
        }
        err
    }
}

fn first_message(errors: &ValidationErrors) -> String {
    sphere_core::field_errors(errors)
        .into_iter()
        .next()
        .map_or_else(|| "Invalid input".to_string(), |error| error.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_phases_block_submit_only() {
        for phase in [FormPhase::Uploading(40), FormPhase::Submitting] {
            assert!(phase.is_pending());
            assert!(!phase.can_submit());
            assert!(phase.can_cancel());
        }
        for phase in [
            FormPhase::Editing,
            FormPhase::Invalid("x".to_string()),
            FormPhase::Submitted,
            FormPhase::Rejected("y".to_string()),
        ] {
            assert!(phase.can_submit());
        }
    }

    #[test]
    fn test_error_message() {
        assert_eq!(FormPhase::Invalid("Too long".to_string()).error_message(), Some("Too long"));
        assert_eq!(FormPhase::Submitted.error_message(), None);
    }

    #[test]
    fn test_touch_leaves_pending_phase() {
        let status = FormStatus::new();
        status.set(FormPhase::Rejected("no".to_string()));
        status.touch();
        assert_eq!(status.phase(), FormPhase::Editing);

        status.set(FormPhase::Submitting);
        status.touch();
        assert_eq!(status.phase(), FormPhase::Submitting);
        assert_eq!(status.begin(), Err(SphereError::SubmissionPending));
    }

    #[test]
    fn test_port_unavailable_is_not_displayed() {
        let status = FormStatus::new();
        status.set(FormPhase::Submitting);
        let err = status.rejected(SphereError::PortUnavailable);
        assert_eq!(err, SphereError::PortUnavailable);
        assert_eq!(status.phase(), FormPhase::Editing);
    }
}
