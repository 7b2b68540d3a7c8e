//! Image selection checks.

use sphere_core::{SphereError, SphereResult};

/// An image picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ImageFile {
    #[must_use]
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Checks the file at selection time.
    pub(crate) fn check(&self, max_bytes: usize) -> SphereResult<()> {
        if !self.content_type.starts_with("image/") {
            return Err(SphereError::validation("Please select an image file"));
        }
        if self.bytes.len() > max_bytes {
            return Err(SphereError::validation(format!(
                "Image size must be less than {}",
                human_size(max_bytes)
            )));
        }
        Ok(())
    }
}

fn human_size(bytes: usize) -> String {
    const MIB: usize = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= 1024 {
        format!("{}KB", bytes / 1024)
    } else {
        format!("{} bytes", bytes)
    }
}
