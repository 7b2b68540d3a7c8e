//! Post composer form.

use sphere_core::rules::not_blank;
use sphere_core::{SphereResult, POST_MAX_LENGTH};
use tokio::sync::watch;
use validator::Validate;

use super::phase::{FormPhase, FormStatus};
use crate::client::SyncClient;
use crate::mutations::AddPost;

#[derive(Debug, Validate)]
struct PostDraft {
    #[validate(
        custom(function = "not_blank", message = "Post content cannot be empty"),
        length(max = 1000, message = "Post is too long (max 1000 characters)")
    )]
    content: String,
}

/// Composer for a new feed post.
pub struct PostForm {
    content: String,
    status: FormStatus,
}

impl Default for PostForm {
    fn default() -> Self {
        Self::new()
    }
}

impl PostForm {
    #[must_use]
    pub fn new() -> Self {
        Self {
            content: String::new(),
            status: FormStatus::new(),
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.status.touch();
    }

    /// Characters typed so far, for the `n/1000` counter.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    #[must_use]
    pub fn phase(&self) -> FormPhase {
        self.status.phase()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FormPhase> {
        self.status.subscribe()
    }

    /// Whether the submit button is enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.phase().can_submit()
            && !self.content.trim().is_empty()
            && self.char_count() <= POST_MAX_LENGTH
    }

    /// Validates and publishes the trimmed content.
    ///
    /// Clears the content on success.
    pub async fn submit(&mut self, client: &SyncClient) -> SphereResult<()> {
        self.status.begin()?;
        self.status.validate(&PostDraft {
            content: self.content.clone(),
        })?;

        self.status.set(FormPhase::Submitting);
        client
            .mutate(AddPost::new(self.content.trim()))
            .await
            .map_err(|err| self.status.rejected(err))?;

        self.content.clear();
        self.status.set(FormPhase::Submitted);
        Ok(())
    }
}
