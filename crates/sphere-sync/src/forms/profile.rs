//! Profile setup and edit form.

use sphere_config::UploadConfig;
use sphere_core::rules::not_blank;
use sphere_core::{ExperienceLevel, ExternalBlob, SphereError, SphereResult, UserProfile};
use sphere_port::BlobStore;
use std::sync::Arc;
use tokio::sync::watch;
use validator::Validate;

use super::image::ImageFile;
use super::phase::{FormPhase, FormStatus};
use crate::client::SyncClient;
use crate::mutations::SaveCallerUserProfile;
use crate::queries::CallerProfileQuery;

#[derive(Debug, Validate)]
struct ProfileDraft {
    #[validate(
        custom(function = "not_blank", message = "Name is required"),
        length(max = 50, message = "Name must be at most 50 characters")
    )]
    name: String,
    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    bio: String,
}

/// Whether the form creates the first profile or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileFormMode {
    Setup,
    Edit,
}

/// Profile setup and edit form.
pub struct ProfileForm {
    mode: ProfileFormMode,
    name: String,
    bio: String,
    experience: ExperienceLevel,
    picture: Option<ImageFile>,
    existing_picture: Option<ExternalBlob>,
    max_image_bytes: usize,
    status: FormStatus,
}

impl ProfileForm {
    /// Empty form for a caller without a profile.
    #[must_use]
    pub fn setup(uploads: &UploadConfig) -> Self {
        Self {
            mode: ProfileFormMode::Setup,
            name: String::new(),
            bio: String::new(),
            experience: ExperienceLevel::default(),
            picture: None,
            existing_picture: None,
            max_image_bytes: uploads.max_image_bytes,
            status: FormStatus::new(),
        }
    }

    /// Form pre-filled from `existing`.
    #[must_use]
    pub fn edit(existing: &UserProfile, uploads: &UploadConfig) -> Self {
        Self {
            mode: ProfileFormMode::Edit,
            name: existing.name.clone(),
            bio: existing.bio.clone(),
            experience: existing.experience,
            existing_picture: existing.profile_pic.clone(),
            ..Self::setup(uploads)
        }
    }

    /// Edit form pre-filled from the cached caller profile, if any.
    #[must_use]
    pub fn edit_cached(client: &SyncClient, uploads: &UploadConfig) -> Self {
        match client.cached(&CallerProfileQuery).flatten() {
            Some(profile) => Self::edit(&profile, uploads),
            None => Self {
                mode: ProfileFormMode::Edit,
                ..Self::setup(uploads)
            },
        }
    }

    #[must_use]
    pub fn mode(&self) -> ProfileFormMode {
        self.mode
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn bio(&self) -> &str {
        &self.bio
    }

    #[must_use]
    pub fn experience(&self) -> ExperienceLevel {
        self.experience
    }

    /// The newly selected picture, if any.
    #[must_use]
    pub fn picture(&self) -> Option<&ImageFile> {
        self.picture.as_ref()
    }

    /// URL of the picture kept when no new one is selected.
    #[must_use]
    pub fn current_picture_url(&self) -> Option<&str> {
        self.existing_picture.as_ref().map(ExternalBlob::direct_url)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.status.touch();
    }

    pub fn set_bio(&mut self, bio: impl Into<String>) {
        self.bio = bio.into();
        self.status.touch();
    }

    pub fn set_experience(&mut self, experience: ExperienceLevel) {
        self.experience = experience;
        self.status.touch();
    }

    /// Selects a new picture; rejects non-images and oversized files.
    pub fn select_picture(&mut self, image: ImageFile) -> SphereResult<()> {
        if let Err(err) = image.check(self.max_image_bytes) {
            return Err(self.status.invalid(&err.display_message()));
        }
        self.picture = Some(image);
        self.status.touch();
        Ok(())
    }

    pub fn clear_picture(&mut self) {
        self.picture = None;
        self.status.touch();
    }

    #[must_use]
    pub fn phase(&self) -> FormPhase {
        self.status.phase()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FormPhase> {
        self.status.subscribe()
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.phase().can_submit() && !self.name.trim().is_empty()
    }

    /// Validates, uploads a newly selected picture and saves the profile.
    pub async fn submit(
        &mut self,
        client: &SyncClient,
        blobs: Arc<dyn BlobStore>,
    ) -> SphereResult<UserProfile> {
        self.status.begin()?;
        self.status.validate(&ProfileDraft {
            name: self.name.clone(),
            bio: self.bio.clone(),
        })?;
        if !client.is_ready() {
            return Err(self.status.rejected(SphereError::PortUnavailable));
        }

        let profile_pic = match &self.picture {
            Some(image) => Some(self.status.upload(blobs, image.bytes.clone()).await?),
            None => self.existing_picture.clone(),
        };
        let profile = UserProfile {
            name: self.name.trim().to_string(),
            bio: self.bio.trim().to_string(),
            experience: self.experience,
            profile_pic,
        };

        self.status.set(FormPhase::Submitting);
        client
            .mutate(SaveCallerUserProfile::new(profile.clone()))
            .await
            .map_err(|err| self.status.rejected(err))?;

        self.existing_picture = profile.profile_pic.clone();
        self.picture = None;
        self.status.set(FormPhase::Submitted);
        Ok(profile)
    }
}
