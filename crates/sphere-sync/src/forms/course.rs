//! Course creation form.

use chrono::Utc;
use sphere_config::UploadConfig;
use sphere_core::rules::{non_negative_amount, not_blank};
use sphere_core::{icp_to_e8s, Course, CourseId, SphereError, SphereResult};
use sphere_port::{BlobStore, NewCourse};
use std::sync::Arc;
use tokio::sync::watch;
use validator::Validate;

use super::image::ImageFile;
use super::phase::{FormPhase, FormStatus};
use crate::client::SyncClient;
use crate::mutations::CreateCourse;

/// Maximum length of a course title.
pub const COURSE_TITLE_MAX_LENGTH: usize = 100;

/// Maximum length of a course description.
pub const COURSE_DESCRIPTION_MAX_LENGTH: usize = 1000;

#[derive(Debug, Validate)]
struct CourseDraft {
    #[validate(
        custom(function = "not_blank", message = "Title is required"),
        length(max = 100, message = "Title must be at most 100 characters")
    )]
    title: String,
    #[validate(
        custom(function = "not_blank", message = "Description is required"),
        length(max = 1000, message = "Description must be at most 1000 characters")
    )]
    description: String,
    #[validate(custom(function = "non_negative_amount", message = "Please enter a valid price"))]
    price: String,
    #[validate(required(message = "Please select a thumbnail image"))]
    thumbnail: Option<usize>,
}

/// Course creation form.
///
/// The price is typed in ICP and sent in e8s. The thumbnail is uploaded
/// before the course is created; its URL becomes the course thumbnail.
pub struct CourseForm {
    title: String,
    description: String,
    price: String,
    thumbnail: Option<ImageFile>,
    max_image_bytes: usize,
    status: FormStatus,
}

impl CourseForm {
    #[must_use]
    pub fn new(uploads: &UploadConfig) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            price: String::new(),
            thumbnail: None,
            max_image_bytes: uploads.max_image_bytes,
            status: FormStatus::new(),
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn price(&self) -> &str {
        &self.price
    }

    #[must_use]
    pub fn thumbnail(&self) -> Option<&ImageFile> {
        self.thumbnail.as_ref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.status.touch();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.status.touch();
    }

    /// Sets the price as typed, in ICP.
    pub fn set_price(&mut self, price: impl Into<String>) {
        self.price = price.into();
        self.status.touch();
    }

    /// Selects the thumbnail; rejects non-images and oversized files.
    pub fn select_thumbnail(&mut self, image: ImageFile) -> SphereResult<()> {
        if let Err(err) = image.check(self.max_image_bytes) {
            return Err(self.status.invalid(&err.display_message()));
        }
        self.thumbnail = Some(image);
        self.status.touch();
        Ok(())
    }

    pub fn remove_thumbnail(&mut self) {
        self.thumbnail = None;
        self.status.touch();
    }

    /// The typed price in e8s, if it is a valid amount.
    #[must_use]
    pub fn price_e8s(&self) -> Option<u64> {
        self.price.trim().parse::<f64>().ok().and_then(icp_to_e8s)
    }

    #[must_use]
    pub fn phase(&self) -> FormPhase {
        self.status.phase()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FormPhase> {
        self.status.subscribe()
    }

    /// Whether every required field is filled in and nothing is pending.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.phase().can_submit()
            && !self.title.trim().is_empty()
            && !self.description.trim().is_empty()
            && !self.price.trim().is_empty()
            && self.thumbnail.is_some()
    }

    /// Validates, uploads the thumbnail and creates the course.
    ///
    /// Clears the form on success.
    pub async fn submit(
        &mut self,
        client: &SyncClient,
        blobs: Arc<dyn BlobStore>,
    ) -> SphereResult<Course> {
        self.status.begin()?;
        self.status.validate(&CourseDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            price: self.price.clone(),
            thumbnail: self.thumbnail.as_ref().map(ImageFile::len),
        })?;
        let Some(price) = self.price_e8s() else {
            return Err(self.status.invalid("Please enter a valid price"));
        };
        let Some(thumbnail) = &self.thumbnail else {
            return Err(self.status.invalid("Please select a thumbnail image"));
        };
        if !client.is_ready() {
            return Err(self.status.rejected(SphereError::PortUnavailable));
        }

        let blob = self.status.upload(blobs, thumbnail.bytes.clone()).await?;
        let course = NewCourse {
            id: CourseId::generate(Utc::now()),
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            price,
            thumbnail_url: blob.direct_url,
        };

        self.status.set(FormPhase::Submitting);
        let created = client
            .mutate(CreateCourse::new(course))
            .await
            .map_err(|err| self.status.rejected(err))?;

        self.title.clear();
        self.description.clear();
        self.price.clear();
        self.thumbnail = None;
        self.status.set(FormPhase::Submitted);
        Ok(created)
    }
}
