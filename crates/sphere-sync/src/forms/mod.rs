//! Form state machines.
//!
//! Forms collect input, validate it locally and only then run a mutation.
//! Each form publishes its phase on a watch channel so a UI can render
//! upload progress while `submit` is running.

mod course;
mod image;
mod phase;
mod post;
mod profile;

pub use course::{CourseForm, COURSE_DESCRIPTION_MAX_LENGTH, COURSE_TITLE_MAX_LENGTH};
pub use image::ImageFile;
pub use phase::FormPhase;
pub use post::PostForm;
pub use profile::{ProfileForm, ProfileFormMode};
