//! # Remote payloads
//!
//! Immutable value snapshots received from the remote access port. The cache
//! treats them as opaque; the helpers here only serve display and forms.

pub mod blob;
pub mod course;
pub mod enrollment;
pub mod post;
pub mod profile;
pub mod time;

pub use blob::*;
pub use course::*;
pub use enrollment::*;
pub use post::*;
pub use profile::*;
pub use time::*;
