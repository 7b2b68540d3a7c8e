//! # Sphere Core
//!
//! Core types, remote payloads, and error definitions shared by every layer
//! of the Stock Sphere client sync stack.

pub mod domain;
pub mod error;
pub mod id;
pub mod result;
pub mod telemetry;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use result::*;
pub use validation::*;
