//! # Sphere App
//!
//! Composition root for the Stock Sphere sync layer: wires configuration,
//! the HTTP port, the entity cache, the sync client and the identity session.

pub mod app;
pub mod render;
pub mod startup;

pub use app::{App, AppBuilder};
