//! # Sphere Config
//!
//! Configuration management for the Stock Sphere sync layer.
//! Supports layered configuration from files and environment variables,
//! and runtime reload.

mod app_config;
mod loader;

pub use app_config::*;
pub use loader::*;
