//! Core types and error handling shared across the crate.
//!
//! This module hosts the error taxonomy ([`error`]) and re-exports the types
//! the rest of the crate uses on nearly every code path.

pub mod error;

pub use error::{ErrorContext, MagedeployError, user_friendly_error};

/// Convenience result alias used throughout the deployment engine.
pub type Result<T> = std::result::Result<T, MagedeployError>;

/// The composer package type this installer is responsible for.
///
/// [`crate::installer::Installer::supports`] returns `true` only for this
/// exact string.
pub const MAGENTO_MODULE_TYPE: &str = "magento-module";
