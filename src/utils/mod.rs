//! Cross-cutting utilities.
//!
//! - [`fs`] - File system helpers: atomic writes, path normalization and
//!   containment checks, checksums, empty-directory pruning

pub mod fs;
