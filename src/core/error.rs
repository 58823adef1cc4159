//! Error handling for magedeploy
//!
//! The error system is built around two types:
//! - [`MagedeployError`] - Enumerated error types for all failure cases in the
//!   deployment engine
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!   for CLI display
//!
//! # Error Categories
//!
//! - **Selection**: [`MagedeployError::UnknownStrategy`],
//!   [`MagedeployError::NoMappingSource`]
//! - **Parsing**: [`MagedeployError::MalformedMap`],
//!   [`MagedeployError::ModmanParse`], [`MagedeployError::ManifestParse`]
//! - **Deployment**: [`MagedeployError::DestinationConflict`],
//!   [`MagedeployError::CrossDeviceLink`], [`MagedeployError::UnsafePath`],
//!   [`MagedeployError::FileSystemError`]
//! - **Configuration**: [`MagedeployError::ConfigError`],
//!   [`MagedeployError::ComposerParseError`]
//! - **State**: [`MagedeployError::StateParseError`]
//!
//! Selection and parsing errors are raised before any filesystem mutation for
//! the affected package. Deploy-time errors abort the remaining entries of that
//! package's mapping but leave already-written entries in place; there is no
//! cross-entry rollback.
//!
//! Use [`user_friendly_error`] to convert any error into a displayable format
//! with contextual suggestions.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for magedeploy operations.
///
/// Each variant carries the context needed to report the failure against the
/// offending package and mapping entry. Errors are never silently swallowed:
/// a batch operation collects them per package and reports all of them at the
/// end of the run.
#[derive(Error, Debug)]
pub enum MagedeployError {
    /// A deploy strategy name was not one of `copy`, `symlink`, `link`, `none`.
    ///
    /// Raised during selection, before any parsing or filesystem access, for
    /// strategy names coming from the package's own `magento-deploystrategy`
    /// field. Names in the project configuration are validated at load time
    /// and raise the same error there.
    #[error("unknown deploy strategy '{name}'")]
    UnknownStrategy {
        /// The unrecognized strategy name as written in the metadata
        name: String,
    },

    /// No mapping source could be detected for a package.
    ///
    /// The package declared no explicit `map`, has no project-level map
    /// override, carries no `modman` file at its source root, and names no
    /// resolvable `package-xml` manifest.
    #[error("no file mapping source found for package '{package}'")]
    NoMappingSource {
        /// The package that cannot be mapped
        package: String,
    },

    /// An explicit map contained a value that is not a relative path string.
    #[error("malformed file map for package '{package}': {reason}")]
    MalformedMap {
        /// The package whose map is malformed
        package: String,
        /// What exactly was wrong with the map
        reason: String,
    },

    /// A `modman` file contained a line with the wrong token count, or
    /// referenced a source path missing from the package.
    #[error("failed to parse modman file '{path}' at line {line}: {reason}")]
    ModmanParse {
        /// Path of the modman file
        path: String,
        /// 1-based line number of the offending line
        line: usize,
        /// Description of the problem
        reason: String,
    },

    /// A package.xml manifest was unparsable or referenced an unknown target
    /// type.
    #[error("failed to parse package manifest '{path}': {reason}")]
    ManifestParse {
        /// Path of the manifest file
        path: String,
        /// Description of the problem
        reason: String,
    },

    /// The destination of a symlink or hard link already exists and is not a
    /// link placed by this package.
    ///
    /// Deployment fails rather than overwriting; there is no force flag.
    #[error("destination already exists and was not placed by this package: {path}")]
    DestinationConflict {
        /// The conflicting destination path
        path: String,
    },

    /// A hard link crossed a filesystem boundary.
    #[error(
        "cannot hard link across filesystems: '{source_path}' -> '{dest_path}' \
         (use the 'copy' deploy strategy for this package instead)"
    )]
    CrossDeviceLink {
        /// The link source
        source_path: String,
        /// The link destination
        dest_path: String,
    },

    /// A mapping entry resolved to a path outside the application root.
    ///
    /// Strategies never write outside their bound destination root; an entry
    /// that escapes it via `..` components is rejected before any mutation.
    #[error("mapping entry escapes the application root: {path}")]
    UnsafePath {
        /// The offending path as written in the mapping
        path: String,
    },

    /// A filesystem operation failed while deploying or removing files.
    #[error("filesystem error during {operation} of '{path}'")]
    FileSystemError {
        /// The operation that failed (e.g. "copy", "symlink", "remove")
        operation: String,
        /// The path involved
        path: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Project configuration is missing or invalid.
    #[error("configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// A composer metadata file could not be read or parsed.
    #[error("failed to read composer metadata '{path}': {reason}")]
    ComposerParseError {
        /// Path of the composer file
        path: String,
        /// Description of the problem
        reason: String,
    },

    /// A requested package is not present in `installed.json`.
    #[error("package '{name}' is not installed")]
    PackageNotFound {
        /// The requested package name
        name: String,
    },

    /// A package of an unsupported type was handed to the installer.
    #[error("package type '{package_type}' is not supported (expected 'magento-module')")]
    UnsupportedPackageType {
        /// The declared package type
        package_type: String,
    },

    /// The deploy state file exists but could not be parsed.
    #[error("failed to parse deploy state file '{path}': {reason}")]
    StateParseError {
        /// Path of the state file
        path: String,
        /// Description of the problem
        reason: String,
    },

    /// Generic I/O error from [`std::io::Error`]
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error from [`serde_json::Error`]
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl MagedeployError {
    /// Shorthand for wrapping an I/O failure with the operation and path that
    /// produced it.
    pub fn fs(operation: impl Into<String>, path: impl fmt::Display, source: std::io::Error) -> Self {
        Self::FileSystemError {
            operation: operation.into(),
            path: path.to_string(),
            source,
        }
    }
}

/// Wrapper that adds user-friendly context to errors for CLI display.
///
/// Pairs the underlying error with an optional suggestion and optional
/// details, rendered with color when printed through [`ErrorContext::display`].
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: anyhow::Error,
    /// A suggestion for how the user might resolve the problem
    pub suggestion: Option<String>,
    /// Additional details about the failure
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from any error type.
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self { error: error.into(), suggestion: None, details: None }
    }

    /// Attach a resolution suggestion shown below the error message.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach additional details shown below the error message.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details, and suggestion to stderr with colors.
    pub fn display(&self) {
        eprintln!("{} {}", "error:".red().bold(), self.error);
        if let Some(details) = &self.details {
            eprintln!("  {} {}", "details:".yellow(), details);
        }
        if let Some(suggestion) = &self.suggestion {
            eprintln!("  {} {}", "suggestion:".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }
        Ok(())
    }
}

/// Convert any error into an [`ErrorContext`] with contextual suggestions.
///
/// Downcasts to [`MagedeployError`] where possible and attaches a suggestion
/// appropriate to the failure mode; other errors pass through unchanged.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let Some(mage_err) = error.downcast_ref::<MagedeployError>() else {
        return ErrorContext::new(error);
    };

    let (suggestion, details) = match mage_err {
        MagedeployError::UnknownStrategy { .. } => (
            Some("Valid strategies are: copy, symlink, link, none".to_string()),
            None,
        ),
        MagedeployError::NoMappingSource { package } => (
            Some(format!(
                "Declare an 'extra.map' in the package, add a 'magento-map-overwrite' \
                 entry for '{package}' in the root composer.json, or ship a modman file"
            )),
            Some(
                "Mapping sources are probed in order: explicit map, modman file, \
                 package.xml manifest"
                    .to_string(),
            ),
        ),
        MagedeployError::DestinationConflict { path } => (
            Some(format!("Remove '{path}' manually if it is stale, then redeploy")),
            Some("Link strategies never overwrite files they did not place".to_string()),
        ),
        MagedeployError::CrossDeviceLink { .. } => (
            Some(
                "Set 'magento-deploystrategy' to 'copy' for this package, or move the \
                 vendor directory onto the same filesystem as the application root"
                    .to_string(),
            ),
            None,
        ),
        MagedeployError::ConfigError { .. } => (
            Some(
                "Check the 'extra' section of the root composer.json; \
                 'magento-root-dir' is required"
                    .to_string(),
            ),
            None,
        ),
        MagedeployError::StateParseError { path, .. } => (
            Some(format!("Delete '{path}' and redeploy all packages to rebuild it")),
            None,
        ),
        _ => (None, None),
    };

    let mut ctx = ErrorContext::new(error);
    if let Some(s) = suggestion {
        ctx = ctx.with_suggestion(s);
    }
    if let Some(d) = details {
        ctx = ctx.with_details(d);
    }
    ctx
}
