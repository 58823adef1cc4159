//! Package identity and declared metadata.
//!
//! A [`Package`] is the unit the installer operates on: a composer package of
//! type `magento-module`, already extracted into the vendor directory by the
//! host package manager. It is immutable for the duration of one
//! install/update/uninstall operation.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The recognized keys of a module package's composer `extra` section.
///
/// Unknown keys are ignored; the recognized ones drive strategy and parser
/// selection:
///
/// - `magento-deploystrategy` - the package's own preferred strategy, beaten
///   by a project-level override, beating the project default
/// - `map` - an explicit source-to-destination file map; a JSON `null` is
///   treated the same as an absent key (fall through to modman detection)
/// - `package-xml` - name of a Magento Connect manifest at the package root
///
/// Map values are kept as raw JSON values here; the explicit-map parser
/// validates that each one is a path string and reports a
/// [`MalformedMap`](crate::core::MagedeployError::MalformedMap) otherwise.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PackageExtra {
    /// The package's own declared deploy strategy name
    #[serde(rename = "magento-deploystrategy")]
    pub deploy_strategy: Option<String>,

    /// Explicit source-to-destination file map
    pub map: Option<BTreeMap<String, serde_json::Value>>,

    /// File name of a package.xml manifest at the package source root
    #[serde(rename = "package-xml")]
    pub package_xml: Option<String>,
}

/// A module package as handed over by the host package manager.
#[derive(Debug, Clone)]
pub struct Package {
    /// Unique composer name, e.g. `acme/widget`
    pub name: String,
    /// Declared version, if any
    pub version: Option<String>,
    /// Composer package type; the installer only supports `magento-module`
    pub package_type: String,
    /// Absolute path of the package's extracted source tree
    pub source_dir: PathBuf,
    /// Recognized `extra` metadata
    pub extra: PackageExtra,
}

impl Package {
    /// Creates a package with empty extra metadata. Primarily useful in
    /// tests; real packages come from `installed.json` via
    /// [`crate::composer`].
    pub fn new(name: impl Into<String>, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            version: None,
            package_type: crate::core::MAGENTO_MODULE_TYPE.to_string(),
            source_dir: source_dir.into(),
            extra: PackageExtra::default(),
        }
    }
}
