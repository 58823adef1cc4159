//! Fixture builder for composer-project layouts.
//!
//! Builds a temporary project directory with a `composer.json`, a vendor
//! tree, and a `vendor/composer/installed.json`, mirroring what Composer
//! leaves on disk after an install.

use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct ProjectFixture {
    _tmp: TempDir,
    pub project_dir: PathBuf,
    root_extra: Value,
    installed: Vec<Value>,
}

impl ProjectFixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let project_dir = tmp.path().to_path_buf();
        fs::create_dir_all(project_dir.join("htdocs")).unwrap();
        fs::create_dir_all(project_dir.join("vendor/composer")).unwrap();
        Self {
            _tmp: tmp,
            project_dir,
            root_extra: json!({"magento-root-dir": "htdocs"}),
            installed: Vec::new(),
        }
    }

    /// The application root the fixture deploys into.
    pub fn magento_root(&self) -> PathBuf {
        self.project_dir.join("htdocs")
    }

    /// Sets an `extra` key of the root composer.json.
    pub fn with_root_extra(mut self, key: &str, value: Value) -> Self {
        self.root_extra[key] = value;
        self
    }

    /// Adds a magento-module package with the given source files and a
    /// modman file mapping each onto itself.
    pub fn with_modman_module(self, name: &str, files: &[&str]) -> Self {
        let modman: String =
            files.iter().map(|f| format!("{f} {f}\n")).collect();
        self.with_module(name, json!({}), files, Some(&modman))
    }

    /// Adds a magento-module package with arbitrary extra metadata, source
    /// files, and optionally a modman file.
    pub fn with_module(
        mut self,
        name: &str,
        extra: Value,
        files: &[&str],
        modman: Option<&str>,
    ) -> Self {
        let dir = self.project_dir.join("vendor").join(name);
        for file in files {
            write_file(&dir.join(file), "fixture content");
        }
        if let Some(modman) = modman {
            write_file(&dir.join("modman"), modman);
        }
        fs::create_dir_all(&dir).unwrap();
        self.installed.push(json!({
            "name": name,
            "version": "1.0.0",
            "type": "magento-module",
            "extra": extra,
        }));
        self
    }

    /// Writes the composer metadata files and returns the fixture.
    pub fn build(self) -> Self {
        let composer = json!({
            "name": "acme/project",
            "extra": self.root_extra,
        });
        write_file(
            &self.project_dir.join("composer.json"),
            &serde_json::to_string_pretty(&composer).unwrap(),
        );
        let installed = json!({"packages": self.installed});
        write_file(
            &self.project_dir.join("vendor/composer/installed.json"),
            &serde_json::to_string_pretty(&installed).unwrap(),
        );
        self
    }
}

pub fn write_file(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}
