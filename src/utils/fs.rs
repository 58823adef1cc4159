//! File system utilities for deployment operations.
//!
//! Small, synchronous helpers shared by the deploy strategies, the state
//! file, and the CLI: directory creation, atomic writes, lexical path
//! normalization, containment checks, relative-path computation, and
//! checksums.
//!
//! Writes that matter go through a temp-then-rename sequence so that no file
//! is ever observable in a half-written state, even though the engine does
//! not provide cross-entry rollback.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Ensures a directory exists, creating it and all parents if necessary.
///
/// Returns an error if the path exists but is not a directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        anyhow::bail!("Path exists but is not a directory: {}", path.display());
    }
    Ok(())
}

/// Ensures the parent directory of a path exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

/// Writes bytes to a file atomically via a temporary file in the same
/// directory followed by a rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    ensure_parent_dir(path)?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(content)
        .with_context(|| format!("Failed to write temp file for {}", path.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| "Failed to sync file to disk")?;
    tmp.persist(path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;
    Ok(())
}

/// Copies a single file atomically: the content lands in a temporary file
/// next to the destination and is renamed into place.
///
/// Overwrites an existing destination. Parent directories are created.
pub fn atomic_copy(src: &Path, dst: &Path) -> io::Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    let dir = dst.parent().unwrap_or_else(|| Path::new("."));
    let tmp = tempfile::NamedTempFile::new_in(dir)?;
    fs::copy(src, tmp.path())?;
    tmp.persist(dst).map_err(|e| e.error)?;
    Ok(())
}

/// Calculates the SHA-256 checksum of a file, formatted as `sha256:<hex>`.
pub fn file_checksum(path: &Path) -> io::Result<String> {
    let content = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(format!("sha256:{}", hex::encode(hasher.finalize())))
}

/// Normalizes a path lexically, resolving `.` and `..` components without
/// touching the filesystem.
///
/// `..` components that would climb above the start of the path are dropped,
/// which makes the result safe to use for containment checks.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root (or escaping a relative path) is dropped,
                // which keeps the result usable for containment checks
                if !matches!(
                    result.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                ) {
                    result.pop();
                }
            }
            other => result.push(other),
        }
    }
    result
}

/// Returns `true` if `path`, normalized, stays within `base`.
///
/// `path` may be relative (resolved against `base`) or absolute.
pub fn is_safe_path(base: &Path, path: &Path) -> bool {
    let full = if path.is_absolute() { path.to_path_buf() } else { base.join(path) };
    normalize_path(&full).starts_with(normalize_path(base))
}

/// Computes the relative path from `from_dir` to `to`.
///
/// Both paths must be absolute. Used to create relative symlink targets.
pub fn relative_path(from_dir: &Path, to: &Path) -> PathBuf {
    let from = normalize_path(from_dir);
    let to = normalize_path(to);

    let from_components: Vec<_> = from.components().collect();
    let to_components: Vec<_> = to.components().collect();

    let common = from_components
        .iter()
        .zip(to_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common..from_components.len() {
        result.push("..");
    }
    for component in &to_components[common..] {
        result.push(component);
    }
    if result.as_os_str().is_empty() {
        result.push(".");
    }
    result
}

/// Removes now-empty directories from `start` upward, stopping at (and never
/// removing) `root`.
///
/// Used after uninstalling a package so that directory skeletons it created
/// do not linger in the application root. Non-empty directories stop the
/// walk; unrelated files are never touched.
pub fn prune_empty_dirs(root: &Path, start: &Path) -> io::Result<()> {
    let root = normalize_path(root);
    let mut current = normalize_path(start);
    while current.starts_with(&root) && current != root {
        match fs::read_dir(&current) {
            Ok(mut entries) => {
                if entries.next().is_some() {
                    break;
                }
                fs::remove_dir(&current)?;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }
    Ok(())
}
