//! Magento Connect `package.xml` manifest parser.
//!
//! The manifest enumerates packaged files under `<contents>` as nested
//! `<target name="...">`, `<dir name="...">`, and `<file name="...">`
//! elements. Each target name translates to a fixed base directory in the
//! application root (`magelocal` to `app/code/local`, `magedesign` to
//! `app/design`, and so on); the file's path below the target mirrors its
//! layout inside the package, so every file maps onto itself relative to the
//! translated base.
//!
//! Unknown target names and unparsable XML are [`ManifestParse`] errors, as
//! are declared files missing from the package source tree.
//!
//! [`ManifestParse`]: crate::core::MagedeployError::ManifestParse

use crate::core::{MagedeployError, Result};
use crate::mapping::{Mapping, MappingEntry};
use crate::package::Package;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Translates a manifest target name to its application-root-relative base
/// directory. `mage` and `mageweb` map onto the root itself.
fn target_base(name: &str) -> Option<&'static str> {
    let base = match name {
        "magelocal" => "app/code/local",
        "magecommunity" => "app/code/community",
        "magecore" => "app/code/core",
        "magedesign" => "app/design",
        "mageetc" => "app/etc",
        "magelib" => "lib",
        "magelocale" => "app/locale",
        "magemedia" => "media",
        "mageskin" => "skin",
        "magetest" => "tests",
        "mage" | "mageweb" => "",
        _ => return None,
    };
    Some(base)
}

fn manifest_error(path: &Path, reason: impl ToString) -> MagedeployError {
    MagedeployError::ManifestParse {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn name_attribute(element: &BytesStart<'_>, path: &Path) -> Result<String> {
    let attr = element
        .try_get_attribute("name")
        .map_err(|e| manifest_error(path, e))?
        .ok_or_else(|| {
            manifest_error(
                path,
                format!(
                    "<{}> element without a 'name' attribute",
                    String::from_utf8_lossy(element.name().as_ref())
                ),
            )
        })?;
    let value = attr.unescape_value().map_err(|e| manifest_error(path, e))?;
    Ok(value.into_owned())
}

pub fn parse(package: &Package) -> Result<Mapping> {
    let manifest_name = package.extra.package_xml.as_deref().unwrap_or("package.xml");
    let path = package.source_dir.join(manifest_name);
    let content = fs::read_to_string(&path)
        .map_err(|e| MagedeployError::fs("read", path.display(), e))?;

    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut in_contents = false;
    // Base directory of the enclosing <target>, None outside one
    let mut base: Option<&'static str> = None;
    // Stack of <dir name> components inside the current target
    let mut dirs: Vec<String> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| manifest_error(&path, e))?;
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"contents" => in_contents = true,
                b"target" if in_contents => {
                    let target = name_attribute(&e, &path)?;
                    base = Some(target_base(&target).ok_or_else(|| {
                        manifest_error(&path, format!("unknown target type '{target}'"))
                    })?);
                    dirs.clear();
                }
                b"dir" if base.is_some() => {
                    let dir = name_attribute(&e, &path)?;
                    if dir != "." && dir != "/" {
                        dirs.push(dir);
                    } else {
                        // placeholder for the target root, still needs a
                        // matching pop on </dir>
                        dirs.push(String::new());
                    }
                }
                b"file" => {
                    if let Some(base) = base {
                        entries.push(file_entry(package, &path, base, &dirs, &e)?);
                    }
                }
                _ => {}
            },
            Event::Empty(e) => {
                if e.name().as_ref() == b"file" {
                    if let Some(base) = base {
                        entries.push(file_entry(package, &path, base, &dirs, &e)?);
                    }
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"contents" => in_contents = false,
                b"target" => {
                    base = None;
                    dirs.clear();
                }
                b"dir" => {
                    dirs.pop();
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    debug!(package = %package.name, entries = entries.len(), "parsed package.xml manifest");
    Ok(Mapping::from_entries(entries))
}

fn file_entry(
    package: &Package,
    manifest_path: &Path,
    base: &str,
    dirs: &[String],
    element: &BytesStart<'_>,
) -> Result<MappingEntry> {
    let file = name_attribute(element, manifest_path)?;

    let mut rel = String::from(base);
    for dir in dirs.iter().filter(|d| !d.is_empty()) {
        if !rel.is_empty() {
            rel.push('/');
        }
        rel.push_str(dir);
    }
    if !rel.is_empty() {
        rel.push('/');
    }
    rel.push_str(&file);

    if !package.source_dir.join(&rel).exists() {
        return Err(manifest_error(
            manifest_path,
            format!("declared file '{rel}' does not exist in the package"),
        ));
    }
    Ok(MappingEntry::new(&rel, &rel))
}
