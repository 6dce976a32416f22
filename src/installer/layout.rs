//! Artifact classification and archive expansion.

use crate::core::{PackageCategory, Result, UnhacsError};
use crate::manifest::Package;
use crate::utils::fs::ensure_dir;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::warn;
use zip::ZipArchive;

/// Local file header signature of a zip archive.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// How a fetched artifact is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactLayout {
    /// One file, installed as-is
    SingleFile,
    /// A zip archive, expanded before install
    Archive,
}

/// Classify an artifact by its declared filename and leading bytes.
///
/// Rules, first match wins:
/// 1. no content → [`UnhacsError::EmptyArtifact`]
/// 2. `.zip` extension without the zip signature → [`UnhacsError::ExtractionFailed`]
/// 3. zip signature, whatever the name → [`ArtifactLayout::Archive`]
/// 4. anything else → [`ArtifactLayout::SingleFile`]
pub fn classify(filename: &str, bytes: &[u8]) -> Result<ArtifactLayout> {
    if bytes.is_empty() {
        return Err(UnhacsError::EmptyArtifact {
            filename: filename.to_string(),
        });
    }

    let has_zip_extension =
        Path::new(filename).extension().is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    let has_zip_magic = bytes.starts_with(ZIP_MAGIC);

    match (has_zip_extension, has_zip_magic) {
        (true, false) => Err(extraction_failed(filename, "not a zip archive")),
        (_, true) => Ok(ArtifactLayout::Archive),
        (false, false) => Ok(ArtifactLayout::SingleFile),
    }
}

/// Expand a zip archive into `dest`, returning the number of files written.
///
/// Entries whose path would escape `dest` abort the extraction.
pub fn extract_zip(filename: &str, bytes: &[u8], dest: &Path) -> Result<usize> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| extraction_failed(filename, e))?;
    ensure_dir(dest)?;

    let mut written = 0;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| extraction_failed(filename, e))?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(extraction_failed(filename, format!("unsafe entry path '{}'", entry.name())));
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            ensure_dir(&out_path)?;
            continue;
        }

        let mut content = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry
            .read_to_end(&mut content)
            .map_err(|e| extraction_failed(filename, format!("{}: {e}", entry.name())))?;

        if let Some(parent) = out_path.parent() {
            ensure_dir(parent)?;
        }
        std::fs::write(&out_path, &content)
            .map_err(|e| UnhacsError::fs("writing extracted file", &out_path, e))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode((mode & 0o777) | 0o600);
            std::fs::set_permissions(&out_path, permissions)
                .map_err(|e| UnhacsError::fs("setting permissions on", &out_path, e))?;
        }

        written += 1;
    }

    if written == 0 {
        return Err(extraction_failed(filename, "archive contains no files"));
    }
    Ok(written)
}

/// Find the directory inside an expanded archive that holds the package.
///
/// - a root with exactly one entry that is a directory is flattened one level
///   (release zipballs nest everything under `<owner>-<repo>-<sha>/`)
/// - for integrations, a `custom_components/` directory at that root selects the
///   sub-directory named after the package, or else the first one by name
///
/// Home Assistant only loads an integration from a directory named after its
/// domain, so picking a differently named component logs a warning.
pub fn locate_package_root(extracted: &Path, package: &Package) -> Result<PathBuf> {
    let mut root = extracted.to_path_buf();

    let entries = read_dir_sorted(&root)?;
    if let [only] = entries.as_slice()
        && only.is_dir()
    {
        root = only.clone();
    }

    if package.category == PackageCategory::Integration {
        let components = root.join("custom_components");
        if components.is_dir() {
            let candidates: Vec<PathBuf> =
                read_dir_sorted(&components)?.into_iter().filter(|p| p.is_dir()).collect();
            let named = candidates
                .iter()
                .find(|p| p.file_name().is_some_and(|n| n == package.name.as_str()));
            if let Some(chosen) = named.or_else(|| candidates.first()) {
                if let Some(component) = renamed_component(chosen, package) {
                    warn!(
                        "{} ships component '{}' but installs as '{}'; Home Assistant will not load it. \
                         Re-add it with --name {}",
                        package.repo, component, package.name, component
                    );
                }
                root = chosen.clone();
            }
        }
    }

    Ok(root)
}

/// Name of the chosen component directory when it is not `package.name`.
fn renamed_component(chosen: &Path, package: &Package) -> Option<String> {
    let component = chosen.file_name()?.to_string_lossy();
    (component != package.name.as_str()).then(|| component.into_owned())
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = std::fs::read_dir(dir)
        .and_then(|iter| iter.map(|entry| entry.map(|e| e.path())).collect::<std::io::Result<Vec<_>>>())
        .map_err(|e| UnhacsError::fs("listing", dir, e))?;
    entries.sort();
    Ok(entries)
}

fn extraction_failed(filename: &str, reason: impl std::fmt::Display) -> UnhacsError {
    UnhacsError::ExtractionFailed {
        filename: filename.to_string(),
        reason: reason.to_string(),
    }
}
