/// Metadata tree scanner for authority defaults.
///
/// Layout:
///   <root>/<religion>/authority.toml               religion default
///   <root>/<religion>/<collection>/authority.toml  collection default
///
/// Each file carries `authority = <int>` and may carry `name = "..."` to override
/// the directory name as the lookup key. Absence of the root, of a file or of the
/// `authority` key is normal and simply contributes nothing.

use std::fs;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Format, Toml},
};
use serde::Deserialize;

use super::{AuthorityConfig, MAX_AUTHORITY, MIN_AUTHORITY};

pub const METADATA_FILE: &str = "authority.toml";

#[derive(Debug, Deserialize)]
struct MetadataFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    authority: Option<i64>,
}

/// Scan `root` and build a fresh `AuthorityConfig`.
pub fn load_authority_config(root: &Path) -> AuthorityConfig {
    let mut config = AuthorityConfig::new();

    for religion_dir in subdirectories(root) {
        let religion_meta = read_metadata(&religion_dir.join(METADATA_FILE));
        let religion = display_name(&religion_dir, religion_meta.as_ref());

        if let Some(authority) = religion_meta.as_ref().and_then(|m| m.authority) {
            warn_if_clamped(&religion_dir, authority);
            config = config.with_religion(religion.clone(), authority);
        }

        for collection_dir in subdirectories(&religion_dir) {
            let Some(meta) = read_metadata(&collection_dir.join(METADATA_FILE)) else {
                continue;
            };
            let Some(authority) = meta.authority else {
                continue;
            };
            warn_if_clamped(&collection_dir, authority);
            let collection = display_name(&collection_dir, Some(&meta));
            config = config.with_collection(religion.clone(), collection, authority);
        }
    }

    tracing::debug!(
        root = %root.display(),
        religions = config.religion_count(),
        collections = config.collection_count(),
        "Loaded authority metadata"
    );
    config
}

fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "Metadata directory not readable");
            return Vec::new();
        }
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    // Deterministic order so duplicate display names resolve the same way every load
    dirs.sort();
    dirs
}

fn read_metadata(path: &Path) -> Option<MetadataFile> {
    if !path.is_file() {
        return None;
    }
    match Figment::from(Toml::file(path)).extract::<MetadataFile>() {
        Ok(meta) => Some(meta),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable metadata file");
            None
        }
    }
}

fn display_name(dir: &Path, meta: Option<&MetadataFile>) -> String {
    meta.and_then(|m| m.name.clone())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| {
            dir.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
}

fn warn_if_clamped(dir: &Path, authority: i64) {
    if authority < MIN_AUTHORITY as i64 || authority > MAX_AUTHORITY as i64 {
        tracing::warn!(
            dir = %dir.display(),
            authority,
            "Authority outside 1-10, clamping"
        );
    }
}
