//! On-disk cache of downloaded datasets.
//!
//! One file per feature type, named after the type without its namespace
//! prefix. A dataset is downloaded only when its file is missing.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Namespace prefix of the Helsinki open-data feature types.
pub const NAMESPACE_PREFIX: &str = "avoindata:";

const EXTENSION: &str = "geojson";

/// Directory holding cached datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetCache {
    dir: PathBuf,
}

impl DatasetCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File stem for a feature type: `avoindata:Maavesi_merialue` → `Maavesi_merialue`.
    pub fn file_name(type_name: &str) -> &str {
        type_name.strip_prefix(NAMESPACE_PREFIX).unwrap_or(type_name)
    }

    /// Cache path of a feature type.
    pub fn path_for(&self, type_name: &str) -> PathBuf {
        self.dir
            .join(Self::file_name(type_name))
            .with_extension(EXTENSION)
    }

    pub fn is_cached(&self, type_name: &str) -> bool {
        self.path_for(type_name).is_file()
    }

    /// Store a downloaded body.
    ///
    /// The body is written next to the target and renamed into place, so a
    /// failed download never leaves a partial file that looks cached.
    pub fn store(&self, type_name: &str, body: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(type_name);
        let partial = path.with_extension(format!("{EXTENSION}.part"));
        fs::write(&partial, body)?;
        if let Err(e) = fs::rename(&partial, &path) {
            let _ = fs::remove_file(&partial);
            return Err(e.into());
        }
        Ok(path)
    }
}
