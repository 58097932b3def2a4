use crate::core::pass::backed_up_original;
use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Hidden files only match patterns that start with a literal dot.
const CANDIDATE_MATCH: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: true,
};

/// Storage over one local directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for LocalStorage {
    fn list_candidates(&self, pattern: &glob::Pattern) -> Result<Vec<PathBuf>> {
        let mut candidates = Vec::new();

        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            let path = entry.path();

            // follows symlinks, like opening the file would
            if !path.is_file() {
                continue;
            }

            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                tracing::debug!("Ignoring non UTF-8 file name {}", path.display());
                continue;
            };

            if !pattern.matches_with(name, CANDIDATE_MATCH) {
                continue;
            }

            // our own backups hold the text the pass replaced
            if backed_up_original(&path).is_some_and(|original| original.is_file()) {
                tracing::debug!("Ignoring backup {}", path.display());
                continue;
            }

            candidates.push(path);
        }

        candidates.sort();
        Ok(candidates)
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    /// Writes to a temporary file in the same directory, then renames it over
    /// `path`. Existing permissions are carried over.
    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(data)?;
        temp.as_file().sync_all()?;

        if let Ok(metadata) = fs::metadata(path) {
            temp.as_file().set_permissions(metadata.permissions())?;
        }

        temp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}
