use crate::domain::model::{MalformedPolicy, Signature};
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

pub trait Storage {
    /// Regular files directly inside the scan root whose names match `pattern`,
    /// sorted by path.
    fn list_candidates(&self, pattern: &glob::Pattern) -> Result<Vec<PathBuf>>;
    fn read_file(&self, path: &Path) -> std::io::Result<Vec<u8>>;
    /// Replaces the whole content of `path`.
    fn write_file(&self, path: &Path, data: &[u8]) -> std::io::Result<()>;
}

pub trait ConfigProvider {
    fn directory(&self) -> &Path;
    fn pattern(&self) -> &str;
    fn signatures(&self) -> &[Signature];
    fn dry_run(&self) -> bool;
    fn backup(&self) -> bool;
    fn on_malformed(&self) -> MalformedPolicy;
}
