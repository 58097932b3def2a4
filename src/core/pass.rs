use crate::core::detect::{decode_payload, detect};
use crate::core::{ConfigProvider, Storage};
use crate::domain::model::{FileOutcome, MalformedPolicy, PassReport};
use crate::utils::error::{DecodeError, Result};
use std::path::{Path, PathBuf};

/// One linear pass over the candidate files of a directory.
pub struct DecoderPass<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    echo: bool,
}

impl<S: Storage, C: ConfigProvider> DecoderPass<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            echo: true,
        }
    }

    /// Turns the per-file stdout lines on or off. The returned report is the
    /// same either way.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn run(&self) -> Result<PassReport> {
        let pattern = glob::Pattern::new(self.config.pattern())?;

        // Collected up front: files rewritten below are never revisited.
        let candidates = self.storage.list_candidates(&pattern)?;
        tracing::info!(
            "Scanning {} ({} candidate files matching '{}')",
            self.config.directory().display(),
            candidates.len(),
            self.config.pattern()
        );
        if self.config.dry_run() {
            tracing::info!("Dry run: no files will be written");
        }

        let mut report = PassReport::default();
        for path in candidates {
            let outcome = self.process_file(&path)?;
            let entry = report.push(path, outcome);
            if self.echo {
                println!("{}", entry);
            }
        }

        tracing::info!(
            "Pass finished: {} decoded, {} skipped",
            report.decoded(),
            report.skipped()
        );
        Ok(report)
    }

    /// Classifies one file and rewrites it when it holds a recognised payload.
    /// Only a malformed payload under [`MalformedPolicy::Abort`] is an error.
    pub fn process_file(&self, path: &Path) -> Result<FileOutcome> {
        let original = match self.storage.read_file(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!("Cannot read {}: {}", path.display(), e);
                return Ok(FileOutcome::SkippedUnreadable {
                    reason: format!("{:?}", e.kind()),
                });
            }
        };

        let text = match std::str::from_utf8(&original) {
            Ok(text) => text.trim(),
            Err(e) => {
                tracing::debug!(
                    "{} is not text (invalid UTF-8 after {} bytes), assuming binary",
                    path.display(),
                    e.valid_up_to()
                );
                return Ok(FileOutcome::SkippedUnreadable {
                    reason: "InvalidUtf8".to_string(),
                });
            }
        };

        let Some(signature) = detect(text, self.config.signatures()) else {
            return Ok(FileOutcome::SkippedUnrecognized);
        };
        tracing::debug!(
            "{} matches '{}' ({})",
            path.display(),
            signature.prefix,
            signature.kind
        );

        let decoded = match decode_payload(text) {
            Ok(decoded) => decoded,
            Err(e) => match self.config.on_malformed() {
                MalformedPolicy::Skip => {
                    tracing::warn!("Malformed base64 in {}: {}", path.display(), e);
                    return Ok(FileOutcome::SkippedMalformed {
                        reason: e.to_string(),
                    });
                }
                MalformedPolicy::Abort => {
                    return Err(DecodeError::MalformedPayload {
                        path: path.to_path_buf(),
                        source: e,
                    });
                }
            },
        };

        if !decoded.starts_with(signature.kind.magic_bytes()) {
            tracing::warn!(
                "{} decoded to {} bytes without a {} header",
                path.display(),
                decoded.len(),
                signature.kind
            );
        }

        if self.config.dry_run() {
            return Ok(FileOutcome::WouldDecode {
                kind: signature.kind,
                bytes: decoded.len(),
            });
        }

        if self.config.backup() {
            let backup = backup_path_for(path);
            if let Err(e) = self.storage.write_file(&backup, &original) {
                tracing::error!("Backup of {} failed: {}", path.display(), e);
                return Ok(FileOutcome::WriteFailed {
                    reason: format!("backup: {}", e),
                });
            }
            tracing::debug!("Backed up to {}", backup.display());
        }

        if let Err(e) = self.storage.write_file(path, &decoded) {
            tracing::error!("Rewriting {} failed: {}", path.display(), e);
            return Ok(FileOutcome::WriteFailed {
                reason: e.to_string(),
            });
        }

        Ok(FileOutcome::Decoded {
            kind: signature.kind,
            bytes: decoded.len(),
        })
    }
}

/// `<name>.bak` next to `path`.
pub fn backup_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}

/// The file a `<name>.bak` path was made from, if `path` has that shape.
pub fn backed_up_original(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let original = name.strip_suffix(".bak").filter(|stem| !stem.is_empty())?;
    Some(path.with_file_name(original))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ImageKind, Signature};
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::io;

    struct MemoryStorage {
        files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
        unreadable: Vec<PathBuf>,
        fail_writes: bool,
    }

    impl MemoryStorage {
        fn with(files: &[(&str, &[u8])]) -> Self {
            Self {
                files: RefCell::new(
                    files
                        .iter()
                        .map(|(p, d)| (PathBuf::from(p), d.to_vec()))
                        .collect(),
                ),
                unreadable: Vec::new(),
                fail_writes: false,
            }
        }

        fn get(&self, path: &str) -> Option<Vec<u8>> {
            self.files.borrow().get(Path::new(path)).cloned()
        }
    }

    impl Storage for &MemoryStorage {
        fn list_candidates(&self, pattern: &glob::Pattern) -> Result<Vec<PathBuf>> {
            Ok(self
                .files
                .borrow()
                .keys()
                .filter(|p| pattern.matches(&p.to_string_lossy()))
                .cloned()
                .collect())
        }

        fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
            if self.unreadable.iter().any(|p| p == path) {
                return Err(io::Error::from(io::ErrorKind::PermissionDenied));
            }
            self.files
                .borrow()
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }

        fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
            if self.fail_writes {
                return Err(io::Error::from(io::ErrorKind::PermissionDenied));
            }
            self.files
                .borrow_mut()
                .insert(path.to_path_buf(), data.to_vec());
            Ok(())
        }
    }

    struct TestConfig {
        signatures: Vec<Signature>,
        dry_run: bool,
        backup: bool,
        on_malformed: MalformedPolicy,
    }

    impl Default for TestConfig {
        fn default() -> Self {
            Self {
                signatures: Signature::defaults(),
                dry_run: false,
                backup: false,
                on_malformed: MalformedPolicy::Skip,
            }
        }
    }

    impl ConfigProvider for TestConfig {
        fn directory(&self) -> &Path {
            Path::new("mem")
        }
        fn pattern(&self) -> &str {
            "*.png"
        }
        fn signatures(&self) -> &[Signature] {
            &self.signatures
        }
        fn dry_run(&self) -> bool {
            self.dry_run
        }
        fn backup(&self) -> bool {
            self.backup
        }
        fn on_malformed(&self) -> MalformedPolicy {
            self.on_malformed
        }
    }

    #[test]
    fn test_decodes_png_payload() {
        // "\x89PNG\r\n\x1a\n"
        let storage = MemoryStorage::with(&[("a.png", b"  iVBORw0KGgo=\n")]);
        let pass = DecoderPass::new(&storage, TestConfig::default()).with_echo(false);

        let report = pass.run().unwrap();

        assert_eq!(report.decoded(), 1);
        assert_eq!(
            storage.get("a.png").unwrap(),
            vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]
        );
    }

    #[test]
    fn test_binary_and_plain_text_are_skipped() {
        let storage = MemoryStorage::with(&[
            ("bin.png", &[0x89u8, 0x50, 0x4E, 0x47, 0xFF][..]),
            ("note.png", &b"just some notes"[..]),
        ]);
        let pass = DecoderPass::new(&storage, TestConfig::default()).with_echo(false);

        let report = pass.run().unwrap();

        assert_eq!(
            report.outcome_for(Path::new("bin.png")),
            Some(&FileOutcome::SkippedUnreadable {
                reason: "InvalidUtf8".to_string()
            })
        );
        assert_eq!(
            report.outcome_for(Path::new("note.png")),
            Some(&FileOutcome::SkippedUnrecognized)
        );
        assert_eq!(storage.get("note.png").unwrap(), b"just some notes");
    }

    #[test]
    fn test_malformed_payload_policy() {
        let storage = MemoryStorage::with(&[("bad.png", b"/9j/!!not-base64")]);

        let pass = DecoderPass::new(&storage, TestConfig::default()).with_echo(false);
        let outcome = pass.process_file(Path::new("bad.png")).unwrap();
        assert!(matches!(outcome, FileOutcome::SkippedMalformed { .. }));

        let config = TestConfig {
            on_malformed: MalformedPolicy::Abort,
            ..TestConfig::default()
        };
        let pass = DecoderPass::new(&storage, config).with_echo(false);
        let err = pass.run().unwrap_err();
        assert!(matches!(err, DecodeError::MalformedPayload { .. }));
        assert_eq!(storage.get("bad.png").unwrap(), b"/9j/!!not-base64");
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let storage = MemoryStorage::with(&[("a.png", b"/9j/4A==")]);
        let config = TestConfig {
            dry_run: true,
            ..TestConfig::default()
        };
        let pass = DecoderPass::new(&storage, config).with_echo(false);

        let outcome = pass.process_file(Path::new("a.png")).unwrap();

        assert_eq!(
            outcome,
            FileOutcome::WouldDecode {
                kind: ImageKind::Jpeg,
                bytes: 4
            }
        );
        assert_eq!(storage.get("a.png").unwrap(), b"/9j/4A==");
    }

    #[test]
    fn test_backup_keeps_original_text() {
        let storage = MemoryStorage::with(&[("a.png", b"/9j/4A==")]);
        let config = TestConfig {
            backup: true,
            ..TestConfig::default()
        };
        let pass = DecoderPass::new(&storage, config).with_echo(false);

        pass.run().unwrap();

        assert_eq!(storage.get("a.png.bak").unwrap(), b"/9j/4A==");
        assert_eq!(storage.get("a.png").unwrap(), vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[test]
    fn test_write_failure_is_reported_not_fatal() {
        let mut storage = MemoryStorage::with(&[("a.png", b"/9j/4A=="), ("b.png", b"/9j/4A==")]);
        storage.fail_writes = true;
        let pass = DecoderPass::new(&storage, TestConfig::default()).with_echo(false);

        let report = pass.run().unwrap();

        assert_eq!(report.files.len(), 2);
        assert!(report
            .files
            .iter()
            .all(|f| matches!(f.outcome, FileOutcome::WriteFailed { .. })));
    }

    #[test]
    fn test_read_failure_is_reported_by_error_kind() {
        let mut storage = MemoryStorage::with(&[("a.png", b"/9j/4A=="), ("b.png", b"/9j/4A==")]);
        storage.unreadable.push(PathBuf::from("a.png"));
        let pass = DecoderPass::new(&storage, TestConfig::default()).with_echo(false);

        let report = pass.run().unwrap();

        assert_eq!(
            report.outcome_for(Path::new("a.png")),
            Some(&FileOutcome::SkippedUnreadable {
                reason: "PermissionDenied".to_string()
            })
        );
        assert!(report.outcome_for(Path::new("b.png")).unwrap().is_decoded());
        assert_eq!(storage.get("a.png").unwrap(), b"/9j/4A==");

        // listed, then gone before it was read
        let outcome = pass.process_file(Path::new("vanished.png")).unwrap();
        assert_eq!(
            outcome,
            FileOutcome::SkippedUnreadable {
                reason: "NotFound".to_string()
            }
        );
    }

    #[test]
    fn test_backup_path() {
        assert_eq!(
            backup_path_for(Path::new("assets/logo.png")),
            PathBuf::from("assets/logo.png.bak")
        );
        assert_eq!(
            backed_up_original(Path::new("assets/logo.png.bak")),
            Some(PathBuf::from("assets/logo.png"))
        );
        assert_eq!(backed_up_original(Path::new("assets/logo.png")), None);
        assert_eq!(backed_up_original(Path::new("assets/.bak")), None);
    }
}
