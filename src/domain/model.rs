use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Image format a base64 payload is expected to decode into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageKind {
    /// Leading bytes of a binary file of this kind.
    pub fn magic_bytes(&self) -> &'static [u8] {
        match self {
            ImageKind::Jpeg => &[0xFF, 0xD8, 0xFF],
            ImageKind::Png => &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A],
            ImageKind::Gif => b"GIF8",
            ImageKind::Webp => b"RIFF",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpeg",
            ImageKind::Png => "png",
            ImageKind::Gif => "gif",
            ImageKind::Webp => "webp",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(ImageKind::Jpeg),
            "png" => Ok(ImageKind::Png),
            "gif" => Ok(ImageKind::Gif),
            "webp" => Ok(ImageKind::Webp),
            other => Err(format!(
                "unknown image kind '{}', expected one of: jpeg, png, gif, webp",
                other
            )),
        }
    }
}

/// A base64 text prefix and the image kind it identifies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub prefix: String,
    pub kind: ImageKind,
}

impl Signature {
    pub fn new(prefix: impl Into<String>, kind: ImageKind) -> Self {
        Self {
            prefix: prefix.into(),
            kind,
        }
    }

    /// `/9j/` (JPEG SOI marker) and `iVBORw0` (PNG header), in that order.
    pub fn defaults() -> Vec<Signature> {
        vec![
            Signature::new("/9j/", ImageKind::Jpeg),
            Signature::new("iVBORw0", ImageKind::Png),
        ]
    }
}

/// Parses the `PREFIX=KIND` form used on the command line.
impl FromStr for Signature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // prefixes may contain '=' only as base64 padding, so split on the last one
        let (prefix, kind) = s
            .rsplit_once('=')
            .ok_or_else(|| format!("expected PREFIX=KIND, got '{}'", s))?;
        if prefix.is_empty() {
            return Err("signature prefix cannot be empty".to_string());
        }
        Ok(Signature::new(prefix, kind.parse()?))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Report the file and carry on with the pass.
    #[default]
    Skip,
    /// Stop the pass with an error.
    Abort,
}

/// What happened to a single candidate file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    Decoded { kind: ImageKind, bytes: usize },
    WouldDecode { kind: ImageKind, bytes: usize },
    SkippedUnreadable { reason: String },
    SkippedUnrecognized,
    SkippedMalformed { reason: String },
    WriteFailed { reason: String },
}

impl FileOutcome {
    pub fn is_decoded(&self) -> bool {
        matches!(self, FileOutcome::Decoded { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// The console line for one file.
impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.display();
        match &self.outcome {
            FileOutcome::Decoded { .. } => write!(f, "Decoding {}", path),
            FileOutcome::WouldDecode { kind, .. } => {
                write!(f, "Would decode {} ({})", path, kind)
            }
            FileOutcome::SkippedUnreadable { reason } => write!(f, "Skipping {}: {}", path, reason),
            FileOutcome::SkippedUnrecognized => {
                write!(f, "Skipping {}: Not recognized as base64", path)
            }
            FileOutcome::SkippedMalformed { reason } => {
                write!(f, "Skipping {}: MalformedBase64 ({})", path, reason)
            }
            FileOutcome::WriteFailed { reason } => {
                write!(f, "Skipping {}: WriteFailed ({})", path, reason)
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PassReport {
    pub files: Vec<FileReport>,
}

impl PassReport {
    pub fn push(&mut self, path: PathBuf, outcome: FileOutcome) -> &FileReport {
        self.files.push(FileReport { path, outcome });
        &self.files[self.files.len() - 1]
    }

    pub fn decoded(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.is_decoded()).count()
    }

    pub fn skipped(&self) -> usize {
        self.files.len() - self.decoded()
    }

    pub fn outcome_for(&self, path: &std::path::Path) -> Option<&FileOutcome> {
        self.files
            .iter()
            .find(|f| f.path == path)
            .map(|f| &f.outcome)
    }
}
