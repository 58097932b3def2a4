pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::model::{MalformedPolicy, Signature};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::path::{Path, PathBuf};

pub const DEFAULT_DIRECTORY: &str = "src/assets";
pub const DEFAULT_PATTERN: &str = "*.png";

/// Fully resolved settings for one decoder pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub directory: PathBuf,
    pub pattern: String,
    pub signatures: Vec<Signature>,
    pub dry_run: bool,
    pub backup: bool,
    pub on_malformed: MalformedPolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_DIRECTORY),
            pattern: DEFAULT_PATTERN.to_string(),
            signatures: Signature::defaults(),
            dry_run: false,
            backup: false,
            on_malformed: MalformedPolicy::Skip,
        }
    }
}

impl ScanConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }
}

impl Validate for ScanConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_directory("scan.directory", &self.directory)?;
        validation::validate_file_pattern("scan.pattern", &self.pattern)?;
        validation::validate_signatures("signatures", &self.signatures)?;
        Ok(())
    }
}

impl ConfigProvider for ScanConfig {
    fn directory(&self) -> &Path {
        &self.directory
    }

    fn pattern(&self) -> &str {
        &self.pattern
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

#[cfg(feature = "cli")]
pub use self::args::CliConfig;

#[cfg(feature = "cli")]
mod args {
    use super::toml_config::TomlConfig;
    use super::ScanConfig;
    use crate::domain::model::{MalformedPolicy, Signature};
    use crate::utils::error::Result;
    use crate::utils::validation::Validate;
    use clap::Parser;
    use std::path::PathBuf;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "asset-decode")]
    #[command(about = "Rewrite image assets saved as base64 text back into binary files")]
    pub struct CliConfig {
        /// Directory to scan (not recursive) [default: src/assets]
        #[arg(long)]
        pub dir: Option<PathBuf>,

        /// File-name glob selecting candidate files [default: *.png]
        #[arg(long)]
        pub pattern: Option<String>,

        /// Recognised payload prefix, e.g. '/9j/=jpeg'. Replaces the defaults
        #[arg(long = "signature", value_name = "PREFIX=KIND")]
        pub signatures: Vec<Signature>,

        /// TOML configuration file; flags given here override it
        #[arg(short, long)]
        pub config: Option<PathBuf>,

        /// Report what would be decoded without writing anything
        #[arg(long)]
        pub dry_run: bool,

        /// Keep a '<name>.bak' copy of every rewritten file
        #[arg(long)]
        pub backup: bool,

        /// Stop the pass at the first malformed payload
        #[arg(long)]
        pub strict: bool,

        /// Print the pass report as JSON instead of one line per file
        #[arg(long)]
        pub json: bool,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    impl CliConfig {
        /// Merges the optional config file with the flags on top.
        pub fn resolve(&self) -> Result<ScanConfig> {
            let mut config = match &self.config {
                Some(path) => {
                    tracing::info!("Loading configuration from {}", path.display());
                    let file = TomlConfig::from_file(path)?;
                    file.validate()?;
                    file.into_scan_config()
                }
                None => ScanConfig::default(),
            };

            if let Some(dir) = &self.dir {
                config.directory = dir.clone();
            }
            if let Some(pattern) = &self.pattern {
                config.pattern = pattern.clone();
            }
            if !self.signatures.is_empty() {
                config.signatures = self.signatures.clone();
            }
            config.dry_run |= self.dry_run;
            config.backup |= self.backup;
            if self.strict {
                config.on_malformed = MalformedPolicy::Abort;
            }

            Ok(config)
        }
    }

}
