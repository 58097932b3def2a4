use crate::config::{ScanConfig, DEFAULT_DIRECTORY, DEFAULT_PATTERN};
use crate::domain::model::{MalformedPolicy, Signature};
use crate::utils::error::{DecodeError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// On-disk configuration. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub scan: Option<ScanSection>,
    pub signatures: Option<Vec<Signature>>,
    pub write: Option<WriteSection>,
    pub error_handling: Option<ErrorHandlingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanSection {
    pub directory: Option<PathBuf>,
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WriteSection {
    pub dry_run: Option<bool>,
    pub backup: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorHandlingSection {
    pub on_malformed: Option<MalformedPolicy>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| DecodeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables stay as
    /// written.
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static regex is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn into_scan_config(self) -> ScanConfig {
        let scan = self.scan.unwrap_or_default();
        let write = self.write.unwrap_or_default();
        let error_handling = self.error_handling.unwrap_or_default();

        ScanConfig {
            directory: scan
                .directory
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DIRECTORY)),
            pattern: scan.pattern.unwrap_or_else(|| DEFAULT_PATTERN.to_string()),
            signatures: self.signatures.unwrap_or_else(Signature::defaults),
            dry_run: write.dry_run.unwrap_or(false),
            backup: write.backup.unwrap_or(false),
            on_malformed: error_handling.on_malformed.unwrap_or_default(),
        }
    }
}

/// Checks the fields the file sets. The scan directory is only checked for
/// shape here; it may be overridden before the pass runs.
impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(scan) = &self.scan {
            if let Some(directory) = &scan.directory {
                validation::validate_path("scan.directory", &directory.to_string_lossy())?;
            }
            if let Some(pattern) = &scan.pattern {
                validation::validate_file_pattern("scan.pattern", pattern)?;
            }
        }

        if let Some(signatures) = &self.signatures {
            validation::validate_signatures("signatures", signatures)?;
        }

        Ok(())
    }
}
