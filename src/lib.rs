pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, toml_config::TomlConfig, ScanConfig};
pub use core::pass::DecoderPass;
pub use domain::model::{FileOutcome, ImageKind, MalformedPolicy, PassReport, Signature};
pub use utils::error::{DecodeError, Result};
