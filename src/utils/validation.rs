use crate::core::detect::is_base64_prefix;
use crate::domain::model::Signature;
use crate::utils::error::{DecodeError, Result};
use std::collections::HashSet;
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(DecodeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(DecodeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_directory(field_name: &str, path: &Path) -> Result<()> {
    validate_path(field_name, &path.to_string_lossy())?;

    if !path.exists() {
        return Err(DecodeError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} '{}' does not exist", field_name, path.display()),
        )));
    }

    if !path.is_dir() {
        return Err(DecodeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.display().to_string(),
            reason: "Not a directory".to_string(),
        });
    }
    Ok(())
}

/// The pattern is matched against bare file names, so it cannot hold a
/// path separator.
pub fn validate_file_pattern(field_name: &str, pattern: &str) -> Result<()> {
    validate_non_empty_string(field_name, pattern)?;

    if pattern.contains('/') || pattern.contains('\\') {
        return Err(DecodeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: pattern.to_string(),
            reason: "Pattern must match file names only; subdirectories are not scanned"
                .to_string(),
        });
    }

    glob::Pattern::new(pattern)?;
    Ok(())
}

pub fn validate_signatures(field_name: &str, signatures: &[Signature]) -> Result<()> {
    if signatures.is_empty() {
        return Err(DecodeError::MissingConfigError {
            field: field_name.to_string(),
        });
    }

    let mut seen = HashSet::new();
    for signature in signatures {
        if !is_base64_prefix(&signature.prefix) {
            return Err(DecodeError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: signature.prefix.clone(),
                reason: "Prefix must be non-empty base64 text (A-Z, a-z, 0-9, +, /, =)"
                    .to_string(),
            });
        }
        if !seen.insert(signature.prefix.as_str()) {
            return Err(DecodeError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: signature.prefix.clone(),
                reason: "Duplicate signature prefix".to_string(),
            });
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DecodeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ImageKind;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("scan.directory", "src/assets").is_ok());
        assert!(validate_path("scan.directory", "").is_err());
        assert!(validate_path("scan.directory", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(validate_directory("scan.directory", dir.path()).is_ok());

        let missing = validate_directory("scan.directory", &dir.path().join("missing")).unwrap_err();
        assert!(matches!(missing, DecodeError::IoError(_)));
        assert_eq!(missing.exit_code(), 3);

        let file = dir.path().join("a.png");
        std::fs::write(&file, b"x").unwrap();
        let not_dir = validate_directory("scan.directory", &file).unwrap_err();
        assert!(matches!(not_dir, DecodeError::InvalidConfigValueError { .. }));
        assert_eq!(not_dir.exit_code(), 1);
    }

    #[test]
    fn test_validate_file_pattern() {
        assert!(validate_file_pattern("scan.pattern", "*.png").is_ok());
        assert!(validate_file_pattern("scan.pattern", "*.{png}").is_ok());
        assert!(validate_file_pattern("scan.pattern", "").is_err());
        assert!(validate_file_pattern("scan.pattern", "img/*.png").is_err());
        assert!(matches!(
            validate_file_pattern("scan.pattern", "[*.png"),
            Err(DecodeError::PatternError(_))
        ));
    }

    #[test]
    fn test_validate_signatures() {
        assert!(validate_signatures("signatures", &Signature::defaults()).is_ok());
        assert!(matches!(
            validate_signatures("signatures", &[]),
            Err(DecodeError::MissingConfigError { .. })
        ));

        let bad = vec![Signature::new("data:image", ImageKind::Png)];
        assert!(validate_signatures("signatures", &bad).is_err());

        let dup = vec![
            Signature::new("/9j/", ImageKind::Jpeg),
            Signature::new("/9j/", ImageKind::Png),
        ];
        assert!(validate_signatures("signatures", &dup).is_err());
    }
}
