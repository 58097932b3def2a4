use crate::domain::model::Signature;
use base64::{engine::general_purpose, Engine};

/// First signature whose prefix starts `text`. Callers pass text that is
/// already trimmed.
pub fn detect<'a>(text: &str, signatures: &'a [Signature]) -> Option<&'a Signature> {
    signatures
        .iter()
        .find(|sig| !sig.prefix.is_empty() && text.starts_with(sig.prefix.as_str()))
}

/// Decodes standard, padded base64. Embedded whitespace (wrapped lines) is
/// ignored.
pub fn decode_payload(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    general_purpose::STANDARD.decode(compact)
}

/// Characters allowed in a signature prefix.
pub fn is_base64_prefix(prefix: &str) -> bool {
    !prefix.is_empty()
        && prefix
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'=')
}
