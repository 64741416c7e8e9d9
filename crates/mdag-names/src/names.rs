//! Key label and name validation.
//!
//! Key labels are local, human-chosen handles for signing keys:
//! - Must be non-empty and at most 64 characters
//! - Must not contain whitespace, `/`, `~`, `^`, `:`, `?`, `*`, `[`, `\`
//! - Must not start with `.` or `-`
//!
//! Published names appear as a single path segment in `/name/<name>`, so
//! they must be non-empty and free of `/` and the same forbidden characters.

use crate::error::{NameError, Result};

/// Characters that are forbidden anywhere in a label or name.
const FORBIDDEN_CHARS: &[char] = &[
    ' ', '\t', '\n', '\r', '/', '~', '^', ':', '?', '*', '[', '\\',
];

/// Longest accepted key label.
const MAX_LABEL_LEN: usize = 64;

/// Validate a key label, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use mdag_names::names::validate_key_label;
///
/// assert!(validate_key_label("self").is_ok());
/// assert!(validate_key_label("site-key").is_ok());
/// assert!(validate_key_label("").is_err());
/// assert!(validate_key_label("a/b").is_err());
/// ```
pub fn validate_key_label(label: &str) -> Result<()> {
    let invalid = |reason: String| NameError::InvalidName {
        name: label.to_string(),
        reason,
    };

    if label.is_empty() {
        return Err(invalid("key label must not be empty".into()));
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(invalid(format!("longer than {MAX_LABEL_LEN} characters")));
    }
    if let Some(ch) = label.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(invalid(format!("contains forbidden character: {ch:?}")));
    }
    if label.starts_with('.') || label.starts_with('-') {
        return Err(invalid("must not start with '.' or '-'".into()));
    }
    Ok(())
}

/// Validate a published name.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(NameError::InvalidName {
            name: name.to_string(),
            reason: "name must not be empty".into(),
        });
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(NameError::InvalidName {
            name: name.to_string(),
            reason: format!("contains forbidden character: {ch:?}"),
        });
    }
    Ok(())
}
