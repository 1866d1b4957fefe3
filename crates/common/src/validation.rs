//! Validation utilities for object keys and upload filenames.

use once_cell::sync::Lazy;
use regex::Regex;

/// Longest key accepted by the stores.
pub const MAX_KEY_LENGTH: usize = 255;

// Regex patterns
static OBJECT_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_-][A-Za-z0-9._-]*$").expect("object key pattern compiles")
});

static UNSAFE_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("filename pattern compiles"));

/// Validate a storage object key.
///
/// A valid key:
/// - Is at most 255 bytes
/// - Contains only ASCII letters, digits, `.`, `_` and `-`
/// - Does not start with `.` (hidden and temporary files are never addressable)
///
/// # Examples
///
/// ```
/// use ml_benchmark_common::validation::validate_object_key;
///
/// assert!(validate_object_key("iris.csv").is_ok());
/// assert!(validate_object_key("../secrets").is_err());
/// assert!(validate_object_key(".hidden").is_err());
/// ```
pub fn validate_object_key(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("Key cannot be empty".to_string());
    }

    if key.len() > MAX_KEY_LENGTH {
        return Err(format!(
            "Key cannot be longer than {} characters",
            MAX_KEY_LENGTH
        ));
    }

    if !OBJECT_KEY_REGEX.is_match(key) {
        return Err(
            "Key must contain only letters, digits, '.', '_' and '-', and must not start with '.'"
                .to_string(),
        );
    }

    Ok(())
}

/// Reduce a client-supplied filename to a safe object key.
///
/// Directory components become separators, runs of whitespace become `_`,
/// anything outside `[A-Za-z0-9_.-]` is dropped, and leading or trailing
/// `.`/`_` are stripped. The result may be empty.
///
/// # Examples
///
/// ```
/// use ml_benchmark_common::validation::secure_filename;
///
/// assert_eq!(secure_filename("My Data.csv"), "My_Data.csv");
/// assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
/// ```
pub fn secure_filename(filename: &str) -> String {
    let spaced = filename.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let stripped = UNSAFE_FILENAME_CHARS.replace_all(&joined, "");
    let trimmed = stripped.trim_matches(|c| c == '.' || c == '_');

    let mut out = trimmed.to_string();
    if out.len() > MAX_KEY_LENGTH {
        // Only ASCII remains, so any byte index is a char boundary
        out.truncate(MAX_KEY_LENGTH);
    }
    out
}

/// Lowercased extension of a filename, without the dot.
pub fn file_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Check a filename against an allow-list of extensions (case-insensitive).
///
/// # Examples
///
/// ```
/// use ml_benchmark_common::validation::has_allowed_extension;
///
/// let allowed = vec!["csv".to_string()];
/// assert!(has_allowed_extension("train.CSV", &allowed));
/// assert!(!has_allowed_extension("train.xlsx", &allowed));
/// ```
pub fn has_allowed_extension(filename: &str, allowed: &[String]) -> bool {
    match file_extension(filename) {
        Some(ext) => allowed
            .iter()
            .any(|a| a.trim_start_matches('.').eq_ignore_ascii_case(&ext)),
        None => false,
    }
}
