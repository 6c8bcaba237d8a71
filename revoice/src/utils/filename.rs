//! Title sanitization for artifact file names.
//!
//! Every artifact of a job shares one base name derived from the video title.
//! The title comes from arbitrary upstream metadata, so it is stripped of
//! characters that are illegal in file names on Windows, Linux, or macOS while
//! keeping valid Unicode text such as Japanese or Chinese titles intact.

/// Characters that are never allowed in an artifact name.
pub const FORBIDDEN_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Base name used when a title is missing or sanitizes to nothing.
pub const DEFAULT_TITLE: &str = "unnamed";

/// Windows reserved filenames (case-insensitive)
const WINDOWS_RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Sanitize a video title for use as an artifact base name.
///
/// This function:
/// 1. Removes the forbidden characters `\ / : * ? " < > |`
/// 2. Removes control characters
/// 3. Trims leading/trailing whitespace and dots
/// 4. Prefixes Windows reserved names with an underscore
/// 5. Returns [`DEFAULT_TITLE`] if nothing is left
///
/// The result is never empty and `sanitize_title(sanitize_title(x)) == sanitize_title(x)`.
///
/// # Examples
///
/// ```
/// use revoice::utils::filename::sanitize_title;
///
/// assert_eq!(sanitize_title("What? Why: How"), "What Why How");
/// assert_eq!(sanitize_title("カエルの動画?"), "カエルの動画");
/// assert_eq!(sanitize_title(""), "unnamed");
/// assert_eq!(sanitize_title("CON"), "_CON");
/// ```
pub fn sanitize_title(input: &str) -> String {
    let stripped: String = input
        .chars()
        .filter(|c| !c.is_control() && !FORBIDDEN_CHARS.contains(c))
        .collect();

    let trimmed = stripped.trim_matches(|c: char| c.is_whitespace() || c == '.');

    if trimmed.is_empty() {
        return DEFAULT_TITLE.to_string();
    }

    let upper = trimmed.to_uppercase();
    for reserved in WINDOWS_RESERVED_NAMES {
        if upper == *reserved || upper.starts_with(&format!("{}.", reserved)) {
            return format!("_{}", trimmed);
        }
    }

    trimmed.to_string()
}

/// Sanitize an optional title, falling back to [`DEFAULT_TITLE`] when absent.
pub fn sanitize_optional_title(input: Option<&str>) -> String {
    sanitize_title(input.unwrap_or_default())
}
