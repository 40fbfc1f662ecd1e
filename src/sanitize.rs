//! Title to filesystem-safe token mapping
//!
//! Titles become staging and storage names, so the token must be valid on
//! every filesystem the store may live on and must survive a second pass
//! unchanged (staging names are re-sanitized when finalized).

use unicode_normalization::UnicodeNormalization;

/// Token used when sanitization leaves nothing
pub const PLACEHOLDER: &str = "video";

/// Characters rejected by common filesystems, plus `!` which shells expand
const HOSTILE: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*', '!'];

/// Map an arbitrary title to an ASCII-only, path-safe token
///
/// The title is NFKC-normalized, then every non-ASCII character is dropped
/// (not transliterated), hostile and control characters are removed,
/// whitespace runs collapse to one space, and leading/trailing dots and
/// spaces are trimmed. An empty result becomes [`PLACEHOLDER`].
///
/// ```
/// use media_acquire::sanitize::sanitize;
///
/// assert_eq!(sanitize("Çöçö: Live! / 2024"), "Live 2024");
/// assert_eq!(sanitize("???"), "video");
/// ```
pub fn sanitize(title: &str) -> String {
    let ascii: String = title
        .nfkc()
        .filter(|c| c.is_ascii())
        .filter(|c| !HOSTILE.contains(c))
        .map(|c| if c.is_ascii_control() { ' ' } else { c })
        .collect();

    let collapsed = ascii.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_matches(|c: char| c == '.' || c == ' ');

    if trimmed.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Storage name of a title's poster: `{sanitized}-poster.jpg`
pub fn poster_name(title: &str) -> String {
    format!("{}-poster.jpg", sanitize(title))
}
