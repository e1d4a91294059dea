//! Title Fingerprint
//!
//! Lossy one-way projection of a post title used for exact-match
//! duplicate detection. Lowercases, keeps only ASCII alphanumerics and
//! Han ideographs, and truncates to a fixed length. Two titles with
//! equal fingerprints are treated as the same post.

/// Maximum fingerprint length in characters.
const MAX_FINGERPRINT_CHARS: usize = 80;

/// Whether a normalized character survives the projection.
fn retained(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Compute the fingerprint of a title.
pub fn title_fingerprint(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| retained(*c))
        .take(MAX_FINGERPRINT_CHARS)
        .collect()
}
