//! Candidate Parser
//!
//! Extracts a structured post candidate from free-text generator output
//! by locating labeled sections (TITLE / CONTENT / SUMMARY / TAGS). Pure
//! text processing; no network or state.

use regex::Regex;

use crate::error::HeraldError;
use crate::types::ParsedCandidate;

/// Labels are matched at line starts, case-insensitively, with optional
/// markdown bold markers around the label word.
const LABEL_PATTERN: &str = r"(?mi)^\s*\*{0,2}(TITLE|CONTENT|SUMMARY|TAGS)\*{0,2}\s*:\*{0,2}\s*";

/// Parse generator output into a candidate.
///
/// Fails if the mandatory TITLE or CONTENT section is absent or empty.
/// Text before the first label is ignored; when a label repeats, the
/// first occurrence wins.
pub fn parse_candidate(text: &str) -> Result<ParsedCandidate, HeraldError> {
    let label_re = Regex::new(LABEL_PATTERN)
        .map_err(|e| HeraldError::Parse(format!("label pattern failed to compile: {}", e)))?;

    let mut labels: Vec<(String, usize, usize)> = Vec::new();
    for captures in label_re.captures_iter(text) {
        let full = match captures.get(0) {
            Some(m) => m,
            None => continue,
        };
        let name = match captures.get(1) {
            Some(m) => m.as_str().to_lowercase(),
            None => continue,
        };
        labels.push((name, full.start(), full.end()));
    }

    let mut title: Option<String> = None;
    let mut content: Option<String> = None;
    let mut summary: Option<String> = None;
    let mut tags: Option<String> = None;

    for (i, (name, _, body_start)) in labels.iter().enumerate() {
        let body_end = labels
            .get(i + 1)
            .map(|(_, next_start, _)| *next_start)
            .unwrap_or(text.len());
        let section = text[*body_start..body_end].trim();

        let slot = match name.as_str() {
            "title" => &mut title,
            "content" => &mut content,
            "summary" => &mut summary,
            _ => &mut tags,
        };
        if slot.is_none() {
            *slot = Some(section.to_string());
        }
    }

    let title = title
        .map(|t| clean_title(&t))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| HeraldError::Parse("generation output has no TITLE section".to_string()))?;

    let content = content
        .filter(|c| !c.is_empty())
        .ok_or_else(|| HeraldError::Parse("generation output has no CONTENT section".to_string()))?;

    Ok(ParsedCandidate {
        title,
        content,
        summary: summary.filter(|s| !s.is_empty()),
        tags: tags.map(|t| split_tags(&t)).unwrap_or_default(),
    })
}

/// Strip wrapping quotes and collapse internal whitespace to single
/// spaces, so a line-wrapped title stays one line.
fn clean_title(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('"').trim_matches('`');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a TAGS section on commas, dropping hash prefixes and empties.
/// Order is preserved.
fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|tag| tag.trim().trim_start_matches('#').trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}
