//! Parsing of terraform's textual output rendering.
//!
//! Newer terraform releases hand us machine-readable JSON (`output -json`);
//! this module covers the fallback where only the human-oriented list
//! literal is available: a bracket-bounded list of double-quoted elements
//! with a trailing comma, possibly spread over several lines.

use crate::error::{Result, TerraformError};

/// Parses a list literal like `["i-0abc", "i-0def",]` into ordered strings.
///
/// Tolerates empty lists, a trailing comma, and multi-line rendering.
/// Element order is preserved; it corresponds to creation index, which
/// downstream code uses to correlate an instance with its elastic IP.
pub fn parse_list_literal(raw: &str) -> Result<Vec<String>> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| TerraformError::MalformedOutput(trimmed.to_string()))?;

    let inner = inner.trim();
    let inner = inner.strip_suffix(',').unwrap_or(inner);
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .map(|element| {
            let element = element.trim();
            element
                .strip_prefix('"')
                .and_then(|e| e.strip_suffix('"'))
                .map(str::to_string)
                .ok_or_else(|| TerraformError::MalformedOutput(element.to_string()))
        })
        .collect()
}
