//! YAML frontmatter extraction
//!
//! Splits a leading `---` delimited block off an agent document and
//! normalizes its fields. A missing block is not an error; a malformed one
//! degrades to a filename-derived name with the whole document as body.

use crate::agent::types::Frontmatter;
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::debug;

const DELIMITER: &str = "---";
const PLACEHOLDER_NAME: &str = "Unknown Agent";

#[derive(Debug, Error)]
enum BlockError {
    #[error("frontmatter block is never closed")]
    Unterminated,
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Extracts frontmatter and returns it with the remaining body text.
pub fn extract_frontmatter(markdown: &str, filename: &str) -> (Frontmatter, String) {
    match split_block(markdown) {
        Ok(Some((fields, body))) => (normalize(&fields, filename), body.to_string()),
        Ok(None) => (normalize(&Mapping::new(), filename), markdown.to_string()),
        Err(e) => {
            debug!(filename, error = %e, "Malformed frontmatter, treating whole file as body");
            (fallback(filename), markdown.to_string())
        }
    }
}

/// Returns the parsed metadata mapping and the body, or `None` when the
/// document does not open with a delimiter line.
fn split_block(markdown: &str) -> Result<Option<(Mapping, &str)>, BlockError> {
    let Some(rest) = markdown.strip_prefix(DELIMITER) else {
        return Ok(None);
    };
    let Some((opening_tail, after)) = rest.split_once('\n') else {
        return Ok(None);
    };
    if !opening_tail.trim().is_empty() {
        return Ok(None);
    }

    let mut offset = 0;
    for line in after.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let yaml = &after[..offset];
            let body = &after[offset + line.len()..];
            return Ok(Some((parse_mapping(yaml)?, body)));
        }
        offset += line.len();
    }

    Err(BlockError::Unterminated)
}

fn parse_mapping(yaml: &str) -> Result<Mapping, BlockError> {
    if yaml.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(map) => Ok(map),
        _ => Ok(Mapping::new()),
    }
}

fn normalize(fields: &Mapping, filename: &str) -> Frontmatter {
    let name = string_field(fields, "name")
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| derive_name_from_filename(filename));

    Frontmatter {
        name,
        description: string_field(fields, "description").unwrap_or_default(),
        tools: normalize_tools(fields.get("tools")),
        model: string_field(fields, "model"),
    }
}

fn fallback(filename: &str) -> Frontmatter {
    Frontmatter {
        name: derive_name_from_filename(filename),
        description: String::new(),
        tools: Vec::new(),
        model: None,
    }
}

fn string_field(fields: &Mapping, key: &str) -> Option<String> {
    match fields.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Accepts a YAML sequence or a comma separated string.
pub fn normalize_tools(tools: Option<&Value>) -> Vec<String> {
    match tools {
        Some(Value::Sequence(items)) => items
            .iter()
            .filter_map(scalar_to_string)
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => serde_yaml::to_string(other)
            .ok()
            .map(|s| s.trim().to_string()),
    }
}

/// "code-reviewer_security.md" -> "Code Reviewer Security"
pub fn derive_name_from_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let stem = match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    };

    let spaced = stem.replace(['-', '_'], " ");
    let titled = title_case(&spaced);
    let trimmed = titled.trim();

    if trimmed.is_empty() {
        PLACEHOLDER_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Uppercases every character that starts a word.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_word = false;
    for c in text.chars() {
        let is_word = c.is_alphanumeric() || c == '_';
        if is_word && !prev_is_word {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev_is_word = is_word;
    }
    out
}
