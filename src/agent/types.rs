use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

/// A markdown document as handed to the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    pub text: String,
    pub filename: String,
}

impl RawDocument {
    pub fn new(text: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            filename: filename.into(),
        }
    }
}

/// Normalized YAML metadata of an agent file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frontmatter {
    /// Never empty: falls back to a name derived from the filename.
    pub name: String,
    pub description: String,
    pub tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub language: String,
    pub content: String,
}

/// Everything between one heading and the next heading of any level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSection {
    pub heading: String,
    pub level: usize,
    /// Verbatim source slice, trimmed.
    pub content: String,
    pub tables: Vec<MarkdownTable>,
    #[serde(rename = "codeBlocks")]
    pub code_blocks: Vec<CodeBlock>,
}

/// Canonical semantic buckets that varied heading phrasings are folded into.
///
/// Declaration order is the order in which headings are tested against the
/// categories, so it decides which bucket wins when a heading could match two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionCategory {
    Behavior,
    KeyDecisions,
    Constraints,
    Inputs,
    Outputs,
    SuccessCriteria,
    MemoryIntegration,
    CrossReferences,
    ReturnFormat,
    LogEntry,
    ConsoleOutput,
}

impl SectionCategory {
    pub const ALL: [SectionCategory; 11] = [
        SectionCategory::Behavior,
        SectionCategory::KeyDecisions,
        SectionCategory::Constraints,
        SectionCategory::Inputs,
        SectionCategory::Outputs,
        SectionCategory::SuccessCriteria,
        SectionCategory::MemoryIntegration,
        SectionCategory::CrossReferences,
        SectionCategory::ReturnFormat,
        SectionCategory::LogEntry,
        SectionCategory::ConsoleOutput,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SectionCategory::Behavior => "behavior",
            SectionCategory::KeyDecisions => "key_decisions",
            SectionCategory::Constraints => "constraints",
            SectionCategory::Inputs => "inputs",
            SectionCategory::Outputs => "outputs",
            SectionCategory::SuccessCriteria => "success_criteria",
            SectionCategory::MemoryIntegration => "memory_integration",
            SectionCategory::CrossReferences => "cross_references",
            SectionCategory::ReturnFormat => "return_format",
            SectionCategory::LogEntry => "log_entry",
            SectionCategory::ConsoleOutput => "console_output",
        }
    }
}

impl fmt::Display for SectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Sections keyed by canonical category key or by a slug of the heading.
///
/// Only the first section for a given key is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappedSections(BTreeMap<String, ParsedSection>);

impl MappedSections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts unless the key is already taken. Returns whether it was inserted.
    pub fn insert_first(&mut self, key: impl Into<String>, section: ParsedSection) -> bool {
        match self.0.entry(key.into()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(section);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, category: SectionCategory) -> Option<&ParsedSection> {
        self.0.get(category.key())
    }

    pub fn get_key(&self, key: &str) -> Option<&ParsedSection> {
        self.0.get(key)
    }

    /// Content of a canonical section, or `""` when the section is absent.
    pub fn content_of(&self, category: SectionCategory) -> &str {
        self.get(category).map(|s| s.content.as_str()).unwrap_or("")
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParsedSection)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Raw per-document communication hints. Names are free text, not yet
/// resolved against the known agent set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCommunication {
    pub talks_to: Vec<String>,
    pub receives_from: Vec<String>,
}

impl AgentCommunication {
    pub fn add_talks_to(&mut self, name: &str) {
        push_unique(&mut self.talks_to, name);
    }

    pub fn add_receives_from(&mut self, name: &str) {
        push_unique(&mut self.receives_from, name);
    }
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

/// One agent document after frontmatter extraction, segmentation, mapping
/// and communication extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAgent {
    pub filename: String,
    pub raw_markdown: String,
    pub frontmatter: Frontmatter,
    pub mapped_sections: MappedSections,
    pub communication: AgentCommunication,
    pub all_sections: Vec<ParsedSection>,
}

impl ParsedAgent {
    pub fn name(&self) -> &str {
        &self.frontmatter.name
    }

    pub fn section(&self, category: SectionCategory) -> Option<&ParsedSection> {
        self.mapped_sections.get(category)
    }
}
