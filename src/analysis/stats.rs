//! Stat card heuristics
//!
//! Five independent 1-10 scores. Each score is a small pure function over
//! the counts it needs, so scorers can be tested and swapped in isolation.

use crate::agent::types::{AgentCommunication, ParsedAgent, ParsedSection, SectionCategory};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStats {
    pub scope: u8,
    pub autonomy: u8,
    pub connections: u8,
    pub rigor: u8,
    pub complexity: u8,
}

const SCOPE_BANDS: [usize; 4] = [2, 4, 6, 8];
const RIGOR_BANDS: [usize; 4] = [2, 5, 8, 12];
const MAX_OUTPUT_LINES: usize = 5;
const MAX_SUBSTANTIVE_SECTIONS: usize = 5;
const SUBSTANTIVE_CONTENT_LEN: usize = 50;

struct StatPatterns {
    mode: Regex,
    interactive: Regex,
    heavy_interaction: Regex,
    mentions: Vec<Regex>,
    checkbox: Regex,
    validation: Regex,
    conditional: Regex,
    table_row: Regex,
}

fn patterns() -> &'static StatPatterns {
    static PATTERNS: OnceLock<StatPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| StatPatterns {
        mode: Regex::new(r"(?i)mode:\s*\w+").expect("valid regex"),
        interactive: Regex::new(r"interactive|user approval|confirm with user|ask user")
            .expect("valid regex"),
        heavy_interaction: Regex::new(r"interview|elicit|ask user about|prompt for")
            .expect("valid regex"),
        mentions: [
            r"(?i)invoke[sd]?\s+(?:the\s+)?(\w[\w\s-]*)",
            r"(?i)route\s+\w+\s+to\s+(\w[\w\s-]*)",
            r"(?i)invoked by\s+(\w[\w\s-]*)",
            r"(?i)(\w[\w-]*)\s+(?:agent|provides|reviews)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect(),
        checkbox: Regex::new(r"- \[[ x]\]").expect("valid regex"),
        validation: Regex::new(
            r"(?i)\b(?:validat\w*|verif\w*|check|review|inspect|audit|enforce|mandatory|must|shall)\b",
        )
        .expect("valid regex"),
        conditional: Regex::new(r"(?i)\b(?:if|when|unless|otherwise|else)\b").expect("valid regex"),
        table_row: Regex::new(r"(?mR)^\|.*\|$").expect("valid regex"),
    })
}

/// Raw counts every score is computed from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatInputs {
    pub output_lines: usize,
    pub substantive_sections: usize,
    pub modes: usize,
    pub has_ask_tool: bool,
    pub interactive_phrases: usize,
    pub heavy_interaction_phrases: usize,
    pub distinct_mentions: usize,
    pub checkboxes: usize,
    pub validation_keywords: usize,
    pub words: usize,
    pub conditionals: usize,
    pub table_rows: usize,
}

impl StatInputs {
    pub fn collect(agent: &ParsedAgent) -> Self {
        let p = patterns();
        let text = agent.raw_markdown.as_str();
        let lowered = text.to_lowercase();

        Self {
            output_lines: count_list_lines(
                agent.mapped_sections.content_of(SectionCategory::Outputs),
            ),
            substantive_sections: count_substantive(&agent.all_sections),
            modes: p.mode.find_iter(text).count(),
            has_ask_tool: has_ask_tool(&agent.frontmatter.tools),
            interactive_phrases: p.interactive.find_iter(&lowered).count(),
            heavy_interaction_phrases: p.heavy_interaction.find_iter(&lowered).count(),
            distinct_mentions: distinct_mentions(text, &agent.communication).len(),
            checkboxes: p.checkbox.find_iter(text).count(),
            validation_keywords: p.validation.find_iter(text).count(),
            words: text.split_whitespace().count(),
            conditionals: p.conditional.find_iter(text).count(),
            table_rows: p.table_row.find_iter(text).count(),
        }
    }

    pub fn stats(&self) -> AgentStats {
        AgentStats {
            scope: scope_score(self.output_lines, self.substantive_sections, self.modes),
            autonomy: autonomy_score(
                self.has_ask_tool,
                self.interactive_phrases,
                self.heavy_interaction_phrases,
            ),
            connections: connections_score(self.distinct_mentions),
            rigor: rigor_score(self.checkboxes, self.validation_keywords),
            complexity: complexity_score(
                self.words,
                self.modes,
                self.conditionals,
                self.table_rows,
            ),
        }
    }
}

pub fn derive_stats(agent: &ParsedAgent) -> AgentStats {
    StatInputs::collect(agent).stats()
}

/// Lines of an outputs section that read as list items or table rows.
fn count_list_lines(content: &str) -> usize {
    content
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with('-') || l.starts_with('|'))
        .count()
}

fn count_substantive(sections: &[ParsedSection]) -> usize {
    sections
        .iter()
        .filter(|s| s.content.chars().count() > SUBSTANTIVE_CONTENT_LEN)
        .count()
}

fn has_ask_tool(tools: &[String]) -> bool {
    tools.iter().any(|t| {
        let t = t.to_lowercase();
        t.contains("askuserquestion") || t == "ask"
    })
}

/// Distinct lowercased agent-like names mentioned in the text or in the
/// communication hints.
fn distinct_mentions(text: &str, communication: &AgentCommunication) -> HashSet<String> {
    let mut mentions = HashSet::new();

    for re in &patterns().mentions {
        for cap in re.captures_iter(text) {
            let Some(m) = cap.get(1) else { continue };
            let name = m.as_str().trim().to_lowercase();
            let len = name.chars().count();
            if len > 2 && len < 40 {
                mentions.insert(name);
            }
        }
    }

    for name in communication
        .talks_to
        .iter()
        .chain(communication.receives_from.iter())
    {
        mentions.insert(name.to_lowercase());
    }

    mentions
}

pub fn scope_score(output_lines: usize, substantive_sections: usize, modes: usize) -> u8 {
    let count = output_lines.min(MAX_OUTPUT_LINES)
        + substantive_sections.min(MAX_SUBSTANTIVE_SECTIONS)
        + modes;
    band_score(count, SCOPE_BANDS)
}

pub fn autonomy_score(has_ask_tool: bool, interactive: usize, heavy: usize) -> u8 {
    if heavy >= 3 {
        2
    } else if has_ask_tool && interactive >= 2 {
        4
    } else if has_ask_tool || interactive >= 1 {
        7
    } else {
        10
    }
}

pub fn connections_score(distinct_mentions: usize) -> u8 {
    match distinct_mentions {
        0 => 1,
        1..=2 => 3,
        3..=4 => 5,
        5..=6 => 7,
        _ => 9,
    }
}

pub fn rigor_score(checkboxes: usize, validation_keywords: usize) -> u8 {
    band_score(checkboxes + validation_keywords / 3, RIGOR_BANDS)
}

pub fn complexity_score(words: usize, modes: usize, conditionals: usize, table_rows: usize) -> u8 {
    let raw = words / 200 + modes * 2 + conditionals + table_rows / 3;
    raw.clamp(1, 10) as u8
}

/// Maps a count onto 2/4/6/8/10 using four inclusive upper bounds.
fn band_score(count: usize, bands: [usize; 4]) -> u8 {
    bands
        .iter()
        .position(|&upper| count <= upper)
        .map(|i| (i as u8 + 1) * 2)
        .unwrap_or(10)
}
