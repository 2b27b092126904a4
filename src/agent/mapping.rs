//! Heading text to canonical section category mapping

use crate::agent::types::{MappedSections, ParsedSection, SectionCategory};
use regex::Regex;
use std::sync::OnceLock;

/// Heading patterns per category, tested top to bottom. Patterns ending in
/// `$` must match the whole heading; the rest are prefix matches.
const SECTION_PATTERNS: &[(SectionCategory, &[&str])] = &[
    (
        SectionCategory::Behavior,
        &[r"^behaviou?r$", r"^how it works$", r"^workflow$", r"^process$"],
    ),
    (
        SectionCategory::KeyDecisions,
        &[r"^key decision", r"^decision area", r"^decisions$"],
    ),
    (
        SectionCategory::Constraints,
        &[r"^constraints?$", r"^limitations?$", r"^rules$"],
    ),
    (
        SectionCategory::Inputs,
        &[r"^inputs?$", r"^input format", r"^input data"],
    ),
    (
        SectionCategory::Outputs,
        &[r"^outputs?$", r"^output format", r"^deliverables?$"],
    ),
    (
        SectionCategory::SuccessCriteria,
        &[
            r"^success criteria",
            r"^acceptance criteria",
            r"^exit criteria",
            r"^done when",
        ],
    ),
    (SectionCategory::MemoryIntegration, &[r"^memory"]),
    (
        SectionCategory::CrossReferences,
        &[r"^cross.?ref", r"^related agents?", r"^references$", r"^see also$"],
    ),
    (
        SectionCategory::ReturnFormat,
        &[r"^return format", r"^task result", r"^response format"],
    ),
    (
        SectionCategory::LogEntry,
        &[r"^log entry", r"^logging", r"^log output"],
    ),
    (
        SectionCategory::ConsoleOutput,
        &[r"^console output", r"^console protocol"],
    ),
];

fn compiled_patterns() -> &'static [(SectionCategory, Vec<Regex>)] {
    static PATTERNS: OnceLock<Vec<(SectionCategory, Vec<Regex>)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        SECTION_PATTERNS
            .iter()
            .map(|(category, patterns)| {
                let compiled = patterns
                    .iter()
                    .map(|p| Regex::new(&format!("(?i){}", p)).expect("valid section pattern"))
                    .collect();
                (*category, compiled)
            })
            .collect()
    })
}

/// Returns the canonical category for a heading, if any.
pub fn categorize_heading(heading: &str) -> Option<SectionCategory> {
    let heading = heading.trim();
    compiled_patterns()
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|re| re.is_match(heading)))
        .map(|(category, _)| *category)
}

/// Lowercased heading with every run of non-alphanumerics collapsed to `_`.
pub fn fallback_key(heading: &str) -> String {
    let mut key = String::with_capacity(heading.len());
    let mut pending_separator = false;
    for c in heading.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !key.is_empty() {
                key.push('_');
            }
            pending_separator = false;
            key.push(c);
        } else {
            pending_separator = true;
        }
    }
    key
}

/// Maps sections to canonical keys. The first section claiming a key wins.
pub fn map_sections(sections: &[ParsedSection]) -> MappedSections {
    let mut mapped = MappedSections::new();

    for section in sections {
        match categorize_heading(&section.heading) {
            Some(category) => {
                mapped.insert_first(category.key(), section.clone());
            }
            None => {
                let key = fallback_key(&section.heading);
                if !key.is_empty() {
                    mapped.insert_first(key, section.clone());
                }
            }
        }
    }

    mapped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(heading: &str, content: &str) -> ParsedSection {
        ParsedSection {
            heading: heading.to_string(),
            level: 2,
            content: content.to_string(),
            tables: vec![],
            code_blocks: vec![],
        }
    }

    #[test]
    fn test_behavior_variants() {
        for heading in ["Behavior", "Behaviour", "How It Works", "workflow", "PROCESS"] {
            assert_eq!(
                categorize_heading(heading),
                Some(SectionCategory::Behavior),
                "heading {heading:?}"
            );
        }
    }

    #[test]
    fn test_whole_string_patterns_reject_suffixes() {
        assert_eq!(categorize_heading("Behavior Notes"), None);
        assert_eq!(categorize_heading("Rules of Engagement"), None);
    }

    #[test]
    fn test_prefix_patterns() {
        assert_eq!(
            categorize_heading("Key Decision Areas"),
            Some(SectionCategory::KeyDecisions)
        );
        assert_eq!(
            categorize_heading("Memory Integration"),
            Some(SectionCategory::MemoryIntegration)
        );
        assert_eq!(
            categorize_heading("Cross-References"),
            Some(SectionCategory::CrossReferences)
        );
        assert_eq!(
            categorize_heading("Done When"),
            Some(SectionCategory::SuccessCriteria)
        );
        assert_eq!(
            categorize_heading("Logging Rules"),
            Some(SectionCategory::LogEntry)
        );
    }

    #[test]
    fn test_all_categories_reachable() {
        let headings = [
            "Behavior",
            "Key Decision Areas",
            "Constraints",
            "Inputs",
            "Outputs",
            "Success Criteria",
            "Memory Integration",
            "Cross References",
            "Return Format",
            "Log Entry",
            "Console Output",
        ];
        let sections: Vec<_> = headings.iter().map(|h| section(h, "x")).collect();
        let mapped = map_sections(&sections);

        for category in SectionCategory::ALL {
            assert!(mapped.get(category).is_some(), "missing {category}");
        }
    }

    #[test]
    fn test_first_wins_per_category() {
        let sections = vec![
            section("Workflow", "first"),
            section("Behavior", "second"),
        ];
        let mapped = map_sections(&sections);
        assert_eq!(mapped.content_of(SectionCategory::Behavior), "first");
        assert_eq!(mapped.len(), 1);
    }

    #[test]
    fn test_fallback_key() {
        assert_eq!(fallback_key("Custom Section Name"), "custom_section_name");
        assert_eq!(fallback_key("  --Quality / Gates!! "), "quality_gates");
        assert_eq!(fallback_key("!!!"), "");
    }

    #[test]
    fn test_unmapped_sections_use_fallback_key() {
        let sections = vec![
            section("Custom Section Name", "first"),
            section("Custom section name", "second"),
            section("???", "dropped"),
        ];
        let mapped = map_sections(&sections);

        assert_eq!(mapped.len(), 1);
        assert_eq!(
            mapped.get_key("custom_section_name").unwrap().content,
            "first"
        );
    }
}
