use crate::agent::communication::derive_communication;
use crate::agent::frontmatter::extract_frontmatter;
use crate::agent::sections::parse_sections;
use crate::agent::types::{ParsedAgent, RawDocument};
use tracing::debug;

/// Parses one agent document into its structured form.
///
/// Communication hints are taken from the full document, frontmatter
/// included; sections only from the body.
pub fn parse_agent(markdown: &str, filename: &str) -> ParsedAgent {
    let (frontmatter, body) = extract_frontmatter(markdown, filename);
    let (all_sections, mapped_sections) = parse_sections(&body);
    let communication = derive_communication(markdown);

    debug!(
        filename,
        name = %frontmatter.name,
        sections = all_sections.len(),
        mapped = mapped_sections.len(),
        talks_to = communication.talks_to.len(),
        receives_from = communication.receives_from.len(),
        "Parsed agent"
    );

    ParsedAgent {
        filename: filename.to_string(),
        raw_markdown: markdown.to_string(),
        frontmatter,
        mapped_sections,
        communication,
        all_sections,
    }
}

pub fn parse_document(document: &RawDocument) -> ParsedAgent {
    parse_agent(&document.text, &document.filename)
}
