//! Per-document parsing: frontmatter, sections, section mapping and raw
//! communication hints.

pub mod communication;
pub mod frontmatter;
pub mod mapping;
pub mod parser;
pub mod sections;
pub mod types;

pub use parser::{parse_agent, parse_document};
pub use types::{
    AgentCommunication, CodeBlock, Frontmatter, MappedSections, MarkdownTable, ParsedAgent,
    ParsedSection, RawDocument, SectionCategory,
};
