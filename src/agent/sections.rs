//! Heading-based section segmentation
//!
//! The body is parsed with pulldown-cmark and walked as a flat list of
//! top-level blocks. Every top-level heading opens a section that runs until
//! the next top-level heading of any level, so subheadings become their own
//! adjacent sections. Section content is the original source text of the
//! blocks in between, not a re-rendering of the parse tree. Text before the
//! first heading is not represented.

use crate::agent::mapping::map_sections;
use crate::agent::types::{CodeBlock, MappedSections, MarkdownTable, ParsedSection};
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::ops::Range;
use tracing::trace;

/// Segments a markdown body into ordered sections and their mapped view.
pub fn parse_sections(body: &str) -> (Vec<ParsedSection>, MappedSections) {
    let sections = segment(body);
    let mapped = map_sections(&sections);
    (sections, mapped)
}

/// Splits a body into flat sections in document order.
pub fn segment(body: &str) -> Vec<ParsedSection> {
    let blocks = BlockCollector::collect(body);

    let heading_positions: Vec<usize> = blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| b.heading.is_some())
        .map(|(i, _)| i)
        .collect();

    let mut sections = Vec::with_capacity(heading_positions.len());
    for (n, &start) in heading_positions.iter().enumerate() {
        let end = heading_positions
            .get(n + 1)
            .copied()
            .unwrap_or(blocks.len());
        let Some((level, heading)) = blocks[start].heading.clone() else {
            continue;
        };
        let content_blocks = &blocks[start + 1..end];

        // Link reference definitions emit no events, so the span is taken
        // from the source rather than from the collected blocks.
        let span_end = blocks.get(end).map_or(body.len(), |b| b.range.start);
        let content = body
            .get(blocks[start].range.end..span_end)
            .unwrap_or("")
            .trim()
            .to_string();

        let tables = content_blocks
            .iter()
            .flat_map(|b| b.tables.iter().cloned())
            .collect();
        let code_blocks = content_blocks
            .iter()
            .flat_map(|b| b.code_blocks.iter().cloned())
            .collect();

        trace!(heading = %heading, level, blocks = content_blocks.len(), "Segmented section");

        sections.push(ParsedSection {
            heading,
            level,
            content,
            tables,
            code_blocks,
        });
    }

    sections
}

/// A top-level block with everything collected from inside it.
#[derive(Debug)]
struct Block {
    range: Range<usize>,
    heading: Option<(usize, String)>,
    tables: Vec<MarkdownTable>,
    code_blocks: Vec<CodeBlock>,
}

impl Block {
    fn new(range: Range<usize>) -> Self {
        Self {
            range,
            heading: None,
            tables: Vec::new(),
            code_blocks: Vec::new(),
        }
    }
}

#[derive(Default)]
struct BlockCollector {
    blocks: Vec<Block>,
    current: Option<Block>,
    depth: usize,
    heading: Option<(usize, String)>,
    table: Option<MarkdownTable>,
    row: Option<Vec<String>>,
    cell: Option<String>,
    code: Option<CodeBlock>,
}

impl BlockCollector {
    fn collect(body: &str) -> Vec<Block> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let mut collector = Self::default();
        for (event, range) in Parser::new_ext(body, options).into_offset_iter() {
            collector.handle(event, range);
        }
        collector.blocks
    }

    fn handle(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => {
                if self.depth == 0 {
                    self.current = Some(Block::new(range));
                }
                self.open(tag);
                self.depth += 1;
            }
            Event::End(tag) => {
                self.depth = self.depth.saturating_sub(1);
                self.close(tag);
                if self.depth == 0 {
                    if let Some(block) = self.current.take() {
                        self.blocks.push(block);
                    }
                }
            }
            Event::Text(text) | Event::Code(text) | Event::Html(text) | Event::InlineHtml(text)
                if self.depth > 0 =>
            {
                self.push_text(&text);
            }
            Event::SoftBreak | Event::HardBreak if self.depth > 0 => self.push_break(),
            _ if self.depth == 0 => {
                self.blocks.push(Block::new(range));
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } if self.depth == 0 => {
                self.heading = Some((level as usize, String::new()));
            }
            Tag::Table(_) => self.table = Some(MarkdownTable::default()),
            Tag::TableHead | Tag::TableRow => self.row = Some(Vec::new()),
            Tag::TableCell => self.cell = Some(String::new()),
            Tag::CodeBlock(kind) => {
                self.code = Some(CodeBlock {
                    language: code_language(&kind),
                    content: String::new(),
                });
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) if self.depth == 0 => {
                if let (Some(heading), Some(block)) = (self.heading.take(), self.current.as_mut()) {
                    block.heading = Some(heading);
                }
            }
            TagEnd::TableCell => {
                if let (Some(cell), Some(row)) = (self.cell.take(), self.row.as_mut()) {
                    row.push(cell.trim().to_string());
                }
            }
            TagEnd::TableHead => {
                if let (Some(row), Some(table)) = (self.row.take(), self.table.as_mut()) {
                    table.headers = row;
                }
            }
            TagEnd::TableRow => {
                if let (Some(row), Some(table)) = (self.row.take(), self.table.as_mut()) {
                    table.rows.push(row);
                }
            }
            TagEnd::Table => {
                if let (Some(table), Some(block)) = (self.table.take(), self.current.as_mut()) {
                    block.tables.push(table);
                }
            }
            TagEnd::CodeBlock => {
                if let (Some(mut code), Some(block)) = (self.code.take(), self.current.as_mut()) {
                    if code.content.ends_with('\n') {
                        code.content.pop();
                    }
                    block.code_blocks.push(code);
                }
            }
            _ => {}
        }
    }

    fn push_break(&mut self) {
        if self.code.is_some() {
            return;
        }
        if let Some(cell) = self.cell.as_mut() {
            cell.push('\n');
        } else if let Some((_, heading)) = self.heading.as_mut() {
            heading.push('\n');
        }
    }

    fn push_text(&mut self, text: &CowStr<'_>) {
        if let Some(code) = self.code.as_mut() {
            code.content.push_str(text);
        } else if let Some(cell) = self.cell.as_mut() {
            cell.push_str(text);
        } else if let Some((_, heading)) = self.heading.as_mut() {
            heading.push_str(text);
        }
    }
}

fn code_language(kind: &CodeBlockKind<'_>) -> String {
    match kind {
        CodeBlockKind::Fenced(info) => info.split_whitespace().next().unwrap_or("").to_string(),
        CodeBlockKind::Indented => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::types::SectionCategory;

    #[test]
    fn test_parses_behavior_section() {
        let body = "## Behavior\n\nThis agent does things step by step.\n\n## Constraints\n\nMust follow rules.";
        let (_, mapped) = parse_sections(body);

        let behavior = mapped.get(SectionCategory::Behavior).unwrap();
        assert!(behavior.content.contains("step by step"));
        assert!(mapped.get(SectionCategory::Constraints).is_some());
    }

    #[test]
    fn test_nested_headings_are_flat_sections() {
        let body = "## Behavior\n\nMain behavior content.\n\n### Sub-behavior\n\nNested content here.\n\n## Constraints\n\nRules section.";
        let sections = segment(body);

        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].heading, "Behavior");
        assert_eq!(sections[0].level, 2);
        assert_eq!(sections[0].content, "Main behavior content.");
        assert_eq!(sections[1].heading, "Sub-behavior");
        assert_eq!(sections[1].level, 3);
        assert_eq!(sections[1].content, "Nested content here.");
        assert_eq!(sections[2].heading, "Constraints");
    }

    #[test]
    fn test_empty_section() {
        let body = "## Behavior\n\n## Constraints\n\nSome content.";
        let sections = segment(body);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].heading, "Behavior");
        assert!(sections[0].content.is_empty());
        assert!(sections[1].content.contains("Some content"));
    }

    #[test]
    fn test_no_headings() {
        let body = "Just plain text without any headings.\n\nSome more text here.";
        let (sections, mapped) = parse_sections(body);
        assert!(sections.is_empty());
        assert!(mapped.is_empty());
    }

    #[test]
    fn test_preamble_is_dropped() {
        let body = "Intro paragraph.\n\n## Behavior\n\nBody.";
        let sections = segment(body);
        assert_eq!(sections.len(), 1);
        assert!(!sections[0].content.contains("Intro"));
    }

    #[test]
    fn test_extracts_table() {
        let body = "## Key Decision Areas\n\n| Decision | Route To |\n|----------|----------|\n| Arch issue | Architect |\n| Code fix | Developer |";
        let (_, mapped) = parse_sections(body);
        let section = mapped.get(SectionCategory::KeyDecisions).unwrap();

        assert_eq!(section.tables.len(), 1);
        assert_eq!(section.tables[0].headers, vec!["Decision", "Route To"]);
        assert_eq!(
            section.tables[0].rows,
            vec![
                vec!["Arch issue".to_string(), "Architect".to_string()],
                vec!["Code fix".to_string(), "Developer".to_string()],
            ]
        );
    }

    #[test]
    fn test_table_cells_are_plain_text() {
        let body = "## Routing\n\n| Agent | Notes |\n|---|---|\n| **Architect** | uses `ADR` files |";
        let sections = segment(body);
        assert_eq!(
            sections[0].tables[0].rows[0],
            vec!["Architect".to_string(), "uses ADR files".to_string()]
        );
    }

    #[test]
    fn test_extracts_code_block_with_language() {
        let body = "## Return Format\n\n```json\n{\"status\": \"complete\"}\n```";
        let (_, mapped) = parse_sections(body);
        let section = mapped.get(SectionCategory::ReturnFormat).unwrap();

        assert_eq!(section.code_blocks.len(), 1);
        assert_eq!(section.code_blocks[0].language, "json");
        assert_eq!(section.code_blocks[0].content, "{\"status\": \"complete\"}");
    }

    #[test]
    fn test_code_block_without_language() {
        let body = "## Example\n\n```\nplain\n```";
        let sections = segment(body);
        assert_eq!(sections[0].code_blocks[0].language, "");
        assert_eq!(sections[0].code_blocks[0].content, "plain");
    }

    #[test]
    fn test_nested_code_block_in_list_is_collected() {
        let body = "## Steps\n\n- Run this:\n\n  ```bash\n  cargo test\n  ```\n- Done";
        let sections = segment(body);
        assert_eq!(sections[0].code_blocks.len(), 1);
        assert_eq!(sections[0].code_blocks[0].language, "bash");
        assert!(sections[0].code_blocks[0].content.contains("cargo test"));
    }

    #[test]
    fn test_content_preserves_source_formatting() {
        let body = "## Outputs\n\n- **ADR** files\n- `design.md`\n\n> quoted";
        let sections = segment(body);
        assert_eq!(sections[0].content, "- **ADR** files\n- `design.md`\n\n> quoted");
    }

    #[test]
    fn test_heading_with_inline_code() {
        let body = "## The `run` command\n\ntext";
        let sections = segment(body);
        assert_eq!(sections[0].heading, "The run command");
    }

    #[test]
    fn test_link_definitions_stay_in_content() {
        let body = "## See Also\n\n[Developer]: ./developer.md\n\n## Outputs\n\n- x";
        let sections = segment(body);
        assert_eq!(sections[0].content, "[Developer]: ./developer.md");
        assert_eq!(sections[1].content, "- x");
    }

    #[test]
    fn test_multiline_setext_heading() {
        let sections = segment("Line one\nLine two\n========\n\nbody");
        assert_eq!(sections[0].heading, "Line one\nLine two");
        assert_eq!(sections[0].level, 1);
        assert_eq!(sections[0].content, "body");
    }

    #[test]
    fn test_segmentation_is_idempotent() {
        let body = "## Behavior\n\nA\n\n### Detail\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n## Outputs\n\n- x";
        assert_eq!(parse_sections(body), parse_sections(body));
    }
}
