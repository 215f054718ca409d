//! Markdown rendering for structured documents.

use crate::error::{Error, Result};
use crate::model::{CodeBlock, Document, ListBlock, Notes, Table, Unit};

use super::{ExtractionStats, RenderOptions};

/// Convert a document to Markdown.
///
/// Units are separated by one blank line and non-empty output ends with a
/// single newline. The same document always renders to the same bytes.
///
/// Fails with [`Error::Render`] when a table's rows differ in width, which
/// only a hand-built document can contain.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(doc)
}

/// Convert a document to Markdown and count what was rendered.
pub fn to_markdown_with_stats(
    doc: &Document,
    options: &RenderOptions,
) -> Result<(String, ExtractionStats)> {
    let markdown = to_markdown(doc, options)?;
    Ok((markdown, ExtractionStats::from_document(doc)))
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a document to Markdown.
    pub fn render(&self, doc: &Document) -> Result<String> {
        let mut output = self.render_units(&doc.units)?.join("\n\n");
        if !output.is_empty() {
            output.push('\n');
        }
        Ok(output)
    }

    fn render_units(&self, units: &[Unit]) -> Result<Vec<String>> {
        let mut rendered = Vec::with_capacity(units.len());
        for unit in units {
            if let Some(text) = self.render_unit(unit)? {
                rendered.push(text);
            }
        }
        Ok(rendered)
    }

    fn render_unit(&self, unit: &Unit) -> Result<Option<String>> {
        let rendered = match unit {
            Unit::Heading { level, text } => {
                let level = (*level).clamp(1, self.options.max_heading_level.max(1));
                format!("{} {}", "#".repeat(level as usize), self.escape(text, false))
            }
            Unit::Paragraph { text } => {
                let escaped = self.escape(text, false);
                if self.options.escape_special_chars {
                    escape_block_start(&escaped)
                } else {
                    escaped
                }
            }
            Unit::List(list) => self.render_list(list),
            Unit::Table(table) => self.render_table(table)?,
            Unit::CodeBlock(code) => self.render_code(code),
            Unit::Notes(notes) => self.render_notes(notes)?,
        };
        Ok((!rendered.trim().is_empty()).then_some(rendered))
    }

    fn render_list(&self, list: &ListBlock) -> String {
        // Ordinal counter per nesting level, reset when a shallower item appears
        let mut counters: Vec<u32> = Vec::new();
        let mut lines = Vec::with_capacity(list.items.len());

        for item in &list.items {
            let level = item.level as usize;
            counters.resize(level + 1, 0);
            counters[level] += 1;

            let marker = if item.ordered {
                format!("{}.", counters[level])
            } else {
                self.options.list_marker.to_string()
            };
            lines.push(format!(
                "{}{} {}",
                "  ".repeat(level),
                marker,
                self.escape(&item.text, false)
            ));
        }
        lines.join("\n")
    }

    fn render_table(&self, table: &Table) -> Result<String> {
        let Some(header) = table.header_row() else {
            return Ok(String::new());
        };
        if !table.is_rectangular() {
            return Err(Error::Render(format!(
                "table rows differ in width (header has {} cells)",
                header.cells.len()
            )));
        }

        let mut lines = Vec::with_capacity(table.rows.len() + 1);
        for (i, row) in table.rows.iter().enumerate() {
            let mut line = String::from("|");
            for cell in &row.cells {
                let content = cell.text.replace('\n', " ");
                line.push(' ');
                line.push_str(&self.escape(content.trim(), true));
                line.push_str(" |");
            }
            lines.push(line);

            if i == 0 {
                lines.push(format!("|{}", " --- |".repeat(header.cells.len())));
            }
        }
        Ok(lines.join("\n"))
    }

    fn render_code(&self, code: &CodeBlock) -> String {
        if code.lines.is_empty() {
            return String::new();
        }
        let content = code.content();
        let fence = "`".repeat(longest_backtick_run(&content).max(2) + 1);
        let language = if self.options.code_language_hints {
            code.language.as_deref().unwrap_or("")
        } else {
            ""
        };
        format!("{fence}{language}\n{content}\n{fence}")
    }

    fn render_notes(&self, notes: &Notes) -> Result<String> {
        if !self.options.include_notes {
            return Ok(String::new());
        }
        let quoted = self
            .render_units(&notes.units)?
            .join("\n\n")
            .lines()
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        Ok(quoted)
    }

    fn escape(&self, text: &str, in_table: bool) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text, in_table)
        } else {
            text.to_string()
        }
    }
}

/// Escape characters that would be read as Markdown syntax.
///
/// The pipe is only special inside table cells.
fn escape_markdown(text: &str, in_table: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' => {
                result.push('\\');
                result.push(c);
            }
            '|' if in_table => result.push_str("\\|"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape a leading heading, quote or list marker so paragraph text is not
/// reparsed as another block.
fn escape_block_start(text: &str) -> String {
    let trimmed = text.trim_start();
    let indent = &text[..text.len() - trimmed.len()];
    let mut chars = trimmed.chars();
    let marker_end = match chars.next() {
        Some('#') | Some('>') => Some(0),
        Some('-') | Some('+') if chars.next().map_or(true, char::is_whitespace) => Some(0),
        Some(c) if c.is_ascii_digit() => {
            let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
            let after = &trimmed[digits..];
            let mut rest = after.chars();
            match rest.next() {
                Some('.') | Some(')') if rest.next().map_or(true, char::is_whitespace) => {
                    Some(digits)
                }
                _ => None,
            }
        }
        _ => None,
    };
    match marker_end {
        Some(at) => format!("{indent}{}\\{}", &trimmed[..at], &trimmed[at..]),
        None => text.to_string(),
    }
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}
