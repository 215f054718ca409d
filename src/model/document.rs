//! Document-level types.

use super::Table;
use serde::{Deserialize, Serialize};

/// A structured document in final reading order.
///
/// Built once by the reading-order resolver and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Units in reading order, spanning all pages
    pub units: Vec<Unit>,

    /// Number of pages that contributed input (including empty ones)
    pub page_count: usize,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from units.
    pub fn with_units(units: Vec<Unit>) -> Self {
        Self {
            units,
            page_count: 0,
        }
    }

    /// Check if the document has no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Number of top-level units.
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Iterate over all units, descending into notes sections.
    pub fn iter_all(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().flat_map(|unit| {
            let nested: &[Unit] = match unit {
                Unit::Notes(notes) => &notes.units,
                _ => &[],
            };
            std::iter::once(unit).chain(nested.iter())
        })
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.units
            .iter()
            .map(Unit::plain_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// A finalized, typed element of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Unit {
    /// A heading (level 1-6)
    Heading {
        /// Heading level
        level: u8,
        /// Heading text
        text: String,
    },

    /// A paragraph of running text
    Paragraph {
        /// Paragraph text
        text: String,
    },

    /// A list of items, possibly nested
    List(ListBlock),

    /// A table
    Table(Table),

    /// A block of preformatted code lines
    CodeBlock(CodeBlock),

    /// Margin content (headers, footers, page numbers) of one page
    Notes(Notes),
}

impl Unit {
    /// Create a heading unit; the level is clamped to 1-6.
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        Unit::Heading {
            level: level.clamp(1, 6),
            text: text.into(),
        }
    }

    /// Create a paragraph unit.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Unit::Paragraph { text: text.into() }
    }

    /// Get plain text content of the unit.
    pub fn plain_text(&self) -> String {
        match self {
            Unit::Heading { text, .. } | Unit::Paragraph { text } => text.clone(),
            Unit::List(list) => list
                .items
                .iter()
                .map(|i| i.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            Unit::Table(table) => table.plain_text(),
            Unit::CodeBlock(code) => code.content(),
            Unit::Notes(notes) => notes
                .units
                .iter()
                .map(Unit::plain_text)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Check if this unit is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, Unit::Heading { .. })
    }

    /// Check if this unit is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Unit::Paragraph { .. })
    }

    /// Check if this unit is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Unit::Table(_))
    }
}

/// A run of list items grouped into one list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListBlock {
    /// Items in order; nesting is expressed by [`ListItem::level`]
    pub items: Vec<ListItem>,
}

impl ListBlock {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item to the list.
    pub fn push(&mut self, item: ListItem) {
        self.items.push(item);
    }

    /// Whether the top-level items are ordered.
    pub fn is_ordered(&self) -> bool {
        self.items
            .iter()
            .find(|i| i.level == 0)
            .map(|i| i.ordered)
            .unwrap_or(false)
    }

    /// Deepest nesting level in the list.
    pub fn depth(&self) -> u8 {
        self.items.iter().map(|i| i.level).max().unwrap_or(0)
    }
}

/// A single list item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    /// Whether the source marker was ordinal
    pub ordered: bool,
    /// The marker as it appeared in the source (e.g., "•", "3.", "(a)")
    pub marker: String,
    /// Nesting level, 0 = outermost
    pub level: u8,
    /// Item text without its marker
    pub text: String,
}

impl ListItem {
    /// Create an unordered item.
    pub fn bullet(text: impl Into<String>, level: u8) -> Self {
        Self {
            ordered: false,
            marker: "-".to_string(),
            level,
            text: text.into(),
        }
    }

    /// Create an ordered item.
    pub fn ordinal(marker: impl Into<String>, text: impl Into<String>, level: u8) -> Self {
        Self {
            ordered: true,
            marker: marker.into(),
            level,
            text: text.into(),
        }
    }
}

/// Preformatted lines set in a monospace font.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Lines with leading whitespace preserved
    pub lines: Vec<String>,
    /// Guessed language, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl CodeBlock {
    /// Create a code block from lines.
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            language: None,
        }
    }

    /// The code text, lines joined with `\n`.
    pub fn content(&self) -> String {
        self.lines.join("\n")
    }
}

/// Marginal content collected from one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notes {
    /// Page index (0-based)
    pub page: usize,
    /// Units found in the page margins, in reading order
    pub units: Vec<Unit>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_clamped() {
        assert_eq!(
            Unit::heading("Big", 9),
            Unit::Heading {
                level: 6,
                text: "Big".into()
            }
        );
        assert!(Unit::heading("Small", 0).is_heading());
    }

    #[test]
    fn test_list_block_ordering() {
        let mut list = ListBlock::new();
        list.push(ListItem::ordinal("1.", "first", 0));
        list.push(ListItem::bullet("nested", 1));
        assert!(list.is_ordered());
        assert_eq!(list.depth(), 1);
    }

    #[test]
    fn test_iter_all_descends_into_notes() {
        let doc = Document::with_units(vec![
            Unit::paragraph("body"),
            Unit::Notes(Notes {
                page: 0,
                units: vec![Unit::paragraph("footer")],
            }),
        ]);
        assert_eq!(doc.iter_all().count(), 3);
        assert!(doc.plain_text().contains("footer"));
    }

    #[test]
    fn test_unit_serializes_with_type_tag() {
        let json = serde_json::to_string(&Unit::paragraph("x")).unwrap();
        assert_eq!(json, r#"{"type":"paragraph","text":"x"}"#);
    }
}
