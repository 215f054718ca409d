//! Conversion statistics.

use crate::model::{Document, Unit};
use serde::{Deserialize, Serialize};

/// Statistics collected during a conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Total number of pages received
    pub page_count: u32,

    /// Pages that contributed no units
    pub empty_pages: u32,

    /// Tokens skipped for a degenerate bounding box
    pub malformed_tokens: u32,

    /// Number of headings
    pub heading_count: u32,

    /// Number of paragraphs
    pub paragraph_count: u32,

    /// Number of lists
    pub list_count: u32,

    /// Number of list items across all lists
    pub list_item_count: u32,

    /// Number of tables
    pub table_count: u32,

    /// Table-like rows that were emitted as paragraphs
    pub table_demotions: u32,

    /// Number of code blocks
    pub code_block_count: u32,

    /// Pages with margin content
    pub notes_count: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the units of a document, including those inside notes.
    pub fn from_document(doc: &Document) -> Self {
        let mut stats = Self {
            page_count: doc.page_count as u32,
            ..Self::default()
        };
        for unit in doc.iter_all() {
            stats.add_unit(unit);
        }
        stats
    }

    fn add_unit(&mut self, unit: &Unit) {
        match unit {
            Unit::Heading { text, .. } => {
                self.heading_count += 1;
                self.count_text(text);
            }
            Unit::Paragraph { text } => {
                self.paragraph_count += 1;
                self.count_text(text);
            }
            Unit::List(list) => {
                self.list_count += 1;
                self.list_item_count += list.items.len() as u32;
                for item in &list.items {
                    self.count_text(&item.text);
                }
            }
            Unit::Table(table) => {
                self.table_count += 1;
                self.count_text(&table.plain_text());
            }
            Unit::CodeBlock(code) => {
                self.code_block_count += 1;
                self.count_text(&code.content());
            }
            // Contained units are visited on their own
            Unit::Notes(_) => self.notes_count += 1,
        }
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.page_count += other.page_count;
        self.empty_pages += other.empty_pages;
        self.malformed_tokens += other.malformed_tokens;
        self.heading_count += other.heading_count;
        self.paragraph_count += other.paragraph_count;
        self.list_count += other.list_count;
        self.list_item_count += other.list_item_count;
        self.table_count += other.table_count;
        self.table_demotions += other.table_demotions;
        self.code_block_count += other.code_block_count;
        self.notes_count += other.notes_count;
        self.word_count += other.word_count;
        self.char_count += other.char_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ListBlock, ListItem, Notes, Table};

    #[test]
    fn test_extraction_stats_count_text() {
        let mut stats = ExtractionStats::new();
        stats.count_text("Hello, world! This is a test.");

        assert_eq!(stats.word_count, 6);
        assert_eq!(stats.char_count, 24);
    }

    #[test]
    fn test_from_document() {
        let mut list = ListBlock::new();
        list.push(ListItem::bullet("one", 0));
        list.push(ListItem::bullet("two", 1));
        let doc = Document {
            units: vec![
                Unit::heading("Title", 1),
                Unit::paragraph("Body text"),
                Unit::List(list),
                Unit::Table(Table::from_grid(vec![
                    vec!["a".into(), "b".into()],
                    vec!["1".into(), "2".into()],
                ])),
                Unit::Notes(Notes {
                    page: 0,
                    units: vec![Unit::paragraph("7")],
                }),
            ],
            page_count: 1,
        };

        let stats = ExtractionStats::from_document(&doc);
        assert_eq!(stats.page_count, 1);
        assert_eq!(stats.heading_count, 1);
        assert_eq!(stats.paragraph_count, 2);
        assert_eq!(stats.list_count, 1);
        assert_eq!(stats.list_item_count, 2);
        assert_eq!(stats.table_count, 1);
        assert_eq!(stats.notes_count, 1);
    }

    #[test]
    fn test_extraction_stats_merge() {
        let mut stats1 = ExtractionStats {
            paragraph_count: 5,
            table_count: 2,
            ..Default::default()
        };
        let stats2 = ExtractionStats {
            paragraph_count: 3,
            table_count: 1,
            malformed_tokens: 4,
            ..Default::default()
        };

        stats1.merge(&stats2);

        assert_eq!(stats1.paragraph_count, 8);
        assert_eq!(stats1.table_count, 3);
        assert_eq!(stats1.malformed_tokens, 4);
    }
}
