//! Reading-order resolution: page items to the final [`Document`].

use crate::layout::classify::{BlockKind, TypedBlock};
use crate::layout::code::guess_language;
use crate::layout::table::{AnalyzedPage, PageItem};
use crate::model::{CodeBlock, Document, ListBlock, ListItem, Notes, Unit};

/// Order the analyzed pages into one document.
///
/// Items are ordered by page, then column, then top edge; items at the same
/// position keep their classification order. Margin content of each page is
/// collected into a trailing [`Notes`] unit for that page.
pub fn resolve(mut pages: Vec<AnalyzedPage>) -> Document {
    pages.sort_by_key(|p| p.page);
    let page_count = pages.len();
    let mut units = Vec::new();

    for page in pages {
        let mut items = page.items;
        items.sort_by(|a, b| a.column().cmp(&b.column()).then(a.top().total_cmp(&b.top())));

        let (marginal, body): (Vec<PageItem>, Vec<PageItem>) =
            items.into_iter().partition(PageItem::is_marginal);

        units.extend(build_units(body));

        let notes = build_units(marginal);
        if !notes.is_empty() {
            units.push(Unit::Notes(Notes {
                page: page.page,
                units: notes,
            }));
        }
    }

    Document { units, page_count }
}

/// Group ordered items into units, merging list items and code lines.
fn build_units(items: Vec<PageItem>) -> Vec<Unit> {
    let mut units = Vec::new();
    let mut list_run: Vec<TypedBlock> = Vec::new();
    let mut code_run: Vec<TypedBlock> = Vec::new();

    for item in items {
        let block = match item {
            PageItem::Table(placed) => {
                flush_list(&mut list_run, &mut units);
                flush_code(&mut code_run, &mut units);
                units.push(Unit::Table(placed.table));
                continue;
            }
            PageItem::Block(block) => block,
        };

        match &block.kind {
            BlockKind::ListItem { .. } => {
                flush_code(&mut code_run, &mut units);
                list_run.push(block);
            }
            BlockKind::CodeLine => {
                flush_list(&mut list_run, &mut units);
                code_run.push(block);
            }
            _ => {
                flush_list(&mut list_run, &mut units);
                flush_code(&mut code_run, &mut units);
                if let Some(unit) = single_unit(block) {
                    units.push(unit);
                }
            }
        }
    }
    flush_list(&mut list_run, &mut units);
    flush_code(&mut code_run, &mut units);
    units
}

fn single_unit(block: TypedBlock) -> Option<Unit> {
    if block.text.trim().is_empty() {
        return None;
    }
    match block.kind {
        BlockKind::Heading { level } => Some(Unit::heading(block.text, level)),
        // Table rows reaching this point were never reconciled
        BlockKind::Paragraph | BlockKind::TableRow { .. } => Some(Unit::paragraph(block.text)),
        BlockKind::ListItem { .. } | BlockKind::CodeLine => None,
    }
}

fn flush_list(run: &mut Vec<TypedBlock>, units: &mut Vec<Unit>) {
    if run.is_empty() {
        return;
    }

    let items: Vec<ListItem> = run
        .drain(..)
        .filter_map(|block| match block.kind {
            BlockKind::ListItem {
                ordered,
                marker,
                level,
            } => Some(ListItem {
                ordered,
                marker,
                level,
                text: block.text,
            }),
            _ => None,
        })
        .collect();

    for list in split_lists(normalize_levels(items)) {
        units.push(Unit::List(list));
    }
}

/// Shift levels so the shallowest item is at 0 and no item is more than
/// one level deeper than its predecessor.
fn normalize_levels(mut items: Vec<ListItem>) -> Vec<ListItem> {
    let min = items.iter().map(|i| i.level).min().unwrap_or(0);
    let mut prev: Option<u8> = None;
    for item in &mut items {
        let level = item.level - min;
        item.level = match prev {
            None => 0,
            Some(p) => level.min(p.saturating_add(1)),
        };
        prev = Some(item.level);
    }
    items
}

/// Start a new list where a top-level item switches between ordered and
/// unordered.
fn split_lists(items: Vec<ListItem>) -> Vec<ListBlock> {
    let mut lists: Vec<ListBlock> = Vec::new();
    for item in items {
        let starts_new = match lists.last() {
            None => true,
            Some(list) => item.level == 0 && list.is_ordered() != item.ordered,
        };
        if starts_new {
            lists.push(ListBlock::new());
        }
        if let Some(list) = lists.last_mut() {
            list.push(item);
        }
    }
    lists
}

fn flush_code(run: &mut Vec<TypedBlock>, units: &mut Vec<Unit>) {
    if run.is_empty() {
        return;
    }

    let mut lines = Vec::with_capacity(run.len());
    let mut prev_source: Option<usize> = None;
    for block in run.drain(..) {
        if prev_source.is_some_and(|s| s != block.source) {
            lines.push(String::new());
        }
        prev_source = Some(block.source);
        lines.push(block.text);
    }

    let mut code = CodeBlock::new(lines);
    code.language = guess_language(&code.content()).map(str::to_string);
    units.push(Unit::CodeBlock(code));
}
