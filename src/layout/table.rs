//! Table reconstruction from runs of aligned rows.
//!
//! Cell start positions of all rows in a run are clustered; clusters used by
//! at least two rows become columns. Runs that cannot be reconciled into a
//! rectangular grid are demoted to one paragraph per row.

use std::ops::Range;

use crate::error::Warning;
use crate::layout::classify::{BlockKind, CellSpan, TypedBlock};
use crate::layout::options::LayoutOptions;
use crate::model::Table;

/// A reconstructed table with its position on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedTable {
    /// Page index (0-based)
    pub page: usize,
    /// Column index
    pub column: usize,
    /// Top edge of the first row
    pub top: f32,
    /// Whether the table lies in a margin band
    pub marginal: bool,
    /// The grid
    pub table: Table,
}

/// A finalized element of one page, before reading order is resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum PageItem {
    /// A classified block
    Block(TypedBlock),
    /// A reconstructed table
    Table(PlacedTable),
}

impl PageItem {
    /// Page index.
    pub fn page(&self) -> usize {
        match self {
            PageItem::Block(b) => b.page,
            PageItem::Table(t) => t.page,
        }
    }

    /// Column index.
    pub fn column(&self) -> usize {
        match self {
            PageItem::Block(b) => b.column,
            PageItem::Table(t) => t.column,
        }
    }

    /// Top edge.
    pub fn top(&self) -> f32 {
        match self {
            PageItem::Block(b) => b.top,
            PageItem::Table(t) => t.top,
        }
    }

    /// Whether the item lies in a margin band.
    pub fn is_marginal(&self) -> bool {
        match self {
            PageItem::Block(b) => b.marginal,
            PageItem::Table(t) => t.marginal,
        }
    }
}

/// Classified and table-reconciled content of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzedPage {
    /// Page index (0-based)
    pub page: usize,
    /// Items in classification order
    pub items: Vec<PageItem>,
    /// Non-fatal problems found on the page
    pub warnings: Vec<Warning>,
    /// Number of table rows demoted to paragraphs
    pub demoted_rows: usize,
}

impl AnalyzedPage {
    /// Number of reconstructed tables.
    pub fn table_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i, PageItem::Table(_)))
            .count()
    }
}

/// Replace each maximal run of same-column table rows with tables or
/// paragraphs.
pub fn reconstruct_tables(
    page: usize,
    blocks: Vec<TypedBlock>,
    options: &LayoutOptions,
) -> AnalyzedPage {
    let mut result = AnalyzedPage {
        page,
        ..AnalyzedPage::default()
    };
    let mut run: Vec<TypedBlock> = Vec::new();

    for block in blocks {
        let continues = run.last().is_some_and(|last| {
            block.is_table_row() && last.column == block.column && last.marginal == block.marginal
        });
        if !continues && !run.is_empty() {
            flush_run(std::mem::take(&mut run), options, &mut result);
        }
        if block.is_table_row() {
            run.push(block);
        } else {
            result.items.push(PageItem::Block(block));
        }
    }
    if !run.is_empty() {
        flush_run(run, options, &mut result);
    }
    result
}

fn flush_run(run: Vec<TypedBlock>, options: &LayoutOptions, out: &mut AnalyzedPage) {
    let rows: Vec<&[CellSpan]> = run.iter().filter_map(TypedBlock::cells).collect();

    match reconcile(&rows, options) {
        Ok(pieces) => {
            let mut run: Vec<Option<TypedBlock>> = run.into_iter().map(Some).collect();
            for piece in pieces {
                match piece {
                    Piece::Table { grid, starts, rows } => {
                        let first = run[rows.start].as_ref();
                        let (column, top, marginal) = first
                            .map(|b| (b.column, b.top, b.marginal))
                            .unwrap_or_default();
                        let table = Table::from_grid(grid).with_column_starts(starts);
                        log::debug!(
                            "Page {}: table with {} rows x {} columns",
                            out.page,
                            table.row_count(),
                            table.column_count()
                        );
                        out.items.push(PageItem::Table(PlacedTable {
                            page: out.page,
                            column,
                            top,
                            marginal,
                            table,
                        }));
                    }
                    Piece::Demoted { row, reason } => {
                        if let Some(block) = run[row].take() {
                            out.demoted_rows += 1;
                            if let Some(reason) = reason {
                                out.warnings.push(Warning::TableReconciliationFailure {
                                    page: out.page,
                                    rows: 1,
                                    reason,
                                });
                            }
                            out.items.push(PageItem::Block(demote(block)));
                        }
                    }
                }
            }
        }
        Err(reason) => {
            log::debug!(
                "Page {}: demoting {} table row(s): {}",
                out.page,
                run.len(),
                reason
            );
            out.warnings.push(Warning::TableReconciliationFailure {
                page: out.page,
                rows: run.len(),
                reason,
            });
            out.demoted_rows += run.len();
            out.items
                .extend(run.into_iter().map(|b| PageItem::Block(demote(b))));
        }
    }
}

fn demote(mut block: TypedBlock) -> TypedBlock {
    block.kind = BlockKind::Paragraph;
    block
}

#[derive(Debug)]
enum Piece {
    Table {
        grid: Vec<Vec<String>>,
        starts: Vec<f32>,
        rows: Range<usize>,
    },
    Demoted {
        row: usize,
        reason: Option<String>,
    },
}

/// A column found by clustering cell starts.
#[derive(Debug)]
struct Cluster {
    left: f32,
    rows: Vec<usize>,
}

/// Single-linkage clustering of cell starts. Returns the clusters and the
/// cluster index of every cell, row by row.
fn cluster_starts(rows: &[&[CellSpan]], tolerance: f32) -> (Vec<Cluster>, Vec<Vec<usize>>) {
    let mut starts: Vec<(f32, usize, usize)> = rows
        .iter()
        .enumerate()
        .flat_map(|(r, cells)| cells.iter().enumerate().map(move |(c, cell)| (cell.x0, r, c)))
        .collect();
    starts.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut clusters: Vec<Cluster> = Vec::new();
    let mut assignment: Vec<Vec<usize>> = rows.iter().map(|cells| vec![0; cells.len()]).collect();
    let mut prev_x: Option<f32> = None;

    for (x, r, c) in starts {
        let joins = prev_x.is_some_and(|p| x - p <= tolerance);
        if !joins {
            clusters.push(Cluster {
                left: x,
                rows: Vec::new(),
            });
        }
        let id = clusters.len() - 1;
        if !clusters[id].rows.contains(&r) {
            clusters[id].rows.push(r);
        }
        assignment[r][c] = id;
        prev_x = Some(x);
    }
    (clusters, assignment)
}

fn reconcile(rows: &[&[CellSpan]], options: &LayoutOptions) -> Result<Vec<Piece>, String> {
    let (clusters, assignment) = cluster_starts(rows, options.table_column_tolerance);

    // Map cluster id to stable column index
    let mut column_of: Vec<Option<usize>> = vec![None; clusters.len()];
    let mut starts = Vec::new();
    for (id, cluster) in clusters.iter().enumerate() {
        if cluster.rows.len() >= 2 {
            column_of[id] = Some(starts.len());
            starts.push(cluster.left);
        }
    }
    let columns = starts.len();

    if columns < 2 {
        return Err(format!("{} aligned column(s), need 2", columns));
    }
    if rows.len() < options.min_table_rows {
        return Err(format!(
            "{} row(s), need {}",
            rows.len(),
            options.min_table_rows
        ));
    }

    let populated: Vec<usize> = assignment
        .iter()
        .map(|ids| {
            let mut hit = vec![false; columns];
            for id in ids {
                if let Some(col) = column_of[*id] {
                    hit[col] = true;
                }
            }
            hit.iter().filter(|h| **h).count()
        })
        .collect();
    let complete = populated.iter().filter(|n| **n == columns).count();
    if complete * 2 <= rows.len() {
        return Err(format!(
            "only {} of {} rows fill all {} columns",
            complete,
            rows.len(),
            columns
        ));
    }

    // Split at rows that populate fewer than two columns
    let mut pieces = Vec::new();
    let mut fragment_start: Option<usize> = None;
    for r in 0..=rows.len() {
        let keep = r < rows.len() && populated[r] >= 2;
        match (keep, fragment_start) {
            (true, None) => fragment_start = Some(r),
            (false, Some(start)) => {
                emit_fragment(rows, &assignment, &column_of, &starts, start..r, options, &mut pieces);
                fragment_start = None;
            }
            _ => {}
        }
        if !keep && r < rows.len() {
            pieces.push(Piece::Demoted {
                row: r,
                reason: None,
            });
        }
    }
    Ok(pieces)
}

fn emit_fragment(
    rows: &[&[CellSpan]],
    assignment: &[Vec<usize>],
    column_of: &[Option<usize>],
    starts: &[f32],
    range: Range<usize>,
    options: &LayoutOptions,
    pieces: &mut Vec<Piece>,
) {
    if range.len() < options.min_table_rows {
        for row in range.clone() {
            pieces.push(Piece::Demoted {
                row,
                reason: Some(format!(
                    "table fragment of {} row(s), need {}",
                    range.len(),
                    options.min_table_rows
                )),
            });
        }
        return;
    }

    let columns = starts.len();
    let mut extra_start: Option<f32> = None;
    let mut grid: Vec<Vec<String>> = Vec::with_capacity(range.len());
    for r in range.clone() {
        let mut cells = vec![String::new(); columns + 1];
        for (cell, id) in rows[r].iter().zip(&assignment[r]) {
            let slot = match column_of[*id] {
                Some(col) => col,
                None => {
                    extra_start = Some(extra_start.map_or(cell.x0, |x| x.min(cell.x0)));
                    columns
                }
            };
            if !cells[slot].is_empty() {
                cells[slot].push(' ');
            }
            cells[slot].push_str(&cell.text);
        }
        grid.push(cells);
    }

    let mut starts = starts.to_vec();
    match extra_start {
        Some(x) => starts.push(x),
        None => grid.iter_mut().for_each(|cells| {
            cells.pop();
        }),
    }

    pieces.push(Piece::Table {
        grid,
        starts,
        rows: range,
    });
}
