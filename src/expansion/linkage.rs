//! Logical linkage between the leaves of expanded rows.

use indexmap::IndexMap;
use serde::Serialize;

use super::Matrix;
use crate::config::DecoderConfig;
use crate::tree::{collapse, Arena, NodeId, Operator, AND_FAMILY};

/// Per column, the rows each leaf appears in (0-based), in order of first appearance.
pub type LinkageMap = Vec<IndexMap<NodeId, Vec<usize>>>;

pub fn linkage_map(matrix: &Matrix<NodeId>) -> LinkageMap {
    let mut map: LinkageMap = vec![IndexMap::new(); matrix.width()];
    for (row, cells) in matrix.rows.iter().enumerate() {
        for (column, leaf) in cells.iter().enumerate() {
            map[column].entry(*leaf).or_default().push(row);
        }
    }
    map
}

/// Formats 0-based row indices as 1-based ranges, e.g. `1-4,6`.
pub fn format_rows(rows: &[usize]) -> String {
    let mut sorted = rows.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut ranges: Vec<String> = Vec::new();
    let mut iter = sorted.into_iter().peekable();
    while let Some(start) = iter.next() {
        let mut end = start;
        while iter.peek() == Some(&(end + 1)) {
            end += 1;
            iter.next();
        }
        if start == end {
            ranges.push((start + 1).to_string());
        } else {
            ranges.push(format!("{}-{}", start + 1, end + 1));
        }
    }
    ranges.join(",")
}

/// Another leaf of the same tree, how it is linked to a cell, and where it appears.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowLink {
    pub leaf: NodeId,
    pub operators: Vec<Operator>,
    pub rows: Vec<usize>,
}

impl RowLink {
    pub fn rows_label(&self) -> String {
        format_rows(&self.rows)
    }
}

/// Links from the cell at `row`/`column` to every other leaf of its column.
///
/// Leaves outside the cell's scope are skipped: the whole tree when implicit linkages are
/// aggregated, else the part below the topmost synthetic AND.
pub fn row_links(
    arena: &Arena,
    matrix: &Matrix<NodeId>,
    map: &LinkageMap,
    row: usize,
    column: usize,
    config: &DecoderConfig,
) -> Vec<RowLink> {
    let (Some(cell), Some(leaves)) = (matrix.cell(row, column).copied(), map.get(column)) else {
        return Vec::new();
    };
    let scope = |leaf: NodeId| {
        if config.aggregate_implicit_linkages {
            arena.root(leaf)
        } else {
            arena.below_synthetic_root(leaf)
        }
    };
    let cell_scope = scope(cell);

    leaves
        .iter()
        .filter(|(leaf, _)| **leaf != cell && scope(**leaf) == cell_scope)
        .filter_map(|(leaf, rows)| {
            let path = arena.linkage_path(cell, *leaf)?;
            let operators = if config.collapse_operators {
                collapse(&path, &AND_FAMILY)
            } else {
                path
            };
            Some(RowLink {
                leaf: *leaf,
                operators,
                rows: rows.clone(),
            })
        })
        .collect()
}

/// Operator linking two rows in each column; `None` where both rows hold the same leaf.
pub fn row_linkage(arena: &Arena, matrix: &Matrix<NodeId>, a: usize, b: usize) -> Vec<Option<Operator>> {
    (0..matrix.width())
        .map(|column| match (matrix.cell(a, column), matrix.cell(b, column)) {
            (Some(x), Some(y)) => arena.find_linkage(*x, *y),
            _ => None,
        })
        .collect()
}
