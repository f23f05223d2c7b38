use itertools::Itertools;
use serde::Serialize;
use tracing::debug;

use crate::error::ExpansionError;

/// Cartesian expansion of leaf sequences.
///
/// `columns[j]` is the index of the input sequence feeding column `j`; empty inputs have no
/// column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Matrix<T> {
    pub columns: Vec<usize>,
    pub rows: Vec<Vec<T>>,
}

impl<T> Matrix<T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&T> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Column fed by input sequence `sequence`, if it was populated.
    pub fn column_of(&self, sequence: usize) -> Option<usize> {
        self.columns.iter().position(|c| *c == sequence)
    }
}

/// Number of rows `expand` would produce, or `None` on overflow.
pub fn row_count<T>(sequences: &[Vec<T>]) -> Option<usize> {
    let mut populated = sequences.iter().filter(|s| !s.is_empty()).peekable();
    populated.peek()?;
    populated.try_fold(1usize, |acc, s| acc.checked_mul(s.len()))
}

/// Every combination picking one element per populated sequence, rightmost varying fastest.
pub fn expand<T: Clone>(sequences: &[Vec<T>], max_rows: usize) -> Result<Matrix<T>, ExpansionError> {
    let columns: Vec<usize> = sequences
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.is_empty())
        .map(|(i, _)| i)
        .collect();
    if columns.is_empty() {
        return Ok(Matrix {
            columns,
            rows: Vec::new(),
        });
    }

    let rows = row_count(sequences).unwrap_or(usize::MAX);
    if rows > max_rows {
        return Err(ExpansionError::TooManyRows {
            rows,
            limit: max_rows,
        });
    }

    let rows: Vec<Vec<T>> = columns
        .iter()
        .map(|i| sequences[*i].iter().cloned())
        .multi_cartesian_product()
        .collect();
    debug!("expanded {} sequences into {} rows", columns.len(), rows.len());
    Ok(Matrix { columns, rows })
}
