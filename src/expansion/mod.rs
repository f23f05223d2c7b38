//! Expansion of decoded statements into atomic rows.
//!
//! A statement's leaf sequences ([`LeafArrays`]) are expanded into their Cartesian product
//! ([`Matrix`]), and every cell can be related to the other leaves of its column through the
//! operators joining them in the tree ([`linkage`]).

mod leaves;
pub mod linkage;
mod permutation;

use serde::Serialize;
use tracing::{debug, instrument};

pub use leaves::LeafArrays;
pub use linkage::{format_rows, linkage_map, row_linkage, row_links, LinkageMap, RowLink};
pub use permutation::{expand, row_count, Matrix};

use crate::config::DecoderConfig;
use crate::error::ExpansionError;
use crate::parser::Decoded;
use crate::tree::{Arena, NodeId, Statement};

/// A statement expanded into rows of leaves.
#[derive(Debug, Clone, Serialize)]
pub struct Expansion {
    pub leaves: LeafArrays,
    pub matrix: Matrix<NodeId>,
    pub links: LinkageMap,
}

impl Expansion {
    /// Headers of the populated columns.
    pub fn headers(&self) -> Vec<String> {
        let all = self.leaves.headers();
        self.matrix
            .columns
            .iter()
            .filter_map(|i| all.get(*i).cloned())
            .collect()
    }

    /// Cell values with shared elements resolved.
    pub fn render_rows(&self, arena: &Arena, config: &DecoderConfig) -> Vec<Vec<String>> {
        self.matrix
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| arena.leaf_value(*cell, config.shared_inheritance))
                    .collect()
            })
            .collect()
    }

    pub fn row_links(
        &self,
        arena: &Arena,
        row: usize,
        column: usize,
        config: &DecoderConfig,
    ) -> Vec<RowLink> {
        row_links(arena, &self.matrix, &self.links, row, column, config)
    }
}

#[instrument(level = "debug", skip_all)]
pub fn expand_statement(
    arena: &Arena,
    statement: &Statement,
    config: &DecoderConfig,
) -> Result<Expansion, ExpansionError> {
    let leaves = LeafArrays::from_statement(arena, statement, config.aggregate_implicit_linkages);
    let matrix = expand(&leaves.sequences, config.max_rows)?;
    let links = linkage_map(&matrix);
    debug!(
        "statement expanded into {} rows of {} columns",
        matrix.len(),
        matrix.width()
    );
    Ok(Expansion {
        leaves,
        matrix,
        links,
    })
}

/// Expands every statement of a decoded input, component pairs included.
pub fn expand_decoded(
    decoded: &Decoded,
    config: &DecoderConfig,
) -> Result<Vec<Expansion>, ExpansionError> {
    decoded
        .statements()
        .into_iter()
        .map(|statement| expand_statement(&decoded.arena, statement, config))
        .collect()
}
