//! Logical operators joining the two children of a combination node.
//!
//! Three operators are written explicitly in IG Script (`[AND]`, `[OR]`, `[XOR]`). Two further
//! AND variants are introduced by the decoder itself:
//!
//! * [`Operator::SandBetween`] (`bAND`) joins separate occurrences of the same component,
//!   e.g. `A(x) A(y)`.
//! * [`Operator::SandWithin`] (`wAND`) joins sibling combinations inside one component,
//!   e.g. `Cex((a [AND] b) middle (c [XOR] d))`.
//!
//! Both synthetic forms are accepted back by the parser so that normalized output re-parses.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    Display,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum Operator {
    #[strum(serialize = "AND")]
    And,
    #[strum(serialize = "OR")]
    Or,
    #[strum(serialize = "XOR")]
    Xor,
    #[strum(serialize = "bAND")]
    SandBetween,
    #[strum(serialize = "wAND")]
    SandWithin,
}

impl Operator {
    /// Token form as written in IG Script, e.g. `[XOR]`.
    pub fn token(&self) -> String {
        format!("[{}]", self)
    }

    /// AND and both synthetic ANDs.
    pub fn is_and_family(&self) -> bool {
        matches!(
            self,
            Operator::And | Operator::SandBetween | Operator::SandWithin
        )
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, Operator::SandBetween | Operator::SandWithin)
    }

    /// Tokens the combination parser recognizes, longest first within a shared prefix.
    pub(crate) const RECOGNIZED: [(&'static str, Operator); 5] = [
        ("[AND]", Operator::And),
        ("[XOR]", Operator::Xor),
        ("[OR]", Operator::Or),
        ("[wAND]", Operator::SandWithin),
        ("[bAND]", Operator::SandBetween),
    ];

    /// Matches an operator token at the start of `input`.
    pub(crate) fn match_token(input: &str) -> Option<(Operator, usize)> {
        Self::RECOGNIZED
            .iter()
            .find(|(token, _)| input.starts_with(token))
            .map(|(token, op)| (*op, token.len()))
    }
}

/// Merges runs of consecutive operators contained in `family` into a single entry.
///
/// The first operator of each run is kept as the representative.
pub fn collapse(ops: &[Operator], family: &[Operator]) -> Vec<Operator> {
    let mut out: Vec<Operator> = Vec::with_capacity(ops.len());
    for op in ops {
        if let Some(last) = out.last() {
            if family.contains(last) && family.contains(op) {
                continue;
            }
        }
        out.push(*op);
    }
    out
}

/// The AND family used when collapsing linkage paths.
pub const AND_FAMILY: [Operator; 3] = [Operator::And, Operator::SandBetween, Operator::SandWithin];
