//! Decoder for IG Script, the Institutional Grammar annotation language.
//!
//! Annotated institutional statements such as
//! `A(farmer) D(must) I((sow [XOR] harvest)) Bdir(crops) Cac{A(season) I(begins)}` are decoded
//! into arena-allocated operator trees per component ([`parser`], [`tree`]), then expanded into
//! the atomic statements they encode together with the logical linkage between them
//! ([`expansion`]).

pub mod config;
pub mod error;
pub mod expansion;
pub mod parser;
pub mod tree;

// Re-exports
pub use config::{DecoderConfig, SharedInheritance, SuffixMatching};
pub use error::*;
pub use expansion::{expand_decoded, expand_statement, Expansion};
pub use parser::{decode, Decoded, StatementParser};
pub use tree::{Arena, ComponentSymbol, NodeId, Operator, Slot, Statement};
