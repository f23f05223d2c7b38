//! Data model: arena-allocated binary operator trees and the statements holding them.

mod arena;
mod component;
mod node;
mod operator;
mod statement;

pub use arena::Arena;
pub use component::{ComponentSymbol, Slot};
pub use node::{Entry, Node, NodeId, NodeKind};
pub use operator::{collapse, Operator, AND_FAMILY};
pub use statement::{Complexity, SlotComplexity, Statement};
