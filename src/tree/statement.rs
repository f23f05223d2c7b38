use std::collections::BTreeMap;

use serde::Serialize;

use super::{Arena, ComponentSymbol, NodeId, NodeKind, Operator, Slot};
use crate::error::{ParseError, ParseResult, TreeResult};

/// Component slots of one institutional statement, each holding the root of a tree.
///
/// Trees live in the [`Arena`] the statement was parsed into; the statement only records
/// which root belongs to which slot. Iteration follows the canonical [`Slot`] order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Statement {
    slots: BTreeMap<Slot, NodeId>,
}

/// Options and states of a single slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotComplexity {
    pub options: usize,
    pub states: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Complexity {
    pub slots: BTreeMap<Slot, SlotComplexity>,
    pub total: usize,
}

impl Statement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: Slot) -> Option<NodeId> {
        self.slots.get(&slot).copied()
    }

    pub fn set(&mut self, slot: Slot, root: NodeId) -> Option<NodeId> {
        self.slots.insert(slot, root)
    }

    /// Like [`Statement::get`], for callers that treat a missing component as an error.
    pub fn require(&self, slot: Slot) -> ParseResult<NodeId> {
        self.get(slot).ok_or_else(|| ParseError::ComponentNotFound {
            component: slot.to_string(),
        })
    }

    pub fn clear(&mut self, slot: Slot) -> Option<NodeId> {
        self.slots.remove(&slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, NodeId)> + '_ {
        self.slots.iter().map(|(slot, root)| (*slot, *root))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Stores a tree in a slot, joining it to an existing tree with a synthetic AND.
    pub fn attach(&mut self, arena: &mut Arena, slot: Slot, root: NodeId) -> TreeResult<()> {
        let combined = arena.combine_optional(self.get(slot), root, Operator::SandBetween)?;
        self.slots.insert(slot, combined);
        Ok(())
    }

    /// Adds copies of every component of `other` to this statement.
    pub fn copy_components_from(&mut self, arena: &mut Arena, other: &Statement) -> TreeResult<()> {
        for (slot, root) in other.iter() {
            let copy = arena.clone_subtree(root);
            self.attach(arena, slot, copy)?;
        }
        Ok(())
    }

    /// Copy of this statement whose trees are fresh copies in the same arena.
    pub fn deep_clone(&self, arena: &mut Arena) -> Statement {
        let mut copy = Statement::new();
        for (slot, root) in self.iter() {
            let root = arena.clone_subtree(root);
            copy.set(slot, root);
        }
        copy
    }

    pub fn complexity(&self, arena: &Arena) -> Complexity {
        let slots: BTreeMap<Slot, SlotComplexity> = self
            .iter()
            .map(|(slot, root)| {
                (
                    slot,
                    SlotComplexity {
                        options: arena.count_leaves(root),
                        states: arena.state_complexity(root),
                    },
                )
            })
            .collect();

        let leading: usize = slots
            .iter()
            .filter(|(slot, _)| !slot.is_condition() && slot.symbol() != ComponentSymbol::OrElse)
            .map(|(_, c)| c.states)
            .filter(|states| *states > 1)
            .sum();
        let conditions: usize = slots
            .iter()
            .filter(|(slot, _)| slot.is_condition())
            .map(|(_, c)| c.states)
            .sum();

        Complexity {
            total: leading.max(1) * conditions.max(1),
            slots,
        }
    }

    pub fn state_complexity(&self, arena: &Arena) -> usize {
        self.complexity(arena).total
    }

    /// Renders the statement back into IG Script.
    pub fn to_script(&self, arena: &Arena) -> String {
        let mut parts = Vec::new();
        for (slot, root) in self.iter() {
            for occurrence in occurrences(arena, root) {
                let header = header(arena, slot.symbol(), occurrence);
                if slot.is_nested() {
                    parts.push(format!("{}{{{}}}", header, nested_body(arena, occurrence)));
                } else {
                    parts.push(format!("{}({})", header, arena.stringify(occurrence)));
                }
            }
        }
        parts.join(" ")
    }
}

/// Splits a slot tree into the separately written occurrences joined by `bAND`.
fn occurrences(arena: &Arena, root: NodeId) -> Vec<NodeId> {
    match arena[root].kind {
        NodeKind::Combination {
            operator: Operator::SandBetween,
            left,
            right,
        } => {
            let mut out = occurrences(arena, left);
            out.extend(occurrences(arena, right));
            out
        }
        _ => vec![root],
    }
}

fn header(arena: &Arena, symbol: ComponentSymbol, id: NodeId) -> String {
    let node = &arena[id];
    let suffix = node.suffix.as_deref().unwrap_or("");
    let annotation = node.annotation.as_deref().unwrap_or("");
    if symbol.is_property() {
        format!("{}{},p{}", symbol.root(), suffix, annotation)
    } else {
        format!("{}{}{}", symbol, suffix, annotation)
    }
}

/// Content between the braces of a nested component.
fn nested_body(arena: &Arena, id: NodeId) -> String {
    match arena[id].kind {
        NodeKind::Combination {
            operator,
            left,
            right,
        } => format!(
            "{} {} {}",
            nested_operand(arena, left),
            operator.token(),
            nested_operand(arena, right)
        ),
        NodeKind::Leaf { .. } => arena
            .statement(id)
            .map(|statement| statement.to_script(arena))
            .unwrap_or_else(|| arena.stringify(id)),
    }
}

fn nested_operand(arena: &Arena, id: NodeId) -> String {
    match arena[id].kind {
        NodeKind::Combination { .. } => format!("{{{}}}", nested_body(arena, id)),
        NodeKind::Leaf { .. } => match arena.component(id) {
            Some(symbol) => format!("{}{{{}}}", header(arena, symbol, id), nested_body(arena, id)),
            None => format!("{{{}}}", nested_body(arena, id)),
        },
    }
}
