use indexmap::IndexMap;
use serde::Serialize;

use crate::tree::{Arena, NodeId, Slot, Statement};

/// Leaf sequences of a statement in canonical slot order, the input to expansion.
///
/// `slots[i]` names the slot `sequences[i]` was taken from. A slot contributes several
/// sequences when its occurrences are kept apart; `frequency` counts them per slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LeafArrays {
    pub sequences: Vec<Vec<NodeId>>,
    pub slots: Vec<Slot>,
    pub frequency: IndexMap<Slot, usize>,
}

impl LeafArrays {
    /// Collects the leaf sequences of every populated slot.
    ///
    /// Nested slots contribute their whole tree as a single element so that embedded
    /// statements are expanded on their own.
    pub fn from_statement(arena: &Arena, statement: &Statement, aggregate: bool) -> Self {
        let mut arrays = LeafArrays::default();
        for (slot, root) in statement.iter() {
            if slot.is_nested() {
                arrays.push(slot, vec![root]);
                continue;
            }
            for sequence in arena.leaf_sequences(root, aggregate) {
                arrays.push(slot, sequence);
            }
        }
        arrays
    }

    /// Every leaf carrying a suffix, each as its own sequence.
    pub fn suffixed(arena: &Arena, statement: &Statement) -> Self {
        let mut arrays = LeafArrays::default();
        for (slot, root) in statement.iter() {
            for leaf in arena.leaves(root) {
                if arena.suffix(leaf).is_some() {
                    arrays.push(slot, vec![leaf]);
                }
            }
        }
        arrays
    }

    fn push(&mut self, slot: Slot, sequence: Vec<NodeId>) {
        *self.frequency.entry(slot).or_insert(0) += 1;
        self.sequences.push(sequence);
        self.slots.push(slot);
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Column headers; slots with several sequences are numbered `A_1`, `A_2`, ...
    pub fn headers(&self) -> Vec<String> {
        let mut seen: IndexMap<Slot, usize> = IndexMap::new();
        self.slots
            .iter()
            .map(|slot| {
                let count = seen.entry(*slot).or_insert(0);
                *count += 1;
                if self.frequency.get(slot).copied().unwrap_or(0) > 1 {
                    format!("{}_{}", slot, count)
                } else {
                    slot.to_string()
                }
            })
            .collect()
    }
}
