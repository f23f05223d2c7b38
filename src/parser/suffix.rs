//! Private links between suffixed leaves and the property leaves they own.
//!
//! `A1(farmer) A1,p(certified)` ties the property `certified` to `farmer` only. Matching
//! property leaves are recorded on the owning leaf and removed from their own slot.

use indexmap::IndexMap;
use tracing::debug;

use crate::config::SuffixMatching;
use crate::error::TreeResult;
use crate::expansion::LeafArrays;
use crate::tree::{Arena, NodeId, Slot, Statement};

/// Links suffixed leaves to matching leaves of their property component.
///
/// Simple target slots are processed before nested ones. Within a pass every source is
/// matched before any target leaves its tree, so a target shared by several sources is
/// linked to all of them.
pub fn link_private_properties(
    arena: &mut Arena,
    statement: &mut Statement,
    matching: SuffixMatching,
) -> TreeResult<()> {
    for nested in [false, true] {
        let sources = LeafArrays::suffixed(arena, statement);
        let mut pairs = Vec::new();
        for (sequence, slot) in sources.sequences.iter().zip(&sources.slots) {
            let Some(target_slot) = slot
                .symbol()
                .private_link_target()
                .and_then(|target| Slot::new(target, nested))
            else {
                continue;
            };
            for source in sequence {
                for target in matching_targets(arena, statement, *source, target_slot, matching) {
                    pairs.push((*source, target, target_slot));
                }
            }
        }
        detach_targets(arena, statement, &pairs)?;
    }
    Ok(())
}

fn matching_targets(
    arena: &Arena,
    statement: &Statement,
    source: NodeId,
    target_slot: Slot,
    matching: SuffixMatching,
) -> Vec<NodeId> {
    let (Some(source_suffix), Some(target_root)) =
        (arena.suffix(source), statement.get(target_slot))
    else {
        return Vec::new();
    };
    arena
        .leaves(target_root)
        .into_iter()
        .filter(|target| {
            arena
                .suffix(*target)
                .is_some_and(|suffix| suffixes_match(source_suffix, suffix, matching))
        })
        .collect()
}

fn detach_targets(
    arena: &mut Arena,
    statement: &mut Statement,
    pairs: &[(NodeId, NodeId, Slot)],
) -> TreeResult<()> {
    let mut targets: IndexMap<NodeId, Slot> = IndexMap::new();
    for (_, target, slot) in pairs {
        targets.entry(*target).or_insert(*slot);
    }

    // Targets leave their trees, so inherited attributes become their own.
    for target in targets.keys() {
        let component = arena.component(*target);
        let suffix = arena.suffix(*target).map(str::to_string);
        let annotation = arena.annotations(*target);
        let node = arena.node_mut(*target);
        node.component = component;
        node.suffix = suffix;
        node.annotation = annotation;
    }

    for (source, target, slot) in pairs {
        arena.add_private_link(*source, *target)?;
        debug!("linked {:?} to {:?} in {}", target, source, slot);
    }

    for (target, slot) in targets {
        match arena.remove(target)? {
            Some(root) => {
                statement.set(slot, root);
            }
            None => {
                statement.clear(slot);
            }
        }
    }
    Ok(())
}

pub(crate) fn suffixes_match(source: &str, target: &str, matching: SuffixMatching) -> bool {
    match matching {
        SuffixMatching::AllTokens => source == target,
        SuffixMatching::FirstToken => first_token(source) == first_token(target),
    }
}

fn first_token(suffix: &str) -> &str {
    suffix.split(',').next().unwrap_or(suffix)
}
