use igscript::{decode, Decoded, NodeId, Slot, Statement};

pub mod component_pair_test;
pub mod examples_test;
pub mod nested_statement_test;
pub mod private_link_test;

pub fn single(decoded: &Decoded) -> &Statement {
    decoded
        .arena
        .statement(decoded.root)
        .expect("root is a statement")
}

pub fn slot_texts(input: &str, slot: Slot) -> Vec<String> {
    let decoded = decode(input).unwrap();
    let root: NodeId = single(&decoded).get(slot).unwrap();
    decoded
        .arena
        .leaves(root)
        .into_iter()
        .map(|leaf| decoded.arena.text(leaf).unwrap().to_string())
        .collect()
}
