use igscript::{
    decode, ComponentSymbol, DecoderConfig, Slot, StatementParser, SuffixMatching,
};
use pretty_assertions::assert_eq;

use super::single;

#[test]
fn it_links_properties_by_suffix() {
    let decoded =
        decode("A1(farmer) A2(trader) A1,p(certified) A,p(local) I(sell) Bdir(goods)").unwrap();
    let statement = single(&decoded);
    let actors = decoded.arena.leaves(statement.get(Slot::Attributes).unwrap());
    let farmer = actors[0];
    assert_eq!(decoded.arena.text(farmer), Some("farmer"));

    let links = decoded.arena[farmer].private_links();
    assert_eq!(links.len(), 1);
    assert_eq!(decoded.arena.text(links[0]), Some("certified"));
    assert_eq!(
        decoded.arena[links[0]].component,
        Some(ComponentSymbol::AttributesProperty)
    );
    assert!(decoded.arena[actors[1]].private_links().is_empty());

    // The unsuffixed property stays public.
    let remaining = statement.get(Slot::AttributesProperty).unwrap();
    assert_eq!(decoded.arena.text(remaining), Some("local"));
}

#[test]
fn it_links_aims_to_execution_constraints() {
    let decoded = decode("A(farmer) I1(sow) I2(harvest) Cex1(in spring)").unwrap();
    let statement = single(&decoded);
    assert!(statement.get(Slot::ExecutionConstraint).is_none());
    let aims = decoded.arena.leaves(statement.get(Slot::Aim).unwrap());
    assert_eq!(decoded.arena[aims[0]].private_links().len(), 1);
}

#[test]
fn it_inherits_suffix_through_combinations() {
    let decoded = decode("A1((farmer [OR] trader)) A1,p(certified)").unwrap();
    let statement = single(&decoded);
    let actors = decoded.arena.leaves(statement.get(Slot::Attributes).unwrap());
    assert_eq!(actors.len(), 2);
    let certified = decoded.arena[actors[0]].private_links();
    assert_eq!(certified.len(), 1);
    assert_eq!(decoded.arena[actors[1]].private_links(), certified);
    assert_eq!(decoded.arena.text(certified[0]), Some("certified"));
    assert!(statement.get(Slot::AttributesProperty).is_none());
}

#[test]
fn it_links_one_property_to_repeated_owners() {
    let decoded = decode("A1(farmer) A1(trader) A1,p(certified)").unwrap();
    let statement = single(&decoded);
    let actors = decoded.arena.leaves(statement.get(Slot::Attributes).unwrap());
    for actor in actors {
        let links = decoded.arena[actor].private_links();
        assert_eq!(links.len(), 1);
        assert_eq!(decoded.arena.text(links[0]), Some("certified"));
    }
    assert!(statement.get(Slot::AttributesProperty).is_none());
}

#[test]
fn it_honours_suffix_matching_mode() {
    let input = "A1(farmer) A1,2,p(certified)";
    let decoded = decode(input).unwrap();
    assert!(single(&decoded).get(Slot::AttributesProperty).is_none());

    let parser = StatementParser::new(
        DecoderConfig::default().with_suffix_matching(SuffixMatching::AllTokens),
    );
    let decoded = parser.decode(input).unwrap();
    assert!(single(&decoded).get(Slot::AttributesProperty).is_some());
}

#[test]
fn it_links_nested_properties() {
    let decoded = decode("A(farmer) I(sell) Bdir1(goods) Bdir1,p{A(agency) I(certified)}").unwrap();
    let statement = single(&decoded);
    assert!(statement.get(Slot::DirectObjectPropertyNested).is_none());
    let object = statement.get(Slot::DirectObject).unwrap();
    let links = decoded.arena[object].private_links();
    assert_eq!(links.len(), 1);
    assert!(decoded.arena.statement(links[0]).is_some());
}
