use igscript::{decode, expand_decoded, DecoderConfig, Error, Operator, ParseError, Slot};
use pretty_assertions::assert_eq;

#[test]
fn it_extrapolates_component_pairs() {
    let decoded =
        decode("A(farmer) D(must) {I(sow) Bdir(corn) [XOR] I(harvest) Bdir(wheat)}").unwrap();
    assert_eq!(decoded.arena.operator(decoded.root), Some(Operator::Xor));
    assert_eq!(decoded.statement_leaves().len(), 2);
    for statement in decoded.statements() {
        assert_eq!(statement.len(), 4);
        assert!(statement.get(Slot::Attributes).is_some());
    }

    let expansions = expand_decoded(&decoded, &DecoderConfig::default()).unwrap();
    assert_eq!(expansions.len(), 2);
    assert!(expansions.iter().all(|e| e.matrix.len() == 1));
}

#[test]
fn it_nests_component_pairs() {
    let decoded = decode(
        "A(farmer) {I(sow) Bdir(corn) [XOR] {I(harvest) Bdir(wheat) [AND] I(store) Bdir(barley)}}",
    )
    .unwrap();
    assert_eq!(decoded.arena.depth(decoded.root), 2);
    assert_eq!(
        decoded.to_script(),
        vec![
            "A(farmer) I(sow) Bdir(corn)",
            "A(farmer) I(harvest) Bdir(wheat)",
            "A(farmer) I(store) Bdir(barley)",
        ]
    );
}

#[test]
fn it_joins_shared_components_with_pair_components() {
    let decoded = decode("A(farmer) {A(trader) I(buy) [OR] I(sell)}").unwrap();
    let statements = decoded.statements();
    let first = statements[0].get(Slot::Attributes).unwrap();
    assert_eq!(decoded.arena.operator(first), Some(Operator::SandBetween));
    assert_eq!(decoded.to_script()[0], "A(trader) A(farmer) I(buy)");
}

#[test]
fn it_rejects_multiple_pairs_on_one_level() {
    let err = decode("A(farmer) {I(sow) [XOR] I(reap)} {Bdir(corn) [OR] Bdir(wheat)}").unwrap_err();
    assert!(matches!(
        err,
        Error::Parse(ParseError::MultipleComponentPairsOnSameLevel { .. })
    ));
}
