use igscript::{decode, expand_statement, DecoderConfig, Error, Operator, ParseError, Slot};
use pretty_assertions::assert_eq;

use super::single;

#[test]
fn it_embeds_nested_statements() {
    let decoded =
        decode("A(farmer) D(must) I(comply) Bdir{A(agency) I(issues) Bdir(permits)}").unwrap();
    let statement = single(&decoded);
    let nested = statement.get(Slot::DirectObjectNested).unwrap();
    let inner = decoded.arena.statement(nested).unwrap();
    assert_eq!(inner.len(), 3);
    assert_eq!(
        decoded.to_script(),
        vec!["A(farmer) D(must) I(comply) Bdir{A(agency) I(issues) Bdir(permits)}"]
    );
}

#[test]
fn it_joins_nested_occurrences() {
    let decoded = decode("I(sow) Cac{A(a) I(rains)} Cac{A(b) I(shines)}").unwrap();
    let root = single(&decoded)
        .get(Slot::ActivationConditionNested)
        .unwrap();
    assert_eq!(decoded.arena.operator(root), Some(Operator::SandBetween));
    assert_eq!(decoded.arena.count_leaves(root), 2);
}

#[test]
fn it_combines_nested_statements() {
    let decoded = decode(
        "A(farmer) I(sow) Cac{Cac{A(sun) I(shines)} [XOR] {Cac{A(rain) I(falls)} [OR] Cac{A(wind) I(blows)}}}",
    )
    .unwrap();
    let root = single(&decoded)
        .get(Slot::ActivationConditionNested)
        .unwrap();
    assert_eq!(decoded.arena.operator(root), Some(Operator::Xor));
    assert_eq!(decoded.arena.depth(root), 2);
    let leaves = decoded.arena.leaves(root);
    assert_eq!(leaves.len(), 3);
    for leaf in leaves {
        assert!(decoded.arena.statement(leaf).is_some());
    }

    // The nested tree is one column of its own.
    let expansion =
        expand_statement(&decoded.arena, single(&decoded), &DecoderConfig::default()).unwrap();
    assert_eq!(expansion.headers(), vec!["A", "I", "Cac-Ref"]);
    assert_eq!(expansion.matrix.len(), 1);
}

#[test]
fn it_rejects_mixed_nested_types() {
    let err = decode("Cac{Cac{A(sun) I(shines)} [XOR] Bdir{A(rain) I(falls)}}").unwrap_err();
    assert!(matches!(
        err,
        Error::Parse(ParseError::InvalidTypesInNestedStatementCombination { .. })
    ));
}

#[test]
fn it_rejects_operands_without_header() {
    let err = decode("Cac{Cac{A(sun) I(shines)} [XOR] rain falls}").unwrap_err();
    assert!(matches!(
        err,
        Error::Parse(ParseError::InvalidCombination { .. })
    ));
}

#[test]
fn it_rejects_nesting_on_unsupported_components() {
    for input in ["D{A(x) I(y)}", "A{A(x) I(y)}", "I{A(x) I(y)}"] {
        let err = decode(input).unwrap_err();
        assert!(
            matches!(
                err,
                Error::Parse(ParseError::NestingOnUnsupportedComponent { .. })
            ),
            "{}",
            input
        );
    }
}

#[test]
fn it_accepts_or_else_only_when_nested() {
    let decoded = decode("A(farmer) I(pay) O{A(agency) I(fines) Bdir(farmer)}").unwrap();
    assert!(single(&decoded).get(Slot::OrElseNested).is_some());

    let decoded = decode("A(farmer) I(pay) O(fine)").unwrap();
    assert_eq!(single(&decoded).len(), 2);
}
