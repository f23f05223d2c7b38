use igscript::{
    decode, expand_statement,
    expansion::{format_rows, row_linkage},
    parser::{parse_combination, Delimiters},
    Arena, DecoderConfig, Operator, Slot,
};
use pretty_assertions::assert_eq;

use super::{single, slot_texts};

#[test]
fn it_parses_simple_combination() {
    let mut arena = Arena::new();
    let (root, _) =
        parse_combination(&mut arena, "(inspect and [OR] party)", Delimiters::Parentheses).unwrap();
    assert_eq!(arena.depth(root), 1);
    assert_eq!(arena.count_leaves(root), 2);
    assert_eq!(arena.operator(root), Some(Operator::Or));
    let leaves = arena.leaves(root);
    assert_eq!(arena.text(leaves[0]), Some("inspect and"));
    assert_eq!(arena.text(leaves[1]), Some("party"));
}

#[test]
fn it_parses_nested_combination() {
    let mut arena = Arena::new();
    let (root, _) = parse_combination(
        &mut arena,
        "((inspect and [OR] party) [AND] sing)",
        Delimiters::Parentheses,
    )
    .unwrap();
    assert_eq!(arena.depth(root), 2);
    assert_eq!(arena.count_leaves(root), 3);
}

#[test]
fn it_rewrites_repeated_and() {
    let mut arena = Arena::new();
    let (root, normalized) = parse_combination(
        &mut arena,
        "((inspect and [OR] party) [AND] sing [AND] dance [AND] eat)",
        Delimiters::Parentheses,
    )
    .unwrap();
    assert_eq!(arena.count_leaves(root), 5);
    assert_eq!(
        normalized,
        "((((inspect and [OR] party) [AND] sing) [AND] dance) [AND] eat)"
    );

    let mut arena = Arena::new();
    let (root, _) =
        parse_combination(&mut arena, "(a [AND] b [AND] c [AND] d)", Delimiters::Parentheses)
            .unwrap();
    assert_eq!(arena.count_leaves(root), 4);
    assert_eq!(arena.depth(root), 3);
}

#[test]
fn it_rewrites_and_chain_around_nested_combination() {
    let input = "(French (and) [AND] (certified production and [XOR] handling operations) and [AND] (accredited certifying agents))";
    let mut arena = Arena::new();
    let (root, normalized) =
        parse_combination(&mut arena, input, Delimiters::Parentheses).unwrap();
    assert_eq!(
        normalized,
        "((French (and) [AND] (certified production and [XOR] handling operations) and) [AND] (accredited certifying agents))"
    );

    assert_eq!(arena.operator(root), Some(Operator::And));
    let (left, _) = arena[root].children().unwrap();
    assert_eq!(arena.operator(left), Some(Operator::And));
    assert_eq!(arena.depth(root), 3);

    let leaves: Vec<_> = arena
        .leaves(root)
        .into_iter()
        .map(|leaf| arena.text(leaf).unwrap().to_string())
        .collect();
    assert_eq!(
        leaves,
        vec![
            "French (and)",
            "certified production and",
            "handling operations",
            "accredited certifying agents"
        ]
    );

    let (_, renormalized) =
        parse_combination(&mut arena, &normalized, Delimiters::Parentheses).unwrap();
    assert_eq!(renormalized, normalized);
}

#[test]
fn it_aggregates_repeated_components() {
    let decoded = decode("A(x) A(y)").unwrap();
    let statement = single(&decoded);

    let aggregated = expand_statement(&decoded.arena, statement, &DecoderConfig::default()).unwrap();
    assert_eq!(aggregated.leaves.sequences.len(), 1);
    assert_eq!(aggregated.leaves.sequences[0].len(), 2);
    assert_eq!(aggregated.headers(), vec!["A"]);
    assert_eq!(aggregated.matrix.len(), 2);

    let config = DecoderConfig::default().with_aggregation(false);
    let separate = expand_statement(&decoded.arena, statement, &config).unwrap();
    assert_eq!(separate.headers(), vec!["A_1", "A_2"]);
    assert!(separate.leaves.sequences.iter().all(|s| s.len() == 1));
    assert_eq!(separate.matrix.len(), 1);
}

#[test]
fn it_expands_and_links_rows() {
    let decoded = decode("A(farmer) I((sow [AND] harvest)) Bdir((corn [OR] wheat))").unwrap();
    let config = DecoderConfig::default();
    let expansion = expand_statement(&decoded.arena, single(&decoded), &config).unwrap();

    assert_eq!(expansion.headers(), vec!["A", "I", "Bdir"]);
    assert_eq!(
        expansion.render_rows(&decoded.arena, &config),
        vec![
            vec!["farmer", "sow", "corn"],
            vec!["farmer", "sow", "wheat"],
            vec!["farmer", "harvest", "corn"],
            vec!["farmer", "harvest", "wheat"],
        ]
    );

    // Rows sharing an object differ in the AND-ed aims.
    assert_eq!(
        row_linkage(&decoded.arena, &expansion.matrix, 0, 2),
        vec![None, Some(Operator::And), None]
    );
    // Rows sharing an aim differ in the OR-ed objects.
    assert_eq!(
        row_linkage(&decoded.arena, &expansion.matrix, 0, 1),
        vec![None, None, Some(Operator::Or)]
    );

    let links = expansion.row_links(&decoded.arena, 0, 1, &config);
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].operators, vec![Operator::And]);
    assert_eq!(format_rows(&links[0].rows), "3-4");
}

#[test]
fn it_resolves_shared_elements() {
    let texts = slot_texts("Cex(on (weekdays [XOR] holidays) only)", Slot::ExecutionConstraint);
    assert_eq!(texts, vec!["weekdays", "holidays"]);

    let decoded = decode("Cex(on (weekdays [XOR] holidays) only)").unwrap();
    let config = DecoderConfig::default();
    let expansion = expand_statement(&decoded.arena, single(&decoded), &config).unwrap();
    assert_eq!(
        expansion.render_rows(&decoded.arena, &config),
        vec![vec!["on weekdays only"], vec!["on holidays only"]]
    );
}

#[test]
fn it_reports_statement_complexity() {
    let decoded =
        decode("A(farmer) I((sow [XOR] harvest)) Bdir((corn [OR] wheat)) Cac((day [XOR] night))")
            .unwrap();
    let complexity = single(&decoded).complexity(&decoded.arena);
    // (2 + 3) leading states times 2 activation conditions.
    assert_eq!(complexity.total, 10);
}
