use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::combination::{parse_combination, Delimiters};
use super::scanner::{
    clean_input, component_header, find_closing, has_top_level_operator, scan_segments,
    validate_balance, Content, Header, Segment,
};
use super::suffix::link_private_properties;
use crate::config::DecoderConfig;
use crate::error::{ParseError, ParseResult, Result};
use crate::tree::{Arena, NodeId, Slot, Statement};

/// Result of decoding one IG Script input.
///
/// `root` is either a single statement leaf or, for component pairs, a combination tree whose
/// leaves are the extrapolated statements.
#[derive(Debug, Clone, Serialize)]
pub struct Decoded {
    pub arena: Arena,
    pub root: NodeId,
}

impl Decoded {
    /// Leaves of `root` holding statements, left to right.
    pub fn statement_leaves(&self) -> Vec<NodeId> {
        self.arena
            .leaves(self.root)
            .into_iter()
            .filter(|leaf| self.arena.statement(*leaf).is_some())
            .collect()
    }

    pub fn statements(&self) -> Vec<&Statement> {
        self.statement_leaves()
            .into_iter()
            .filter_map(|leaf| self.arena.statement(leaf))
            .collect()
    }

    /// Statements re-encoded as IG Script.
    pub fn to_script(&self) -> Vec<String> {
        self.statements()
            .into_iter()
            .map(|statement| statement.to_script(&self.arena))
            .collect()
    }
}

/// Decodes IG Script text into statements.
#[derive(Debug, Clone, Default)]
pub struct StatementParser {
    config: DecoderConfig,
}

impl StatementParser {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    #[instrument(level = "debug", skip(self, input))]
    pub fn decode(&self, input: &str) -> Result<Decoded> {
        let cleaned = clean_input(input);
        validate_balance(&cleaned)?;
        let mut arena = Arena::new();
        let root = self.parse_text(&mut arena, &cleaned)?;
        debug!("decoded {} nodes", arena.len());
        Ok(Decoded { arena, root })
    }

    /// Parses statement text, returning a statement leaf or a tree of pair statements.
    fn parse_text(&self, arena: &mut Arena, text: &str) -> ParseResult<NodeId> {
        let mut segments = Vec::new();
        flatten_segments(scan_segments(text)?, &mut segments)?;

        let mut pairs = Vec::new();
        let mut occurrences = HashSet::new();
        let mut statement = Statement::new();
        for segment in segments {
            if let Segment::Component { text, .. } = &segment {
                if !occurrences.insert(*text) {
                    return Err(ParseError::DuplicateComponentEntry {
                        fragment: text.to_string(),
                    });
                }
            }
            match segment {
                Segment::Block { content } => pairs.push(content),
                Segment::Component {
                    header,
                    kind: Content::Plain,
                    content,
                    ..
                } => self.parse_plain(arena, &mut statement, &header, content)?,
                Segment::Component {
                    header,
                    kind: Content::Nested,
                    content,
                    ..
                } => self.parse_nested(arena, &mut statement, &header, content)?,
            }
        }

        if pairs.len() > 1 {
            return Err(ParseError::MultipleComponentPairsOnSameLevel {
                pairs: pairs
                    .iter()
                    .map(|pair| format!("{{{}}}", pair))
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        match pairs.pop() {
            Some(pair) => self.parse_pair(arena, &statement, pair),
            None => {
                if statement.is_empty() {
                    debug!("no components found in '{}'", text);
                }
                link_private_properties(arena, &mut statement, self.config.suffix_matching)?;
                Ok(arena.nested(statement))
            }
        }
    }

    fn parse_plain(
        &self,
        arena: &mut Arena,
        statement: &mut Statement,
        header: &Header,
        content: &str,
    ) -> ParseResult<()> {
        if !header.symbol.supports_plain_content() {
            warn!("ignoring {}({}) without nested statement", header.symbol, content);
            return Ok(());
        }
        let slot = Slot::new(header.symbol, false).ok_or_else(|| ParseError::InvalidCombination {
            fragment: content.to_string(),
        })?;

        let text = if has_top_level_operator(content) {
            format!("({})", content)
        } else {
            content.to_string()
        };
        let (root, _) = parse_combination(arena, &text, Delimiters::Parentheses)?;
        self.apply_header(arena, root, header);
        statement.attach(arena, slot, root)?;
        Ok(())
    }

    fn parse_nested(
        &self,
        arena: &mut Arena,
        statement: &mut Statement,
        header: &Header,
        content: &str,
    ) -> ParseResult<()> {
        let slot = Slot::new(header.symbol, true)
            .filter(|_| header.symbol.supports_nesting())
            .ok_or_else(|| ParseError::NestingOnUnsupportedComponent {
                component: header.symbol.to_string(),
            })?;

        let root = if has_top_level_operator(content) {
            self.parse_nested_combination(arena, header, content)?
        } else {
            self.parse_text(arena, content)?
        };
        self.apply_header(arena, root, header);
        statement.attach(arena, slot, root)?;
        Ok(())
    }

    /// `X{ X{...} [XOR] X{...} }`: every operand must be a nested statement of the same
    /// component as the enclosing header.
    fn parse_nested_combination(
        &self,
        arena: &mut Arena,
        header: &Header,
        content: &str,
    ) -> ParseResult<NodeId> {
        let (root, _) = parse_combination(arena, &format!("{{{}}}", content), Delimiters::Braces)?;

        for leaf in arena.leaves(root) {
            let text = arena.text(leaf).unwrap_or_default().to_string();
            let (inner_header, inner) = nested_operand(&text)?;
            if inner_header.symbol != header.symbol {
                return Err(ParseError::InvalidTypesInNestedStatementCombination {
                    found: format!(
                        "{} combined within {}",
                        inner_header.symbol, header.symbol
                    ),
                });
            }
            let replacement = self.parse_text(arena, inner)?;
            self.apply_header(arena, replacement, &inner_header);
            arena.replace(leaf, replacement);
        }
        Ok(root)
    }

    /// `{ I(a) Bdir(x) [XOR] I(b) Bdir(y) }`: each operand becomes a full statement that also
    /// receives the components written outside the braces.
    fn parse_pair(
        &self,
        arena: &mut Arena,
        shared: &Statement,
        content: &str,
    ) -> ParseResult<NodeId> {
        let (root, _) = parse_combination(arena, &format!("{{{}}}", content), Delimiters::Braces)?;
        for leaf in arena.leaves(root) {
            let text = arena.text(leaf).unwrap_or_default().to_string();
            let replacement = self.parse_text(arena, &text)?;
            arena.replace(leaf, replacement);
        }

        let root = arena.root(root);
        for leaf in arena.leaves(root) {
            let Some(mut statement) = arena.take_statement(leaf) else {
                continue;
            };
            statement.copy_components_from(arena, shared)?;
            link_private_properties(arena, &mut statement, self.config.suffix_matching)?;
            arena.put_statement(leaf, statement);
        }
        debug!(
            "component pair expanded into {} statements",
            arena.count_leaves(root)
        );
        Ok(root)
    }

    fn apply_header(&self, arena: &mut Arena, node: NodeId, header: &Header) {
        let annotation = header
            .annotation
            .clone()
            .filter(|_| self.config.include_annotations);
        let node = arena.node_mut(node);
        node.component = Some(header.symbol);
        node.suffix = header.suffix.clone();
        node.annotation = annotation;
    }
}

/// Inlines brace blocks without a top-level operator; the remaining blocks are pairs.
fn flatten_segments<'a>(segments: Vec<Segment<'a>>, out: &mut Vec<Segment<'a>>) -> ParseResult<()> {
    for segment in segments {
        match segment {
            Segment::Block { content } if !has_top_level_operator(content) => {
                flatten_segments(scan_segments(content)?, out)?;
            }
            other => out.push(other),
        }
    }
    Ok(())
}

/// Splits `X{...}` into its header and inner statement text.
fn nested_operand(text: &str) -> ParseResult<(Header, &str)> {
    let text = text.trim();
    let invalid = || ParseError::InvalidCombination {
        fragment: text.to_string(),
    };
    let (rest, (header, kind)) = component_header(text).map_err(|_| invalid())?;
    if kind != Content::Nested {
        return Err(ParseError::InvalidTypesInNestedStatementCombination {
            found: format!("plain {} content in nested combination", header.symbol),
        });
    }
    let open_at = text.len() - rest.len();
    let close_at = find_closing(text, open_at, '{', '}').ok_or_else(invalid)?;
    if !text[close_at + 1..].trim().is_empty() {
        return Err(invalid());
    }
    Ok((header, &text[open_at + 1..close_at]))
}

/// Decodes `input` with the default configuration.
pub fn decode(input: &str) -> Result<Decoded> {
    StatementParser::default().decode(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::tree::{ComponentSymbol, Operator};
    use pretty_assertions::assert_eq;

    fn single(decoded: &Decoded) -> &Statement {
        decoded.arena.statement(decoded.root).unwrap()
    }

    #[test]
    fn test_plain_components() {
        let decoded = decode("A(farmer) D(must) I((sow [AND] harvest)) Bdir(crops)").unwrap();
        let statement = single(&decoded);
        assert_eq!(statement.len(), 4);
        let aim = statement.get(Slot::Aim).unwrap();
        assert_eq!(decoded.arena.operator(aim), Some(Operator::And));
        assert_eq!(decoded.arena.component(aim), Some(ComponentSymbol::Aim));
    }

    #[test]
    fn test_unwrapped_operator_content() {
        let decoded = decode("I(sow [XOR] harvest)").unwrap();
        let aim = single(&decoded).get(Slot::Aim).unwrap();
        assert_eq!(decoded.arena.operator(aim), Some(Operator::Xor));
    }

    #[test]
    fn test_repeated_components_join_with_band() {
        let decoded = decode("A(x) A(y)").unwrap();
        let root = single(&decoded).get(Slot::Attributes).unwrap();
        assert_eq!(decoded.arena.operator(root), Some(Operator::SandBetween));
        assert_eq!(decoded.to_script(), vec!["A(x) A(y)"]);
    }

    #[test]
    fn test_duplicate_occurrences_rejected() {
        let err = decode("A(x) I(sow) A(x)").unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ParseError::DuplicateComponentEntry { ref fragment }) if fragment == "A(x)"
        ));

        // Suffix or annotation make occurrences distinct.
        assert!(decode("A1(x) A2(x)").is_ok());
        assert!(decode("A[gov](x) A(x)").is_ok());
        assert!(matches!(
            decode("Cac{A(a) I(b)} Cac{A(a) I(b)}"),
            Err(Error::Parse(ParseError::DuplicateComponentEntry { .. }))
        ));
    }

    #[test]
    fn test_header_attributes() {
        let decoded = decode("A1[gov](agency) A1,p(federal)").unwrap();
        let statement = single(&decoded);
        let actor = statement.get(Slot::Attributes).unwrap();
        assert_eq!(decoded.arena.annotations(actor).as_deref(), Some("[gov]"));
        // The property was linked privately and left its slot.
        assert!(statement.get(Slot::AttributesProperty).is_none());
        assert_eq!(decoded.arena[actor].private_links().len(), 1);

        let parser = StatementParser::new(DecoderConfig {
            include_annotations: false,
            ..Default::default()
        });
        let decoded = parser.decode("A1[gov](agency)").unwrap();
        let actor = single(&decoded).get(Slot::Attributes).unwrap();
        assert_eq!(decoded.arena.annotations(actor), None);
    }

    #[test]
    fn test_nested_statement() {
        let decoded = decode("A(farmer) I(sow) Cac{A(season) I(begins)}").unwrap();
        let statement = single(&decoded);
        let nested = statement.get(Slot::ActivationConditionNested).unwrap();
        let inner = decoded.arena.statement(nested).unwrap();
        assert_eq!(inner.to_script(&decoded.arena), "A(season) I(begins)");
        assert_eq!(
            statement.to_script(&decoded.arena),
            "A(farmer) I(sow) Cac{A(season) I(begins)}"
        );
    }

    #[test]
    fn test_nested_combination() {
        let decoded =
            decode("I(sow) Cac{Cac{A(a) I(b)} [XOR] Cac{A(c) I(d)}}").unwrap();
        let nested = single(&decoded)
            .get(Slot::ActivationConditionNested)
            .unwrap();
        assert_eq!(decoded.arena.operator(nested), Some(Operator::Xor));
        let leaves = decoded.arena.leaves(nested);
        assert_eq!(leaves.len(), 2);
        assert!(leaves.iter().all(|l| decoded.arena.statement(*l).is_some()));
    }

    #[test]
    fn test_nested_combination_type_mismatch() {
        let err = decode("Cac{Cac{A(a) I(b)} [XOR] Cex{A(c) I(d)}}").unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ParseError::InvalidTypesInNestedStatementCombination { .. })
        ));
    }

    #[test]
    fn test_nesting_on_unsupported_component() {
        let err = decode("I{A(x) I(y)}").unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ParseError::NestingOnUnsupportedComponent { .. })
        ));
    }

    #[test]
    fn test_component_pair() {
        let decoded = decode("A(farmer) D(must) {I(sow) Bdir(corn) [XOR] I(harvest) Bdir(wheat)}")
            .unwrap();
        assert_eq!(decoded.arena.operator(decoded.root), Some(Operator::Xor));
        assert_eq!(
            decoded.to_script(),
            vec![
                "A(farmer) D(must) I(sow) Bdir(corn)",
                "A(farmer) D(must) I(harvest) Bdir(wheat)"
            ]
        );
    }

    #[test]
    fn test_multiple_pairs_rejected() {
        let err = decode("{I(a) [XOR] I(b)} {Bdir(c) [OR] Bdir(d)}").unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ParseError::MultipleComponentPairsOnSameLevel { .. })
        ));
    }

    #[test]
    fn test_braces_without_operator_are_inlined() {
        let decoded = decode("{A(x) I(y)}").unwrap();
        assert_eq!(decoded.to_script(), vec!["A(x) I(y)"]);
    }

    #[test]
    fn test_imbalance_reported_before_parsing() {
        let err = decode("A(farmer I(sow)").unwrap_err();
        assert!(err
            .to_string()
            .contains("There is 1 additional opening parenthesis ('(')"));
    }

    #[test]
    fn test_empty_input_yields_empty_statement() {
        let decoded = decode("   ").unwrap();
        assert!(single(&decoded).is_empty());
    }
}
