//! Combination parser: turns bracketed expressions such as `((a [OR] b) [AND] c)` into
//! binary operator trees.
//!
//! Parsing runs in two phases. [`detect_combinations`] scans the expression once, tracking
//! the nesting level of every scope and the single operator each scope may hold. Repeated
//! `[AND]` within one scope is rewritten into left-deep form (`(a [AND] b) [AND] c`) and the
//! scan starts over on the rewritten text. The tree is then assembled from the lowest level
//! holding complete scopes, recursing into the operands of each.

use std::collections::BTreeMap;

use tracing::{debug, instrument, trace};

use super::scanner::find_closing;
use crate::error::{ParseError, ParseResult};
use crate::tree::{Arena, NodeId, Operator};

/// Bracket pair delimiting combination scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiters {
    /// Value combinations inside a component, `(a [AND] b)`.
    Parentheses,
    /// Statement-level combinations, `{A(x) I(y) [XOR] A(z) I(w)}`. Operators inside
    /// parentheses belong to component content and are skipped.
    Braces,
}

impl Delimiters {
    pub fn open(&self) -> char {
        match self {
            Delimiters::Parentheses => '(',
            Delimiters::Braces => '{',
        }
    }

    pub fn close(&self) -> char {
        match self {
            Delimiters::Parentheses => ')',
            Delimiters::Braces => '}',
        }
    }
}

/// Byte offsets of one scope. `left` is the first byte after the opening delimiter and
/// `right` the offset of the closing one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Boundaries {
    pub left: usize,
    pub right: usize,
    pub operator: Option<(usize, Operator)>,
    pub complete: bool,
}

/// Scopes per nesting level (1-based), in order of appearance.
pub(crate) type Levels = BTreeMap<usize, Vec<Boundaries>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Outside,
    Left,
    Right,
}

enum Scan {
    Done(Levels),
    Rewritten(String),
}

/// Parses one combination expression into `arena`.
///
/// Returns the root of the new tree and the normalized expression, which re-parses to the
/// same structure without further rewriting.
#[instrument(level = "debug", skip(arena))]
pub fn parse_combination(
    arena: &mut Arena,
    text: &str,
    delimiters: Delimiters,
) -> ParseResult<(NodeId, String)> {
    if !contains_operator(text) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyLeaf {
                fragment: text.to_string(),
            });
        }
        return Ok((arena.leaf(trimmed), trimmed.to_string()));
    }

    let (expression, levels) = detect_combinations(text, delimiters)?;
    let root = build_tree(arena, &expression, &levels, delimiters)?;
    debug!("parsed '{}' into {}", expression, arena.stringify(root));
    Ok((root, expression))
}

/// True if `text` contains any operator token, regardless of nesting.
pub fn contains_operator(text: &str) -> bool {
    Operator::RECOGNIZED
        .iter()
        .any(|(token, _)| text.contains(*token))
}

/// Scans `expression` into per-level scopes, applying AND rewrites until none remain.
pub(crate) fn detect_combinations(
    expression: &str,
    delimiters: Delimiters,
) -> ParseResult<(String, Levels)> {
    check_balance(expression, delimiters)?;
    let mut expression = expression.to_string();
    loop {
        match scan(&expression, delimiters)? {
            Scan::Done(levels) => return Ok((expression, levels)),
            Scan::Rewritten(rewritten) => {
                debug!("repeated [AND], rewritten to '{}'", rewritten);
                expression = rewritten;
            }
        }
    }
}

fn check_balance(expression: &str, delimiters: Delimiters) -> ParseResult<()> {
    let (open, close) = (delimiters.open(), delimiters.close());
    let mut depth: i64 = 0;
    for c in expression.chars() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth < 0 {
                break;
            }
        }
    }
    if depth == 0 {
        return Ok(());
    }
    let message = if depth > 0 {
        format!("{} unclosed '{}'", depth, open)
    } else {
        format!("'{}' without matching '{}'", close, open)
    };
    Err(ParseError::ImbalancedParentheses {
        message,
        input: expression.to_string(),
    })
}

fn scan(expression: &str, delimiters: Delimiters) -> ParseResult<Scan> {
    let (open, close) = (delimiters.open(), delimiters.close());
    let mut level = 0usize;
    let mut modes = vec![Mode::Outside];
    let mut levels = Levels::new();
    // Parentheses depth, tracked independently of the active delimiters.
    let mut paren_depth: i64 = 0;

    for (i, c) in expression.char_indices() {
        match c {
            '(' => paren_depth += 1,
            ')' => paren_depth -= 1,
            _ => {}
        }

        if c == open {
            level += 1;
            if modes.len() <= level {
                modes.push(Mode::Left);
            } else {
                modes[level] = Mode::Left;
            }
            levels.entry(level).or_default().push(Boundaries {
                left: i + c.len_utf8(),
                ..Default::default()
            });
        } else if c == close {
            let scope = levels
                .get_mut(&level)
                .and_then(|scopes| scopes.last_mut())
                .filter(|_| level > 0)
                .ok_or_else(|| ParseError::ImbalancedParentheses {
                    message: format!("'{}' without matching '{}'", close, open),
                    input: expression.to_string(),
                })?;
            scope.right = i;
            if let Some((position, operator)) = scope.operator {
                let right_start = position + operator.token().len();
                if right_start >= i || expression[right_start..i].trim().is_empty() {
                    return Err(ParseError::EmptyLeaf {
                        fragment: expression[scope.left..i].to_string(),
                    });
                }
                scope.complete = true;
            }
            modes[level] = Mode::Outside;
            level -= 1;
        } else if c == '[' {
            let Some((operator, _)) = Operator::match_token(&expression[i..]) else {
                continue;
            };
            if delimiters == Delimiters::Braces && paren_depth != 0 {
                trace!("skipping {} inside component content", operator);
                continue;
            }
            if modes[level] == Mode::Outside {
                return Err(ParseError::LogicalOperatorOutsideCombination {
                    expression: expression.to_string(),
                });
            }
            let Some(scope) = levels.get_mut(&level).and_then(|s| s.last_mut()) else {
                return Err(ParseError::LogicalOperatorOutsideCombination {
                    expression: expression.to_string(),
                });
            };
            if scope.left == i {
                return Err(ParseError::InvalidCombination {
                    fragment: expression[scope.left..].to_string(),
                });
            }
            if expression[scope.left..i].trim().is_empty() {
                return Err(ParseError::EmptyLeaf {
                    fragment: expression[scope.left..].to_string(),
                });
            }

            if modes[level] == Mode::Right {
                let previous = scope.operator.map(|(_, op)| op);
                if operator == Operator::And && previous == Some(Operator::And) {
                    let rewritten = format!(
                        "{}{}{}{} {}",
                        &expression[..scope.left],
                        open,
                        expression[scope.left..i].trim_end(),
                        close,
                        &expression[i..]
                    );
                    return Ok(Scan::Rewritten(rewritten));
                }
                return Err(ParseError::InvalidOperatorCombination {
                    level,
                    expression: expression.to_string(),
                });
            }

            modes[level] = Mode::Right;
            scope.operator = Some((i, operator));
        }
    }

    Ok(Scan::Done(levels))
}

/// Assembles the tree for the lowest level holding complete scopes.
fn build_tree(
    arena: &mut Arena,
    input: &str,
    levels: &Levels,
    delimiters: Delimiters,
) -> ParseResult<NodeId> {
    let Some((&level, scopes)) = levels
        .iter()
        .find(|(_, scopes)| scopes.iter().any(|scope| scope.complete))
    else {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyLeaf {
                fragment: input.to_string(),
            });
        }
        return Ok(arena.leaf(trimmed));
    };

    if let Some(ignored) = scopes
        .iter()
        .filter(|scope| !scope.complete)
        .find(|scope| holds_combination(levels, level, scope))
    {
        return Err(ParseError::IgnoredElements {
            fragment: input[ignored.left..ignored.right].to_string(),
        });
    }

    let complete: Vec<&Boundaries> = scopes.iter().filter(|scope| scope.complete).collect();
    let mut root: Option<NodeId> = None;
    for (index, scope) in complete.iter().enumerate() {
        let Some((position, operator)) = scope.operator else {
            continue;
        };
        let left_text = &input[scope.left..position];
        let right_text = &input[position + operator.token().len()..scope.right];
        trace!(
            "level {} scope {}: '{}' {} '{}'",
            level,
            index,
            left_text,
            operator,
            right_text
        );

        let left = parse_operand(arena, left_text, input, delimiters)?;
        let right = parse_operand(arena, right_text, input, delimiters)?;
        let node = arena.combine(left, right, operator)?;

        let (shared_left, shared_right) = extract_shared(input, &complete, index, delimiters);
        let combination = arena.node_mut(node);
        combination.shared_left = shared_left;
        combination.shared_right = shared_right;

        root = Some(arena.combine_optional(root, node, Operator::SandWithin)?);
    }

    root.ok_or_else(|| ParseError::InvalidCombination {
        fragment: input.to_string(),
    })
}

/// True if a complete scope on a deeper level lies within `scope`.
fn holds_combination(levels: &Levels, level: usize, scope: &Boundaries) -> bool {
    levels
        .range(level + 1..)
        .flat_map(|(_, scopes)| scopes)
        .any(|inner| inner.complete && inner.left > scope.left && inner.right < scope.right)
}

fn parse_operand(
    arena: &mut Arena,
    text: &str,
    input: &str,
    delimiters: Delimiters,
) -> ParseResult<NodeId> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyLeaf {
            fragment: input.to_string(),
        });
    }
    // Statement-level operands are combinations only when fully enclosed in braces;
    // anything else is statement text, possibly holding pairs of its own.
    let scoped = match delimiters {
        Delimiters::Parentheses => true,
        Delimiters::Braces => {
            trimmed.starts_with('{')
                && find_closing(trimmed, 0, '{', '}') == Some(trimmed.len() - 1)
        }
    };
    if !scoped || !contains_operator(text) {
        let value = match delimiters {
            Delimiters::Parentheses => strip_parentheses(trimmed),
            Delimiters::Braces => trimmed,
        };
        if value.is_empty() {
            return Err(ParseError::EmptyLeaf {
                fragment: input.to_string(),
            });
        }
        return Ok(arena.leaf(value));
    }
    let (expression, levels) = detect_combinations(text, delimiters)?;
    build_tree(arena, &expression, &levels, delimiters)
}

/// `((value))` as an operand is `value`.
fn strip_parentheses(text: &str) -> &str {
    let mut text = text;
    while text.starts_with('(') && find_closing(text, 0, '(', ')') == Some(text.len() - 1) {
        text = text[1..text.len() - 1].trim();
    }
    text
}

/// Text between a combination and its neighbouring combinations (or the ends of the input),
/// split into fragments at scope delimiters.
fn extract_shared(
    input: &str,
    complete: &[&Boundaries],
    index: usize,
    delimiters: Delimiters,
) -> (Vec<String>, Vec<String>) {
    let scope = complete[index];
    let start = index
        .checked_sub(1)
        .map_or(0, |previous| complete[previous].right);
    let end = complete
        .get(index + 1)
        .map_or(input.len(), |next| next.left);
    (
        shared_fragments(&input[start..scope.left], delimiters),
        shared_fragments(&input[scope.right..end], delimiters),
    )
}

fn shared_fragments(text: &str, delimiters: Delimiters) -> Vec<String> {
    text.split([delimiters.open(), delimiters.close()])
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
        .collect()
}
