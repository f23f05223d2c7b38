//! Top-level scanning of statement text into component occurrences and pair blocks.

use lazy_static::lazy_static;
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_while},
    character::complete::{char, one_of},
    combinator::{opt, peek, recognize},
    error::{Error as NomError, ErrorKind},
    multi::many0,
    sequence::delimited,
    IResult,
};
use regex::Regex;
use tracing::{instrument, trace};

use crate::error::{ParseError, ParseResult};
use crate::tree::{ComponentSymbol, Operator};

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Collapses line breaks and runs of whitespace into single spaces.
pub fn clean_input(input: &str) -> String {
    WHITESPACE.replace_all(input, " ").trim().to_string()
}

/// Checks that parentheses and braces are balanced, reporting the surplus otherwise.
pub fn validate_balance(input: &str) -> ParseResult<()> {
    check_pair(input, '(', ')', "parenthesis", "parentheses")?;
    check_pair(input, '{', '}', "brace", "braces")
}

fn check_pair(
    input: &str,
    open: char,
    close: char,
    singular: &str,
    plural: &str,
) -> ParseResult<()> {
    let count = input.chars().fold(0i64, |count, c| match c {
        c if c == open => count + 1,
        c if c == close => count - 1,
        _ => count,
    });
    if count == 0 {
        return Ok(());
    }

    let surplus = count.unsigned_abs();
    let (verb, noun) = if surplus == 1 {
        ("is", singular)
    } else {
        ("are", plural)
    };
    let (side, symbol) = if count > 0 {
        ("opening", open)
    } else {
        ("closing", close)
    };
    Err(ParseError::ImbalancedParentheses {
        message: format!(
            "There {} {} additional {} {} ('{}')",
            verb, surplus, side, noun, symbol
        ),
        input: input.to_string(),
    })
}

/// Byte offset of the delimiter closing the one at `open_at`.
pub(crate) fn find_closing(input: &str, open_at: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in input[open_at..].char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(open_at + i);
            }
        }
    }
    None
}

/// True if `text` holds an operator token outside any parentheses or braces.
pub(crate) fn has_top_level_operator(text: &str) -> bool {
    let mut depth = 0i64;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '{' => depth += 1,
            ')' | '}' => depth -= 1,
            '[' if depth == 0 && Operator::match_token(&text[i..]).is_some() => return true,
            _ => {}
        }
    }
    false
}

/// Parsed component header, e.g. `Bdir1,p[gov]` in `Bdir1,p[gov](content)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub symbol: ComponentSymbol,
    pub suffix: Option<String>,
    /// Annotation including its brackets.
    pub annotation: Option<String>,
}

/// Content delimiter following a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content {
    Plain,
    Nested,
}

/// Component root symbol, longest first so `Bdir` is not read as an unknown `B`.
fn symbol_root(input: &str) -> IResult<&str, &str> {
    alt((
        tag("Bdir"),
        tag("Bind"),
        tag("Cac"),
        tag("Cex"),
        tag("A"),
        tag("D"),
        tag("I"),
        tag("E"),
        tag("M"),
        tag("F"),
        tag("P"),
        tag("O"),
    ))(input)
}

fn suffix_tokens(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == ',')(input)
}

/// `[...]` block, which may hold nested brackets.
fn annotation(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('['),
        many0(alt((is_not("[]"), annotation))),
        char(']'),
    ))(input)
}

/// `symbol suffix? (",p" suffix?)? annotation?` followed by `(` or `{`, which is not consumed.
pub(crate) fn component_header(input: &str) -> IResult<&str, (Header, Content)> {
    let (input, root) = symbol_root(input)?;
    let (input, raw_suffix) = suffix_tokens(input)?;
    let (input, annotation) = opt(annotation)(input)?;
    let (input, delimiter) = peek(one_of("({"))(input)?;

    let (property, suffix) = split_suffix(raw_suffix);
    let symbol = ComponentSymbol::from_header(root, property)
        .ok_or(nom::Err::Error(NomError::new(input, ErrorKind::Verify)))?;
    let content = if delimiter == '{' {
        Content::Nested
    } else {
        Content::Plain
    };

    Ok((
        input,
        (
            Header {
                symbol,
                suffix,
                annotation: annotation.map(str::to_string),
            },
            content,
        ),
    ))
}

/// Splits raw suffix text into the property marker and the remaining suffix.
///
/// `1,p` and `1,2,p` are properties with suffixes `1` and `1,2`; `,p2` is a property with
/// suffix `2`. The marker is a non-leading token that is `p` or `p` followed by digits, so
/// `1,pre` is a plain suffix.
fn split_suffix(raw: &str) -> (bool, Option<String>) {
    let mut tokens: Vec<&str> = raw.split(',').collect();
    let marker = tokens
        .iter()
        .skip(1)
        .position(|token| is_property_marker(token))
        .map(|i| i + 1);
    if let Some(i) = marker {
        let token = tokens[i];
        tokens[i] = &token[1..];
    }
    let suffix = tokens
        .into_iter()
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(",");
    (marker.is_some(), (!suffix.is_empty()).then_some(suffix))
}

fn is_property_marker(token: &str) -> bool {
    token
        .strip_prefix('p')
        .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_digit()))
}

/// A top-level piece of statement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Component {
        header: Header,
        kind: Content,
        /// Text between the content delimiters.
        content: &'a str,
        /// The whole occurrence, header included.
        text: &'a str,
    },
    /// Headerless `{...}` block, a component pair candidate.
    Block { content: &'a str },
}

/// Splits statement text into component occurrences and headerless brace blocks.
///
/// Text outside any component is ignored. Expects balanced input.
#[instrument(level = "trace", skip(input))]
pub fn scan_segments(input: &str) -> ParseResult<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    let mut i = 0;
    let mut previous: Option<char> = None;

    while i < input.len() {
        let rest = &input[i..];
        let Some(c) = rest.chars().next() else { break };

        if c == '{' {
            let end = closing_or_error(input, i, '{', '}')?;
            segments.push(Segment::Block {
                content: &input[i + 1..end],
            });
            i = end + 1;
            previous = Some('}');
            continue;
        }

        let at_boundary = previous.map_or(true, |p| !p.is_alphanumeric() && p != '_');
        if at_boundary {
            if let Ok((after, (header, kind))) = component_header(rest) {
                let open_at = input.len() - after.len();
                let (open, close) = match kind {
                    Content::Plain => ('(', ')'),
                    Content::Nested => ('{', '}'),
                };
                let end = closing_or_error(input, open_at, open, close)?;
                trace!("found {} occurrence at {}", header.symbol, i);
                segments.push(Segment::Component {
                    header,
                    kind,
                    content: &input[open_at + 1..end],
                    text: &input[i..=end],
                });
                i = end + 1;
                previous = Some(close);
                continue;
            }
        }

        if c == '(' {
            // Parenthesized free text is not scanned for components.
            let end = closing_or_error(input, i, '(', ')')?;
            i = end + 1;
            previous = Some(')');
            continue;
        }

        i += c.len_utf8();
        previous = Some(c);
    }

    Ok(segments)
}

fn closing_or_error(input: &str, open_at: usize, open: char, close: char) -> ParseResult<usize> {
    find_closing(input, open_at, open, close).ok_or_else(|| ParseError::ImbalancedParentheses {
        message: format!("'{}' at position {} is never closed", open, open_at),
        input: input.to_string(),
    })
}
