//! Token parsers for ownership files.
//!
//! nom-based parsers for comment lines and the whitespace-separated tokens
//! of a rule line, plus owner token classification.

use nom::{
    IResult, Parser,
    bytes::complete::{take_while, take_while1},
    character::complete::char,
    combinator::rest,
    multi::many0,
    sequence::preceded,
};

use super::ast::OwnerRef;

fn is_token_char(c: char) -> bool {
    !c.is_whitespace()
}

/// Skips any run of Unicode whitespace, including form feeds and NBSP.
fn separator(input: &str) -> IResult<&str, &str> {
    take_while(char::is_whitespace).parse(input)
}

/// Parses one whitespace-delimited token, skipping leading whitespace.
fn token(input: &str) -> IResult<&str, &str> {
    preceded(separator, take_while1(is_token_char)).parse(input)
}

/// Parses a complete comment line (optional whitespace + # + content).
pub fn parse_comment_line(input: &str) -> IResult<&str, &str> {
    (separator, char('#'), rest)
        .map(|(_, _, content)| content)
        .parse(input)
}

/// Checks if a line is blank (empty or only whitespace).
pub fn is_blank_line(input: &str) -> bool {
    input.trim().is_empty()
}

/// The raw tokens of a rule line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTokens<'a> {
    /// The pattern token.
    pub pattern: &'a str,
    /// Owner tokens, stopping before any inline comment.
    pub owners: Vec<&'a str>,
}

/// Splits a rule line into its pattern and owner tokens.
///
/// A token starting with '#' opens an inline comment; it and everything
/// after it are discarded. Fails only if the line has no pattern token.
pub fn parse_rule_tokens(input: &str) -> IResult<&str, RuleTokens<'_>> {
    let (after_pattern, pattern) = token(input)?;
    let (remaining, tokens) = many0(token).parse(after_pattern)?;

    let owners = tokens
        .into_iter()
        .take_while(|token| !token.starts_with('#'))
        .collect();

    Ok((remaining, RuleTokens { pattern, owners }))
}

/// The shape of an owner token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerKind<'a> {
    /// `@name`, without the '@'.
    Individual(&'a str),
    /// `@org/team`.
    Team { org: &'a str, team: &'a str },
    /// Anything else, kept verbatim.
    Literal(&'a str),
}

/// Classifies an owner token by its shape.
pub fn classify_owner(text: &str) -> OwnerKind<'_> {
    let Some(stripped) = text.strip_prefix('@') else {
        return OwnerKind::Literal(text);
    };

    match stripped.split_once('/') {
        Some((org, team)) if !org.is_empty() && !team.is_empty() => {
            OwnerKind::Team { org, team }
        }
        Some(_) => OwnerKind::Literal(text),
        None if !stripped.is_empty() => OwnerKind::Individual(stripped),
        None => OwnerKind::Literal(text),
    }
}

/// Creates an owner reference from a token.
///
/// Tokens that don't look like `@name` or `@org/team` pass through as
/// individuals holding the raw text.
pub fn make_owner(text: &str) -> OwnerRef {
    match classify_owner(text) {
        OwnerKind::Individual(name) => OwnerRef::individual(name),
        OwnerKind::Team { org, team } => OwnerRef::team(org, team),
        OwnerKind::Literal(raw) => OwnerRef::individual(raw),
    }
}
