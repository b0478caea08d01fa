//! File-level parser for ownership declarations.
//!
//! The parser is total: every input yields a (possibly empty) list of
//! rules. Lines it cannot make sense of degrade to fewer owners rather than
//! aborting the file.

use super::ast::{OwnershipFile, OwnershipRule};
use super::lexer::{is_blank_line, make_owner, parse_comment_line, parse_rule_tokens};
use log::{debug, trace};

/// Parses a single line into a rule, or `None` for lines that carry no rule.
fn parse_line(line_text: &str, line_num: usize) -> Option<OwnershipRule> {
    if is_blank_line(line_text) {
        trace!("Line {}: blank", line_num);
        return None;
    }

    if parse_comment_line(line_text).is_ok() {
        trace!("Line {}: comment", line_num);
        return None;
    }

    // A non-blank line always has a first token, so this only misses on
    // whitespace the lexer doesn't treat as a separator.
    let (_, tokens) = parse_rule_tokens(line_text).ok()?;
    let owners = tokens.owners.iter().map(|token| make_owner(token)).collect();

    trace!(
        "Line {}: rule '{}' with {} owner(s)",
        line_num,
        tokens.pattern,
        tokens.owners.len()
    );
    Some(OwnershipRule::new(tokens.pattern, owners, line_num))
}

/// Parses ownership file content into its rules, preserving file order.
pub fn parse_ownership(input: &str) -> OwnershipFile {
    debug!("Parsing ownership file ({} bytes)", input.len());

    let rules: Vec<OwnershipRule> = input
        .lines()
        .enumerate()
        .filter_map(|(line_idx, line_text)| parse_line(line_text, line_idx + 1))
        .collect();

    debug!("Parsing complete: {} rule(s)", rules.len());
    OwnershipFile::new(rules)
}
