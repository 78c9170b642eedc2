//! Recursive-descent-ish parser for the regex dialect: literals, `|`
//! alternation, implicit concatenation, `(...)` groups, `[...]` character
//! classes, and the `*`/`?`/`+` quantifiers.
//!
//! `(...)` groups are located with a balanced-paren scan so nested groups
//! resolve correctly, and a leading `*`/`?`/`+` with nothing to quantify is
//! rejected as malformed rather than silently treated as a literal
//! character.

use super::{RegexNode, TERMINATOR};
use crate::error::{LangError, Result};

pub struct RegexParser;

impl RegexParser {
    /// Parses `pattern`, wrapping it as `(pattern)#` so `#` is the unique
    /// accepting-position marker, then assigns leaf ids.
    pub fn parse(pattern: &str) -> Result<RegexNode> {
        let wrapped: Vec<char> = format!("({pattern})#").chars().collect();
        let mut node = Self::parse_range(&wrapped, 0, wrapped.len())?;
        node.assign_ids();
        Ok(node)
    }

    /// Parses `chars[start..end]` as a full alternation/concatenation
    /// expression over a shared buffer with explicit bounds, rather than
    /// copying substrings at every recursive step.
    fn parse_range(chars: &[char], start: usize, end: usize) -> Result<RegexNode> {
        let mut last = RegexNode::epsilon();
        let mut i = start;
        let mut have_atom = false;

        while i < end {
            let c = chars[i];

            if c == '|' {
                let rest = Self::parse_range(chars, i + 1, end)?;
                return Ok(RegexNode::union(last, rest));
            }

            if matches!(c, '*' | '?' | '+') {
                return Err(LangError::MalformedRegex(format!(
                    "dangling quantifier '{c}' with nothing to quantify"
                )));
            }

            let (mut atom, mut j) = if c == '(' {
                let close = Self::find_matching_paren(chars, i, end)?;
                (Self::parse_range(chars, i + 1, close)?, close)
            } else if c == '[' {
                Self::parse_class(chars, i, end)?
            } else {
                (RegexNode::leaf(c), i)
            };

            if j + 1 < end {
                match chars[j + 1] {
                    '*' => {
                        atom = RegexNode::star(atom);
                        j += 1;
                    }
                    '?' => {
                        atom = RegexNode::union(atom, RegexNode::epsilon());
                        j += 1;
                    }
                    '+' => {
                        let copy = atom.clone();
                        atom = RegexNode::concat(atom, RegexNode::star(copy));
                        j += 1;
                    }
                    _ => {}
                }
            }

            last = if have_atom { RegexNode::concat(last, atom) } else { atom };
            have_atom = true;
            i = j + 1;
        }

        Ok(last)
    }

    /// Finds the `)` matching the `(` at `chars[open]`, scanning
    /// `chars[open+1..end]` with a depth counter so nested groups resolve
    /// to their own closing paren rather than the outermost one.
    fn find_matching_paren(chars: &[char], open: usize, end: usize) -> Result<usize> {
        let mut depth = 1usize;
        let mut k = open + 1;
        while k < end {
            match chars[k] {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(k);
                    }
                }
                _ => {}
            }
            k += 1;
        }
        Err(LangError::MalformedRegex("unmatched '('".to_string()))
    }

    /// Parses `[...]` starting at `chars[start] == '['`, returning the
    /// built union-of-leaves node and the index of the closing `]`. A
    /// character range `a-z` expands into individual leaf characters rather
    /// than a dedicated range node, so classes and single characters share
    /// the same leaf representation everywhere downstream.
    fn parse_class(chars: &[char], start: usize, end: usize) -> Result<(RegexNode, usize)> {
        let mut elems: Vec<char> = Vec::new();
        let mut i = start + 1;
        loop {
            if i >= end {
                return Err(LangError::MalformedRegex("unmatched '['".to_string()));
            }
            if chars[i] == ']' {
                break;
            }
            if chars[i] == '-' {
                if i == start + 1 || i + 1 >= end || chars[i + 1] == ']' {
                    return Err(LangError::MalformedRegex(
                        "character range missing a bound".to_string(),
                    ));
                }
                let a = chars[i - 1];
                let b = chars[i + 1];
                if (b as u32) < (a as u32) {
                    return Err(LangError::MalformedRegex(format!(
                        "character range '{a}-{b}' is backwards"
                    )));
                }
                for code in (a as u32)..=(b as u32) {
                    if let Some(ch) = char::from_u32(code) {
                        elems.push(ch);
                    }
                }
            } else {
                elems.push(chars[i]);
            }
            i += 1;
        }

        if elems.is_empty() {
            return Err(LangError::MalformedRegex("empty character class".to_string()));
        }

        let mut node = RegexNode::leaf(elems[0]);
        for &ch in &elems[1..] {
            node = RegexNode::union(node, RegexNode::leaf(ch));
        }
        Ok((node, i))
    }
}

/// Returns `true` if `ch` is the accepting-position marker.
pub fn is_terminator(ch: Option<char>) -> bool {
    ch == Some(TERMINATOR)
}
