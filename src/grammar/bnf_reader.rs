//! Parses textual BNF into a [`Grammar`].
//!
//! One rule per non-empty, non-comment line: `HEAD -> BODY1 | BODY2 | ...`.
//! Each body is whitespace-tokenized; the literal `ϵ` or an empty body
//! denotes the ε-production.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Grammar, Symbol};
use crate::error::{LangError, Result};

static ALT_SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\|\s*").unwrap());
static WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const EPSILON_TOKEN: &str = "\u{3f5}";

pub struct BNFReader;

impl BNFReader {
    /// Parses `text` into a [`Grammar`]. Fails with
    /// [`LangError::MalformedGrammar`] if a non-comment line lacks `->` or
    /// has an empty head.
    pub fn parse(text: &str) -> Result<Grammar> {
        let mut rules: Vec<(Symbol, Vec<Symbol>)> = Vec::new();

        for (lineno, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((head, bodies)) = line.split_once("->") else {
                return Err(LangError::MalformedGrammar(format!(
                    "line {}: missing '->': {:?}",
                    lineno + 1,
                    raw_line
                )));
            };

            let head = head.trim().to_string();
            if head.is_empty() {
                return Err(LangError::MalformedGrammar(format!(
                    "line {}: empty rule head",
                    lineno + 1
                )));
            }

            for alt in ALT_SEP.split(bodies.trim()) {
                let body = Self::parse_body(alt);
                rules.push((head.clone(), body));
            }
        }

        if rules.is_empty() {
            return Err(LangError::MalformedGrammar(
                "grammar text contains no rules".to_string(),
            ));
        }

        Grammar::build(rules)
    }

    fn parse_body(alt: &str) -> Vec<Symbol> {
        let alt = alt.trim();
        if alt.is_empty() || alt == EPSILON_TOKEN {
            return Vec::new();
        }
        WS.split(alt).map(|s| s.to_string()).collect()
    }
}
