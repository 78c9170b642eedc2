//! The in-memory context-free grammar model.
//!
//! A [`Symbol`] is just a `String`; classification into terminal,
//! non-terminal, or epsilon is purely by membership in the owning
//! [`Grammar`]'s sets, never by the symbol's own type.

pub mod bnf_reader;
pub mod first_follow;

use indexmap::IndexMap;

use crate::error::{LangError, Result};
use crate::index::{RuleIndex, RuleVec};

/// A grammar symbol. The empty string is reserved to mean epsilon (ε) and
/// never appears as a terminal or non-terminal name.
pub type Symbol = String;

pub const EPSILON: &str = "";
pub const END_OF_INPUT: &str = "$";

/// A single production `head -> body`. An ε-production is represented by
/// an empty `body`, so every rule (not just LR items) can test for epsilon
/// by checking `body.is_empty()` rather than comparing against a sentinel
/// symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub head: Symbol,
    pub body: Vec<Symbol>,
}

impl Rule {
    pub fn is_epsilon(&self) -> bool {
        self.body.is_empty()
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.body.is_empty() {
            write!(f, "{} -> \u{3f5}", self.head)
        } else {
            write!(f, "{} -> {}", self.head, self.body.join(" "))
        }
    }
}

/// An immutable context-free grammar: an ordered rule list plus the
/// derived non-terminal/terminal classification.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub rules: RuleVec<Rule>,
    /// First-appearance order; `non_terminals[0]` is the start symbol.
    pub non_terminals: Vec<Symbol>,
    /// Sorted lexicographically, for deterministic iteration regardless of
    /// declaration order.
    pub terminals: Vec<Symbol>,
    /// Non-terminal -> its rules, in the same order as `rules`.
    pub rule_map: IndexMap<Symbol, Vec<RuleIndex>>,
}

impl Grammar {
    /// Builds a `Grammar` from a flat list of `(head, body)` pairs in
    /// source order, classifying non-terminals (by appearing as a head)
    /// and terminals (everything else, sorted).
    pub fn build(rules: Vec<(Symbol, Vec<Symbol>)>) -> Result<Self> {
        if rules.is_empty() {
            return Err(LangError::MalformedGrammar(
                "grammar has no rules".to_string(),
            ));
        }

        let mut rule_vec = RuleVec::new();
        let mut non_terminals = Vec::new();
        let mut rule_map: IndexMap<Symbol, Vec<RuleIndex>> = IndexMap::new();

        for (head, body) in rules {
            if head.is_empty() {
                return Err(LangError::MalformedGrammar(
                    "rule has an empty head".to_string(),
                ));
            }
            if !non_terminals.contains(&head) {
                non_terminals.push(head.clone());
            }
            let idx = rule_vec.push(Rule { head: head.clone(), body });
            rule_map.entry(head).or_default().push(idx);
        }

        let mut terminals = Vec::new();
        for rule in rule_vec.iter() {
            for sym in &rule.body {
                if !non_terminals.contains(sym) && !terminals.contains(sym) {
                    terminals.push(sym.clone());
                }
            }
        }
        terminals.sort();

        Ok(Grammar { rules: rule_vec, non_terminals, terminals, rule_map })
    }

    pub fn start_symbol(&self) -> &Symbol {
        &self.non_terminals[0]
    }

    pub fn is_terminal(&self, sym: &str) -> bool {
        sym == EPSILON || self.terminals.iter().any(|t| t == sym)
    }

    pub fn is_non_terminal(&self, sym: &str) -> bool {
        self.non_terminals.iter().any(|n| n == sym)
    }

    /// The rules headed by `nt`, in declaration order. Empty if `nt` is not
    /// a non-terminal of this grammar.
    pub fn rules_for(&self, nt: &str) -> &[RuleIndex] {
        self.rule_map.get(nt).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn rule(&self, idx: RuleIndex) -> &Rule {
        &self.rules[idx]
    }
}
