//! Crate-wide error type.
//!
//! One variant per recognized error kind: a malformed input, an ambiguous
//! grammar, an un-extendable grammar, a likely-left-recursive grammar, or a
//! parse-time syntax error. Builders return `Result<T>` and are never
//! partially committed; on `Err` the builder instance that produced it is
//! simply dropped.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LangError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LangError {
    #[error("malformed grammar: {0}")]
    MalformedGrammar(String),

    #[error("malformed regex: {0}")]
    MalformedRegex(String),

    #[error(
        "ambiguous grammar (LL(1)): cell ({non_terminal}, {terminal}) already \
         holds rule #{existing_rule}, cannot also hold rule #{new_rule}"
    )]
    AmbiguousGrammarLl {
        non_terminal: String,
        terminal: String,
        existing_rule: usize,
        new_rule: usize,
    },

    #[error(
        "ambiguous grammar (SLR(1)): {kind} conflict in state {state} on \
         terminal {terminal} between {existing} and {new}"
    )]
    AmbiguousGrammarSlr {
        kind: SlrConflictKind,
        state: usize,
        terminal: String,
        existing: String,
        new: String,
    },

    #[error("cannot extend grammar: no free symbol for a fresh start (tried {tried:?})")]
    CannotExtendGrammar { tried: Vec<String> },

    #[error(
        "grammar is likely left-recursive: FIRST/FOLLOW recursion revisited \
         rule #{rule} while computing {symbol}"
    )]
    GrammarLikelyLeftRecursive { symbol: String, rule: usize },

    #[error("syntax error: expected {expected}, got {actual}")]
    SyntaxError { expected: String, actual: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlrConflictKind {
    ShiftReduce,
    ReduceReduce,
    AcceptReduce,
}

impl std::fmt::Display for SlrConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlrConflictKind::ShiftReduce => write!(f, "shift/reduce"),
            SlrConflictKind::ReduceReduce => write!(f, "reduce/reduce"),
            SlrConflictKind::AcceptReduce => write!(f, "accept/reduce"),
        }
    }
}
