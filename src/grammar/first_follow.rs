//! FIRST/FOLLOW computation over an immutable grammar.
//!
//! Both are memoized recursions: FIRST over symbol sequences, FOLLOW over
//! non-terminals, with a visited-rule set threaded by value through the
//! FOLLOW recursion to break cycles. Reporting a revisited rule directly as
//! a likely-left-recursive grammar gives a precise diagnosis, rather than
//! relying on a platform recursion-depth overflow to signal the same thing.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use super::{Grammar, Symbol, EPSILON, END_OF_INPUT};
use crate::error::{LangError, Result};
use crate::index::RuleIndex;

pub struct FirstFollow<'g> {
    grammar: &'g Grammar,
    first_cache: RefCell<HashMap<Vec<Symbol>, HashSet<Symbol>>>,
    first_in_progress: RefCell<HashSet<Symbol>>,
    follow_cache: RefCell<HashMap<Symbol, HashSet<Symbol>>>,
}

impl<'g> FirstFollow<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        FirstFollow {
            grammar,
            first_cache: RefCell::new(HashMap::new()),
            first_in_progress: RefCell::new(HashSet::new()),
            follow_cache: RefCell::new(HashMap::new()),
        }
    }

    /// FIRST(seq) for a sequence of symbols. Memoized by the sequence
    /// itself.
    pub fn first(&self, seq: &[Symbol]) -> Result<HashSet<Symbol>> {
        if seq.is_empty() {
            return Ok(HashSet::from([EPSILON.to_string()]));
        }

        let key = seq.to_vec();
        if let Some(cached) = self.first_cache.borrow().get(&key) {
            return Ok(cached.clone());
        }

        let result = if seq.len() == 1 {
            self.first_of_symbol(&seq[0])?
        } else {
            let mut result = HashSet::new();
            let mut all_nullable = true;
            for sym in seq {
                let f = self.first_of_symbol(sym)?;
                result.extend(f.iter().filter(|s| s.as_str() != EPSILON).cloned());
                if !f.contains(EPSILON) {
                    all_nullable = false;
                    break;
                }
            }
            if all_nullable {
                result.insert(EPSILON.to_string());
            }
            result
        };

        trace!("FIRST({:?}) = {:?}", seq, result);
        self.first_cache.borrow_mut().insert(key, result.clone());
        Ok(result)
    }

    fn first_of_symbol(&self, sym: &Symbol) -> Result<HashSet<Symbol>> {
        if self.grammar.is_terminal(sym) {
            return Ok(HashSet::from([sym.clone()]));
        }

        if !self.first_in_progress.borrow_mut().insert(sym.clone()) {
            let rule = self.grammar.rules_for(sym).first().copied().unwrap_or(RuleIndex(0));
            return Err(LangError::GrammarLikelyLeftRecursive {
                symbol: sym.clone(),
                rule: rule.0,
            });
        }

        let mut result = HashSet::new();
        for &ridx in self.grammar.rules_for(sym) {
            let rule = self.grammar.rule(ridx);
            result.extend(self.first(&rule.body)?);
        }
        self.first_in_progress.borrow_mut().remove(sym);
        Ok(result)
    }

    /// FOLLOW(A): `$` seeds the start symbol; every rule `B -> α A β`
    /// contributes FIRST(β)\{ε}, plus FOLLOW(B) when β is nullable and
    /// `B != A`.
    pub fn follow(&self, nt: &str) -> Result<HashSet<Symbol>> {
        if let Some(cached) = self.follow_cache.borrow().get(nt) {
            return Ok(cached.clone());
        }
        let result = self.follow_inner(nt, &HashSet::new())?;
        debug!("FOLLOW({}) = {:?}", nt, result);
        self.follow_cache.borrow_mut().insert(nt.to_string(), result.clone());
        Ok(result)
    }

    fn follow_inner(&self, nt: &str, visited: &HashSet<RuleIndex>) -> Result<HashSet<Symbol>> {
        let mut result = HashSet::new();
        if nt == self.grammar.start_symbol() {
            result.insert(END_OF_INPUT.to_string());
        }

        for ridx in self.grammar.rules.indices() {
            let rule = self.grammar.rule(ridx);
            for (i, sym) in rule.body.iter().enumerate() {
                if sym != nt {
                    continue;
                }
                let rest = &rule.body[i + 1..];
                let first_rest = self.first(rest)?;
                result.extend(first_rest.iter().filter(|s| s.as_str() != EPSILON).cloned());
                let has_empty = first_rest.contains(EPSILON);

                if has_empty && rule.head != nt {
                    if visited.contains(&ridx) {
                        return Err(LangError::GrammarLikelyLeftRecursive {
                            symbol: nt.to_string(),
                            rule: ridx.0,
                        });
                    }
                    let mut next_visited = visited.clone();
                    next_visited.insert(ridx);
                    result.extend(self.follow_inner(&rule.head, &next_visited)?);
                }
            }
        }
        Ok(result)
    }
}
