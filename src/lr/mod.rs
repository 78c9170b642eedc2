//! Canonical LR(0) item automaton: grammar extension, CLOSURE, GOTO, and
//! state enumeration.
//!
//! Items carry no lookahead set of their own; SLR(1) gets its reduction
//! guard from `FOLLOW(A)`, computed separately in `lr::slr`.

pub mod slr;

use std::collections::{BTreeSet, HashMap, VecDeque};

use log::{debug, trace};

use crate::error::{LangError, Result};
use crate::grammar::{Grammar, Symbol};
use crate::index::{LrStateIndex, LrStateVec, RuleIndex};

/// `(rule_index, dot_position)` with `0 <= dot <= |body|`. ε-bodies are
/// stored with length 0, so the item `(r, 0)` for such a rule is already a
/// completed, reducible item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleItem {
    pub rule: RuleIndex,
    pub dot: usize,
}

impl RuleItem {
    pub fn start(rule: RuleIndex) -> Self {
        RuleItem { rule, dot: 0 }
    }

    pub fn symbol_at_dot<'g>(&self, grammar: &'g Grammar) -> Option<&'g Symbol> {
        grammar.rule(self.rule).body.get(self.dot)
    }

    pub fn is_reduce(&self, grammar: &Grammar) -> bool {
        self.dot == grammar.rule(self.rule).body.len()
    }

    pub fn advance(&self) -> Self {
        RuleItem { rule: self.rule, dot: self.dot + 1 }
    }
}

/// A canonicalized set of items. Equality/ordering is structural, which is
/// exactly what comparing two item sets for identity requires.
pub type LrState = BTreeSet<RuleItem>;

pub struct LRItemAutomaton {
    pub states: LrStateVec<LrState>,
    pub transitions: HashMap<(LrStateIndex, Symbol), LrStateIndex>,
    pub start: LrStateIndex,
}

impl LRItemAutomaton {
    /// `grammar` must already be the extended grammar (`extend_grammar`
    /// below) whose rule 0 is `S' -> start`.
    pub fn build(grammar: &Grammar) -> Self {
        let symbol_order = Self::symbol_order(grammar);

        let seed = LrState::from([RuleItem::start(RuleIndex(0))]);
        let start_state = Self::closure(&seed, grammar);

        let mut states: LrStateVec<LrState> = LrStateVec::new();
        let start = states.push(start_state);
        let mut transitions = HashMap::new();
        let mut queue: VecDeque<LrStateIndex> = VecDeque::from([start]);

        while let Some(idx) = queue.pop_front() {
            let items = states[idx].clone();
            for sym in &symbol_order {
                let target = Self::goto(&items, sym, grammar);
                if target.is_empty() {
                    continue;
                }
                let existing = states.indices().find(|&i| states[i] == target);
                let target_idx = match existing {
                    Some(i) => i,
                    None => {
                        let i = states.push(target);
                        queue.push_back(i);
                        i
                    }
                };
                transitions.insert((idx, sym.clone()), target_idx);
            }
        }

        debug!("built LR(0) automaton with {} states", states.len());
        LRItemAutomaton { states, transitions, start }
    }

    /// Non-terminals (declaration order, the fresh start symbol excluded as
    /// it can never be the symbol after a dot) followed by terminals
    /// (already sorted).
    fn symbol_order(grammar: &Grammar) -> Vec<Symbol> {
        let fresh_start = grammar.start_symbol();
        grammar
            .non_terminals
            .iter()
            .filter(|s| *s != fresh_start)
            .cloned()
            .chain(grammar.terminals.iter().cloned())
            .collect()
    }

    /// Expands `items` with every initial item of every production of a
    /// non-terminal found right after some dot, to a fixpoint.
    fn closure(items: &LrState, grammar: &Grammar) -> LrState {
        let mut items = items.clone();
        loop {
            let mut additions = LrState::new();
            for item in &items {
                if let Some(sym) = item.symbol_at_dot(grammar) {
                    if grammar.is_non_terminal(sym) {
                        for &ridx in grammar.rules_for(sym) {
                            additions.insert(RuleItem::start(ridx));
                        }
                    }
                }
            }
            let before = items.len();
            items.extend(additions);
            if items.len() == before {
                trace!("closure stabilized at {} items", items.len());
                return items;
            }
        }
    }

    /// Advances every item of `items` whose symbol-after-dot is `x`, then
    /// closes the result.
    fn goto(items: &LrState, x: &Symbol, grammar: &Grammar) -> LrState {
        let moved: LrState = items
            .iter()
            .filter(|item| item.symbol_at_dot(grammar) == Some(x))
            .map(RuleItem::advance)
            .collect();
        if moved.is_empty() {
            moved
        } else {
            Self::closure(&moved, grammar)
        }
    }
}

/// Inserts a fresh start symbol `S'` with rule `S' -> start` as rule 0.
/// The first candidate name not already used by the grammar wins; if all
/// four are taken, fails with `CannotExtendGrammar`.
pub fn extend_grammar(grammar: &Grammar) -> Result<Grammar> {
    let start = grammar.start_symbol().clone();
    let candidates = [format!("{start}'"), "S".to_string(), "START".to_string(), "START'".to_string()];

    let is_used = |name: &str| grammar.is_terminal(name) || grammar.is_non_terminal(name);
    let Some(fresh) = candidates.iter().find(|c| !is_used(c)) else {
        return Err(LangError::CannotExtendGrammar { tried: candidates.to_vec() });
    };

    let mut rules = vec![(fresh.clone(), vec![start])];
    for rule in grammar.rules.iter() {
        rules.push((rule.head.clone(), rule.body.clone()));
    }
    Grammar::build(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::bnf_reader::BNFReader;

    fn arithmetic_grammar() -> Grammar {
        BNFReader::parse(
            "E -> T E'\n\
             E' -> + T E' | \u{3f5}\n\
             T -> F T'\n\
             T' -> * F T' | \u{3f5}\n\
             F -> ( E ) | id\n",
        )
        .unwrap()
    }

    #[test]
    fn extension_inserts_fresh_start_as_rule_zero() {
        let g = arithmetic_grammar();
        let extended = extend_grammar(&g).unwrap();
        // "E'" is already taken by the grammar's own E' non-terminal, so
        // the next candidate, "S", is picked.
        assert_eq!(extended.start_symbol(), "S");
        assert_eq!(extended.rule(RuleIndex(0)).body, vec!["E".to_string()]);
    }

    #[test]
    fn two_closures_from_equal_seeds_are_equal() {
        let g = arithmetic_grammar();
        let extended = extend_grammar(&g).unwrap();
        let seed = LrState::from([RuleItem::start(RuleIndex(0))]);
        let a = LRItemAutomaton::closure(&seed, &extended);
        let b = LRItemAutomaton::closure(&seed, &extended);
        assert_eq!(a, b);
    }

    #[test]
    fn automaton_has_a_start_state_and_transitions() {
        let g = arithmetic_grammar();
        let extended = extend_grammar(&g).unwrap();
        let automaton = LRItemAutomaton::build(&extended);
        assert!(!automaton.states.is_empty());
        assert!(!automaton.transitions.is_empty());
    }
}
