//! SLR(1) ACTION/GOTO table construction and driver.

use std::collections::BTreeMap;

use log::debug;

use super::{LRItemAutomaton, RuleItem};
use crate::error::{LangError, Result, SlrConflictKind};
use crate::grammar::first_follow::FirstFollow;
use crate::grammar::{Grammar, Symbol, END_OF_INPUT};
use crate::index::{LrStateIndex, RuleIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(LrStateIndex),
    Reduce(RuleIndex),
    Accept,
}

impl Action {
    fn describe(&self) -> String {
        match self {
            Action::Shift(s) => format!("shift to state {}", s.0),
            Action::Reduce(r) => format!("reduce by rule #{}", r.0),
            Action::Accept => "accept".to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SlrTable {
    pub action: BTreeMap<(LrStateIndex, Symbol), Action>,
    pub goto: BTreeMap<(LrStateIndex, Symbol), LrStateIndex>,
}

pub struct SLRTableBuilder;

impl SLRTableBuilder {
    /// `grammar` must be the same extended grammar (`extend_grammar`) that
    /// `automaton` was built from.
    pub fn build(automaton: &LRItemAutomaton, grammar: &Grammar) -> Result<SlrTable> {
        let ff = FirstFollow::new(grammar);
        let fresh_start = grammar.start_symbol();
        let mut table = SlrTable::default();

        for idx in automaton.states.indices() {
            let items = &automaton.states[idx];

            for item in items {
                if item.rule == RuleIndex(0) && item.is_reduce(grammar) {
                    Self::set_action(&mut table, idx, END_OF_INPUT, Action::Accept)?;
                }
            }

            for ((state, sym), target) in &automaton.transitions {
                if *state != idx {
                    continue;
                }
                if grammar.is_terminal(sym) {
                    Self::set_action(&mut table, idx, sym, Action::Shift(*target))?;
                } else {
                    table.goto.insert((idx, sym.clone()), *target);
                }
            }

            for item in items {
                let rule = grammar.rule(item.rule);
                if rule.head == *fresh_start || !item.is_reduce(grammar) {
                    continue;
                }
                for t in ff.follow(&rule.head)? {
                    Self::set_action(&mut table, idx, &t, Action::Reduce(item.rule))?;
                }
            }
        }

        debug!(
            "built SLR(1) table with {} action cells, {} goto cells",
            table.action.len(),
            table.goto.len()
        );
        Ok(table)
    }

    fn set_action(table: &mut SlrTable, state: LrStateIndex, terminal: &str, action: Action) -> Result<()> {
        let key = (state, terminal.to_string());
        if let Some(&existing) = table.action.get(&key) {
            if existing != action {
                let kind = if matches!(existing, Action::Accept) || matches!(action, Action::Accept) {
                    SlrConflictKind::AcceptReduce
                } else if matches!(existing, Action::Shift(_)) || matches!(action, Action::Shift(_)) {
                    SlrConflictKind::ShiftReduce
                } else {
                    SlrConflictKind::ReduceReduce
                };
                return Err(LangError::AmbiguousGrammarSlr {
                    kind,
                    state: state.0,
                    terminal: terminal.to_string(),
                    existing: existing.describe(),
                    new: action.describe(),
                });
            }
            return Ok(());
        }
        table.action.insert(key, action);
        Ok(())
    }
}

/// Drives `table` over `input`, returning the sequence of rules reduced.
pub struct SlrDriver<'g> {
    grammar: &'g Grammar,
    table: &'g SlrTable,
    start: LrStateIndex,
}

impl<'g> SlrDriver<'g> {
    pub fn new(grammar: &'g Grammar, table: &'g SlrTable, automaton: &LRItemAutomaton) -> Self {
        SlrDriver { grammar, table, start: automaton.start }
    }

    pub fn drive(&self, input: &[Symbol]) -> Result<Vec<RuleIndex>> {
        let mut tokens = input.to_vec();
        tokens.push(END_OF_INPUT.to_string());
        let mut cursor = 0usize;

        let mut states = vec![self.start];
        let mut symbols: Vec<Symbol> = Vec::new();
        let mut reductions = Vec::new();

        loop {
            let state = *states.last().unwrap();
            let a = tokens[cursor].clone();

            match self.table.action.get(&(state, a.clone())) {
                Some(Action::Shift(j)) => {
                    symbols.push(a);
                    states.push(*j);
                    cursor += 1;
                }
                Some(Action::Reduce(ridx)) => {
                    let rule = self.grammar.rule(*ridx);
                    for _ in 0..rule.body.len() {
                        symbols.pop();
                        states.pop();
                    }
                    let head = rule.head.clone();
                    let top_state = *states.last().unwrap();
                    let Some(&goto_state) = self.table.goto.get(&(top_state, head.clone())) else {
                        return Err(LangError::SyntaxError {
                            expected: format!("a GOTO entry for {head} from state {}", top_state.0),
                            actual: a,
                        });
                    };
                    symbols.push(head);
                    states.push(goto_state);
                    reductions.push(*ridx);
                }
                Some(Action::Accept) => return Ok(reductions),
                None => {
                    return Err(LangError::SyntaxError {
                        expected: format!("an action in state {}", state.0),
                        actual: a,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::bnf_reader::BNFReader;
    use crate::lr::extend_grammar;

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
    fn e4_start_state_shifts_on_id_and_accepts_on_dollar() {
        let g = arithmetic_grammar();
        let extended = extend_grammar(&g).unwrap();
        let automaton = LRItemAutomaton::build(&extended);
        let table = SLRTableBuilder::build(&automaton, &extended).unwrap();

        assert!(matches!(
            table.action.get(&(automaton.start, "id".to_string())),
            Some(Action::Shift(_))
        ));

        // Some state containing S' -> E . must accept on $.
        let accept_state = automaton
            .states
            .indices()
            .find(|&i| matches!(table.action.get(&(i, END_OF_INPUT.to_string())), Some(Action::Accept)));
        assert!(accept_state.is_some());
    }

    #[test]
    fn accept_reduce_conflict_is_classified_correctly() {
        let mut table = SlrTable::default();
        let state = LrStateIndex(0);
        SLRTableBuilder::set_action(&mut table, state, END_OF_INPUT, Action::Accept).unwrap();
        let err = SLRTableBuilder::set_action(&mut table, state, END_OF_INPUT, Action::Reduce(RuleIndex(1)))
            .unwrap_err();
        match err {
            LangError::AmbiguousGrammarSlr { kind, .. } => assert_eq!(kind, SlrConflictKind::AcceptReduce),
            other => panic!("expected AmbiguousGrammarSlr, got {other:?}"),
        }
    }

    #[test]
    fn e4_ep_epsilon_reduces_on_rparen() {
        let g = arithmetic_grammar();
        let extended = extend_grammar(&g).unwrap();
        let automaton = LRItemAutomaton::build(&extended);
        let table = SLRTableBuilder::build(&automaton, &extended).unwrap();

        let ep_epsilon_rule = extended
            .rules
            .indices()
            .find(|&r| extended.rule(r).head == "E'" && extended.rule(r).is_epsilon())
            .unwrap();

        let has_reduce_on_rparen = automaton.states.indices().any(|i| {
            automaton.states[i].contains(&RuleItem { rule: ep_epsilon_rule, dot: 0 })
                && matches!(
                    table.action.get(&(i, ")".to_string())),
                    Some(Action::Reduce(r)) if *r == ep_epsilon_rule
                )
        });
        assert!(has_reduce_on_rparen);
    }

    #[test]
    fn e5_ambiguous_grammar_fails_slr_build() {
        let g = Grammar::build(vec![
            ("S".into(), vec!["a".into()]),
            ("S".into(), vec!["a".into()]),
        ])
        .unwrap();
        let extended = extend_grammar(&g).unwrap();
        let automaton = LRItemAutomaton::build(&extended);
        let err = SLRTableBuilder::build(&automaton, &extended).unwrap_err();
        assert!(matches!(err, LangError::AmbiguousGrammarSlr { .. }));
    }

    #[test]
    fn drives_id_plus_id_times_id_to_acceptance() {
        let g = arithmetic_grammar();
        let extended = extend_grammar(&g).unwrap();
        let automaton = LRItemAutomaton::build(&extended);
        let table = SLRTableBuilder::build(&automaton, &extended).unwrap();
        let driver = SlrDriver::new(&extended, &table, &automaton);

        let tokens: Vec<Symbol> =
            "id + id * id".split_whitespace().map(str::to_string).collect();
        let reductions = driver.drive(&tokens).unwrap();
        assert!(!reductions.is_empty());
    }
}
