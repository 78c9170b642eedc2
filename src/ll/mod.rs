//! LL(1) predictive table construction and the stack-based driver.

use std::collections::BTreeMap;

use log::debug;

use crate::error::{LangError, Result};
use crate::grammar::first_follow::FirstFollow;
use crate::grammar::{Grammar, Symbol, EPSILON, END_OF_INPUT};
use crate::index::RuleIndex;

/// `T[non_terminal, terminal-or-$] -> rule`.
#[derive(Debug, Clone, Default)]
pub struct LLTable {
    pub cells: BTreeMap<(Symbol, Symbol), RuleIndex>,
}

impl LLTable {
    pub fn get(&self, non_terminal: &str, terminal: &str) -> Option<RuleIndex> {
        self.cells.get(&(non_terminal.to_string(), terminal.to_string())).copied()
    }
}

pub struct LLTableBuilder;

impl LLTableBuilder {
    /// Builds the predictive table: for every rule `A -> α`, every
    /// `t ∈ FIRST(α)\{ε}` predicts it; if `ε ∈ FIRST(α)`, every
    /// `t ∈ FOLLOW(A)` predicts it too. A cell assigned twice with two
    /// different rules is `AmbiguousGrammarLl`.
    pub fn build(grammar: &Grammar) -> Result<LLTable> {
        let ff = FirstFollow::new(grammar);
        let mut table = LLTable::default();

        for ridx in grammar.rules.indices() {
            let rule = grammar.rule(ridx);
            let first_alpha = ff.first(&rule.body)?;

            for t in first_alpha.iter().filter(|s| s.as_str() != EPSILON) {
                Self::set_cell(&mut table, &rule.head, t, ridx)?;
            }
            if first_alpha.contains(EPSILON) {
                for t in ff.follow(&rule.head)? {
                    Self::set_cell(&mut table, &rule.head, &t, ridx)?;
                }
            }
        }

        debug!("built LL(1) table with {} cells", table.cells.len());
        Ok(table)
    }

    fn set_cell(table: &mut LLTable, non_terminal: &str, terminal: &str, rule: RuleIndex) -> Result<()> {
        let key = (non_terminal.to_string(), terminal.to_string());
        if let Some(&existing) = table.cells.get(&key) {
            if existing != rule {
                return Err(LangError::AmbiguousGrammarLl {
                    non_terminal: non_terminal.to_string(),
                    terminal: terminal.to_string(),
                    existing_rule: existing.0,
                    new_rule: rule.0,
                });
            }
            return Ok(());
        }
        table.cells.insert(key, rule);
        Ok(())
    }
}

/// Drives `table` over `input`, returning the left-most derivation as a
/// sequence of rule references.
pub struct LLDriver<'g> {
    grammar: &'g Grammar,
    table: &'g LLTable,
}

impl<'g> LLDriver<'g> {
    pub fn new(grammar: &'g Grammar, table: &'g LLTable) -> Self {
        LLDriver { grammar, table }
    }

    pub fn drive(&self, input: &[Symbol]) -> Result<Vec<RuleIndex>> {
        let mut tokens: Vec<Symbol> = input.to_vec();
        tokens.push(END_OF_INPUT.to_string());
        let mut cursor = 0usize;

        let mut stack: Vec<Symbol> = vec![END_OF_INPUT.to_string(), self.grammar.start_symbol().clone()];
        let mut derivation = Vec::new();

        while stack.last().map(|s| s.as_str()) != Some(END_OF_INPUT) {
            let top = stack.last().unwrap().clone();
            let a = tokens[cursor].clone();

            if top == a {
                stack.pop();
                cursor += 1;
                continue;
            }

            if self.grammar.is_terminal(&top) {
                return Err(LangError::SyntaxError { expected: top, actual: a });
            }

            let Some(ridx) = self.table.get(&top, &a) else {
                return Err(LangError::SyntaxError {
                    expected: format!("a symbol predicted for {top}"),
                    actual: a,
                });
            };

            derivation.push(ridx);
            stack.pop();
            let rule = self.grammar.rule(ridx);
            for sym in rule.body.iter().rev() {
                stack.push(sym.clone());
            }
        }

        Ok(derivation)
    }
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
    fn e3_derivation_starts_with_e_arrow_t_ep() {
        let g = arithmetic_grammar();
        let table = LLTableBuilder::build(&g).unwrap();
        let driver = LLDriver::new(&g, &table);
        let tokens: Vec<Symbol> =
            "id + id * id".split_whitespace().map(str::to_string).collect();
        let derivation = driver.drive(&tokens).unwrap();
        let first_rule = g.rule(derivation[0]);
        assert_eq!(first_rule.head, "E");
        assert_eq!(first_rule.body, vec!["T".to_string(), "E'".to_string()]);
    }

    #[test]
    fn mismatched_terminal_is_syntax_error() {
        let g = arithmetic_grammar();
        let table = LLTableBuilder::build(&g).unwrap();
        let driver = LLDriver::new(&g, &table);
        let tokens: Vec<Symbol> = vec!["id".to_string(), "id".to_string()];
        let err = driver.drive(&tokens).unwrap_err();
        assert!(matches!(err, LangError::SyntaxError { .. }));
    }

    #[test]
    fn e5_ambiguous_grammar_fails_ll_build() {
        let g = Grammar::build(vec![
            ("S".into(), vec!["a".into()]),
            ("S".into(), vec!["a".into()]),
        ])
        .unwrap();
        let err = LLTableBuilder::build(&g).unwrap_err();
        assert!(matches!(err, LangError::AmbiguousGrammarLl { .. }));
    }

    #[test]
    fn every_cell_predicts_at_most_one_rule() {
        let g = arithmetic_grammar();
        let table = LLTableBuilder::build(&g).unwrap();
        // Rebuild the same table and confirm stability (no nondeterminism).
        let table2 = LLTableBuilder::build(&g).unwrap();
        assert_eq!(table.cells, table2.cells);
    }
}
