//! End-to-end pipeline tests: regex-to-DFA, BNF-to-LL(1), and BNF-to-SLR(1),
//! each driven start to finish on a representative grammar or pattern.

use langtools::grammar::bnf_reader::BNFReader;
use langtools::grammar::Grammar;
use langtools::ll::{LLDriver, LLTableBuilder};
use langtools::lr::slr::{SLRTableBuilder, SlrDriver};
use langtools::lr::{extend_grammar, LRItemAutomaton};
use langtools::regex::dfa::RegexDFABuilder;
use langtools::regex::parser::RegexParser;
use langtools::LangError;

const ARITHMETIC: &str = "\
    E -> T E'\n\
    E' -> + T E' | \u{3f5}\n\
    T -> F T'\n\
    T' -> * F T' | \u{3f5}\n\
    F -> ( E ) | id\n";

#[test]
fn e1_regex_to_dfa_a_then_star_of_b_or_c() {
    let node = RegexParser::parse("a(b|c)*").unwrap();
    let dfa = RegexDFABuilder::build(&node).unwrap();
    assert!(dfa.accepts("a"));
    assert!(dfa.accepts("abcbcb"));
    assert!(!dfa.accepts(""));
    assert!(!dfa.accepts("ba"));
}

#[test]
fn e2_regex_to_dfa_class_plus_optional() {
    let node = RegexParser::parse("[a-c]+d?").unwrap();
    let dfa = RegexDFABuilder::build(&node).unwrap();
    assert!(dfa.accepts("aabbccd"));
    assert!(dfa.accepts("b"));
    assert!(!dfa.accepts("d"));
}

#[test]
fn e3_ll1_predictive_parse_of_arithmetic_expression() {
    let g = BNFReader::parse(ARITHMETIC).unwrap();
    let table = LLTableBuilder::build(&g).unwrap();
    let driver = LLDriver::new(&g, &table);
    let tokens: Vec<String> = "id * id + id".split_whitespace().map(str::to_string).collect();
    let derivation = driver.drive(&tokens).unwrap();
    assert_eq!(g.rule(derivation[0]).head, "E");
}

#[test]
fn e4_slr1_shift_reduce_parse_of_arithmetic_expression() {
    let g = BNFReader::parse(ARITHMETIC).unwrap();
    let extended = extend_grammar(&g).unwrap();
    let automaton = LRItemAutomaton::build(&extended);
    let table = SLRTableBuilder::build(&automaton, &extended).unwrap();
    let driver = SlrDriver::new(&extended, &table, &automaton);
    let tokens: Vec<String> = "( id + id ) * id".split_whitespace().map(str::to_string).collect();
    let reductions = driver.drive(&tokens).unwrap();
    assert!(!reductions.is_empty());
    assert_eq!(extended.rule(*reductions.last().unwrap()).head, *g.start_symbol());
}

#[test]
fn e5_ambiguous_grammar_rejected_by_both_ll_and_slr() {
    let g = Grammar::build(vec![
        ("S".into(), vec!["a".into()]),
        ("S".into(), vec!["a".into()]),
    ])
    .unwrap();

    let ll_err = LLTableBuilder::build(&g).unwrap_err();
    assert!(matches!(ll_err, LangError::AmbiguousGrammarLl { .. }));

    let extended = extend_grammar(&g).unwrap();
    let automaton = LRItemAutomaton::build(&extended);
    let slr_err = SLRTableBuilder::build(&automaton, &extended).unwrap_err();
    assert!(matches!(slr_err, LangError::AmbiguousGrammarSlr { .. }));
}

#[test]
fn e6_malformed_bnf_text_is_rejected_before_table_building() {
    let err = BNFReader::parse("S a\n").unwrap_err();
    assert!(matches!(err, LangError::MalformedGrammar(_)));
}

#[test]
fn syntax_error_surfaces_on_unexpected_token() {
    let g = BNFReader::parse(ARITHMETIC).unwrap();
    let table = LLTableBuilder::build(&g).unwrap();
    let driver = LLDriver::new(&g, &table);
    let tokens: Vec<String> = vec!["+".to_string()];
    let err = driver.drive(&tokens).unwrap_err();
    assert!(matches!(err, LangError::SyntaxError { .. }));
}
