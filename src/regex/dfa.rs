//! Direct DFA construction from a regex syntax tree via the followpos
//! algorithm (Aho, Sethi, and Ullman's nullable/firstpos/lastpos/followpos
//! construction).
//!
//! Nullable, firstpos, lastpos, and followpos are computed in one post-order
//! pass over the tree. A plain recursive pass suffices in place of
//! identity-keyed memoization: `+` deep-copies its operand, so the tree
//! never shares subtrees and every node is visited exactly once regardless.
//! Subset construction then explores reachable leaf-position sets by BFS,
//! naming them `q0, q1, ...` in discovery order plus a non-accepting total
//! sink `X`.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use log::debug;

use super::{RegexNode, TERMINATOR};
use crate::error::{LangError, Result};
use crate::index::{DfaStateIndex, DfaStateVec};

const SINK: &str = "X";

/// `(states, alphabet, start, accept_states, delta)`. `delta` is total:
/// every `(state, symbol)` pair has an entry, with the sink absorbing
/// non-matches.
#[derive(Debug, Clone)]
pub struct Dfa {
    pub states: Vec<String>,
    pub alphabet: Vec<char>,
    pub start: String,
    pub accept_states: Vec<String>,
    pub delta: BTreeMap<(String, char), String>,
}

impl Dfa {
    pub fn is_accepting(&self, state: &str) -> bool {
        self.accept_states.iter().any(|s| s == state)
    }

    pub fn step(&self, state: &str, symbol: char) -> &str {
        self.delta
            .get(&(state.to_string(), symbol))
            .map(|s| s.as_str())
            .unwrap_or(SINK)
    }

    /// Runs `input` from the start state, returning whether it's accepted.
    /// Any symbol outside the alphabet is treated as a non-match (routed to
    /// the sink), consistent with `delta` being total over the alphabet.
    pub fn accepts(&self, input: &str) -> bool {
        let mut state = self.start.clone();
        for ch in input.chars() {
            state = self.step(&state, ch).to_string();
        }
        self.is_accepting(&state)
    }
}

impl std::fmt::Display for Dfa {
    /// A flat text dump: states, input alphabet, start state, accept
    /// states, then the transition table one row per state.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "states: [{}]",
            self.states.iter().map(|s| format!("\"{s}\"")).collect::<Vec<_>>().join(", ")
        )?;
        writeln!(
            f,
            "input_alphabet: [{}]",
            self.alphabet.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", ")
        )?;
        writeln!(f, "start_state: \"{}\"", self.start)?;
        writeln!(
            f,
            "accept_states: [{}]",
            self.accept_states.iter().map(|s| format!("\"{s}\"")).collect::<Vec<_>>().join(", ")
        )?;
        writeln!(f, "delta:")?;
        for state in &self.states {
            writeln!(f, " {state}:")?;
            for symbol in &self.alphabet {
                writeln!(f, "  {symbol}: {}", self.step(state, *symbol))?;
            }
        }
        Ok(())
    }
}

type Position = u32;

pub struct RegexDFABuilder;

impl RegexDFABuilder {
    pub fn build(root: &RegexNode) -> Result<Dfa> {
        let mut leaf_chars: HashMap<Position, char> = HashMap::new();
        let mut follow: HashMap<Position, BTreeSet<Position>> = HashMap::new();
        let (_, firstpos_root, _) = Self::compute(root, &mut leaf_chars, &mut follow);

        let terminator_id = leaf_chars
            .iter()
            .find(|(_, &c)| c == TERMINATOR)
            .map(|(&id, _)| id)
            .ok_or_else(|| {
                LangError::MalformedRegex("pattern has no accepting position".to_string())
            })?;

        let mut alphabet: Vec<char> =
            leaf_chars.values().copied().filter(|&c| c != TERMINATOR).collect();
        alphabet.sort();
        alphabet.dedup();

        let mut state_sets: DfaStateVec<BTreeSet<Position>> = DfaStateVec::new();
        let start_idx = state_sets.push(firstpos_root);
        let mut index_of: HashMap<String, DfaStateIndex> = HashMap::new();
        index_of.insert(Self::state_key(&state_sets[start_idx]), start_idx);
        let mut queue: VecDeque<DfaStateIndex> = VecDeque::from([start_idx]);
        let mut delta: HashMap<(DfaStateIndex, char), Option<DfaStateIndex>> = HashMap::new();

        while let Some(idx) = queue.pop_front() {
            let s = state_sets[idx].clone();
            for &a in &alphabet {
                let mut target: BTreeSet<Position> = BTreeSet::new();
                for &pos in &s {
                    if leaf_chars.get(&pos) == Some(&a) {
                        if let Some(f) = follow.get(&pos) {
                            target.extend(f.iter().copied());
                        }
                    }
                }
                if target.is_empty() {
                    delta.insert((idx, a), None);
                    continue;
                }
                let key = Self::state_key(&target);
                let target_idx = match index_of.get(&key) {
                    Some(&existing) => existing,
                    None => {
                        let new_idx = state_sets.push(target);
                        index_of.insert(key, new_idx);
                        queue.push_back(new_idx);
                        new_idx
                    }
                };
                delta.insert((idx, a), Some(target_idx));
            }
        }

        let names: Vec<String> = state_sets
            .indices()
            .map(|i| if i == start_idx { "q0".to_string() } else { format!("q{}", i.0) })
            .collect();

        let mut full_delta: BTreeMap<(String, char), String> = BTreeMap::new();
        for (i, name) in state_sets.indices().zip(names.iter()) {
            for &a in &alphabet {
                let target_name = match delta.get(&(i, a)).copied().flatten() {
                    Some(j) => names[j.0].clone(),
                    None => SINK.to_string(),
                };
                full_delta.insert((name.clone(), a), target_name);
            }
        }
        for &a in &alphabet {
            full_delta.insert((SINK.to_string(), a), SINK.to_string());
        }

        let accept_states: Vec<String> = state_sets
            .indices()
            .filter(|&i| state_sets[i].contains(&terminator_id))
            .map(|i| names[i.0].clone())
            .collect();

        let mut states = names.clone();
        states.push(SINK.to_string());

        debug!(
            "built DFA: {} states, alphabet {:?}, {} accepting",
            states.len(),
            alphabet,
            accept_states.len()
        );

        Ok(Dfa { states, alphabet, start: "q0".to_string(), accept_states, delta: full_delta })
    }

    fn state_key(set: &BTreeSet<Position>) -> String {
        set.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(",")
    }

    /// Post-order computation of `(nullable, firstpos, lastpos)`, threading
    /// `followpos` contributions through `follow` as it goes.
    fn compute(
        node: &RegexNode,
        leaf_chars: &mut HashMap<Position, char>,
        follow: &mut HashMap<Position, BTreeSet<Position>>,
    ) -> (bool, BTreeSet<Position>, BTreeSet<Position>) {
        match node {
            RegexNode::Leaf { ch: None, .. } => (true, BTreeSet::new(), BTreeSet::new()),
            RegexNode::Leaf { ch: Some(c), id } => {
                leaf_chars.insert(*id, *c);
                (false, BTreeSet::from([*id]), BTreeSet::from([*id]))
            }
            RegexNode::Concat(l, r) => {
                let (null_l, first_l, last_l) = Self::compute(l, leaf_chars, follow);
                let (null_r, first_r, last_r) = Self::compute(r, leaf_chars, follow);
                for &i in &last_l {
                    follow.entry(i).or_default().extend(first_r.iter().copied());
                }
                let nullable = null_l && null_r;
                let firstpos =
                    if null_l { first_l.union(&first_r).copied().collect() } else { first_l };
                let lastpos =
                    if null_r { last_l.union(&last_r).copied().collect() } else { last_r };
                (nullable, firstpos, lastpos)
            }
            RegexNode::Union(l, r) => {
                let (null_l, first_l, last_l) = Self::compute(l, leaf_chars, follow);
                let (null_r, first_r, last_r) = Self::compute(r, leaf_chars, follow);
                let nullable = null_l || null_r;
                let firstpos = first_l.union(&first_r).copied().collect();
                let lastpos = last_l.union(&last_r).copied().collect();
                (nullable, firstpos, lastpos)
            }
            RegexNode::Star(c) => {
                let (_, first_c, last_c) = Self::compute(c, leaf_chars, follow);
                for &i in &last_c {
                    follow.entry(i).or_default().extend(first_c.iter().copied());
                }
                (true, first_c, last_c)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::parser::RegexParser;

    fn dfa_for(pattern: &str) -> Dfa {
        let node = RegexParser::parse(pattern).unwrap();
        RegexDFABuilder::build(&node).unwrap()
    }

    #[test]
    fn e1_a_followed_by_star_of_b_or_c() {
        let dfa = dfa_for("a(b|c)*");
        assert_eq!(dfa.alphabet, vec!['a', 'b', 'c']);
        assert!(dfa.accepts("ab"));
        assert!(dfa.accepts("acbc"));
        assert!(dfa.accepts("a"));
        assert!(!dfa.accepts(""));
        assert!(!dfa.accepts("b"));
        assert!(!dfa.accepts("abz"));
    }

    #[test]
    fn e2_class_plus_optional_d() {
        let dfa = dfa_for("[a-c]+d?");
        assert!(dfa.accepts("a"));
        assert!(dfa.accepts("abbcd"));
        assert!(dfa.accepts("cd"));
        assert!(!dfa.accepts(""));
        assert!(!dfa.accepts("d"));
        assert!(!dfa.accepts("ax"));
    }

    #[test]
    fn sink_is_total_and_non_accepting() {
        let dfa = dfa_for("a");
        for state in &dfa.states {
            for &sym in &dfa.alphabet {
                assert!(dfa.delta.contains_key(&(state.clone(), sym)));
            }
        }
        assert!(!dfa.is_accepting(SINK));
        for &sym in &dfa.alphabet {
            assert_eq!(dfa.step(SINK, sym), SINK);
        }
    }

    #[test]
    fn start_state_is_q0_and_contains_firstpos_root() {
        let dfa = dfa_for("ab");
        assert_eq!(dfa.start, "q0");
    }

    #[test]
    fn dump_has_expected_fields() {
        let dfa = dfa_for("a");
        let text = dfa.to_string();
        assert!(text.starts_with("states: ["));
        assert!(text.contains("input_alphabet: ["));
        assert!(text.contains("start_state: \"q0\""));
        assert!(text.contains("accept_states: ["));
        assert!(text.contains("delta:"));
    }
}
