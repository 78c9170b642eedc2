//! Command-line front end: `regex-dfa`, `ll`, and `slr` subcommands.
//!
//! Uses the `clap`-derive + `env_logger::init` CLI convention common among
//! parser/grammar-tooling crates for a thin, exit-code-driven dispatcher.

use std::fs;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use langtools::grammar::bnf_reader::BNFReader;
use langtools::grammar::first_follow::FirstFollow;
use langtools::ll::{LLDriver, LLTableBuilder};
use langtools::lr::slr::{SLRTableBuilder, SlrDriver};
use langtools::lr::{extend_grammar, LRItemAutomaton};
use langtools::regex::dfa::RegexDFABuilder;
use langtools::regex::parser::RegexParser;

#[derive(Parser)]
#[command(name = "langtools", about = "Regex-to-DFA, BNF-to-LL(1), and BNF-to-SLR(1) toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a regex pattern to a DFA and print its flat-text dump.
    RegexDfa { pattern: String },
    /// Build an LL(1) table from a BNF grammar file and optionally drive it
    /// over whitespace-separated input tokens.
    Ll {
        grammar_file: String,
        #[arg(trailing_var_arg = true)]
        input: Vec<String>,
    },
    /// Build an SLR(1) table from a BNF grammar file and optionally drive it
    /// over whitespace-separated input tokens.
    Slr {
        grammar_file: String,
        #[arg(trailing_var_arg = true)]
        input: Vec<String>,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::RegexDfa { pattern } => run_regex_dfa(&pattern),
        Command::Ll { grammar_file, input } => run_ll(&grammar_file, &input),
        Command::Slr { grammar_file, input } => run_slr(&grammar_file, &input),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_regex_dfa(pattern: &str) -> Result<(), Box<dyn std::error::Error>> {
    let node = RegexParser::parse(pattern)?;
    let dfa = RegexDFABuilder::build(&node)?;
    print!("{dfa}");
    Ok(())
}

fn run_ll(grammar_file: &str, input: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(grammar_file)?;
    let grammar = BNFReader::parse(&text)?;
    let table = LLTableBuilder::build(&grammar)?;

    if input.is_empty() {
        let ff = FirstFollow::new(&grammar);
        for nt in &grammar.non_terminals {
            let first: Vec<String> = ff.first(&[nt.clone()])?.into_iter().collect();
            let follow: Vec<String> = ff.follow(nt)?.into_iter().collect();
            println!("FIRST({nt}) = {first:?}");
            println!("FOLLOW({nt}) = {follow:?}");
        }
        println!("LL(1) table built: {} cells", table.cells.len());
        return Ok(());
    }

    let driver = LLDriver::new(&grammar, &table);
    let derivation = driver.drive(input)?;
    for ridx in derivation {
        println!("{}", grammar.rule(ridx));
    }
    Ok(())
}

fn run_slr(grammar_file: &str, input: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(grammar_file)?;
    let grammar = BNFReader::parse(&text)?;
    let extended = extend_grammar(&grammar)?;
    let automaton = LRItemAutomaton::build(&extended);
    let table = SLRTableBuilder::build(&automaton, &extended)?;

    if input.is_empty() {
        for ((state, terminal), action) in &table.action {
            println!("ACTION[{}, {terminal}] = {action:?}", state.0);
        }
        for ((state, nt), target) in &table.goto {
            println!("GOTO[{}, {nt}] = {}", state.0, target.0);
        }
        return Ok(());
    }

    let driver = SlrDriver::new(&extended, &table, &automaton);
    let reductions = driver.drive(input)?;
    for ridx in reductions {
        println!("{}", extended.rule(ridx));
    }
    Ok(())
}
