//! Educational compiler-construction toolkit: regex-to-DFA, BNF-to-LL(1),
//! and BNF-to-SLR(1) pipelines.

pub mod error;
pub mod grammar;
pub mod index;
pub mod ll;
pub mod lr;
pub mod regex;

pub use error::{LangError, Result};
pub use grammar::Grammar;
