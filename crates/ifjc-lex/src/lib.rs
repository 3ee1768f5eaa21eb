//! ifjc-lex - Lexical analysis for the IFJ25 language.
//!
//! The scanner is a deterministic automaton over the source stream. It is
//! pulled one token at a time by the parser; end-of-line is a significant
//! token because the grammar uses it as a statement terminator, while all
//! other whitespace and both comment forms are absorbed silently.

pub mod cursor;
pub mod scanner;
pub mod token;

pub use cursor::Cursor;
pub use scanner::Scanner;
pub use token::{Token, TokenKind};
