//! cirius-lex - Lexical analyzer for the Cirius language.
//!
//! Transforms source text into a finalized token stream. Tokenization is
//! longest-match: multi-character operators win over their single-character
//! prefixes, keywords are recognized after the identifier scan, and `1..3`
//! lexes as two integers around a range token because a float requires a
//! digit after the dot.

mod cursor;
mod lexer;
mod token;

pub use lexer::Lexer;
pub use token::{keyword_from_ident, Token, TokenKind};

use thiserror::Error;

/// Errors produced during tokenization.
///
/// All lexical errors are fatal to the invocation and carry the line on
/// which the offending input starts.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexError {
    #[error("unexpected character '{ch}' at line {line}")]
    UnexpectedChar { ch: char, line: u32 },

    #[error("unterminated string literal starting at line {line}")]
    UnterminatedString { line: u32 },

    #[error("unterminated block comment starting at line {line}")]
    UnterminatedComment { line: u32 },

    #[error("invalid number literal '{lexeme}' at line {line}")]
    InvalidNumber { lexeme: String, line: u32 },
}

/// Tokenize a complete source text.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}
