//! Main lexer implementation.
//!
//! The lexer dispatches on the first character of each token, with
//! dedicated handlers for the characters that begin more than one
//! operator. Whitespace and all three comment forms (`//`, `#`,
//! `/* ... */`) are consumed between tokens and never reach the parser.

use cirius_util::Span;

use crate::cursor::Cursor;
use crate::token::{keyword_from_ident, Token, TokenKind};
use crate::LexError;

/// The lexer for Cirius source code.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    /// Start line of the token being lexed.
    token_line: u32,
    /// Start column of the token being lexed.
    token_column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            token_line: 1,
            token_column: 1,
        }
    }

    /// Tokenize the whole input, failing on the first lexical error.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Produce the next token, or `None` at end of input.
    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_trivia()?;

        self.token_line = self.cursor.line();
        self.token_column = self.cursor.column();

        let Some(ch) = self.cursor.peek() else {
            return Ok(None);
        };

        let kind = match ch {
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            ';' => self.single(TokenKind::Semicolon),
            ',' => self.single(TokenKind::Comma),
            '%' => self.single(TokenKind::Percent),
            '&' => self.single(TokenKind::Amp),
            '|' => self.single(TokenKind::Pipe),
            '^' => self.single(TokenKind::Caret),
            '~' => self.single(TokenKind::Tilde),

            '+' => self.lex_plus(),
            '-' => self.lex_minus(),
            '*' => self.lex_star(),
            '/' => self.lex_slash(),
            '=' => self.lex_equals(),
            '!' => self.lex_bang()?,
            '<' => self.lex_less(),
            '>' => self.lex_greater(),
            '.' => self.lex_dot()?,

            '"' => self.lex_string()?,
            c if c.is_ascii_digit() => self.lex_number()?,
            c if is_ident_start(c) => self.lex_identifier(),

            c => {
                return Err(LexError::UnexpectedChar {
                    ch: c,
                    line: self.token_line,
                })
            }
        };

        Ok(Some(Token::new(
            kind,
            Span::new(self.token_line, self.token_column),
        )))
    }

    /// Consume one character and return `kind`.
    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.bump();
        kind
    }

    /// `++`, `+=`, or `+`.
    fn lex_plus(&mut self) -> TokenKind {
        self.cursor.bump();
        match self.cursor.peek() {
            Some('+') => self.single(TokenKind::PlusPlus),
            Some('=') => self.single(TokenKind::PlusEq),
            _ => TokenKind::Plus,
        }
    }

    /// `--`, `-=`, or `-`.
    fn lex_minus(&mut self) -> TokenKind {
        self.cursor.bump();
        match self.cursor.peek() {
            Some('-') => self.single(TokenKind::MinusMinus),
            Some('=') => self.single(TokenKind::MinusEq),
            _ => TokenKind::Minus,
        }
    }

    /// `*=` or `*`.
    fn lex_star(&mut self) -> TokenKind {
        self.cursor.bump();
        match self.cursor.peek() {
            Some('=') => self.single(TokenKind::StarEq),
            _ => TokenKind::Star,
        }
    }

    /// `/=` or `/`. Comments were already consumed as trivia.
    fn lex_slash(&mut self) -> TokenKind {
        self.cursor.bump();
        match self.cursor.peek() {
            Some('=') => self.single(TokenKind::SlashEq),
            _ => TokenKind::Slash,
        }
    }

    /// `==` or `=`.
    fn lex_equals(&mut self) -> TokenKind {
        self.cursor.bump();
        match self.cursor.peek() {
            Some('=') => self.single(TokenKind::EqEq),
            _ => TokenKind::Assign,
        }
    }

    /// `!=`. A lone `!` is not part of the grammar (`not` is the keyword).
    fn lex_bang(&mut self) -> Result<TokenKind, LexError> {
        self.cursor.bump();
        match self.cursor.peek() {
            Some('=') => Ok(self.single(TokenKind::NotEq)),
            _ => Err(LexError::UnexpectedChar {
                ch: '!',
                line: self.token_line,
            }),
        }
    }

    /// `<<`, `<=`, or `<`.
    fn lex_less(&mut self) -> TokenKind {
        self.cursor.bump();
        match self.cursor.peek() {
            Some('<') => self.single(TokenKind::Shl),
            Some('=') => self.single(TokenKind::Le),
            _ => TokenKind::Lt,
        }
    }

    /// `>>`, `>=`, or `>`.
    fn lex_greater(&mut self) -> TokenKind {
        self.cursor.bump();
        match self.cursor.peek() {
            Some('>') => self.single(TokenKind::Shr),
            Some('=') => self.single(TokenKind::Ge),
            _ => TokenKind::Gt,
        }
    }

    /// `..`. A lone `.` is not part of the grammar.
    fn lex_dot(&mut self) -> Result<TokenKind, LexError> {
        self.cursor.bump();
        match self.cursor.peek() {
            Some('.') => Ok(self.single(TokenKind::DotDot)),
            _ => Err(LexError::UnexpectedChar {
                ch: '.',
                line: self.token_line,
            }),
        }
    }

    /// Double-quoted string literal. No escapes, no embedded newlines; the
    /// token value carries the text with the quotes stripped.
    fn lex_string(&mut self) -> Result<TokenKind, LexError> {
        self.cursor.bump();
        let start = self.cursor.position();
        loop {
            match self.cursor.peek() {
                Some('"') => break,
                Some('\n') | None => {
                    return Err(LexError::UnterminatedString {
                        line: self.token_line,
                    })
                }
                Some(_) => {
                    self.cursor.bump();
                }
            }
        }
        let text = self.cursor.slice_from(start).to_string();
        self.cursor.bump();
        Ok(TokenKind::Str(text))
    }

    /// Integer or float literal. A float requires a digit after the dot,
    /// so `1..3` stays an integer followed by a range token.
    fn lex_number(&mut self) -> Result<TokenKind, LexError> {
        let start = self.cursor.position();
        self.cursor.eat_while(|c| c.is_ascii_digit());

        let is_float = self.cursor.peek() == Some('.')
            && self.cursor.peek_second().is_some_and(|c| c.is_ascii_digit());
        if is_float {
            self.cursor.bump();
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }

        let lexeme = self.cursor.slice_from(start);
        if is_float {
            let value = lexeme.parse::<f64>().map_err(|_| LexError::InvalidNumber {
                lexeme: lexeme.to_string(),
                line: self.token_line,
            })?;
            Ok(TokenKind::Float(value))
        } else {
            let value = lexeme.parse::<i64>().map_err(|_| LexError::InvalidNumber {
                lexeme: lexeme.to_string(),
                line: self.token_line,
            })?;
            Ok(TokenKind::Int(value))
        }
    }

    /// Identifier or reserved keyword.
    fn lex_identifier(&mut self) -> TokenKind {
        let start = self.cursor.position();
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice_from(start);
        keyword_from_ident(text).unwrap_or_else(|| TokenKind::Ident(text.to_string()))
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.cursor.peek() {
                Some(c) if c.is_whitespace() => {
                    self.cursor.bump();
                }
                Some('#') => self.skip_line_comment(),
                Some('/') if self.cursor.peek_second() == Some('/') => self.skip_line_comment(),
                Some('/') if self.cursor.peek_second() == Some('*') => self.skip_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn skip_line_comment(&mut self) {
        self.cursor.eat_while(|c| c != '\n');
    }

    /// `/* ... */`, non-greedy, may span lines.
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let line = self.cursor.line();
        self.cursor.bump();
        self.cursor.bump();
        loop {
            match self.cursor.peek() {
                Some('*') if self.cursor.peek_second() == Some('/') => {
                    self.cursor.bump();
                    self.cursor.bump();
                    return Ok(());
                }
                Some(_) => {
                    self.cursor.bump();
                }
                None => return Err(LexError::UnterminatedComment { line }),
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
