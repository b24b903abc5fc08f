//! Expression parsing via precedence climbing.
//!
//! # Operator precedence (loosest to tightest)
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | Or | `or` | left |
//! | And | `and` | left |
//! | Equality | `==`, `!=` | left |
//! | Comparison | `>`, `<`, `>=`, `<=` | left |
//! | Term | `+`, `-` | left |
//! | Factor | `*`, `/`, `%` | left |
//! | Unary | `not`, `-` (prefix) | right |

use cirius_lex::TokenKind;

use crate::ast::*;
use crate::{ParseError, Parser};

/// Binding power levels. Left-associative operators bind the right side
/// one step tighter, so `a - b - c` groups as `(a - b) - c`.
mod bp {
    pub const MIN: u8 = 0;
    pub const OR: u8 = 2;
    pub const AND: u8 = 4;
    pub const EQUALITY: u8 = 6;
    pub const COMPARISON: u8 = 8;
    pub const TERM: u8 = 10;
    pub const FACTOR: u8 = 12;
}

impl Parser {
    /// Main expression entry point.
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_bp(bp::MIN)
    }

    /// Parse an expression consuming only operators whose left binding
    /// power is at least `min_bp`.
    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;

        while let Some((l_bp, r_bp, op)) = self.infix_binding_power() {
            if l_bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_expr_bp(r_bp)?;
            lhs = Expr::Binary(BinaryExpr {
                left: Box::new(lhs),
                op,
                right: Box::new(rhs),
            });
        }

        Ok(lhs)
    }

    /// Binding powers and operator for the current token, if it is an
    /// infix operator.
    fn infix_binding_power(&self) -> Option<(u8, u8, BinOp)> {
        let (level, op) = match self.peek_kind()? {
            TokenKind::Or => (bp::OR, BinOp::Or),
            TokenKind::And => (bp::AND, BinOp::And),
            TokenKind::EqEq => (bp::EQUALITY, BinOp::Eq),
            TokenKind::NotEq => (bp::EQUALITY, BinOp::Ne),
            TokenKind::Gt => (bp::COMPARISON, BinOp::Gt),
            TokenKind::Lt => (bp::COMPARISON, BinOp::Lt),
            TokenKind::Ge => (bp::COMPARISON, BinOp::Ge),
            TokenKind::Le => (bp::COMPARISON, BinOp::Le),
            TokenKind::Plus => (bp::TERM, BinOp::Add),
            TokenKind::Minus => (bp::TERM, BinOp::Sub),
            TokenKind::Star => (bp::FACTOR, BinOp::Mul),
            TokenKind::Slash => (bp::FACTOR, BinOp::Div),
            TokenKind::Percent => (bp::FACTOR, BinOp::Mod),
            _ => return None,
        };
        Some((level, level + 1, op))
    }

    /// Prefix `not` / `-`, right-associative.
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek_kind() {
            Some(TokenKind::Not) => Some(UnOp::Not),
            Some(TokenKind::Minus) => Some(UnOp::Neg),
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary(UnaryExpr {
                op,
                operand: Box::new(operand),
            }));
        }

        self.parse_primary()
    }

    /// Literal, variable, call, `input()`, or parenthesized expression.
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Int(value)) => {
                let value = *value;
                self.advance();
                Ok(Expr::Int(value))
            }
            Some(TokenKind::Float(value)) => {
                let value = *value;
                self.advance();
                Ok(Expr::Float(value))
            }
            Some(TokenKind::Str(text)) => {
                let text = text.clone();
                self.advance();
                Ok(Expr::Str(text))
            }
            Some(TokenKind::True) => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            Some(TokenKind::False) => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            Some(TokenKind::Ident(_)) => {
                let name = self.expect_ident()?;
                if self.check(&TokenKind::LParen) {
                    let args = self.parse_call_args()?;
                    Ok(Expr::Call(CallExpr { name, args }))
                } else {
                    Ok(Expr::Var(name))
                }
            }
            Some(TokenKind::Input) => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::Input)
            }
            Some(TokenKind::LParen) => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            _ => Err(self.expected("an expression")),
        }
    }
}
