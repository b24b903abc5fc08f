//! Statement parsing - assignment, calls, control flow, I/O.

use cirius_lex::TokenKind;

use crate::ast::*;
use crate::{ParseError, Parser};

impl Parser {
    /// Statements until a closing `}` or end of stream. Stray semicolons
    /// are skipped silently.
    pub(crate) fn parse_block(&mut self) -> Result<Block, ParseError> {
        let mut statements = Vec::new();
        while !self.is_at_end() && !self.check(&TokenKind::RBrace) {
            if self.match_token(&TokenKind::Semicolon) {
                continue;
            }
            statements.push(self.parse_stmt()?);
        }
        Ok(Block { statements })
    }

    /// Dispatch on the first token of a statement.
    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::If) => self.parse_if_stmt(),
            Some(TokenKind::While) => self.parse_while_stmt(),
            Some(TokenKind::For) => self.parse_for_stmt(),
            Some(TokenKind::Return) => self.parse_return_stmt(),
            Some(TokenKind::Print) => self.parse_print_stmt(),
            Some(TokenKind::Input) => self.parse_input_stmt(),
            Some(TokenKind::Ident(_)) => self.parse_assign_or_call(),
            _ => Err(self.expected("a statement")),
        }
    }

    /// An identifier starts either an assignment or a bare call.
    fn parse_assign_or_call(&mut self) -> Result<Stmt, ParseError> {
        let name = self.expect_ident()?;

        if self.match_token(&TokenKind::Assign) {
            let expr = self.parse_expr()?;
            return Ok(Stmt::Assign(Assignment { target: name, expr }));
        }

        if self.check(&TokenKind::LParen) {
            let args = self.parse_call_args()?;
            return Ok(Stmt::Call(CallExpr { name, args }));
        }

        Err(self.expected("'=' or '(' after identifier"))
    }

    /// `if cond { } (elif cond { })* (else { })?`
    fn parse_if_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::If)?;
        let cond = self.parse_condition()?;

        self.expect(TokenKind::LBrace)?;
        let then_block = self.parse_block()?;
        self.expect(TokenKind::RBrace)?;

        let mut elifs = Vec::new();
        while self.match_token(&TokenKind::Elif) {
            let cond = self.parse_condition()?;
            self.expect(TokenKind::LBrace)?;
            let block = self.parse_block()?;
            self.expect(TokenKind::RBrace)?;
            elifs.push((cond, block));
        }

        let else_block = if self.match_token(&TokenKind::Else) {
            self.expect(TokenKind::LBrace)?;
            let block = self.parse_block()?;
            self.expect(TokenKind::RBrace)?;
            Some(block)
        } else {
            None
        };

        Ok(Stmt::If(IfStmt {
            cond,
            then_block,
            elifs,
            else_block,
        }))
    }

    /// `while cond { body }`
    fn parse_while_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::While)?;
        let cond = self.parse_condition()?;

        self.expect(TokenKind::LBrace)?;
        let body = self.parse_block()?;
        self.expect(TokenKind::RBrace)?;

        Ok(Stmt::While(WhileStmt { cond, body }))
    }

    /// Conditions may be parenthesized, but the parentheses are optional.
    fn parse_condition(&mut self) -> Result<Expr, ParseError> {
        if self.match_token(&TokenKind::LParen) {
            let cond = self.parse_expr()?;
            self.expect(TokenKind::RParen)?;
            Ok(cond)
        } else {
            self.parse_expr()
        }
    }

    /// `for IDENT in start..end { body }`
    fn parse_for_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::For)?;
        let var = self.expect_ident()?;
        self.expect(TokenKind::In)?;

        let start = self.parse_expr()?;
        self.expect(TokenKind::DotDot)?;
        let end = self.parse_expr()?;

        self.expect(TokenKind::LBrace)?;
        let body = self.parse_block()?;
        self.expect(TokenKind::RBrace)?;

        Ok(Stmt::For(ForStmt {
            var,
            start,
            end,
            body,
        }))
    }

    /// `return expr`
    fn parse_return_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::Return)?;
        let value = self.parse_expr()?;
        Ok(Stmt::Return(ReturnStmt { value }))
    }

    /// `print(expr)`
    fn parse_print_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::Print)?;
        self.expect(TokenKind::LParen)?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        Ok(Stmt::Print(PrintStmt { value }))
    }

    /// `input()` in statement position; the read value is discarded.
    fn parse_input_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::Input)?;
        self.expect(TokenKind::LParen)?;
        self.expect(TokenKind::RParen)?;
        Ok(Stmt::Input)
    }

    /// `( args? )` after a callee name.
    pub(crate) fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            args.push(self.parse_expr()?);
            while self.match_token(&TokenKind::Comma) {
                args.push(self.parse_expr()?);
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use cirius_lex::tokenize;

    /// Parse a single function body from a statement snippet.
    fn parse_stmts(body: &str) -> Vec<Stmt> {
        let source = format!("func main() {{ {body} }}");
        let program = parse(tokenize(&source).expect("test source should lex"))
            .expect("test source should parse");
        program.functions.into_iter().next().unwrap().body.statements
    }

    #[test]
    fn parses_assignment() {
        let stmts = parse_stmts("x = 1 + 2");
        assert_eq!(stmts.len(), 1);
        assert!(matches!(
            &stmts[0],
            Stmt::Assign(Assignment { target, .. }) if target == "x"
        ));
    }

    #[test]
    fn parses_bare_call_statement() {
        let stmts = parse_stmts("greet(1, 2)");
        match &stmts[0] {
            Stmt::Call(call) => {
                assert_eq!(call.name, "greet");
                assert_eq!(call.args.len(), 2);
            }
            other => panic!("expected call statement, got {other:?}"),
        }
    }

    #[test]
    fn ident_without_assign_or_paren_is_an_error() {
        let source = "func main() { x + 1 }";
        let err = parse(tokenize(source).unwrap()).unwrap_err();
        assert!(err.to_string().contains("'=' or '('"), "got: {err}");
    }

    #[test]
    fn parses_if_elif_else_chain() {
        let stmts = parse_stmts(
            "if x > 0 { print(1) } elif x == 0 { print(0) } else { print(2) }",
        );
        match &stmts[0] {
            Stmt::If(if_stmt) => {
                assert_eq!(if_stmt.elifs.len(), 1);
                assert!(if_stmt.else_block.is_some());
            }
            other => panic!("expected if statement, got {other:?}"),
        }
    }

    #[test]
    fn condition_parens_are_optional() {
        let bare = parse_stmts("if x > 0 { print(1) }");
        let wrapped = parse_stmts("if (x > 0) { print(1) }");
        assert_eq!(bare, wrapped);

        let bare = parse_stmts("while x < 3 { x = x + 1 }");
        let wrapped = parse_stmts("while (x < 3) { x = x + 1 }");
        assert_eq!(bare, wrapped);
    }

    #[test]
    fn parses_while_loop() {
        let stmts = parse_stmts("while i < 3 { i = i + 1 }");
        assert!(matches!(&stmts[0], Stmt::While(w) if w.body.statements.len() == 1));
    }

    #[test]
    fn parses_for_range() {
        let stmts = parse_stmts("for i in 1..3 { print(i) }");
        match &stmts[0] {
            Stmt::For(for_stmt) => {
                assert_eq!(for_stmt.var, "i");
                assert_eq!(for_stmt.start, Expr::Int(1));
                assert_eq!(for_stmt.end, Expr::Int(3));
            }
            other => panic!("expected for statement, got {other:?}"),
        }
    }

    #[test]
    fn parses_return_print_input() {
        let stmts = parse_stmts("return 1 print(2) input()");
        assert!(matches!(&stmts[0], Stmt::Return(_)));
        assert!(matches!(&stmts[1], Stmt::Print(_)));
        assert!(matches!(&stmts[2], Stmt::Input));
    }

    #[test]
    fn stray_semicolons_are_skipped() {
        let stmts = parse_stmts("; x = 1 ;; print(x) ;");
        assert_eq!(stmts.len(), 2);
    }

    #[test]
    fn nested_blocks_parse() {
        let stmts = parse_stmts("if a { if b { print(1) } } ");
        match &stmts[0] {
            Stmt::If(outer) => assert!(matches!(&outer.then_block.statements[0], Stmt::If(_))),
            other => panic!("expected if statement, got {other:?}"),
        }
    }
}
