//! Render an AST back to Cirius source.
//!
//! The output parenthesizes every compound expression, which keeps the
//! printer independent of the precedence table: re-parsing the rendered
//! text yields a structurally identical tree.

use std::fmt::Write;

use crate::ast::*;

/// Render a whole program.
pub fn program_to_source(program: &Program) -> String {
    let mut out = String::new();
    for func in &program.functions {
        write_function(&mut out, func);
        out.push('\n');
    }
    out
}

fn write_function(out: &mut String, func: &FunctionDecl) {
    let _ = writeln!(out, "func {}({}) {{", func.name, func.params.join(", "));
    write_block(out, &func.body, 1);
    out.push_str("}\n");
}

fn write_block(out: &mut String, block: &Block, depth: usize) {
    for stmt in &block.statements {
        write_stmt(out, stmt, depth);
    }
}

fn write_stmt(out: &mut String, stmt: &Stmt, depth: usize) {
    let pad = "    ".repeat(depth);
    match stmt {
        Stmt::Assign(assign) => {
            let _ = writeln!(out, "{pad}{} = {}", assign.target, expr_to_source(&assign.expr));
        }
        Stmt::If(if_stmt) => {
            let _ = writeln!(out, "{pad}if {} {{", expr_to_source(&if_stmt.cond));
            write_block(out, &if_stmt.then_block, depth + 1);
            for (cond, block) in &if_stmt.elifs {
                let _ = writeln!(out, "{pad}}} elif {} {{", expr_to_source(cond));
                write_block(out, block, depth + 1);
            }
            if let Some(block) = &if_stmt.else_block {
                let _ = writeln!(out, "{pad}}} else {{");
                write_block(out, block, depth + 1);
            }
            let _ = writeln!(out, "{pad}}}");
        }
        Stmt::While(while_stmt) => {
            let _ = writeln!(out, "{pad}while {} {{", expr_to_source(&while_stmt.cond));
            write_block(out, &while_stmt.body, depth + 1);
            let _ = writeln!(out, "{pad}}}");
        }
        Stmt::For(for_stmt) => {
            let _ = writeln!(
                out,
                "{pad}for {} in {}..{} {{",
                for_stmt.var,
                expr_to_source(&for_stmt.start),
                expr_to_source(&for_stmt.end)
            );
            write_block(out, &for_stmt.body, depth + 1);
            let _ = writeln!(out, "{pad}}}");
        }
        Stmt::Return(ret) => {
            let _ = writeln!(out, "{pad}return {}", expr_to_source(&ret.value));
        }
        Stmt::Print(print) => {
            let _ = writeln!(out, "{pad}print({})", expr_to_source(&print.value));
        }
        Stmt::Input => {
            let _ = writeln!(out, "{pad}input()");
        }
        Stmt::Call(call) => {
            let _ = writeln!(out, "{pad}{}", call_to_source(call));
        }
    }
}

/// Render an expression.
pub fn expr_to_source(expr: &Expr) -> String {
    match expr {
        Expr::Int(value) => value.to_string(),
        Expr::Float(value) => format!("{value:?}"),
        Expr::Str(text) => format!("\"{text}\""),
        Expr::Bool(true) => "true".to_string(),
        Expr::Bool(false) => "false".to_string(),
        Expr::Var(name) => name.clone(),
        Expr::Binary(binary) => format!(
            "({} {} {})",
            expr_to_source(&binary.left),
            bin_op_source(binary.op),
            expr_to_source(&binary.right)
        ),
        Expr::Unary(unary) => match unary.op {
            UnOp::Neg => format!("(-{})", expr_to_source(&unary.operand)),
            UnOp::Not => format!("(not {})", expr_to_source(&unary.operand)),
        },
        Expr::Call(call) => call_to_source(call),
        Expr::Input => "input()".to_string(),
    }
}

fn call_to_source(call: &CallExpr) -> String {
    let args: Vec<String> = call.args.iter().map(expr_to_source).collect();
    format!("{}({})", call.name, args.join(", "))
}

fn bin_op_source(op: BinOp) -> &'static str {
    match op {
        BinOp::Or => "or",
        BinOp::And => "and",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Gt => ">",
        BinOp::Lt => "<",
        BinOp::Ge => ">=",
        BinOp::Le => "<=",
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use cirius_lex::tokenize;

    fn parse_source(source: &str) -> Program {
        parse(tokenize(source).expect("test source should lex")).expect("test source should parse")
    }

    /// Parse, render, re-parse: the trees must be structurally identical.
    fn assert_round_trip(source: &str) {
        let first = parse_source(source);
        let rendered = program_to_source(&first);
        let second = parse_source(&rendered);
        assert_eq!(first, second, "rendered source:\n{rendered}");
    }

    #[test]
    fn round_trips_arithmetic() {
        assert_round_trip("func main() { print(2 + 3 * 4) }");
        assert_round_trip("func main() { x = (1 + 2) * (3 - 4) / 5 % 6 }");
        assert_round_trip("func main() { y = -x + not b }");
    }

    #[test]
    fn round_trips_control_flow() {
        assert_round_trip(
            "func main() {
                x = input()
                if x > 0 { print(1) } elif x == 0 { print(0) } else { print(-1) }
                while x < 10 { x = x + 1 }
                for i in 1..3 { print(i) }
            }",
        );
    }

    #[test]
    fn round_trips_functions_and_calls() {
        assert_round_trip(
            "func fact(n) { if n <= 1 { return 1 } return n * fact(n - 1) }
             func main() { print(fact(5)) }",
        );
    }

    #[test]
    fn round_trips_literals() {
        assert_round_trip("func main() { a = 3.5 b = \"text\" c = true d = false input() }");
    }

    #[test]
    fn rendered_text_is_plausible_source() {
        let program = parse_source("func main() { for i in 1..3 { print(i) } }");
        let rendered = program_to_source(&program);
        assert!(rendered.contains("func main() {"));
        assert!(rendered.contains("for i in 1..3 {"));
        assert!(rendered.contains("print(i)"));
    }
}
