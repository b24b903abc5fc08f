//! The tree-walking evaluator.

use std::io::{self, BufRead, BufReader, Write};
use std::rc::Rc;

use cirius_par::ast::*;

use crate::env::{Environment, FrameId};
use crate::value::{Builtin, Value};
use crate::RuntimeError;

/// Result of executing a statement: either fall through or carry a
/// `return` up to the nearest call frame.
enum Flow {
    Normal,
    Return(Option<Value>),
}

/// The interpreter.
///
/// Reads from and writes to injected handles; `from_stdio` wires the
/// process streams for the CLI.
pub struct Interpreter<'a> {
    env: Environment,
    reader: Box<dyn BufRead + 'a>,
    writer: Box<dyn Write + 'a>,
}

impl<'a> Interpreter<'a> {
    pub fn new(reader: Box<dyn BufRead + 'a>, writer: Box<dyn Write + 'a>) -> Self {
        Self {
            env: Environment::new(),
            reader,
            writer,
        }
    }

    pub fn from_stdio() -> Interpreter<'static> {
        Interpreter::new(
            Box::new(BufReader::new(io::stdin())),
            Box::new(io::stdout()),
        )
    }

    /// Bind builtins and every declared function in globals, then invoke
    /// `main` with no arguments.
    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        for builtin in Builtin::ALL {
            self.env
                .define(Environment::GLOBALS, builtin.name(), Value::Builtin(builtin));
        }
        for func in &program.functions {
            self.env.define(
                Environment::GLOBALS,
                &func.name,
                Value::Function(Rc::new(func.clone())),
            );
        }

        let main = match self.env.get(Environment::GLOBALS, "main") {
            Some(Value::Function(func)) => Rc::clone(func),
            _ => return Err(RuntimeError::MissingMain),
        };
        self.call_function(&main, Vec::new())?;
        Ok(())
    }

    /// Invoke a user function: fresh frame parented to globals, not to
    /// the caller.
    fn call_function(
        &mut self,
        func: &Rc<FunctionDecl>,
        args: Vec<Value>,
    ) -> Result<Option<Value>, RuntimeError> {
        if args.len() != func.params.len() {
            return Err(RuntimeError::ArityMismatch {
                name: func.name.clone(),
                expected: func.params.len(),
                found: args.len(),
            });
        }

        let mark = self.env.mark();
        let frame = self.env.push_frame(Environment::GLOBALS);
        for (param, arg) in func.params.iter().zip(args) {
            self.env.define(frame, param, arg);
        }

        let flow = self.exec_block(&func.body, frame)?;
        self.env.release(mark);

        Ok(match flow {
            Flow::Return(value) => value,
            Flow::Normal => None,
        })
    }

    /// Blocks always open a fresh frame.
    fn exec_block(&mut self, block: &Block, parent: FrameId) -> Result<Flow, RuntimeError> {
        let mark = self.env.mark();
        let frame = self.env.push_frame(parent);
        for stmt in &block.statements {
            match self.exec_stmt(stmt, frame)? {
                Flow::Normal => {}
                flow => {
                    self.env.release(mark);
                    return Ok(flow);
                }
            }
        }
        self.env.release(mark);
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt, frame: FrameId) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Assign(assign) => {
                let value = self.eval_expr(&assign.expr, frame)?;
                self.env.assign(frame, &assign.target, value);
                Ok(Flow::Normal)
            }
            Stmt::Print(print) => {
                let value = self.eval_expr(&print.value, frame)?;
                writeln!(self.writer, "{value}")?;
                Ok(Flow::Normal)
            }
            Stmt::Input => {
                self.read_int()?;
                Ok(Flow::Normal)
            }
            Stmt::Return(ret) => {
                let value = self.eval_expr(&ret.value, frame)?;
                Ok(Flow::Return(Some(value)))
            }
            Stmt::Call(call) => {
                self.eval_call(call, frame)?;
                Ok(Flow::Normal)
            }
            Stmt::If(if_stmt) => {
                if self.eval_expr(&if_stmt.cond, frame)?.is_truthy() {
                    return self.exec_block(&if_stmt.then_block, frame);
                }
                for (cond, block) in &if_stmt.elifs {
                    if self.eval_expr(cond, frame)?.is_truthy() {
                        return self.exec_block(block, frame);
                    }
                }
                if let Some(block) = &if_stmt.else_block {
                    return self.exec_block(block, frame);
                }
                Ok(Flow::Normal)
            }
            Stmt::While(while_stmt) => {
                while self.eval_expr(&while_stmt.cond, frame)?.is_truthy() {
                    match self.exec_block(&while_stmt.body, frame)? {
                        Flow::Normal => {}
                        flow => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::For(for_stmt) => self.exec_for(for_stmt, frame),
        }
    }

    /// `for var in a..b`: bounds evaluate once, the range is inclusive,
    /// and the loop variable lives in its own frame around the body.
    fn exec_for(&mut self, for_stmt: &ForStmt, frame: FrameId) -> Result<Flow, RuntimeError> {
        let start = match self.eval_expr(&for_stmt.start, frame)? {
            Value::Int(value) => value,
            _ => return Err(RuntimeError::NonIntegerBounds),
        };
        let end = match self.eval_expr(&for_stmt.end, frame)? {
            Value::Int(value) => value,
            _ => return Err(RuntimeError::NonIntegerBounds),
        };

        let mark = self.env.mark();
        let loop_frame = self.env.push_frame(frame);
        for i in start..=end {
            self.env.define(loop_frame, &for_stmt.var, Value::Int(i));
            match self.exec_block(&for_stmt.body, loop_frame)? {
                Flow::Normal => {}
                flow => {
                    self.env.release(mark);
                    return Ok(flow);
                }
            }
        }
        self.env.release(mark);
        Ok(Flow::Normal)
    }

    fn eval_expr(&mut self, expr: &Expr, frame: FrameId) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Int(value) => Ok(Value::Int(*value)),
            Expr::Float(value) => Ok(Value::Float(*value)),
            Expr::Bool(value) => Ok(Value::Bool(*value)),
            Expr::Str(text) => Ok(Value::Str(text.clone())),
            Expr::Var(name) => match self.env.get(frame, name) {
                Some(value) => Ok(value.clone()),
                None => Err(RuntimeError::UndefinedName(name.clone())),
            },
            Expr::Input => self.read_int(),
            Expr::Unary(unary) => {
                let operand = self.eval_expr(&unary.operand, frame)?;
                apply_unary(unary.op, operand)
            }
            Expr::Binary(binary) => {
                // Both sides evaluate; nothing short-circuits.
                let lhs = self.eval_expr(&binary.left, frame)?;
                let rhs = self.eval_expr(&binary.right, frame)?;
                apply_binary(binary.op, lhs, rhs)
            }
            Expr::Call(call) => match self.eval_call(call, frame)? {
                Some(value) => Ok(value),
                None => Err(RuntimeError::NoValue(call.name.clone())),
            },
        }
    }

    /// Calls resolve through the scope chain at run time, so a local
    /// binding can shadow a global function. Arguments evaluate in the
    /// caller's frame.
    fn eval_call(
        &mut self,
        call: &CallExpr,
        frame: FrameId,
    ) -> Result<Option<Value>, RuntimeError> {
        let callee = match self.env.get(frame, &call.name) {
            Some(value) => value.clone(),
            None => return Err(RuntimeError::UndefinedName(call.name.clone())),
        };

        match callee {
            Value::Builtin(builtin) => {
                if call.args.len() != builtin.arity() {
                    return Err(RuntimeError::ArityMismatch {
                        name: builtin.name().to_string(),
                        expected: builtin.arity(),
                        found: call.args.len(),
                    });
                }
                let mut args = Vec::with_capacity(call.args.len());
                for arg in &call.args {
                    args.push(self.eval_expr(arg, frame)?);
                }
                self.call_builtin(builtin, args).map(Some)
            }
            Value::Function(func) => {
                // Arity is checked before any argument evaluates.
                if call.args.len() != func.params.len() {
                    return Err(RuntimeError::ArityMismatch {
                        name: func.name.clone(),
                        expected: func.params.len(),
                        found: call.args.len(),
                    });
                }
                let mut args = Vec::with_capacity(call.args.len());
                for arg in &call.args {
                    args.push(self.eval_expr(arg, frame)?);
                }
                self.call_function(&func, args)
            }
            _ => Err(RuntimeError::NotCallable(call.name.clone())),
        }
    }

    fn call_builtin(
        &mut self,
        builtin: Builtin,
        mut args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        match builtin {
            Builtin::Input => {
                let line = self.read_line()?;
                Ok(Value::Str(line))
            }
            Builtin::Str => Ok(Value::Str(args.remove(0).to_string())),
            Builtin::Bool => Ok(Value::Bool(args.remove(0).is_truthy())),
            Builtin::Int => match args.remove(0) {
                Value::Int(value) => Ok(Value::Int(value)),
                Value::Float(value) => Ok(Value::Int(value as i64)),
                Value::Bool(value) => Ok(Value::Int(value as i64)),
                Value::Str(text) => {
                    text.trim()
                        .parse::<i64>()
                        .map(Value::Int)
                        .map_err(|_| RuntimeError::InvalidArgument {
                            name: "int",
                            message: format!("cannot convert '{text}' to an integer"),
                        })
                }
                other => Err(RuntimeError::InvalidArgument {
                    name: "int",
                    message: format!("cannot convert a {}", other.type_name()),
                }),
            },
            Builtin::Float => match args.remove(0) {
                Value::Int(value) => Ok(Value::Float(value as f64)),
                Value::Float(value) => Ok(Value::Float(value)),
                Value::Bool(value) => Ok(Value::Float(if value { 1.0 } else { 0.0 })),
                Value::Str(text) => {
                    text.trim()
                        .parse::<f64>()
                        .map(Value::Float)
                        .map_err(|_| RuntimeError::InvalidArgument {
                            name: "float",
                            message: format!("cannot convert '{text}' to a float"),
                        })
                }
                other => Err(RuntimeError::InvalidArgument {
                    name: "float",
                    message: format!("cannot convert a {}", other.type_name()),
                }),
            },
        }
    }

    /// `input()` in program position: one line, parsed as an integer.
    fn read_int(&mut self) -> Result<Value, RuntimeError> {
        let line = self.read_line()?;
        line.trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| RuntimeError::InvalidInput(line.trim().to_string()))
    }

    /// One raw line with the trailing newline stripped.
    fn read_line(&mut self) -> Result<String, RuntimeError> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line)?;
        if read == 0 {
            return Err(RuntimeError::InputExhausted);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }
}

fn apply_unary(op: UnOp, operand: Value) -> Result<Value, RuntimeError> {
    match op {
        UnOp::Not => Ok(Value::Bool(!operand.is_truthy())),
        UnOp::Neg => match operand {
            Value::Int(value) => value
                .checked_neg()
                .map(Value::Int)
                .ok_or(RuntimeError::IntegerOverflow),
            Value::Float(value) => Ok(Value::Float(-value)),
            other => Err(RuntimeError::UnsupportedUnary {
                op: "-",
                operand: other.type_name(),
            }),
        },
    }
}

fn apply_binary(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    match op {
        // Logic selects an operand by truthiness, with both sides already
        // evaluated.
        BinOp::And => Ok(if lhs.is_truthy() { rhs } else { lhs }),
        BinOp::Or => Ok(if lhs.is_truthy() { lhs } else { rhs }),

        BinOp::Eq => Ok(Value::Bool(values_equal(&lhs, &rhs))),
        BinOp::Ne => Ok(Value::Bool(!values_equal(&lhs, &rhs))),

        BinOp::Gt | BinOp::Lt | BinOp::Ge | BinOp::Le => compare(op, lhs, rhs),

        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
            arithmetic(op, lhs, rhs)
        }
    }
}

fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
        _ => lhs == rhs,
    }
}

fn compare(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    let ordering = match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
        (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
        (Value::Int(_), Value::Float(_))
        | (Value::Float(_), Value::Int(_))
        | (Value::Float(_), Value::Float(_)) => as_f64(&lhs).partial_cmp(&as_f64(&rhs)),
        _ => None,
    };

    let Some(ordering) = ordering else {
        return Err(RuntimeError::UnsupportedBinary {
            op: op_symbol(op),
            lhs: lhs.type_name(),
            rhs: rhs.type_name(),
        });
    };

    let result = match op {
        BinOp::Gt => ordering.is_gt(),
        BinOp::Lt => ordering.is_lt(),
        BinOp::Ge => ordering.is_ge(),
        BinOp::Le => ordering.is_le(),
        _ => unreachable!("compare only handles ordering operators"),
    };
    Ok(Value::Bool(result))
}

/// Numeric arithmetic with int-to-float promotion on mixed operands, plus
/// string concatenation for `+`. Integer division truncates and a zero
/// divisor is an error, matching the emitted C on the integer subset.
fn arithmetic(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => {
            let (a, b) = (*a, *b);
            let result = match op {
                BinOp::Add => a.checked_add(b),
                BinOp::Sub => a.checked_sub(b),
                BinOp::Mul => a.checked_mul(b),
                BinOp::Div => {
                    if b == 0 {
                        return Err(RuntimeError::DivisionByZero);
                    }
                    a.checked_div(b)
                }
                BinOp::Mod => {
                    if b == 0 {
                        return Err(RuntimeError::DivisionByZero);
                    }
                    a.checked_rem(b)
                }
                _ => unreachable!("arithmetic only handles numeric operators"),
            };
            result.map(Value::Int).ok_or(RuntimeError::IntegerOverflow)
        }
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            let (a, b) = (as_f64(&lhs), as_f64(&rhs));
            let result = match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div => a / b,
                BinOp::Mod => a % b,
                _ => unreachable!("arithmetic only handles numeric operators"),
            };
            Ok(Value::Float(result))
        }
        (Value::Str(a), Value::Str(b)) if op == BinOp::Add => {
            Ok(Value::Str(format!("{a}{b}")))
        }
        _ => Err(RuntimeError::UnsupportedBinary {
            op: op_symbol(op),
            lhs: lhs.type_name(),
            rhs: rhs.type_name(),
        }),
    }
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Int(v) => *v as f64,
        Value::Float(v) => *v,
        _ => unreachable!("as_f64 is only called on numbers"),
    }
}

fn op_symbol(op: BinOp) -> &'static str {
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
    use cirius_lex::tokenize;
    use cirius_par::parse;
    use std::io::Cursor;

    /// Run a program against the given stdin, returning its stdout.
    fn run_with_input(source: &str, input: &str) -> Result<String, RuntimeError> {
        let program = parse(tokenize(source).expect("test source should lex"))
            .expect("test source should parse");
        let mut output = Vec::new();
        {
            let reader = Cursor::new(input.as_bytes().to_vec());
            let mut interpreter =
                Interpreter::new(Box::new(reader), Box::new(&mut output));
            interpreter.run(&program)?;
        }
        Ok(String::from_utf8(output).expect("program output should be utf-8"))
    }

    fn run(source: &str) -> Result<String, RuntimeError> {
        run_with_input(source, "")
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(run("func main(){ print(2+3*4); }").unwrap(), "14\n");
    }

    #[test]
    fn inclusive_for_range() {
        assert_eq!(
            run("func main(){ for i in 1..3 { print(i); } }").unwrap(),
            "1\n2\n3\n"
        );
    }

    #[test]
    fn empty_for_range_runs_zero_times() {
        assert_eq!(run("func main(){ for i in 3..1 { print(i); } }").unwrap(), "");
    }

    #[test]
    fn branch_on_input_sign() {
        let source =
            "func main(){ x=input(); if x>0 { print(1); } elif x==0 { print(0); } else { print(-1); } }";
        assert_eq!(run_with_input(source, "5\n").unwrap(), "1\n");
        assert_eq!(run_with_input(source, "0\n").unwrap(), "0\n");
        assert_eq!(run_with_input(source, "-7\n").unwrap(), "-1\n");
    }

    #[test]
    fn recursive_factorial() {
        let source =
            "func fact(n){ if n<=1 { return 1; } return n*fact(n-1); } func main(){ print(fact(5)); }";
        assert_eq!(run(source).unwrap(), "120\n");
    }

    #[test]
    fn while_loop_counts() {
        let source = "func main(){ i=0; while i<3 { print(i); i=i+1; } }";
        assert_eq!(run(source).unwrap(), "0\n1\n2\n");
    }

    #[test]
    fn return_value_crosses_call_boundary() {
        let source = "func five(){ return 5 } func main(){ x = five() + 1 print(x) }";
        assert_eq!(run(source).unwrap(), "6\n");
    }

    #[test]
    fn return_exits_nested_control_flow() {
        let source = "func f(){ for i in 1..10 { if i == 3 { return i } } return 0 }
                      func main(){ print(f()) }";
        assert_eq!(run(source).unwrap(), "3\n");
    }

    #[test]
    fn function_without_return_yields_no_value() {
        let source = "func noop(){ print(0) } func main(){ x = noop() }";
        let err = run(source).unwrap_err();
        assert!(matches!(err, RuntimeError::NoValue(name) if name == "noop"));
    }

    #[test]
    fn statement_call_discards_missing_value() {
        let source = "func noop(){ print(7) } func main(){ noop() }";
        assert_eq!(run(source).unwrap(), "7\n");
    }

    #[test]
    fn forward_reference_works() {
        let source = "func main(){ later() } func later(){ print(9) }";
        assert_eq!(run(source).unwrap(), "9\n");
    }

    #[test]
    fn missing_main_is_an_error() {
        let err = run("func helper(){ print(1) }").unwrap_err();
        assert!(matches!(err, RuntimeError::MissingMain));
    }

    #[test]
    fn call_frames_are_parented_to_globals() {
        // `hidden` lives in main's frame; callee must not see it.
        let source = "func peek(){ print(hidden) } func main(){ hidden = 1 peek() }";
        let err = run(source).unwrap_err();
        assert!(matches!(err, RuntimeError::UndefinedName(name) if name == "hidden"));
    }

    #[test]
    fn block_scoped_new_name_does_not_leak() {
        // Runtime counterpart of the analyzer rule: the store inside the
        // if-block creates a fresh binding in the block frame.
        let source = "func main(){ x = 0 if true { x = 1 y = 2 } print(x) }";
        assert_eq!(run(source).unwrap(), "1\n");
    }

    #[test]
    fn loop_counter_updates_enclosing_binding() {
        let source = "func main(){ total = 0 for i in 1..4 { total = total + i } print(total) }";
        assert_eq!(run(source).unwrap(), "10\n");
    }

    #[test]
    fn strings_concatenate_and_print_raw() {
        let source = "func main(){ s = \"ab\" + \"cd\" print(s) }";
        assert_eq!(run(source).unwrap(), "abcd\n");
    }

    #[test]
    fn floats_print_with_decimal_point() {
        assert_eq!(run("func main(){ print(1.5 + 1.5) }").unwrap(), "3.0\n");
        assert_eq!(run("func main(){ print(2.5 * 2) }").unwrap(), "5.0\n");
    }

    #[test]
    fn integer_division_truncates() {
        assert_eq!(run("func main(){ print(7 / 2) }").unwrap(), "3\n");
        assert_eq!(run("func main(){ print(7 % 2) }").unwrap(), "1\n");
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert!(matches!(
            run("func main(){ print(1 / 0) }").unwrap_err(),
            RuntimeError::DivisionByZero
        ));
        assert!(matches!(
            run("func main(){ print(1 % 0) }").unwrap_err(),
            RuntimeError::DivisionByZero
        ));
    }

    #[test]
    fn logic_selects_operands() {
        assert_eq!(run("func main(){ print(1 and 5) }").unwrap(), "5\n");
        assert_eq!(run("func main(){ print(0 and 5) }").unwrap(), "0\n");
        assert_eq!(run("func main(){ print(0 or 7) }").unwrap(), "7\n");
        assert_eq!(run("func main(){ print(3 or 7) }").unwrap(), "3\n");
    }

    #[test]
    fn not_produces_booleans() {
        assert_eq!(run("func main(){ print(not 0) }").unwrap(), "true\n");
        assert_eq!(run("func main(){ print(not 3) }").unwrap(), "false\n");
    }

    #[test]
    fn comparisons_promote_numeric_types() {
        assert_eq!(run("func main(){ print(1 == 1.0) }").unwrap(), "true\n");
        assert_eq!(run("func main(){ print(2 > 1.5) }").unwrap(), "true\n");
        assert_eq!(run("func main(){ print(1 == \"1\") }").unwrap(), "false\n");
    }

    #[test]
    fn mixed_arithmetic_promotes_to_float() {
        assert_eq!(run("func main(){ print(1 + 0.5) }").unwrap(), "1.5\n");
    }

    #[test]
    fn type_mismatch_is_reported() {
        let err = run("func main(){ print(1 + \"a\") }").unwrap_err();
        match err {
            RuntimeError::UnsupportedBinary { op, lhs, rhs } => {
                assert_eq!(op, "+");
                assert_eq!(lhs, "int");
                assert_eq!(rhs, "string");
            }
            other => panic!("expected unsupported-operand error, got {other:?}"),
        }
    }

    #[test]
    fn non_integer_input_is_an_error() {
        let err = run_with_input("func main(){ x = input() }", "abc\n").unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidInput(text) if text == "abc"));
    }

    #[test]
    fn exhausted_input_is_an_error() {
        let err = run("func main(){ x = input() }").unwrap_err();
        assert!(matches!(err, RuntimeError::InputExhausted));
    }

    #[test]
    fn input_statement_consumes_a_line() {
        let source = "func main(){ input() x = input() print(x) }";
        assert_eq!(run_with_input(source, "1\n2\n").unwrap(), "2\n");
    }

    #[test]
    fn builtin_conversions() {
        assert_eq!(
            run("func main(){ print(int(\" 42 \")) }").unwrap(),
            "42\n"
        );
        assert_eq!(run("func main(){ print(int(2.9)) }").unwrap(), "2\n");
        assert_eq!(run("func main(){ print(float(2)) }").unwrap(), "2.0\n");
        assert_eq!(run("func main(){ print(bool(0)) }").unwrap(), "false\n");
        assert_eq!(run("func main(){ print(str(12) + \"!\") }").unwrap(), "12!\n");
    }

    #[test]
    fn builtin_rejects_bad_conversion() {
        let err = run("func main(){ print(int(\"xyz\")) }").unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidArgument { name: "int", .. }));
    }

    #[test]
    fn local_binding_shadows_function_at_call_time() {
        let source = "func f(){ return 1 } func main(){ f = 2 x = f() }";
        let err = run(source).unwrap_err();
        assert!(matches!(err, RuntimeError::NotCallable(name) if name == "f"));
    }

    #[test]
    fn arity_is_checked_at_call_time() {
        let source = "func f(a){ return a } func main(){ x = f() }";
        let err = run(source).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::ArityMismatch { expected: 1, found: 0, .. }
        ));
    }

    #[test]
    fn for_bounds_must_be_integers() {
        let err = run("func main(){ for i in 1..2.5 { print(i) } }").unwrap_err();
        assert!(matches!(err, RuntimeError::NonIntegerBounds));
    }

    #[test]
    fn mutual_recursion() {
        let source = "func even(n){ if n == 0 { return 1 } return odd(n - 1) }
                      func odd(n){ if n == 0 { return 0 } return even(n - 1) }
                      func main(){ print(even(10)) }";
        assert_eq!(run(source).unwrap(), "1\n");
    }

    #[test]
    fn deep_recursion_releases_frames() {
        let source = "func down(n){ if n == 0 { return 0 } return down(n - 1) }
                      func main(){ print(down(200)) }";
        assert_eq!(run(source).unwrap(), "0\n");
    }
}
