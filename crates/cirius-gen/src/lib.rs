//! cirius-gen - C source emitter.
//!
//! Walks the flat instruction list and prints one C statement per
//! instruction, indenting inside functions. The emitter is integer-biased
//! by contract: every local is an `int`, declared on its first definition
//! within a function. Instructions it cannot express in that model
//! (calls, returns, non-integer operands) fall back to an `// [ERROR]`
//! comment instead of producing broken C.

use cirius_ir::{Instr, Op, Operand};
use cirius_util::FxHashSet;

/// Emit C source for an instruction list.
pub fn emit(instrs: &[Instr]) -> String {
    let mut emitter = CEmitter::new();
    emitter.generate(instrs);
    emitter.output
}

struct CEmitter {
    output: String,
    indent: usize,
    /// Names already declared in the current function.
    declared: FxHashSet<String>,
}

impl CEmitter {
    fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
            declared: FxHashSet::default(),
        }
    }

    fn generate(&mut self, instrs: &[Instr]) {
        self.emit_line("#include <stdio.h>");
        self.emit_line("");
        for instr in instrs {
            self.gen_instr(instr);
        }
    }

    fn emit_line(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(line);
        self.output.push('\n');
    }

    fn gen_instr(&mut self, instr: &Instr) {
        match instr.op {
            Op::FuncBegin => {
                let name = instr.dest_name().unwrap_or("?");
                self.emit_line(&format!("void {name}() {{"));
                self.indent += 1;
                self.declared.clear();
            }
            Op::FuncEnd => {
                self.indent = self.indent.saturating_sub(1);
                self.emit_line("}");
                self.emit_line("");
            }
            Op::Assign => match (instr.dest_name(), value_of(&instr.arg1)) {
                (Some(dest), Some(value)) => {
                    let line = self.store(dest, &value);
                    self.emit_line(&line);
                }
                _ => self.unsupported(instr),
            },
            Op::Print => match value_of(&instr.arg1) {
                Some(value) => self.emit_line(&format!("printf(\"%d\\n\", {value});")),
                None => self.unsupported(instr),
            },
            Op::Input => match instr.dest_name() {
                Some(dest) => {
                    if self.declared.insert(dest.to_string()) {
                        self.emit_line(&format!("int {dest};"));
                    }
                    self.emit_line(&format!("scanf(\"%d\", &{dest});"));
                }
                None => self.unsupported(instr),
            },
            Op::Label => {
                let name = instr.dest_name().unwrap_or("?");
                self.emit_line(&format!("{name}: ;"));
            }
            Op::Goto => {
                let name = instr.dest_name().unwrap_or("?");
                self.emit_line(&format!("goto {name};"));
            }
            Op::IfFalseGoto => {
                match (value_of(&instr.arg1), instr.arg2.as_ref().and_then(Operand::as_name)) {
                    (Some(cond), Some(label)) => {
                        self.emit_line(&format!("if (!{cond}) goto {label};"));
                    }
                    _ => self.unsupported(instr),
                }
            }
            Op::Not => match (instr.dest_name(), value_of(&instr.arg1)) {
                (Some(dest), Some(operand)) => {
                    let line = self.store(dest, &format!("!{operand}"));
                    self.emit_line(&line);
                }
                _ => self.unsupported(instr),
            },
            Op::Neg => match (instr.dest_name(), value_of(&instr.arg1)) {
                (Some(dest), Some(operand)) => {
                    let line = self.store(dest, &format!("-{operand}"));
                    self.emit_line(&line);
                }
                _ => self.unsupported(instr),
            },
            other => match binary_symbol(other) {
                Some(symbol) => {
                    match (instr.dest_name(), value_of(&instr.arg1), value_of(&instr.arg2)) {
                        (Some(dest), Some(lhs), Some(rhs)) => {
                            let line = self.store(dest, &format!("{lhs} {symbol} {rhs}"));
                            self.emit_line(&line);
                        }
                        _ => self.unsupported(instr),
                    }
                }
                None => self.unsupported(instr),
            },
        }
    }

    /// `int dest = value;` on the first store in a function, a plain
    /// assignment afterwards.
    fn store(&mut self, dest: &str, value: &str) -> String {
        if self.declared.insert(dest.to_string()) {
            format!("int {dest} = {value};")
        } else {
            format!("{dest} = {value};")
        }
    }

    fn unsupported(&mut self, instr: &Instr) {
        self.emit_line(&format!("// [ERROR] op not supported: {instr}"));
    }
}

/// Render an operand in C, when it fits the integer surface.
fn value_of(operand: &Option<Operand>) -> Option<String> {
    match operand.as_ref()? {
        Operand::Name(name) => Some(name.clone()),
        Operand::Int(value) => Some(value.to_string()),
        Operand::Float(_) | Operand::Bool(_) | Operand::Str(_) => None,
    }
}

fn binary_symbol(op: Op) -> Option<&'static str> {
    let symbol = match op {
        Op::Add => "+",
        Op::Sub => "-",
        Op::Mul => "*",
        Op::Div => "/",
        Op::Mod => "%",
        Op::Lt => "<",
        Op::Le | Op::LtEq => "<=",
        Op::Gt => ">",
        Op::Ge => ">=",
        Op::Eq => "==",
        Op::Ne => "!=",
        Op::And => "&&",
        Op::Or => "||",
        _ => return None,
    };
    Some(symbol)
}
