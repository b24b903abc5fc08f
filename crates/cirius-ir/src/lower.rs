//! AST to three-address code lowering.

use cirius_par::ast::*;

use crate::instr::{Instr, Op, Operand};

/// Lower a whole program to a flat instruction list.
pub fn lower(program: &Program) -> Vec<Instr> {
    let mut builder = IrBuilder::new();
    builder.gen_program(program);
    builder.instrs
}

/// Allocates temporaries `t1, t2, …` and prefixed labels from a shared
/// monotone counter, and appends instructions in evaluation order.
struct IrBuilder {
    instrs: Vec<Instr>,
    temp_counter: u32,
    label_counter: u32,
}

impl IrBuilder {
    fn new() -> Self {
        Self {
            instrs: Vec::new(),
            temp_counter: 0,
            label_counter: 0,
        }
    }

    fn new_temp(&mut self) -> String {
        self.temp_counter += 1;
        format!("t{}", self.temp_counter)
    }

    fn new_label(&mut self, prefix: &str) -> String {
        self.label_counter += 1;
        format!("{}{}", prefix, self.label_counter)
    }

    fn gen_program(&mut self, program: &Program) {
        for func in &program.functions {
            self.gen_function(func);
        }
    }

    fn gen_function(&mut self, func: &FunctionDecl) {
        self.instrs.push(Instr::func_begin(&func.name));
        self.gen_block(&func.body);
        self.instrs.push(Instr::func_end(&func.name));
    }

    fn gen_block(&mut self, block: &Block) {
        for stmt in &block.statements {
            self.gen_stmt(stmt);
        }
    }

    fn gen_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign(assign) => {
                let value = self.gen_expr(&assign.expr);
                self.instrs.push(Instr::assign(&assign.target, value));
            }
            Stmt::Call(call) => {
                let argc = self.gen_args(call);
                self.instrs.push(Instr::call(None, &call.name, argc));
            }
            Stmt::Print(print) => {
                let value = self.gen_expr(&print.value);
                self.instrs.push(Instr::print(value));
            }
            Stmt::Input => {
                let temp = self.new_temp();
                self.instrs.push(Instr::input(temp));
            }
            Stmt::Return(ret) => {
                let value = self.gen_expr(&ret.value);
                self.instrs.push(Instr::ret(Some(value)));
            }
            Stmt::If(if_stmt) => self.gen_if(if_stmt),
            Stmt::While(while_stmt) => self.gen_while(while_stmt),
            Stmt::For(for_stmt) => self.gen_for(for_stmt),
        }
    }

    /// Lower `if/elif/else`. Labels are reserved up front: one end label,
    /// one per elif arm, and one for the else block when present (a
    /// missing else falls through to the end label).
    fn gen_if(&mut self, stmt: &IfStmt) {
        let label_end = self.new_label("END_IF");
        let elif_labels: Vec<String> = stmt.elifs.iter().map(|_| self.new_label("ELIF")).collect();
        let label_else = if stmt.else_block.is_some() {
            self.new_label("ELSE")
        } else {
            label_end.clone()
        };

        let cond = self.gen_expr(&stmt.cond);
        let first_target = elif_labels.first().unwrap_or(&label_else).clone();
        self.instrs.push(Instr::if_false_goto(cond, first_target));
        self.gen_block(&stmt.then_block);
        self.instrs.push(Instr::goto(&label_end));

        for (i, (elif_cond, elif_block)) in stmt.elifs.iter().enumerate() {
            let next_target = elif_labels.get(i + 1).unwrap_or(&label_else).clone();
            self.instrs.push(Instr::label(&elif_labels[i]));
            let cond = self.gen_expr(elif_cond);
            self.instrs.push(Instr::if_false_goto(cond, next_target));
            self.gen_block(elif_block);
            self.instrs.push(Instr::goto(&label_end));
        }

        if let Some(else_block) = &stmt.else_block {
            self.instrs.push(Instr::label(&label_else));
            self.gen_block(else_block);
        }

        self.instrs.push(Instr::label(&label_end));
    }

    fn gen_while(&mut self, stmt: &WhileStmt) {
        let label_start = self.new_label("WHILE");
        let label_end = self.new_label("END_WHILE");

        self.instrs.push(Instr::label(&label_start));
        let cond = self.gen_expr(&stmt.cond);
        self.instrs.push(Instr::if_false_goto(cond, &*label_end));
        self.gen_block(&stmt.body);
        self.instrs.push(Instr::goto(&label_start));
        self.instrs.push(Instr::label(&label_end));
    }

    /// Lower `for var in a..b`: initialize once, then re-evaluate the end
    /// bound every iteration and continue while `var <= end`.
    fn gen_for(&mut self, stmt: &ForStmt) {
        let label_start = self.new_label("FOR");
        let label_end = self.new_label("END_FOR");

        let start = self.gen_expr(&stmt.start);
        self.instrs.push(Instr::assign(&stmt.var, start));

        self.instrs.push(Instr::label(&label_start));
        let end = self.gen_expr(&stmt.end);
        let cond = self.new_temp();
        self.instrs.push(Instr::binary(
            Op::LtEq,
            &*cond,
            Operand::Name(stmt.var.clone()),
            end,
        ));
        self.instrs.push(Instr::if_false_goto(
            Operand::Name(cond),
            &*label_end,
        ));
        self.gen_block(&stmt.body);
        self.instrs.push(Instr::binary(
            Op::Add,
            &*stmt.var,
            Operand::Name(stmt.var.clone()),
            Operand::Int(1),
        ));
        self.instrs.push(Instr::goto(&label_start));
        self.instrs.push(Instr::label(&label_end));
    }

    /// Lower an expression, returning the operand that carries its value.
    /// Leaves return their literal or name without emitting; each operator
    /// application allocates a fresh temporary, post-order.
    fn gen_expr(&mut self, expr: &Expr) -> Operand {
        match expr {
            Expr::Int(value) => Operand::Int(*value),
            Expr::Float(value) => Operand::Float(*value),
            Expr::Bool(value) => Operand::Bool(*value),
            Expr::Str(text) => Operand::Str(text.clone()),
            Expr::Var(name) => Operand::Name(name.clone()),
            Expr::Unary(unary) => {
                let operand = self.gen_expr(&unary.operand);
                let temp = self.new_temp();
                let op = match unary.op {
                    UnOp::Neg => Op::Neg,
                    UnOp::Not => Op::Not,
                };
                self.instrs.push(Instr::unary(op, &*temp, operand));
                Operand::Name(temp)
            }
            Expr::Binary(binary) => {
                let lhs = self.gen_expr(&binary.left);
                let rhs = self.gen_expr(&binary.right);
                let temp = self.new_temp();
                self.instrs
                    .push(Instr::binary(bin_op(binary.op), &*temp, lhs, rhs));
                Operand::Name(temp)
            }
            Expr::Call(call) => {
                let argc = self.gen_args(call);
                let temp = self.new_temp();
                self.instrs
                    .push(Instr::call(Some(temp.clone()), &call.name, argc));
                Operand::Name(temp)
            }
            Expr::Input => {
                let temp = self.new_temp();
                self.instrs.push(Instr::input(&*temp));
                Operand::Name(temp)
            }
        }
    }

    /// Evaluate every argument left to right, then stage them with `ARG`.
    /// Returns the argument count for the following `CALL`.
    fn gen_args(&mut self, call: &CallExpr) -> usize {
        let args: Vec<Operand> = call.args.iter().map(|arg| self.gen_expr(arg)).collect();
        let argc = args.len();
        for arg in args {
            self.instrs.push(Instr::arg(arg));
        }
        argc
    }
}

fn bin_op(op: BinOp) -> Op {
    match op {
        BinOp::Add => Op::Add,
        BinOp::Sub => Op::Sub,
        BinOp::Mul => Op::Mul,
        BinOp::Div => Op::Div,
        BinOp::Mod => Op::Mod,
        BinOp::Lt => Op::Lt,
        BinOp::Le => Op::Le,
        BinOp::Gt => Op::Gt,
        BinOp::Ge => Op::Ge,
        BinOp::Eq => Op::Eq,
        BinOp::Ne => Op::Ne,
        BinOp::And => Op::And,
        BinOp::Or => Op::Or,
    }
}
