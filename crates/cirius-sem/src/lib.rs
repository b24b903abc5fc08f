//! cirius-sem - Scope and arity analysis.
//!
//! Walks the AST without rewriting it, checking that every referenced
//! name resolves, that no scope declares a name twice, and that every
//! call matches the callee's declared arity. No type checking happens
//! here; values are dynamically typed at run time.

pub mod scope;

pub use scope::{Binding, ScopeTree};

use cirius_par::ast::*;
use thiserror::Error;

/// Host callables visible to every program: name and declared arity.
pub const BUILTINS: &[(&str, usize)] = &[
    ("str", 1),
    ("int", 1),
    ("float", 1),
    ("bool", 1),
    ("input", 0),
];

/// Errors produced during semantic analysis.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SemanticError {
    #[error("symbol '{0}' is already declared")]
    Duplicate(String),

    #[error("symbol '{0}' is not declared")]
    Undeclared(String),

    #[error("function '{name}' expects {expected} arguments, got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("'{0}' is not a function")]
    NotAFunction(String),
}

/// Analyze a program, rejecting it before any back end runs.
pub fn analyze(program: &Program) -> Result<(), SemanticError> {
    Analyzer::new().check_program(program)
}

/// The semantic analyzer.
///
/// Functions are registered in the global scope before any body is
/// analyzed, so forward references and recursion resolve. Each function
/// body opens a scope parented to globals; each block and each `for`
/// statement opens a fresh child scope.
pub struct Analyzer {
    scopes: ScopeTree,
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            scopes: ScopeTree::new(),
        }
    }

    fn check_program(&mut self, program: &Program) -> Result<(), SemanticError> {
        for &(name, arity) in BUILTINS {
            if !self.scopes.define(name, Binding::Builtin { arity }) {
                return Err(SemanticError::Duplicate(name.to_string()));
            }
        }

        for func in &program.functions {
            let binding = Binding::Function {
                arity: func.params.len(),
            };
            if !self.scopes.define(&func.name, binding) {
                return Err(SemanticError::Duplicate(func.name.clone()));
            }
        }

        for func in &program.functions {
            self.check_function(func)?;
        }
        Ok(())
    }

    fn check_function(&mut self, func: &FunctionDecl) -> Result<(), SemanticError> {
        self.scopes.enter_scope_under(ScopeTree::GLOBAL);
        for param in &func.params {
            if !self.scopes.define(param, Binding::Param) {
                return Err(SemanticError::Duplicate(param.clone()));
            }
        }
        self.check_block(&func.body)?;
        self.scopes.exit_scope();
        Ok(())
    }

    fn check_block(&mut self, block: &Block) -> Result<(), SemanticError> {
        self.scopes.enter_scope();
        for stmt in &block.statements {
            self.check_stmt(stmt)?;
        }
        self.scopes.exit_scope();
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<(), SemanticError> {
        match stmt {
            Stmt::Assign(assign) => {
                self.check_expr(&assign.expr)?;
                // First store to a new name declares it in the current scope.
                if !self.scopes.bound_in_current(&assign.target) {
                    let defined = self.scopes.define(&assign.target, Binding::Var);
                    debug_assert!(defined);
                }
                Ok(())
            }
            Stmt::If(if_stmt) => {
                self.check_expr(&if_stmt.cond)?;
                self.check_block(&if_stmt.then_block)?;
                for (cond, block) in &if_stmt.elifs {
                    self.check_expr(cond)?;
                    self.check_block(block)?;
                }
                if let Some(block) = &if_stmt.else_block {
                    self.check_block(block)?;
                }
                Ok(())
            }
            Stmt::While(while_stmt) => {
                self.check_expr(&while_stmt.cond)?;
                self.check_block(&while_stmt.body)
            }
            Stmt::For(for_stmt) => {
                self.scopes.enter_scope();
                if !self.scopes.define(&for_stmt.var, Binding::Var) {
                    return Err(SemanticError::Duplicate(for_stmt.var.clone()));
                }
                self.check_expr(&for_stmt.start)?;
                self.check_expr(&for_stmt.end)?;
                self.check_block(&for_stmt.body)?;
                self.scopes.exit_scope();
                Ok(())
            }
            Stmt::Return(ret) => self.check_expr(&ret.value),
            Stmt::Print(print) => self.check_expr(&print.value),
            Stmt::Input => Ok(()),
            Stmt::Call(call) => self.check_call(call),
        }
    }

    fn check_expr(&mut self, expr: &Expr) -> Result<(), SemanticError> {
        match expr {
            Expr::Int(_) | Expr::Float(_) | Expr::Str(_) | Expr::Bool(_) | Expr::Input => Ok(()),
            Expr::Var(name) => match self.scopes.resolve(name) {
                Some(_) => Ok(()),
                None => Err(SemanticError::Undeclared(name.clone())),
            },
            Expr::Binary(binary) => {
                self.check_expr(&binary.left)?;
                self.check_expr(&binary.right)
            }
            Expr::Unary(unary) => self.check_expr(&unary.operand),
            Expr::Call(call) => self.check_call(call),
        }
    }

    /// Calls resolve at the global scope only.
    fn check_call(&mut self, call: &CallExpr) -> Result<(), SemanticError> {
        let arity = match self.scopes.resolve_global(&call.name) {
            Some(Binding::Function { arity }) | Some(Binding::Builtin { arity }) => arity,
            Some(_) => return Err(SemanticError::NotAFunction(call.name.clone())),
            None => return Err(SemanticError::Undeclared(call.name.clone())),
        };
        if call.args.len() != arity {
            return Err(SemanticError::ArityMismatch {
                name: call.name.clone(),
                expected: arity,
                found: call.args.len(),
            });
        }
        for arg in &call.args {
            self.check_expr(arg)?;
        }
        Ok(())
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}
