//! Scope tree for name resolution.

use cirius_util::{define_idx, IndexVec};
use indexmap::IndexMap;

define_idx!(ScopeId);

/// What a name is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// A function parameter.
    Param,
    /// A variable introduced by its first assignment.
    Var,
    /// A user-defined function with the given parameter count.
    Function { arity: usize },
    /// A host-provided callable with the given arity.
    Builtin { arity: usize },
}

/// A single scope: bindings plus a parent pointer.
#[derive(Debug)]
pub struct Scope {
    bindings: IndexMap<String, Binding>,
    parent: Option<ScopeId>,
}

/// Arena of scopes with lexical parent pointers.
///
/// Scope 0 is the global scope and is always present. Lookup walks the
/// parent chain; definition always targets the current scope.
pub struct ScopeTree {
    scopes: IndexVec<ScopeId, Scope>,
    current: ScopeId,
}

impl ScopeTree {
    pub const GLOBAL: ScopeId = ScopeId(0);

    pub fn new() -> Self {
        let mut scopes = IndexVec::new();
        let global = scopes.push(Scope {
            bindings: IndexMap::new(),
            parent: None,
        });
        Self {
            scopes,
            current: global,
        }
    }

    /// Open a child of the scope `parent`.
    pub fn enter_scope_under(&mut self, parent: ScopeId) -> ScopeId {
        let scope = self.scopes.push(Scope {
            bindings: IndexMap::new(),
            parent: Some(parent),
        });
        self.current = scope;
        scope
    }

    /// Open a child of the current scope.
    pub fn enter_scope(&mut self) -> ScopeId {
        self.enter_scope_under(self.current)
    }

    /// Return to the parent of the current scope.
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current].parent {
            self.current = parent;
        }
    }

    /// Bind `name` in the current scope. Returns false when the current
    /// scope already binds the name.
    #[must_use]
    pub fn define(&mut self, name: &str, binding: Binding) -> bool {
        let scope = &mut self.scopes[self.current];
        if scope.bindings.contains_key(name) {
            return false;
        }
        scope.bindings.insert(name.to_string(), binding);
        true
    }

    /// True when the current scope itself binds `name`.
    pub fn bound_in_current(&self, name: &str) -> bool {
        self.scopes[self.current].bindings.contains_key(name)
    }

    /// Resolve `name` up the parent chain from the current scope.
    pub fn resolve(&self, name: &str) -> Option<Binding> {
        let mut scope_id = self.current;
        loop {
            let scope = &self.scopes[scope_id];
            if let Some(&binding) = scope.bindings.get(name) {
                return Some(binding);
            }
            scope_id = scope.parent?;
        }
    }

    /// Resolve `name` in the global scope only.
    pub fn resolve_global(&self, name: &str) -> Option<Binding> {
        self.scopes[Self::GLOBAL].bindings.get(name).copied()
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}
