use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::ast::FunctionDef;
use crate::value::Value;

/// A lexical environment: variable and function bindings plus a borrowed
/// link to the enclosing scope.
///
/// A child only ever reads its parent, so the chain is a plain stack of
/// shared borrows: a child scope cannot outlive the execution that created
/// it, and nothing written in a child is visible once it is dropped.
#[derive(Debug, Default)]
pub struct Scope<'p> {
    variables: FxHashMap<String, Value>,
    functions: FxHashMap<String, Rc<FunctionDef>>,
    parent: Option<&'p Scope<'p>>,
}

impl<'p> Scope<'p> {
    pub fn root() -> Self {
        Self::default()
    }

    /// A fresh, empty scope whose lookups fall back to `self`.
    pub fn child(&self) -> Scope<'_> {
        Scope {
            variables: FxHashMap::default(),
            functions: FxHashMap::default(),
            parent: Some(self),
        }
    }

    /// Number of enclosing scopes; the root is at depth 0.
    pub fn depth(&self) -> usize {
        self.parent.map_or(0, |p| p.depth() + 1)
    }

    /// Find a variable, innermost binding first.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        match self.variables.get(name) {
            Some(value) => Some(value),
            None => self.parent.and_then(|p| p.lookup(name)),
        }
    }

    /// Bind `name` in this scope, shadowing any outer binding.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn lookup_function(&self, name: &str) -> Option<&Rc<FunctionDef>> {
        match self.functions.get(name) {
            Some(def) => Some(def),
            None => self.parent.and_then(|p| p.lookup_function(name)),
        }
    }

    /// Register a function; a later definition with the same name replaces
    /// the earlier one.
    pub fn define_function(&mut self, def: Rc<FunctionDef>) {
        self.functions.insert(def.name.clone(), def);
    }
}
