use std::collections::HashMap;

use serde::Serialize;

use crate::interpreter::value::Value;

/// Identifier bindings for one run, kept in first-declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    entries: Vec<Binding>,
    index: HashMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binding {
    pub name: String,
    pub value: Value,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, keeping its original position when it is already present.
    pub fn define(&mut self, name: String, value: Value) {
        match self.index.get(&name) {
            Some(&slot) => self.entries[slot].value = value,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push(Binding { name, value });
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.index.get(name).map(|&slot| self.entries[slot].value)
    }

    /// Reads never fail: unknown names and uninitialized declarations are both `Unset`.
    pub fn lookup(&self, name: &str) -> Value {
        self.get(name).unwrap_or(Value::Unset)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
