use crate::value::Value;
use std::collections::HashMap;

/// Flat global scope. Bindings are never removed; lookups are O(1) and
/// iteration follows first definition order.
pub struct Env<T> {
    slots: HashMap<String, usize>,
    bindings: Vec<(String, T)>,
}

/// Runtime bindings owned by one program run.
pub type SymbolTable = Env<Value>;

impl<T> Env<T> {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            bindings: Vec::new(),
        }
    }

    pub fn define_or_update(&mut self, name: &str, val: T) {
        match self.slots.get(name) {
            Some(&slot) => self.bindings[slot].1 = val,
            None => {
                self.slots.insert(name.into(), self.bindings.len());
                self.bindings.push((name.into(), val));
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&T> {
        self.slots.get(name).map(|&slot| &self.bindings[slot].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.bindings.iter().map(|(name, val)| (name.as_str(), val))
    }
}

impl<T> Default for Env<T> {
    fn default() -> Self {
        Self::new()
    }
}
