//! Caller-owned memory of the last equation seen for each name, so a bare reference in a later
//! block can show what the name was defined as. Entries are inserted or replaced, never pruned.

use crate::translator::numeric_resolver::ResolvedValue;
use crate::translator::symbolic_builder::SymbolicValue;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    pub value: SymbolicValue,
    pub resolved: ResolvedValue,
}

#[derive(Debug, Clone, Default)]
pub struct ExpressionRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl ExpressionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// inserts or replaces the entry of `name`
    pub fn remember(&mut self, name: &str, value: SymbolicValue, resolved: ResolvedValue) {
        self.entries
            .insert(name.to_string(), RegistryEntry { value, resolved });
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}

//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::symbolic_engine::Expr;
    use crate::translator::namespace::Value;

    #[test]
    fn test_remember_replaces() {
        let mut registry = ExpressionRegistry::new();
        assert!(registry.is_empty());
        registry.remember(
            "q",
            SymbolicValue::Expr(Expr::parse_expression("2*x").unwrap()),
            ResolvedValue::Known(Value::Number(4.0)),
        );
        registry.remember(
            "q",
            SymbolicValue::Expr(Expr::parse_expression("3*x").unwrap()),
            ResolvedValue::Known(Value::Number(6.0)),
        );
        let raw = SymbolicValue::Raw("a[0]".to_string());
        registry.remember("a", raw.clone(), ResolvedValue::Unresolved(raw));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["a", "q"]);
        let entry = registry.get("q").unwrap();
        assert_eq!(entry.resolved, ResolvedValue::Known(Value::Number(6.0)));
        assert!(registry.get("x").is_none());
    }
}
