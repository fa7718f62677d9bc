//! Per-scope type table
//!
//! Maps a type name to either a concrete type or another name (a typedef).
//! Chains are walked on lookup. A binding that would close a cycle is
//! refused up front, and the walk itself refuses to revisit a name.

use super::{TypeError, ValueType, BASE_SCALARS};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeEntry {
    Base(ValueType),
    Alias(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeTable {
    entries: HashMap<String, TypeEntry>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl TypeTable {
    /// Table holding only the builtin scalar types
    pub fn with_builtins() -> Self {
        let entries = BASE_SCALARS
            .iter()
            .map(|name| (name.to_string(), TypeEntry::Base(ValueType::scalar(name))))
            .collect();
        Self { entries }
    }

    pub fn type_exists(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn entry(&self, key: &str) -> Option<&TypeEntry> {
        self.entries.get(key)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn add_type(&mut self, key: &str, value_type: ValueType) -> Result<(), TypeError> {
        if self.type_exists(key) {
            return Err(TypeError::DuplicateType(key.to_string()));
        }
        self.entries.insert(key.to_string(), TypeEntry::Base(value_type));
        Ok(())
    }

    /// Replace a struct's entry once its members are known
    pub fn complete_type(&mut self, key: &str, value_type: ValueType) {
        self.entries.insert(key.to_string(), TypeEntry::Base(value_type));
    }

    /// Copy in every entry of `other` whose name is not bound here yet
    pub fn absorb_missing(&mut self, other: &TypeTable) {
        for (key, entry) in &other.entries {
            self.entries
                .entry(key.clone())
                .or_insert_with(|| entry.clone());
        }
    }

    /// `typedef <target> <name>` where the target is itself a named type
    pub fn bind_alias(&mut self, name: &str, target: &str) -> Result<(), TypeError> {
        if name == target {
            return Err(TypeError::TypedefCycle(format!("{} -> {}", name, target)));
        }
        if self.type_exists(name) {
            return Err(TypeError::TypedefRebinding(name.to_string()));
        }
        if !self.type_exists(target) {
            return Err(TypeError::UnknownType(target.to_string()));
        }

        let mut chain = vec![name.to_string(), target.to_string()];
        let mut cursor = target.to_string();
        while let Some(TypeEntry::Alias(next)) = self.entries.get(&cursor) {
            chain.push(next.clone());
            if next == name {
                return Err(TypeError::TypedefCycle(chain.join(" -> ")));
            }
            cursor = next.clone();
        }

        self.entries.insert(name.to_string(), TypeEntry::Alias(target.to_string()));
        Ok(())
    }

    /// `typedef <target> <name>` for any resolved target. Named targets are
    /// stored as aliases so the chain stays visible.
    pub fn bind_typedef(&mut self, name: &str, target: ValueType) -> Result<(), TypeError> {
        let named_target = match &target {
            ValueType::Scalar(key) | ValueType::Struct { name: key, .. } if self.type_exists(key) => {
                Some(key.clone())
            }
            _ => None,
        };
        if let Some(key) = named_target {
            return self.bind_alias(name, &key);
        }

        if self.type_exists(name) {
            return Err(TypeError::TypedefRebinding(name.to_string()));
        }
        self.entries.insert(name.to_string(), TypeEntry::Base(target));
        Ok(())
    }

    /// Walk the alias chain from `key` down to its concrete type
    pub fn exhaust_typedef(&self, key: &str) -> Result<ValueType, TypeError> {
        let mut seen = HashSet::new();
        let mut cursor = key;
        loop {
            if !seen.insert(cursor) {
                return Err(TypeError::TypedefCycle(cursor.to_string()));
            }
            match self.entries.get(cursor) {
                Some(TypeEntry::Base(value_type)) => return Ok(value_type.clone()),
                Some(TypeEntry::Alias(next)) => cursor = next.as_str(),
                None => return Err(TypeError::UnknownType(cursor.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtins_exist() {
        let table = TypeTable::with_builtins();
        assert!(table.type_exists("int"));
        assert!(table.type_exists("void"));
        assert!(!table.type_exists("size_t"));
    }

    #[test]
    fn test_add_type_rejects_duplicates() {
        let mut table = TypeTable::with_builtins();
        table.add_type("days", ValueType::scalar("days")).unwrap();
        assert_eq!(
            table.add_type("days", ValueType::scalar("days")),
            Err(TypeError::DuplicateType("days".to_string()))
        );
    }

    #[test]
    fn test_alias_chain_is_exhausted() {
        let mut table = TypeTable::with_builtins();
        table.bind_alias("size_t", "uint").unwrap();
        table.bind_alias("length_t", "size_t").unwrap();

        assert_eq!(table.entry("length_t"), Some(&TypeEntry::Alias("size_t".to_string())));
        assert_eq!(table.exhaust_typedef("length_t").unwrap(), ValueType::uint());
    }

    #[test]
    fn test_self_typedef_is_rejected() {
        let mut table = TypeTable::with_builtins();
        assert!(matches!(table.bind_alias("A", "A"), Err(TypeError::TypedefCycle(_))));
        assert!(!table.type_exists("A"));
    }

    #[test]
    fn test_typedef_cannot_rebind() {
        let mut table = TypeTable::with_builtins();
        table.bind_alias("A", "int").unwrap();
        table.bind_alias("B", "A").unwrap();
        assert_eq!(
            table.bind_alias("A", "B"),
            Err(TypeError::TypedefRebinding("A".to_string()))
        );
        assert_eq!(
            table.bind_alias("C", "missing"),
            Err(TypeError::UnknownType("missing".to_string()))
        );
    }

    #[test]
    fn test_bind_typedef_keeps_pointer_terminal() {
        let mut table = TypeTable::with_builtins();
        table
            .bind_typedef("string", ValueType::pointer_to(ValueType::char()))
            .unwrap();
        assert_eq!(
            table.bind_typedef("string", ValueType::int()),
            Err(TypeError::TypedefRebinding("string".to_string()))
        );
        assert_eq!(
            table.exhaust_typedef("string").unwrap(),
            ValueType::pointer_to(ValueType::char())
        );

        table.bind_typedef("word", ValueType::int()).unwrap();
        assert_eq!(table.entry("word"), Some(&TypeEntry::Alias("int".to_string())));
    }
}
