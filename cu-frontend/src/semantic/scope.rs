//! Lexical scopes
//!
//! Every block gets a full copy of its parent's scope. Declarations made
//! inside the block land in the copy and disappear when it is popped, so
//! no parent pointers are needed. The bottom frame is the global scope.

use crate::types::{TypeTable, ValueType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    pub variables: BTreeMap<String, ValueType>,
    pub types: TypeTable,
    /// Functions whose body has been seen
    pub defined_functions: BTreeSet<String>,
    /// Integer values of `define`d names and enum members
    pub constants: BTreeMap<String, i64>,
    /// Names bound by `define` without a value
    pub macros: BTreeSet<String>,
    /// Names declared in this frame rather than inherited from a parent
    #[serde(skip)]
    local_names: BTreeSet<String>,
}

/// Outcome of binding a name in the current frame
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    New,
    /// Same name and type declared again in the same frame
    Repeated,
    /// The name already has a different type in this frame
    Conflict(ValueType),
}

impl Scope {
    pub fn lookup(&self, name: &str) -> Option<&ValueType> {
        self.variables.get(name)
    }

    /// Bind `name` in this frame. Names inherited from an enclosing frame
    /// may be shadowed freely.
    pub fn bind(&mut self, name: &str, value_type: ValueType) -> Binding {
        if self.local_names.contains(name) {
            return match self.variables.get(name) {
                Some(existing) if *existing == value_type => Binding::Repeated,
                Some(existing) => Binding::Conflict(existing.clone()),
                None => {
                    self.variables.insert(name.to_string(), value_type);
                    Binding::New
                }
            };
        }
        self.local_names.insert(name.to_string());
        self.variables.insert(name.to_string(), value_type);
        Binding::New
    }

    pub fn is_local(&self, name: &str) -> bool {
        self.local_names.contains(name)
    }

    /// Copy for a nested block: everything is visible, nothing is local
    fn child(&self) -> Self {
        Self {
            local_names: BTreeSet::new(),
            ..self.clone()
        }
    }

    /// Pull in global bindings this frame does not have yet
    fn absorb_missing(&mut self, global: &Scope) {
        for (name, value_type) in &global.variables {
            self.variables
                .entry(name.clone())
                .or_insert_with(|| value_type.clone());
        }
        self.types.absorb_missing(&global.types);
        for (name, value) in &global.constants {
            self.constants.entry(name.clone()).or_insert(*value);
        }
        self.defined_functions
            .extend(global.defined_functions.iter().cloned());
        self.macros.extend(global.macros.iter().cloned());
    }
}

/// Stack of scope frames, never empty
#[derive(Debug, Clone)]
pub struct Environment {
    frames: Vec<Scope>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            frames: vec![Scope::default()],
        }
    }

    pub fn enter_scope(&mut self) {
        let child = self.current().child();
        self.frames.push(child);
        log::trace!("enter scope (depth {})", self.frames.len());
    }

    pub fn exit_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
        log::trace!("exit scope (depth {})", self.frames.len());
    }

    pub fn is_global(&self) -> bool {
        self.frames.len() == 1
    }

    pub fn current(&self) -> &Scope {
        let last = self.frames.len() - 1;
        &self.frames[last]
    }

    pub fn current_mut(&mut self) -> &mut Scope {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    pub fn global(&self) -> &Scope {
        &self.frames[0]
    }

    pub fn into_global(mut self) -> Scope {
        self.frames.truncate(1);
        self.frames.remove(0)
    }

    /// Pop every frame above the global one, leaving only globals visible
    pub fn take_locals(&mut self) -> Vec<Scope> {
        self.frames.split_off(1)
    }

    /// Put frames from [`Environment::take_locals`] back. They also gain
    /// whatever was bound globally in the meantime.
    pub fn restore_locals(&mut self, locals: Vec<Scope>) {
        self.frames.truncate(1);
        self.frames.extend(locals);

        let (global, locals) = self.frames.split_at_mut(1);
        for frame in locals {
            frame.absorb_missing(&global[0]);
        }
    }
}
