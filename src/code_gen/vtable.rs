use std::collections::HashMap;

use crate::ast::{ClassDef, ClassName, Info, MethodName};
use crate::types::ClassTable;

use super::Mangled;

/// Dispatch table of a class: target function names indexed by slot.
///
/// A method keeps the slot where it was first introduced in every descendant
/// class; overriding only replaces the function stored in it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VTable {
    functions: Vec<Box<str>>,
    slots: HashMap<MethodName, usize>,
}

impl VTable {
    /// Builds the table of `class` from the table of its parent.
    fn derive<I: Info>(parent: &VTable, class: &ClassDef<I>) -> VTable {
        let mut vtable = parent.clone();
        for method in &class.methods {
            let function = Mangled(&class.name, method.name.as_str()).to_string();
            vtable.add_or_update(&method.name, function.into());
        }
        vtable
    }

    fn add_or_update(&mut self, method: &MethodName, function: Box<str>) {
        if let Some(&slot) = self.slots.get(method) {
            self.functions[slot] = function;
        } else {
            self.slots.insert(method.clone(), self.functions.len());
            self.functions.push(function);
        }
    }

    pub fn slot(&self, method: &MethodName) -> Option<usize> {
        self.slots.get(method).copied()
    }

    /// Function names, in slot order.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(|function| &**function)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// The dispatch tables of every class, the implicit root included.
#[derive(Debug)]
pub struct VTables {
    tables: HashMap<ClassName, VTable>,
}

impl VTables {
    /// Builds every table, parents before their children.
    pub fn build<I: Info>(table: &ClassTable<'_, I>) -> VTables {
        let mut tables = HashMap::new();
        tables.insert(ClassName::object(), VTable::default());

        for class in table.classes() {
            let mut parent = VTable::default();
            for def in table.lineage(&class.name) {
                if let Some(built) = tables.get(&def.name) {
                    parent = built.clone();
                    continue;
                }
                let vtable = VTable::derive(&parent, def);
                tracing::trace!(class = %def.name, slots = vtable.len(), "built vtable");
                tables.insert(def.name.clone(), vtable.clone());
                parent = vtable;
            }
        }
        VTables { tables }
    }

    pub fn get(&self, class: &ClassName) -> Option<&VTable> {
        self.tables.get(class)
    }
}
