use std::collections::{HashMap, HashSet};

use crate::ast::{ClassDef, ClassName, Info, MethodDef, MethodName, Type};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("class {0} is defined more than once")]
    DuplicateClass(ClassName),
    #[error("class {class} extends undefined class {parent}")]
    UndefinedParent { class: ClassName, parent: ClassName },
    #[error("cyclic inheritance involving class {0}")]
    InheritanceCycle(ClassName),
}

/// The classes of a program, indexed by name.
///
/// Construction validates the hierarchy: names are unique, every parent
/// exists and `extends` is acyclic. Every walk up the hierarchy relies on
/// that, so a `ClassTable` can only be obtained through [`ClassTable::new`].
pub struct ClassTable<'p, I: Info> {
    /// Declared classes. The implicit root is never part of the map.
    classes: HashMap<&'p ClassName, &'p ClassDef<I>>,
    /// Declared classes, in source order.
    order: Vec<&'p ClassDef<I>>,
}

impl<'p, I: Info> ClassTable<'p, I> {
    pub fn new(classes: &'p [ClassDef<I>]) -> Result<ClassTable<'p, I>> {
        let mut map = HashMap::with_capacity(classes.len());
        for class in classes {
            if class.name.is_object() || map.insert(&class.name, class).is_some() {
                return Err(Error::DuplicateClass(class.name.clone()));
            }
        }
        let table = ClassTable {
            classes: map,
            order: classes.iter().collect(),
        };

        for class in classes {
            if !table.contains(&class.extends) {
                return Err(Error::UndefinedParent {
                    class: class.name.clone(),
                    parent: class.extends.clone(),
                });
            }
        }
        for class in classes {
            table.check_acyclic(&class.name)?;
        }
        Ok(table)
    }

    /// Walks the ancestors of `start`, failing if some class shows up twice.
    fn check_acyclic(&self, start: &'p ClassName) -> Result<()> {
        let mut seen = HashSet::new();
        let mut curr = Some(start);
        while let Some(name) = curr {
            if !seen.insert(name) {
                return Err(Error::InheritanceCycle(start.clone()));
            }
            curr = self.parent(name);
        }
        Ok(())
    }

    /// Whether `name` is a declared class or the implicit root.
    pub fn contains(&self, name: &ClassName) -> bool {
        name.is_object() || self.classes.contains_key(name)
    }

    /// Returns the definition of a declared class. The implicit root has none.
    pub fn get(&self, name: &ClassName) -> Option<&'p ClassDef<I>> {
        self.classes.get(name).copied()
    }

    /// Declared classes, in source order.
    pub fn classes(&self) -> impl Iterator<Item = &'p ClassDef<I>> + '_ {
        self.order.iter().copied()
    }

    pub fn parent(&self, name: &ClassName) -> Option<&'p ClassName> {
        self.get(name).map(|class| &class.extends)
    }

    /// Returns the class definitions from the oldest declared ancestor down
    /// to `name` itself. Empty for the implicit root.
    pub fn lineage(&self, name: &ClassName) -> Vec<&'p ClassDef<I>> {
        let mut lineage = Vec::new();
        let mut curr = self.get(name);
        while let Some(class) = curr {
            lineage.push(class);
            curr = self.get(&class.extends);
        }
        lineage.reverse();
        lineage
    }

    /// Class-name subtyping: `sub` extends `sup`, possibly transitively.
    pub fn is_subclass_of(&self, sub: &ClassName, sup: &ClassName) -> bool {
        // A validated hierarchy has no path longer than this; the bound only
        // matters if the table is ever inconsistent.
        let mut fuel = self.classes.len() + 1;
        let mut curr = Some(sub);
        while let Some(name) = curr {
            if name == sup {
                return true;
            }
            if fuel == 0 {
                return false;
            }
            fuel -= 1;
            curr = self.parent(name);
        }
        false
    }

    /// Whether a value of type `actual` may be used where `expected` is
    /// required.
    pub fn is_subtype_of(&self, actual: &Type, expected: &Type) -> bool {
        match (actual, expected) {
            (Type::Class(sub), Type::Class(sup)) => self.is_subclass_of(sub, sup),
            _ => actual == expected,
        }
    }

    /// Whether every class mentioned by `ty` exists.
    pub fn is_defined(&self, ty: &Type) -> bool {
        match ty {
            Type::Class(name) => self.contains(name),
            Type::Int | Type::Bool | Type::Void => true,
        }
    }

    /// Every method reachable from `class`, inherited ones included. An
    /// override replaces the inherited entry. Empty for the implicit root.
    pub fn method_map(&self, class: &ClassName) -> HashMap<&'p MethodName, &'p MethodDef<I>> {
        let mut methods = HashMap::new();
        for def in self.lineage(class) {
            for method in &def.methods {
                methods.insert(&method.name, method);
            }
        }
        methods
    }
}
