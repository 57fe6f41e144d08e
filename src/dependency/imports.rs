use super::names::NameRegistry;
use indexmap::IndexMap;

/// Identifier bound in the importing file.
pub type SymbolId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// `import Foo from "..."`
    Default,
    /// `import { Foo } from "..."`
    Named,
    /// `import * as Foo from "..."`
    Namespace,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub kind: ImportKind,
    pub module: String,
    /// Exported name for named imports, requested local name otherwise.
    pub name: String,
    pub id: SymbolId,
    pub type_only: bool,
}

/// Import bindings of one file, keyed by `(kind, module, name)`.
#[derive(Debug, Clone, Default)]
pub struct ImportManager {
    names: NameRegistry,
    bindings: IndexMap<(ImportKind, String, String), Binding>,
}

impl ImportManager {
    pub(crate) fn names_mut(&mut self) -> &mut NameRegistry {
        &mut self.names
    }

    pub fn add_default(&mut self, module: &str, local: &str, type_only: bool) -> SymbolId {
        self.add(ImportKind::Default, module, local, type_only)
    }

    pub fn add_named(&mut self, module: &str, exported: &str, type_only: bool) -> SymbolId {
        self.add(ImportKind::Named, module, exported, type_only)
    }

    pub fn add_namespace(&mut self, module: &str, local: &str) -> SymbolId {
        self.add(ImportKind::Namespace, module, local, false)
    }

    /// Returns the identifier already bound for `(kind, module, name)` or
    /// mints a new one. A value import of a binding previously requested as
    /// type-only upgrades it.
    pub fn add(&mut self, kind: ImportKind, module: &str, name: &str, type_only: bool) -> SymbolId {
        let key = (kind, module.to_string(), name.to_string());
        if let Some(binding) = self.bindings.get_mut(&key) {
            binding.type_only &= type_only;
            return binding.id.clone();
        }

        let id = self.names.mint(name);
        self.bindings.insert(
            key,
            Binding {
                kind,
                module: module.to_string(),
                name: name.to_string(),
                id: id.clone(),
                type_only,
            },
        );
        id
    }

    /// Registers a binding with a fixed identifier, as read from existing
    /// code.
    pub(crate) fn load(&mut self, kind: ImportKind, module: &str, name: &str, id: &str, type_only: bool) {
        self.names.reserve(id);
        self.bindings.insert(
            (kind, module.to_string(), name.to_string()),
            Binding {
                kind,
                module: module.to_string(),
                name: name.to_string(),
                id: id.to_string(),
                type_only,
            },
        );
    }

    pub fn remove(&mut self, kind: ImportKind, module: &str, name: &str) -> Option<Binding> {
        self.bindings
            .shift_remove(&(kind, module.to_string(), name.to_string()))
    }

    /// Identifier bound for `(kind, module, name)`, if any.
    pub fn identifier(&self, kind: ImportKind, module: &str, name: &str) -> Option<&str> {
        self.bindings
            .get(&(kind, module.to_string(), name.to_string()))
            .map(|binding| binding.id.as_str())
    }

    pub fn has_usages(&self, kind: ImportKind, module: &str, name: &str) -> bool {
        self.identifier(kind, module, name).is_some()
    }

    pub fn remove_by_id(&mut self, id: &str) -> Option<Binding> {
        let index = self.bindings.values().position(|binding| binding.id == id)?;
        self.bindings.shift_remove_index(index).map(|(_, binding)| binding)
    }

    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_binding_returns_same_identifier() {
        let mut imports = ImportManager::default();
        let ids: Vec<_> = (0..3)
            .map(|_| imports.add_default("./Foo.js", "Foo", true))
            .collect();
        assert_eq!(ids, ["Foo", "Foo", "Foo"]);
        assert_eq!(imports.bindings().count(), 1);
    }

    #[test]
    fn test_distinct_modules_get_distinct_identifiers() {
        let mut imports = ImportManager::default();
        assert_eq!(imports.add_default("./a/Foo.js", "Foo", true), "Foo");
        assert_eq!(imports.add_default("./b/Foo.js", "Foo", true), "Foo_1");
    }

    #[test]
    fn test_value_import_upgrades_type_only() {
        let mut imports = ImportManager::default();
        imports.add_named("@x/pkg", "Thing", true);
        imports.add_named("@x/pkg", "Thing", false);
        let binding = imports.bindings().next().unwrap();
        assert!(!binding.type_only);
    }

    #[test]
    fn test_remove() {
        let mut imports = ImportManager::default();
        let id = imports.add_named("@x/pkg", "Thing", true);
        assert!(imports.has_usages(ImportKind::Named, "@x/pkg", "Thing"));
        assert_eq!(imports.remove_by_id(&id).map(|b| b.name), Some("Thing".into()));
        assert!(!imports.has_usages(ImportKind::Named, "@x/pkg", "Thing"));
        assert!(imports.is_empty());
    }
}
