//! Per-file import and export bookkeeping.
//!
//! Every generated file owns one [`DependencyManager`]. Processors ask it for
//! identifiers while lowering types and it turns the collected bindings into
//! import and export statements in a fixed order, so two runs over the same
//! document print the same text.

pub mod exports;
pub mod imports;
pub mod names;
pub mod path;

use crate::codegen::ast::{
    ExportDeclaration, ExportSpecifier, ImportDeclaration, ImportSpecifier, SourceFile, Statement,
};
use std::cmp::Ordering;

pub use exports::ExportManager;
pub use imports::{Binding, ImportKind, ImportManager, SymbolId};
pub use names::NameRegistry;
pub use path::{entity_file, entity_path, PathManager};

#[derive(Debug, Clone, Default)]
pub struct DependencyManager {
    pub paths: PathManager,
    pub imports: ImportManager,
    pub exports: ExportManager,
}

impl DependencyManager {
    pub fn new(paths: PathManager) -> Self {
        Self {
            paths,
            imports: ImportManager::default(),
            exports: ExportManager::default(),
        }
    }

    /// Claims a name for a declaration in this file.
    pub fn reserve(&mut self, name: &str) {
        self.imports.names_mut().reserve(name);
    }

    /// Mints a file-unique identifier for a local declaration.
    pub fn mint(&mut self, name: &str) -> SymbolId {
        self.imports.names_mut().mint(name)
    }

    /// Rebuilds the tables of an existing file. Declared names are reserved
    /// so that new imports never shadow them.
    pub fn from_statements(paths: PathManager, statements: &[Statement]) -> Self {
        let mut manager = Self::new(paths);

        for statement in statements {
            match statement {
                Statement::Import(import) => manager.load_import(import),
                Statement::Export(ExportDeclaration::Default(name)) => {
                    manager.exports.set_default(name.clone());
                }
                Statement::Export(ExportDeclaration::Named(specifiers)) => {
                    for specifier in specifiers {
                        manager.exports.add_named(
                            specifier.exported.clone(),
                            specifier.type_only,
                            specifier.local.clone(),
                        );
                    }
                }
                declaration => {
                    if let Some(name) = declaration.declared_name() {
                        manager.reserve(name);
                    }
                }
            }
        }

        manager
    }

    fn load_import(&mut self, import: &ImportDeclaration) {
        let module = import.module.as_str();
        if let Some(local) = &import.default {
            self.imports
                .load(ImportKind::Default, module, local, local, import.type_only);
        }
        if let Some(local) = &import.namespace {
            self.imports
                .load(ImportKind::Namespace, module, local, local, false);
        }
        for specifier in &import.named {
            self.imports.load(
                ImportKind::Named,
                module,
                &specifier.imported,
                &specifier.local,
                import.type_only || specifier.type_only,
            );
        }
    }

    /// Linearizes the tables into `(imports, exports)` statements.
    ///
    /// Bare module imports come before relative ones; within each group
    /// modules and specifiers follow [`collate`]. Named exports are printed
    /// as one declaration in insertion order, the default export last.
    pub fn to_code(&self) -> (Vec<Statement>, Vec<Statement>) {
        (self.import_statements(), self.export_statements())
    }

    /// Builds a complete file: imports, then `declarations`, then exports.
    pub fn assemble(&self, name: impl Into<String>, declarations: Vec<Statement>) -> SourceFile {
        let (imports, exports) = self.to_code();
        let mut statements = imports;
        statements.extend(declarations);
        statements.extend(exports);
        SourceFile::new(name, statements)
    }

    fn import_statements(&self) -> Vec<Statement> {
        let mut modules: Vec<&str> = self
            .imports
            .bindings()
            .map(|binding| binding.module.as_str())
            .collect();
        modules.sort_by(|a, b| compare_modules(a, b));
        modules.dedup();

        let mut statements = Vec::new();
        for module in modules {
            let bindings: Vec<&Binding> = self
                .imports
                .bindings()
                .filter(|binding| binding.module == module)
                .collect();

            let mut defaults: Vec<&Binding> = bindings
                .iter()
                .copied()
                .filter(|binding| binding.kind == ImportKind::Default)
                .collect();
            defaults.sort_by(|a, b| collate(&a.id, &b.id));
            for binding in defaults {
                statements.push(Statement::Import(ImportDeclaration {
                    module: module.to_string(),
                    type_only: binding.type_only,
                    default: Some(binding.id.clone()),
                    named: Vec::new(),
                    namespace: None,
                }));
            }

            let mut named: Vec<&Binding> = bindings
                .iter()
                .copied()
                .filter(|binding| binding.kind == ImportKind::Named)
                .collect();
            if !named.is_empty() {
                named.sort_by(|a, b| collate(&a.name, &b.name));
                let all_types = named.iter().all(|binding| binding.type_only);
                statements.push(Statement::Import(ImportDeclaration {
                    module: module.to_string(),
                    type_only: all_types,
                    default: None,
                    named: named
                        .into_iter()
                        .map(|binding| ImportSpecifier {
                            imported: binding.name.clone(),
                            local: binding.id.clone(),
                            type_only: binding.type_only && !all_types,
                        })
                        .collect(),
                    namespace: None,
                }));
            }

            let mut namespaces: Vec<&Binding> = bindings
                .iter()
                .copied()
                .filter(|binding| binding.kind == ImportKind::Namespace)
                .collect();
            namespaces.sort_by(|a, b| collate(&a.id, &b.id));
            for binding in namespaces {
                statements.push(Statement::Import(ImportDeclaration {
                    module: module.to_string(),
                    type_only: false,
                    default: None,
                    named: Vec::new(),
                    namespace: Some(binding.id.clone()),
                }));
            }
        }

        statements
    }

    fn export_statements(&self) -> Vec<Statement> {
        let mut statements = Vec::new();

        let named: Vec<ExportSpecifier> = self
            .exports
            .named()
            .map(|(exported, export)| ExportSpecifier {
                local: export.local.clone(),
                exported: exported.to_string(),
                type_only: export.type_only,
            })
            .collect();
        if !named.is_empty() {
            statements.push(Statement::Export(ExportDeclaration::Named(named)));
        }

        if let Some(default) = self.exports.default_export() {
            statements.push(Statement::Export(ExportDeclaration::Default(
                default.to_string(),
            )));
        }

        statements
    }
}

/// Case-insensitive ordering with a case-sensitive tiebreak.
pub fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn is_relative(module: &str) -> bool {
    module.starts_with('.')
}

fn compare_modules(a: &str, b: &str) -> Ordering {
    is_relative(a)
        .cmp(&is_relative(b))
        .then_with(|| collate(a, b))
}
