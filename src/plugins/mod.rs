//! The plugin contract and the standard plugin set.
//!
//! Plugins are constructed from a [`PluginRegistry`] by path and run in
//! order by the [`PluginManager`], each mutating the same
//! [`SharedStorage`].

pub mod backbone;
pub mod barrel;
pub mod client;
pub mod manager;
pub mod model;
pub mod push;
pub mod storage;
pub mod subtypes;

use crate::error::{GeneratorError, Result};
use indexmap::IndexMap;

pub use backbone::BackbonePlugin;
pub use barrel::BarrelPlugin;
pub use client::ClientPlugin;
pub use manager::PluginManager;
pub use model::ModelPlugin;
pub use push::PushPlugin;
pub use storage::{
    FileId, FileTag, FileTags, GenerationOptions, PluginStorage, SharedStorage, SourceFiles,
    BACKBONE_FILE_TAGS,
};
pub use subtypes::SubTypesPlugin;

/// Standard plugins in their default execution order.
pub const STANDARD_PLUGINS: [&str; 6] = [
    backbone::PATH,
    client::PATH,
    barrel::PATH,
    model::PATH,
    push::PATH,
    subtypes::PATH,
];

/// A generation step. Plugins keep no state between runs; everything they
/// produce goes into the shared storage.
pub trait Plugin {
    /// Human-readable name used in logs and errors.
    fn name(&self) -> &str;

    /// Path the plugin is loaded by.
    fn path(&self) -> &str;

    fn execute(&self, storage: &mut SharedStorage<'_>) -> Result<()>;
}

pub type PluginConstructor = fn() -> Box<dyn Plugin>;

/// Named plugin constructors.
pub struct PluginRegistry {
    constructors: IndexMap<String, PluginConstructor>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            constructors: IndexMap::new(),
        };

        registry.register(backbone::PATH, || Box::new(BackbonePlugin));
        registry.register(client::PATH, || Box::new(ClientPlugin));
        registry.register(barrel::PATH, || Box::new(BarrelPlugin));
        registry.register(model::PATH, || Box::new(ModelPlugin));
        registry.register(push::PATH, || Box::new(PushPlugin));
        registry.register(subtypes::PATH, || Box::new(SubTypesPlugin));

        registry
    }

    pub fn register(&mut self, path: impl Into<String>, constructor: PluginConstructor) {
        self.constructors.insert(path.into(), constructor);
    }

    /// Constructs the plugin registered under `path` and checks that it
    /// reports that path.
    pub fn load(&self, path: &str) -> Result<Box<dyn Plugin>> {
        let constructor = self
            .constructors
            .get(path)
            .ok_or_else(|| GeneratorError::PluginLoad {
                path: path.to_string(),
                reason: format!(
                    "no plugin registered under this path (available: {})",
                    self.available_plugins().join(", ")
                ),
            })?;

        let plugin = constructor();
        if plugin.path() != path {
            return Err(GeneratorError::PluginLoad {
                path: path.to_string(),
                reason: format!("constructor produced plugin with path '{}'", plugin.path()),
            });
        }
        Ok(plugin)
    }

    pub fn available_plugins(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Mislabelled;

    impl Plugin for Mislabelled {
        fn name(&self) -> &str {
            "Mislabelled"
        }

        fn path(&self) -> &str {
            "something-else"
        }

        fn execute(&self, _storage: &mut SharedStorage<'_>) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_standard_plugins_load() {
        let registry = PluginRegistry::new();
        for path in STANDARD_PLUGINS {
            assert_eq!(registry.load(path).unwrap().path(), path);
        }
        assert_eq!(registry.available_plugins(), STANDARD_PLUGINS);
    }

    #[test]
    fn test_unknown_path_fails() {
        let registry = PluginRegistry::new();
        let err = registry.load("./plugins/custom.js").err().unwrap();
        assert!(matches!(err, GeneratorError::PluginLoad { ref path, .. } if path == "./plugins/custom.js"));
    }

    #[test]
    fn test_contract_mismatch_fails() {
        let mut registry = PluginRegistry::new();
        registry.register("custom", || Box::new(Mislabelled));
        let err = registry.load("custom").err().unwrap();
        assert!(err.to_string().contains("something-else"));
    }
}
