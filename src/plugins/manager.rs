use super::{Plugin, PluginRegistry, SharedStorage};
use crate::error::{GeneratorError, Result};

/// Runs plugins one after another over the same storage.
pub struct PluginManager {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginManager {
    pub fn new(plugins: Vec<Box<dyn Plugin>>) -> Self {
        Self { plugins }
    }

    /// Loads every plugin up front so that an unknown path fails before any
    /// plugin has run.
    pub fn load<S: AsRef<str>>(registry: &PluginRegistry, paths: &[S]) -> Result<Self> {
        let plugins = paths
            .iter()
            .map(|path| registry.load(path.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(plugins))
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|plugin| plugin.name()).collect()
    }

    /// Stops at the first failing plugin.
    pub fn execute(&self, storage: &mut SharedStorage<'_>) -> Result<()> {
        for plugin in &self.plugins {
            let span = tracing::info_span!("plugin", name = plugin.name());
            let _guard = span.enter();

            let before = storage.sources.len();
            plugin
                .execute(storage)
                .map_err(|source| GeneratorError::PluginFailed {
                    plugin: plugin.name().to_string(),
                    source: Box::new(source),
                })?;
            tracing::debug!(
                added = storage.sources.len() - before,
                "plugin finished"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::ast::SourceFile;
    use crate::document::bundle;
    use crate::plugins::GenerationOptions;

    struct Emitter(&'static str);

    impl Plugin for Emitter {
        fn name(&self) -> &str {
            self.0
        }

        fn path(&self) -> &str {
            self.0
        }

        fn execute(&self, storage: &mut SharedStorage<'_>) -> Result<()> {
            storage.sources.add(SourceFile::new(format!("{}.ts", self.0), vec![]));
            Ok(())
        }
    }

    struct Failing;

    impl Plugin for Failing {
        fn name(&self) -> &str {
            "Failing"
        }

        fn path(&self) -> &str {
            "failing"
        }

        fn execute(&self, _storage: &mut SharedStorage<'_>) -> Result<()> {
            Err(GeneratorError::configuration("failing", "always fails"))
        }
    }

    const DOCUMENT: &str = r#"{ "openapi": "3.0.1", "info": { "title": "T", "version": "1" }, "paths": {} }"#;

    #[test]
    fn test_plugins_run_in_order() {
        let bundle = bundle(DOCUMENT).unwrap();
        let mut storage = SharedStorage::new(&bundle.api, GenerationOptions::default());
        let manager = PluginManager::new(vec![Box::new(Emitter("first")), Box::new(Emitter("second"))]);

        manager.execute(&mut storage).unwrap();

        let names: Vec<_> = storage.sources.iter().map(|(_, file)| file.name.clone()).collect();
        assert_eq!(names, ["first.ts", "second.ts"]);
    }

    #[test]
    fn test_first_failure_aborts() {
        let bundle = bundle(DOCUMENT).unwrap();
        let mut storage = SharedStorage::new(&bundle.api, GenerationOptions::default());
        let manager = PluginManager::new(vec![
            Box::new(Emitter("first")),
            Box::new(Failing),
            Box::new(Emitter("never")),
        ]);

        let err = manager.execute(&mut storage).unwrap_err();
        assert!(matches!(err, GeneratorError::PluginFailed { ref plugin, .. } if plugin == "Failing"));
        assert_eq!(storage.sources.len(), 1);
    }

    #[test]
    fn test_unknown_plugin_fails_before_running() {
        let registry = PluginRegistry::new();
        let err = PluginManager::load(&registry, &["backbone", "missing"]).err().unwrap();
        assert!(matches!(err, GeneratorError::PluginLoad { ref path, .. } if path == "missing"));
    }
}
