use super::{backbone, FileTag, Plugin, SharedStorage};
use crate::dependency::DependencyManager;
use crate::error::{GeneratorError, Result};

pub const PATH: &str = "barrel";
pub const BARREL_FILE: &str = "endpoints.ts";

/// Re-exports every endpoint module as a namespace from `endpoints.ts`.
pub struct BarrelPlugin;

impl Plugin for BarrelPlugin {
    fn name(&self) -> &str {
        "BarrelPlugin"
    }

    fn path(&self) -> &str {
        PATH
    }

    fn execute(&self, storage: &mut SharedStorage<'_>) -> Result<()> {
        let tags = storage.file_tags().ok_or_else(|| {
            GeneratorError::configuration(
                PATH,
                format!(
                    "endpoint file tags are missing; the '{}' plugin must run first",
                    backbone::PATH
                ),
            )
        })?;

        let mut dependencies = DependencyManager::new(storage.options.paths());
        for (id, tag) in tags {
            let FileTag::Endpoint(_) = tag else {
                continue;
            };
            let Some(file) = storage.sources.get(*id) else {
                continue;
            };
            let stem = file.name.strip_suffix(".ts").unwrap_or(&file.name);
            let module = dependencies
                .paths
                .module_path(&file.name, BARREL_FILE);
            let namespace = dependencies.imports.add_namespace(&module, stem);
            dependencies.exports.add_named(stem, false, namespace);
        }

        let file = dependencies.assemble(BARREL_FILE, Vec::new());
        storage.sources.add(file);
        Ok(())
    }
}
