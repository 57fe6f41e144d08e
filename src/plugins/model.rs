use super::{Plugin, SharedStorage};
use crate::error::Result;
use crate::processors::ModelProcessor;

pub const PATH: &str = "model";

/// Emits a form model class for every object entity.
pub struct ModelPlugin;

impl Plugin for ModelPlugin {
    fn name(&self) -> &str {
        "ModelPlugin"
    }

    fn path(&self) -> &str {
        PATH
    }

    fn execute(&self, storage: &mut SharedStorage<'_>) -> Result<()> {
        let components: Vec<_> = storage.resolver.components().collect();
        for (name, component) in components {
            let Some(file) = ModelProcessor::new(storage, name, component).process() else {
                tracing::debug!(entity = name, "no form model for entity");
                continue;
            };
            storage.sources.add(file);
        }
        Ok(())
    }
}
