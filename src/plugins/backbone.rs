use super::{FileTag, FileTags, Plugin, SharedStorage, BACKBONE_FILE_TAGS};
use crate::error::Result;
use crate::processors::{collect_services, EndpointProcessor, EntityProcessor};

pub const PATH: &str = "backbone";

/// Emits the endpoint modules and the entity declarations every other
/// plugin builds on, and tags each file it emits.
pub struct BackbonePlugin;

impl Plugin for BackbonePlugin {
    fn name(&self) -> &str {
        "BackbonePlugin"
    }

    fn path(&self) -> &str {
        PATH
    }

    fn execute(&self, storage: &mut SharedStorage<'_>) -> Result<()> {
        let api = storage.api;
        let mut tags = FileTags::new();

        for (service, methods) in collect_services(api) {
            let file = EndpointProcessor::new(storage, service, &methods).process()?;
            let id = storage.sources.add(file);
            tags.insert(id, FileTag::Endpoint(service.to_string()));
        }

        let components: Vec<_> = storage.resolver.components().collect();
        for (name, component) in components {
            let file = EntityProcessor::new(storage, name, component).process();
            let id = storage.sources.add(file);
            tags.insert(id, FileTag::Entity(name.to_string()));
        }

        tracing::info!(files = tags.len(), "generated endpoints and entities");
        storage.plugin_storage.insert(BACKBONE_FILE_TAGS, tags);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::bundle;
    use crate::plugins::GenerationOptions;

    #[test]
    fn test_tags_every_file() {
        let bundle = bundle(
            r##"{
              "openapi": "3.0.1",
              "info": { "title": "T", "version": "1" },
              "paths": {
                "/UserEndpoint/list": { "post": { "responses": { "200": { "description": "" } } } }
              },
              "components": { "schemas": { "com.example.User": { "type": "object", "properties": {} } } }
            }"##,
        )
        .unwrap();
        let mut storage = SharedStorage::new(&bundle.api, GenerationOptions::default());

        BackbonePlugin.execute(&mut storage).unwrap();

        let tags = storage.file_tags().unwrap();
        let tagged: Vec<_> = tags
            .iter()
            .map(|(id, tag)| (storage.sources.get(*id).unwrap().name.as_str(), tag.clone()))
            .collect();
        assert_eq!(
            tagged,
            [
                ("UserEndpoint.ts", FileTag::Endpoint("UserEndpoint".into())),
                ("com/example/User.ts", FileTag::Entity("com.example.User".into())),
            ]
        );
    }
}
