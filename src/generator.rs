//! Entry point of the library: document text in, generated files out.

use crate::codegen::print;
use crate::document::bundle;
use crate::error::{GeneratorError, Result};
use crate::plugins::{GenerationOptions, PluginManager, PluginRegistry, SharedStorage};
use tera::{Context, Tera};

const BANNER_TEMPLATE: &str = "banner";

/// A generated file, named relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub name: String,
    pub content: String,
}

pub struct Generator {
    manager: PluginManager,
    options: GenerationOptions,
    banner: Option<String>,
}

impl Generator {
    pub fn new(manager: PluginManager, options: GenerationOptions) -> Self {
        Self {
            manager,
            options,
            banner: None,
        }
    }

    /// Loads the plugins registered under `paths` from the standard registry.
    pub fn from_paths<S: AsRef<str>>(paths: &[S], options: GenerationOptions) -> Result<Self> {
        let manager = PluginManager::load(&PluginRegistry::new(), paths)?;
        Ok(Self::new(manager, options))
    }

    /// Sets a `tera` template printed at the top of every file. The template
    /// sees `file_name`, `title` and `version`.
    pub fn with_banner(mut self, banner: Option<String>) -> Self {
        self.banner = banner;
        self
    }

    pub fn process(&self, input: &str) -> Result<Vec<File>> {
        let bundle = bundle(input)?;
        tracing::debug!(
            references = bundle.index.len(),
            plugins = ?self.manager.plugin_names(),
            "document bundled"
        );

        let mut storage = SharedStorage::new(&bundle.api, self.options.clone());
        self.manager.execute(&mut storage)?;

        let tera = self.banner_template()?;
        let mut files = Vec::with_capacity(storage.sources.len());
        for source in storage.sources.into_files() {
            let mut content = print(&source);
            if let Some(tera) = &tera {
                let mut context = Context::new();
                context.insert("file_name", &source.name);
                context.insert("title", &bundle.api.info.title);
                context.insert("version", &bundle.api.info.version);

                let mut banner = tera
                    .render(BANNER_TEMPLATE, &context)
                    .map_err(|source_error| GeneratorError::Template {
                        file: source.name.clone(),
                        source: source_error,
                    })?;
                if !banner.ends_with('\n') {
                    banner.push('\n');
                }
                content.insert_str(0, &banner);
            }
            files.push(File {
                name: source.name,
                content,
            });
        }

        tracing::info!(files = files.len(), "generation finished");
        Ok(files)
    }

    fn banner_template(&self) -> Result<Option<Tera>> {
        let Some(banner) = &self.banner else {
            return Ok(None);
        };
        let mut tera = Tera::default();
        tera.add_raw_template(BANNER_TEMPLATE, banner)
            .map_err(|source| GeneratorError::Template {
                file: BANNER_TEMPLATE.to_string(),
                source,
            })?;
        Ok(Some(tera))
    }
}
