//! State threaded through one plugin run.

use crate::codegen::ast::SourceFile;
use crate::dependency::PathManager;
use crate::document::ReferenceResolver;
use indexmap::IndexMap;
use openapiv3::OpenAPI;
use std::any::Any;
use std::collections::HashMap;
use std::path::PathBuf;

/// Storage key under which the backbone plugin records its [`FileTags`].
pub const BACKBONE_FILE_TAGS: &str = "backbone.file-tags";

/// File name of a hand-written client that replaces the generated one.
pub const CLIENT_OVERRIDE_FILE: &str = "connect-client.ts";
pub const CLIENT_DEFAULT_FILE: &str = "connect-client.default.ts";

/// Role of a file emitted by the backbone plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileTag {
    /// Endpoint module for the named service.
    Endpoint(String),
    /// Declaration of the named component schema.
    Entity(String),
}

pub type FileTags = IndexMap<FileId, FileTag>;

/// Stable index of a file in [`SourceFiles`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(usize);

/// Arena of generated files in emission order.
#[derive(Debug, Default)]
pub struct SourceFiles {
    files: Vec<SourceFile>,
}

impl SourceFiles {
    pub fn add(&mut self, file: SourceFile) -> FileId {
        self.files.push(file);
        FileId(self.files.len() - 1)
    }

    pub fn get(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0)
    }

    /// Swaps the file stored under `id`, returning the previous one.
    pub fn replace(&mut self, id: FileId, file: SourceFile) -> Option<SourceFile> {
        self.files
            .get_mut(id.0)
            .map(|slot| std::mem::replace(slot, file))
    }

    pub fn find(&self, name: &str) -> Option<FileId> {
        self.files
            .iter()
            .position(|file| file.name == name)
            .map(FileId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
        self.files
            .iter()
            .enumerate()
            .map(|(index, file)| (FileId(index), file))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn into_files(self) -> Vec<SourceFile> {
        self.files
    }
}

/// Values plugins leave for later plugins, keyed by constants the producing
/// plugin declares.
#[derive(Default)]
pub struct PluginStorage {
    values: HashMap<&'static str, Box<dyn Any>>,
}

impl PluginStorage {
    pub fn insert<T: Any>(&mut self, key: &'static str, value: T) {
        self.values.insert(key, Box::new(value));
    }

    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|value| value.downcast_ref())
    }

    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.values
            .get_mut(key)
            .and_then(|value| value.downcast_mut())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

impl std::fmt::Debug for PluginStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Directory the files will be written to; used to detect a client
    /// override.
    pub output_dir: Option<PathBuf>,
    pub import_extension: String,
    pub alias_root: Option<String>,
    /// Endpoint prefix passed to the generated client.
    pub client_prefix: String,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            import_extension: crate::dependency::path::DEFAULT_IMPORT_EXTENSION.to_string(),
            alias_root: None,
            client_prefix: "connect".to_string(),
        }
    }
}

impl GenerationOptions {
    pub fn paths(&self) -> PathManager {
        PathManager::new(self.import_extension.clone(), self.alias_root.clone())
    }

    pub fn has_client_override(&self) -> bool {
        self.output_dir
            .as_ref()
            .is_some_and(|dir| dir.join(CLIENT_OVERRIDE_FILE).is_file())
    }

    /// The client module endpoint files import from.
    pub fn client_file(&self) -> &'static str {
        if self.has_client_override() {
            CLIENT_OVERRIDE_FILE
        } else {
            CLIENT_DEFAULT_FILE
        }
    }
}

pub struct SharedStorage<'a> {
    pub api: &'a OpenAPI,
    pub resolver: ReferenceResolver<'a>,
    pub plugin_storage: PluginStorage,
    pub sources: SourceFiles,
    pub options: GenerationOptions,
}

impl<'a> SharedStorage<'a> {
    pub fn new(api: &'a OpenAPI, options: GenerationOptions) -> Self {
        Self {
            api,
            resolver: ReferenceResolver::new(api),
            plugin_storage: PluginStorage::default(),
            sources: SourceFiles::default(),
            options,
        }
    }

    pub fn file_tags(&self) -> Option<&FileTags> {
        self.plugin_storage.get(BACKBONE_FILE_TAGS)
    }
}
