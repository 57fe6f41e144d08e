use crate::dependency::path::DEFAULT_IMPORT_EXTENSION;
use crate::plugins::{GenerationOptions, STANDARD_PLUGINS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    pub version: String,

    #[serde(default)]
    pub input: Option<InputConfig>,

    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Plugin paths in execution order.
    #[serde(default = "default_plugins")]
    pub plugins: Vec<String>,

    #[serde(default)]
    pub verbose: bool,

    #[serde(rename = "importExtension", default = "default_import_extension")]
    pub import_extension: String,

    #[serde(rename = "aliasRoot", default)]
    pub alias_root: Option<String>,

    #[serde(rename = "clientPrefix", default = "default_client_prefix")]
    pub client_prefix: String,

    /// `tera` template prepended to every generated file.
    #[serde(default)]
    pub banner: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct InputConfig {
    pub source: PathBuf,
}

fn default_plugins() -> Vec<String> {
    STANDARD_PLUGINS.iter().map(|path| path.to_string()).collect()
}

fn default_import_extension() -> String {
    DEFAULT_IMPORT_EXTENSION.to_string()
}

fn default_client_prefix() -> String {
    "connect".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            input: None,
            output: Some(PathBuf::from("generated")),
            plugins: default_plugins(),
            verbose: false,
            import_extension: default_import_extension(),
            alias_root: None,
            client_prefix: default_client_prefix(),
            banner: None,
        }
    }
}

impl Config {
    /// Options handed to the plugins for a run writing into `output_dir`.
    pub fn generation_options(&self, output_dir: Option<PathBuf>) -> GenerationOptions {
        GenerationOptions {
            output_dir,
            import_extension: self.import_extension.clone(),
            alias_root: self.alias_root.clone(),
            client_prefix: self.client_prefix.clone(),
        }
    }
}
