use super::schema::{Config, InputConfig};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "./.config/endpoint-generator.yaml";

/// Load configuration from file or return default
pub fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config_path = match custom_path {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(DEFAULT_CONFIG_PATH),
    };

    if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        tracing::debug!(path = ?config_path, plugins = ?config.plugins, "loaded config");
        Ok(config)
    } else if custom_path.is_some() {
        anyhow::bail!("Config file not found: {:?}", config_path);
    } else {
        Ok(Config::default())
    }
}

/// Command line values that override the config file.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub spec: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub verbose: bool,
    pub plugins: Vec<String>,
}

/// Merge config with CLI arguments (CLI takes precedence)
pub fn merge_with_cli_args(mut config: Config, cli: CliOverrides) -> Config {
    if let Some(source) = cli.spec {
        match &mut config.input {
            Some(input) => input.source = source,
            None => config.input = Some(InputConfig { source }),
        }
    }

    if let Some(output) = cli.output {
        config.output = Some(output);
    }

    config.verbose |= cli.verbose;

    if !cli.plugins.is_empty() {
        config.plugins = cli.plugins;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::STANDARD_PLUGINS;

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_file_fields_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "version: \"1.0\"\ninput:\n  source: api/openapi.json\nplugins: [backbone, client]\nimportExtension: \"\"\nbanner: \"// {{ title }}\"\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.input.unwrap().source, PathBuf::from("api/openapi.json"));
        assert_eq!(config.plugins, ["backbone", "client"]);
        assert_eq!(config.import_extension, "");
        assert_eq!(config.client_prefix, "connect");
        assert_eq!(config.banner.as_deref(), Some("// {{ title }}"));
        assert!(!config.verbose);
    }

    #[test]
    fn test_cli_overrides_file() {
        let config = Config {
            input: Some(InputConfig {
                source: PathBuf::from("from-file.json"),
            }),
            ..Config::default()
        };

        let merged = merge_with_cli_args(
            config,
            CliOverrides {
                spec: Some(PathBuf::from("from-cli.json")),
                output: Some(PathBuf::from("out")),
                verbose: true,
                plugins: vec!["backbone".to_string()],
            },
        );

        assert_eq!(merged.input.unwrap().source, PathBuf::from("from-cli.json"));
        assert_eq!(merged.output, Some(PathBuf::from("out")));
        assert!(merged.verbose);
        assert_eq!(merged.plugins, ["backbone"]);
    }

    #[test]
    fn test_defaults_run_every_standard_plugin() {
        let merged = merge_with_cli_args(Config::default(), CliOverrides::default());
        assert_eq!(merged.plugins, STANDARD_PLUGINS);
        assert!(merged.input.is_none());

        let options = merged.generation_options(None);
        assert_eq!(options.import_extension, ".js");
        assert_eq!(options.client_prefix, "connect");
    }
}
