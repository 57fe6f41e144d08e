use thiserror::Error;

/// Errors raised by the generation pipeline.
///
/// Unresolvable type shapes are not errors: they degrade to `unknown` in the
/// generated code.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("invalid document: {0}")]
    Document(String),

    #[error("dangling reference {reference} at {location}")]
    DanglingReference { reference: String, location: String },

    #[error("plugin '{plugin}' is misconfigured: {message}")]
    Configuration { plugin: String, message: String },

    #[error("cannot load plugin '{path}': {reason}")]
    PluginLoad { path: String, reason: String },

    #[error("plugin '{plugin}' failed: {source}")]
    PluginFailed {
        plugin: String,
        #[source]
        source: Box<GeneratorError>,
    },

    #[error("failed to render banner for {file}: {source}")]
    Template {
        file: String,
        #[source]
        source: tera::Error,
    },
}

impl GeneratorError {
    pub fn configuration(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    pub fn is_document_error(&self) -> bool {
        matches!(self.root_cause(), Self::Document(_) | Self::DanglingReference { .. })
    }

    /// The error a failing plugin raised, without the plugin wrapper.
    pub fn root_cause(&self) -> &GeneratorError {
        match self {
            Self::PluginFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
