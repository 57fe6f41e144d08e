//! Generates TypeScript endpoint clients, entity declarations and form models
//! from OpenAPI 3.0 descriptions of reflected server endpoints.
//!
//! ```no_run
//! use endpoint_generator::{GenerationOptions, Generator, STANDARD_PLUGINS};
//!
//! let generator = Generator::from_paths(&STANDARD_PLUGINS, GenerationOptions::default())?;
//! for file in generator.process(&std::fs::read_to_string("openapi.json")?)? {
//!     println!("{}", file.name);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod codegen;
pub mod config;
pub mod dependency;
pub mod document;
pub mod error;
pub mod generator;
pub mod plugins;
pub mod processors;

pub use error::{GeneratorError, Result};
pub use generator::{File, Generator};
pub use plugins::{
    GenerationOptions, Plugin, PluginManager, PluginRegistry, SharedStorage, STANDARD_PLUGINS,
};
