//! Schema lowering and the per-file logic of the standard plugins.

pub mod endpoint;
pub mod entity;
pub mod model;
pub mod type_schema;

pub use endpoint::{collect_services, endpoint_file_name, EndpointMethod, EndpointProcessor};
pub use entity::EntityProcessor;
pub use model::{model_file, ModelProcessor};
pub use type_schema::{Nullability, TypeEnv, TypeSchemaProcessor};

/// Runtime package providing the client, request options and subscriptions.
pub const FRONTEND_PACKAGE: &str = "@vaadin/hilla-frontend";
/// Package providing the form model base classes.
pub const FORM_PACKAGE: &str = "@vaadin/hilla-lit-form";

pub const JSON_MEDIA_TYPE: &str = "application/json";
