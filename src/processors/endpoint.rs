//! Endpoint modules: one file per service with one async function per method.

use super::type_schema::{Nullability, TypeEnv, TypeSchemaProcessor};
use super::{FRONTEND_PACKAGE, JSON_MEDIA_TYPE};
use crate::codegen::ast::{
    Expr, FunctionDeclaration, Keyword, Param, SourceFile, Statement, Stmt, TsType,
};
use crate::codegen::utils::sanitize_identifier;
use crate::dependency::DependencyManager;
use crate::document::{NodeKind, SchemaNode};
use crate::error::Result;
use crate::plugins::SharedStorage;
use indexmap::IndexMap;
use openapiv3::{OpenAPI, Operation, ReferenceOr, Schema, StatusCode};

pub const ENDPOINT_SUFFIX: &str = "Endpoint";

#[derive(Debug, Clone, Copy)]
pub struct EndpointMethod<'a> {
    pub name: &'a str,
    pub operation: &'a Operation,
}

/// Groups `POST /{service}/{method}` operations by service, in document
/// order. Other paths and verbs are reported and skipped.
pub fn collect_services(api: &OpenAPI) -> IndexMap<&str, Vec<EndpointMethod<'_>>> {
    let mut services: IndexMap<&str, Vec<EndpointMethod<'_>>> = IndexMap::new();

    for (path, item) in &api.paths.paths {
        let ReferenceOr::Item(item) = item else {
            tracing::warn!(path = %path, "skipping referenced path item");
            continue;
        };

        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        let [service, method] = segments.as_slice() else {
            tracing::warn!(path = %path, "skipping path that is not /{{service}}/{{method}}");
            continue;
        };
        if service.is_empty() || method.is_empty() {
            tracing::warn!(path = %path, "skipping path with an empty segment");
            continue;
        }

        let other_verbs = [
            &item.get,
            &item.put,
            &item.delete,
            &item.options,
            &item.head,
            &item.patch,
            &item.trace,
        ];
        if other_verbs.iter().any(|operation| operation.is_some()) {
            tracing::warn!(path = %path, "only POST operations are generated");
        }

        let Some(operation) = &item.post else {
            continue;
        };
        services.entry(*service).or_default().push(EndpointMethod {
            name: *method,
            operation,
        });
    }

    services
}

/// `Foo` -> `FooEndpoint.ts`; names already ending in `Endpoint` are kept.
pub fn endpoint_file_name(service: &str) -> String {
    if service.ends_with(ENDPOINT_SUFFIX) {
        format!("{service}.ts")
    } else {
        format!("{service}{ENDPOINT_SUFFIX}.ts")
    }
}

/// Schema of the `200` JSON response. Other status codes are logged and
/// ignored.
pub fn response_schema<'a>(method: &str, operation: &'a Operation) -> Option<&'a ReferenceOr<Schema>> {
    let mut schema = None;
    for (code, response) in &operation.responses.responses {
        match (code, response) {
            (StatusCode::Code(200), ReferenceOr::Item(response)) => {
                schema = response
                    .content
                    .get(JSON_MEDIA_TYPE)
                    .and_then(|media| media.schema.as_ref());
            }
            (StatusCode::Code(200), ReferenceOr::Reference { reference }) => {
                tracing::warn!(method, reference = %reference, "referenced responses are not supported");
            }
            (code, _) => {
                tracing::warn!(method, code = ?code, "ignoring unsupported response code");
            }
        }
    }
    schema
}

/// A request body property turned into a function parameter.
struct Parameter<'a> {
    name: &'a str,
    schema: &'a ReferenceOr<Box<Schema>>,
    required: bool,
}

pub struct EndpointProcessor<'s, 'a> {
    storage: &'s SharedStorage<'a>,
    service: &'a str,
    methods: &'s [EndpointMethod<'a>],
}

impl<'s, 'a> EndpointProcessor<'s, 'a> {
    pub fn new(
        storage: &'s SharedStorage<'a>,
        service: &'a str,
        methods: &'s [EndpointMethod<'a>],
    ) -> Self {
        Self {
            storage,
            service,
            methods,
        }
    }

    pub fn process(&self) -> Result<SourceFile> {
        let file_name = endpoint_file_name(self.service);
        let mut dependencies = DependencyManager::new(self.storage.options.paths());

        let mut functions = Vec::with_capacity(self.methods.len());
        for method in self.methods {
            let id = dependencies.mint(method.name);
            functions.push((*method, id, self.parameters(method)?));
        }

        // Parameters shadow module-level identifiers inside the function.
        for (_, _, parameters) in &functions {
            for parameter in parameters {
                dependencies.reserve(&sanitize_identifier(parameter.name));
            }
        }

        let client_module = dependencies
            .paths
            .module_path(self.storage.options.client_file(), &file_name);
        let client = dependencies.imports.add_default(&client_module, "client", false);
        let init_type = dependencies
            .imports
            .add_named(FRONTEND_PACKAGE, "EndpointRequestInit", true);

        let mut declarations = Vec::with_capacity(functions.len());
        for (method, id, parameters) in &functions {
            let function = self.function(
                &mut dependencies,
                &file_name,
                method,
                id,
                parameters,
                &client,
                &init_type,
            );
            declarations.push(Statement::Function(function));
            dependencies.exports.add_named(method.name, false, id.clone());
        }

        tracing::debug!(
            file = %file_name,
            methods = self.methods.len(),
            "generated endpoint module"
        );
        Ok(dependencies.assemble(file_name, declarations))
    }

    fn parameters(&self, method: &EndpointMethod<'a>) -> Result<Vec<Parameter<'a>>> {
        let body = match &method.operation.request_body {
            None => return Ok(Vec::new()),
            Some(ReferenceOr::Item(body)) => body,
            Some(ReferenceOr::Reference { reference }) => {
                tracing::warn!(method = method.name, reference = %reference, "referenced request bodies are not supported");
                return Ok(Vec::new());
            }
        };
        let Some(schema) = body
            .content
            .get(JSON_MEDIA_TYPE)
            .and_then(|media| media.schema.as_ref())
        else {
            return Ok(Vec::new());
        };

        let schema = self.storage.resolver.resolve(schema)?;
        match SchemaNode::new(schema).kind() {
            NodeKind::Object {
                properties,
                required,
            } => Ok(properties
                .iter()
                .map(|(name, schema)| Parameter {
                    name,
                    schema,
                    required: required.contains(name),
                })
                .collect()),
            _ => {
                tracing::warn!(method = method.name, "request body is not an object, ignoring");
                Ok(Vec::new())
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn function(
        &self,
        dependencies: &mut DependencyManager,
        file_name: &str,
        method: &EndpointMethod<'a>,
        id: &str,
        parameters: &[Parameter<'a>],
        client: &str,
        init_type: &str,
    ) -> FunctionDeclaration {
        let env = TypeEnv::root();
        let mut processor = TypeSchemaProcessor::new(&self.storage.resolver, dependencies, file_name);

        let mut params = Vec::with_capacity(parameters.len() + 1);
        let mut arguments = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            let policy = if parameter.required {
                Nullability::NonNull
            } else {
                Nullability::FromSchema
            };
            let local = sanitize_identifier(parameter.name);
            params.push(Param::new(
                local.clone(),
                processor.process(parameter.schema, &env, policy),
            ));
            arguments.push((parameter.name.to_string(), Expr::Ident(local)));
        }

        let init = if parameters.iter().any(|p| p.name == "init") {
            "__init"
        } else {
            "init"
        };
        params.push(Param {
            name: init.to_string(),
            ty: Some(TsType::reference(init_type)),
            optional: true,
        });

        let returns = response_schema(method.name, method.operation)
            .map(|schema| processor.process(schema, &env, Nullability::FromSchema))
            .unwrap_or(TsType::keyword(Keyword::Void));

        FunctionDeclaration {
            name: id.to_string(),
            is_async: true,
            params,
            return_type: Some(TsType::generic("Promise", vec![returns])),
            body: vec![Stmt::Return(Expr::call(
                Expr::member(Expr::ident(client), "call"),
                vec![
                    Expr::Str(self.service.to_string()),
                    Expr::Str(method.name.to_string()),
                    Expr::Object(arguments),
                    Expr::ident(init),
                ],
            ))],
        }
    }
}
