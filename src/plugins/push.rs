//! Turns streaming endpoint methods into subscriptions.
//!
//! A method whose `200` response schema carries an `x-class-name` of a
//! streaming marker class returns `Subscription<T>` and calls
//! `client.subscribe` instead of `client.call`. The request init parameter
//! does not apply to subscriptions.

use super::{backbone, FileTag, Plugin, SharedStorage};
use crate::codegen::ast::{Expr, FunctionDeclaration, Keyword, SourceFile, Statement, Stmt, TsType};
use crate::codegen::utils::simple_name;
use crate::dependency::{DependencyManager, ImportKind};
use crate::document::{NodeKind, SchemaNode, SchemaRef};
use crate::error::{GeneratorError, Result};
use crate::processors::endpoint::response_schema;
use crate::processors::{collect_services, EndpointMethod, Nullability, TypeEnv, TypeSchemaProcessor, FRONTEND_PACKAGE};
use openapiv3::{ReferenceOr, Schema};

pub const PATH: &str = "push";

/// Simple names of the classes that mark a streaming response.
pub const PUSH_CLASSES: [&str; 2] = ["Flux", "EndpointSubscription"];

pub struct PushPlugin;

impl Plugin for PushPlugin {
    fn name(&self) -> &str {
        "PushPlugin"
    }

    fn path(&self) -> &str {
        PATH
    }

    fn execute(&self, storage: &mut SharedStorage<'_>) -> Result<()> {
        let tags = storage.file_tags().ok_or_else(|| {
            GeneratorError::configuration(
                PATH,
                format!(
                    "endpoint file tags are missing; the '{}' plugin must run first",
                    backbone::PATH
                ),
            )
        })?;

        let endpoints: Vec<_> = tags
            .iter()
            .filter_map(|(id, tag)| match tag {
                FileTag::Endpoint(service) => Some((*id, service.clone())),
                FileTag::Entity(_) => None,
            })
            .collect();
        let services = collect_services(storage.api);

        for (id, service) in endpoints {
            let Some(methods) = services.get(service.as_str()) else {
                continue;
            };
            let streaming: Vec<_> = methods
                .iter()
                .filter_map(|method| streaming_item(method).map(|item| (*method, item)))
                .collect();
            if streaming.is_empty() {
                continue;
            }
            let Some(file) = storage.sources.get(id) else {
                continue;
            };

            let rewritten = rewrite(storage, file, &streaming);
            tracing::debug!(
                file = %rewritten.name,
                methods = streaming.len(),
                "rewrote streaming methods"
            );
            storage.sources.replace(id, rewritten);
        }

        Ok(())
    }
}

/// Item schema of a streaming response, or `None` when the method is not
/// streaming.
fn streaming_item<'a>(method: &EndpointMethod<'a>) -> Option<StreamItem<'a>> {
    let schema = response_schema(method.name, method.operation)?;
    let node = marked_node(SchemaNode::new(schema))?;
    Some(match node.kind() {
        NodeKind::Array(Some(items)) => StreamItem::Schema(items),
        _ => node
            .type_parameters()
            .into_iter()
            .next()
            .map(StreamItem::Owned)
            .unwrap_or(StreamItem::Unknown),
    })
}

enum StreamItem<'a> {
    Schema(SchemaRef<'a>),
    Owned(ReferenceOr<Schema>),
    Unknown,
}

/// The node carrying a streaming `x-class-name`, looking through a
/// nullable wrapper.
fn marked_node(node: SchemaNode<'_>) -> Option<SchemaNode<'_>> {
    let is_push = |node: &SchemaNode<'_>| {
        node.class_name()
            .is_some_and(|class| PUSH_CLASSES.contains(&simple_name(class)))
    };
    if is_push(&node) {
        return Some(node);
    }
    match node.kind() {
        NodeKind::Composed { members, .. } => members
            .iter()
            .map(SchemaNode::new)
            .find(|member| is_push(member)),
        _ => None,
    }
}

fn rewrite(
    storage: &SharedStorage<'_>,
    file: &SourceFile,
    streaming: &[(EndpointMethod<'_>, StreamItem<'_>)],
) -> SourceFile {
    let mut dependencies = DependencyManager::from_statements(storage.options.paths(), &file.statements);

    let mut items = Vec::new();
    {
        let mut processor = TypeSchemaProcessor::new(&storage.resolver, &mut dependencies, &file.name);
        let env = TypeEnv::root();
        for (method, item) in streaming {
            let Some(local) = file.exported_local(method.name) else {
                continue;
            };
            let item = match item {
                StreamItem::Schema(items) => processor.process(*items, &env, Nullability::FromSchema),
                StreamItem::Owned(schema) => processor.process(schema, &env, Nullability::FromSchema),
                StreamItem::Unknown => TsType::keyword(Keyword::Unknown),
            };
            items.push((local.to_string(), item));
        }
    }
    if items.is_empty() {
        return file.clone();
    }

    let subscription = dependencies
        .imports
        .add_named(FRONTEND_PACKAGE, "Subscription", true);
    let replacements: Vec<_> = items
        .into_iter()
        .map(|(local, item)| (local, TsType::generic(subscription.clone(), vec![item])))
        .collect();

    let declarations: Vec<Statement> = file
        .declarations()
        .map(|statement| match statement {
            Statement::Function(function) => {
                let replacement = replacements
                    .iter()
                    .find(|(local, _)| *local == function.name)
                    .and_then(|(_, returns)| to_subscription(function, returns.clone()));
                match replacement {
                    Some(function) => Statement::Function(function),
                    None => statement.clone(),
                }
            }
            other => other.clone(),
        })
        .collect();

    if let Some(init) = dependencies
        .imports
        .identifier(ImportKind::Named, FRONTEND_PACKAGE, "EndpointRequestInit")
        .map(str::to_string)
    {
        if !declarations.iter().any(|statement| statement.mentions(&init)) {
            dependencies.imports.remove_by_id(&init);
        }
    }

    dependencies.assemble(file.name.clone(), declarations)
}

/// `async f(..., init?): Promise<T> { return client.call(s, m, p, init); }`
/// becomes `f(...): Subscription<T> { return client.subscribe(s, m, p); }`.
fn to_subscription(function: &FunctionDeclaration, returns: TsType) -> Option<FunctionDeclaration> {
    let [Stmt::Return(Expr::Call { callee, args })] = function.body.as_slice() else {
        tracing::warn!(function = %function.name, "unexpected endpoint function body");
        return None;
    };
    let Expr::Member { object, .. } = callee.as_ref() else {
        return None;
    };

    let mut params = function.params.clone();
    params.pop();
    let mut args = args.clone();
    args.pop();

    Some(FunctionDeclaration {
        name: function.name.clone(),
        is_async: false,
        params,
        return_type: Some(returns),
        body: vec![Stmt::Return(Expr::call(
            Expr::member(object.as_ref().clone(), "subscribe"),
            args,
        ))],
    })
}
