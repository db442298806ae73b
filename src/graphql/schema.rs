//! Engine adapter: turns a [SchemaDefinition] into an async-graphql dynamic
//! schema whose field resolvers all go through the [Processor].

use std::sync::Arc;

use anyhow::Result;
use async_graphql::dynamic::{Field, FieldFuture, FieldValue, InputValue, Object, ResolverContext, Schema};
use async_graphql::extensions::Tracing;
use async_graphql::{ErrorExtensions, Value};

use crate::security::Principal;

use super::{FieldDefinition, FieldNode, ObjectDefinition, Processor, SchemaDefinition};

/// Build the executable schema. Root query and mutation fields run the
/// operation access check; fields of every other type go straight to the pipeline.
pub fn build_schema(definition: &SchemaDefinition, processor: Arc<Processor>) -> Result<Schema> {
    let query = definition.query_type();
    let mutation = definition.mutation_type();

    let mut builder = Schema::build(query.name(), mutation.map(|m| m.name()), None)
        .extension(Tracing)
        .register(dynamic_object(query, true, &processor));
    if let Some(mutation) = mutation {
        builder = builder.register(dynamic_object(mutation, true, &processor));
    }
    for object in definition.types() {
        builder = builder.register(dynamic_object(object, false, &processor));
    }

    builder
        .finish()
        .map_err(|e| anyhow::anyhow!("Failed to build GraphQL schema: {}", e))
}

fn dynamic_object(definition: &ObjectDefinition, root: bool, processor: &Arc<Processor>) -> Object {
    let mut object = Object::new(definition.name());
    if let Some(description) = definition.describe() {
        object = object.description(description);
    }
    for field in definition.fields() {
        object = object.field(dynamic_field(definition.name(), field, root, processor));
    }
    object
}

fn dynamic_field(
    parent_type: &str,
    definition: &Arc<FieldDefinition>,
    root: bool,
    processor: &Arc<Processor>,
) -> Field {
    let parent_type: Arc<str> = Arc::from(parent_type);
    let resolved = definition.clone();
    let processor = processor.clone();

    let mut field = Field::new(definition.name(), definition.ty().clone(), move |ctx| {
        FieldFuture::new(resolve(
            ctx,
            processor.clone(),
            resolved.clone(),
            parent_type.clone(),
            root,
        ))
    });
    if let Some(description) = definition.describe() {
        field = field.description(description);
    }
    for argument in definition.arguments() {
        let mut input = InputValue::new(argument.name(), argument.ty().clone());
        if let Some(default) = argument.default() {
            input = input.default_value(default.clone());
        }
        if let Some(description) = argument.describe() {
            input = input.description(description);
        }
        field = field.argument(input);
    }
    field
}

async fn resolve<'a>(
    ctx: ResolverContext<'a>,
    processor: Arc<Processor>,
    definition: Arc<FieldDefinition>,
    parent_type: Arc<str>,
    root: bool,
) -> async_graphql::Result<Option<FieldValue<'a>>> {
    let field = ctx.ctx.field();
    let node = if root {
        FieldNode::from_selection_tree(field)?
    } else {
        FieldNode::from_selection(field)?
    };
    let node = Arc::new(node);
    let parent = ctx
        .parent_value
        .as_value()
        .cloned()
        .unwrap_or(Value::Null);
    let exec = processor.context(ctx.ctx.data_opt::<Principal>().cloned());

    let result = if root {
        processor
            .resolve_query(&definition, node, &parent_type, parent, &exec)
            .await
    } else {
        processor
            .resolve_field(&definition, node, &parent_type, parent, &exec)
            .await
    };

    match result.map_err(|e| e.extend())? {
        Value::Null => Ok(None),
        value => Ok(Some(FieldValue::value(value))),
    }
}
