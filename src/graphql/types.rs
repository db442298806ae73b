//! Schema definitions: object types, fields and their arguments.
//!
//! Definitions are built once at startup, wrapped in `Arc` and shared
//! read-only by every request.

use std::fmt;
use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::TypeRef;
use async_trait::async_trait;

use crate::services::ResolverRef;

use super::{Arguments, ResolveInfo};

/// A field's own resolve behaviour, used when it declares no resolver reference.
#[async_trait]
pub trait FieldBehavior: Send + Sync {
    async fn resolve(
        &self,
        parent: Value,
        args: Arguments,
        info: ResolveInfo,
    ) -> anyhow::Result<Value>;
}

/// Declared argument of a field.
#[derive(Debug, Clone)]
pub struct ArgumentDefinition {
    name: String,
    ty: TypeRef,
    default_value: Option<Value>,
    description: Option<String>,
}

impl ArgumentDefinition {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            default_value: None,
            description: None,
        }
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn default(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn describe(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A named, typed field of an object type.
///
/// Resolution order: the declared [ResolverRef], else the field's
/// [FieldBehavior], else the same-named key of the parent value.
#[derive(Clone)]
pub struct FieldDefinition {
    name: String,
    ty: TypeRef,
    description: Option<String>,
    arguments: Vec<ArgumentDefinition>,
    resolver: Option<ResolverRef>,
    behavior: Option<Arc<dyn FieldBehavior>>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
            arguments: Vec::new(),
            resolver: None,
            behavior: None,
        }
    }

    pub fn argument(mut self, argument: ArgumentDefinition) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn resolver(mut self, resolver: ResolverRef) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn behavior(mut self, behavior: impl FieldBehavior + 'static) -> Self {
        self.behavior = Some(Arc::new(behavior));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn describe(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn arguments(&self) -> &[ArgumentDefinition] {
        &self.arguments
    }

    pub fn find_argument(&self, name: &str) -> Option<&ArgumentDefinition> {
        self.arguments.iter().find(|a| a.name == name)
    }

    pub fn resolver_ref(&self) -> Option<&ResolverRef> {
        self.resolver.as_ref()
    }

    pub fn field_behavior(&self) -> Option<&Arc<dyn FieldBehavior>> {
        self.behavior.as_ref()
    }
}

impl fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("arguments", &self.arguments)
            .field("resolver", &self.resolver)
            .field("behavior", &self.behavior.is_some())
            .finish()
    }
}

/// An object type and its fields.
#[derive(Debug, Clone)]
pub struct ObjectDefinition {
    name: String,
    description: Option<String>,
    fields: Vec<Arc<FieldDefinition>>,
}

impl ObjectDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(Arc::new(field));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn describe(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn fields(&self) -> &[Arc<FieldDefinition>] {
        &self.fields
    }

    pub fn find_field(&self, name: &str) -> Option<&Arc<FieldDefinition>> {
        self.fields.iter().find(|f| f.name() == name)
    }
}

/// Root types plus every other object type reachable from them.
#[derive(Debug, Clone)]
pub struct SchemaDefinition {
    query: ObjectDefinition,
    mutation: Option<ObjectDefinition>,
    types: Vec<ObjectDefinition>,
}

impl SchemaDefinition {
    pub fn new(query: ObjectDefinition) -> Self {
        Self {
            query,
            mutation: None,
            types: Vec::new(),
        }
    }

    pub fn mutation(mut self, mutation: ObjectDefinition) -> Self {
        self.mutation = Some(mutation);
        self
    }

    pub fn object(mut self, object: ObjectDefinition) -> Self {
        self.types.push(object);
        self
    }

    pub fn query_type(&self) -> &ObjectDefinition {
        &self.query
    }

    pub fn mutation_type(&self) -> Option<&ObjectDefinition> {
        self.mutation.as_ref()
    }

    pub fn types(&self) -> &[ObjectDefinition] {
        &self.types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lookup_helpers() {
        let object = ObjectDefinition::new("Query").field(
            FieldDefinition::new("greet", TypeRef::named_nn(TypeRef::STRING))
                .argument(ArgumentDefinition::new("name", TypeRef::named(TypeRef::STRING)))
                .resolver(ResolverRef::service("@greeter", "sayHello")),
        );
        let greet = object.find_field("greet").unwrap();
        assert!(greet.find_argument("name").is_some());
        assert!(greet.find_argument("other").is_none());
        assert!(greet.resolver_ref().is_some());
        assert!(greet.field_behavior().is_none());
        assert!(object.find_field("missing").is_none());
    }
}
