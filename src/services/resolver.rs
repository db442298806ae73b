//! Resolver references and their lookup.
//!
//! A field names its resolver either inline ([ResolverRef::Inline]) or as a
//! method on a container service ([ResolverRef::ServiceMethod], written
//! `@service` / `method`). [lookup] turns that into a [Handler] the pipeline
//! can invoke.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_graphql::Value;
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::ResolveError;
use crate::graphql::{Arguments, FieldBehavior, FieldDefinition, ResolveInfo};

use super::{ResolverService, ServiceContainer};

/// Callable resolver: `(parent, arguments, info) -> value`.
pub type ResolverFn =
    Arc<dyn Fn(Value, Arguments, ResolveInfo) -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync>;

/// Wrap an async closure as a [ResolverFn].
pub fn resolver_fn<F, Fut>(f: F) -> ResolverFn
where
    F: Fn(Value, Arguments, ResolveInfo) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    Arc::new(move |parent, args, info| f(parent, args, info).boxed())
}

/// How a field names its resolver.
#[derive(Clone)]
pub enum ResolverRef {
    Inline(ResolverFn),
    ServiceMethod { service: String, method: String },
}

impl ResolverRef {
    /// Inline resolver from an async closure.
    pub fn inline<F, Fut>(f: F) -> Self
    where
        F: Fn(Value, Arguments, ResolveInfo) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self::Inline(resolver_fn(f))
    }

    /// Service method reference; a leading `@` on the service id is accepted and dropped.
    pub fn service(service: impl AsRef<str>, method: impl Into<String>) -> Self {
        let service = service.as_ref();
        Self::ServiceMethod {
            service: service.strip_prefix('@').unwrap_or(service).to_string(),
            method: method.into(),
        }
    }
}

impl fmt::Debug for ResolverRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline(_) => f.write_str("Inline(..)"),
            Self::ServiceMethod { service, method } => f
                .debug_struct("ServiceMethod")
                .field("service", service)
                .field("method", method)
                .finish(),
        }
    }
}

/// A resolver ready to be invoked for one field.
#[derive(Clone)]
pub enum Handler {
    Inline(ResolverFn),
    Method {
        service: Arc<dyn ResolverService>,
        method: String,
    },
    Behavior(Arc<dyn FieldBehavior>),
    /// Read the same-named key off the parent value.
    Property(String),
}

impl Handler {
    pub async fn invoke(
        &self,
        parent: Value,
        args: Arguments,
        info: ResolveInfo,
    ) -> anyhow::Result<Value> {
        match self {
            Handler::Inline(f) => f(parent, args, info).await,
            Handler::Method { service, method } => {
                service.invoke(method, parent, args, info).await
            }
            Handler::Behavior(behavior) => behavior.resolve(parent, args, info).await,
            Handler::Property(name) => Ok(property_value(&parent, name)),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Inline(_) => f.write_str("Inline(..)"),
            Handler::Method { method, .. } => write!(f, "Method({})", method),
            Handler::Behavior(_) => f.write_str("Behavior(..)"),
            Handler::Property(name) => write!(f, "Property({})", name),
        }
    }
}

/// Resolve a field's declared resolver to exactly one handler.
pub fn lookup(field: &FieldDefinition, container: &ServiceContainer) -> Result<Handler, ResolveError> {
    match field.resolver_ref() {
        Some(ResolverRef::ServiceMethod { service, method }) => {
            let instance = container
                .get(service)
                .ok_or_else(|| ResolveError::ResolverNotFound {
                    service: service.clone(),
                    field: field.name().to_string(),
                })?;
            if !instance.has_method(method) {
                return Err(ResolveError::ResolverMethodNotFound {
                    method: method.clone(),
                    service: service.clone(),
                    field: field.name().to_string(),
                });
            }
            Ok(Handler::Method {
                service: instance,
                method: method.clone(),
            })
        }
        Some(ResolverRef::Inline(f)) => Ok(Handler::Inline(f.clone())),
        None => match field.field_behavior() {
            Some(behavior) => Ok(Handler::Behavior(behavior.clone())),
            None => Ok(Handler::Property(field.name().to_string())),
        },
    }
}

/// Default resolution: the parent's same-named key, `Null` when absent or not an object.
pub fn property_value(parent: &Value, name: &str) -> Value {
    match parent {
        Value::Object(map) => map.get(name).cloned().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use async_graphql::dynamic::TypeRef;

    use super::*;
    use crate::services::FnService;

    fn parent() -> Value {
        Value::from_json(serde_json::json!({ "name": "Ada", "age": 36 })).unwrap()
    }

    fn field(name: &str) -> FieldDefinition {
        FieldDefinition::new(name, TypeRef::named(TypeRef::STRING))
    }

    #[test]
    fn test_service_reference_strips_marker() {
        assert_matches!(
            ResolverRef::service("@greeter", "sayHello"),
            ResolverRef::ServiceMethod { ref service, ref method }
                if service == "greeter" && method == "sayHello"
        );
        assert_matches!(
            ResolverRef::service("greeter", "sayHello"),
            ResolverRef::ServiceMethod { ref service, .. } if service == "greeter"
        );
    }

    #[test]
    fn test_property_value() {
        assert_eq!(property_value(&parent(), "name"), Value::from("Ada"));
        assert_eq!(property_value(&parent(), "missing"), Value::Null);
        assert_eq!(property_value(&Value::Null, "name"), Value::Null);
        assert_eq!(property_value(&Value::from(3), "name"), Value::Null);
    }

    #[test]
    fn test_lookup_default_is_property() {
        let handler = lookup(&field("name"), &ServiceContainer::new()).unwrap();
        assert_matches!(handler, Handler::Property(ref name) if name == "name");
    }

    #[test]
    fn test_lookup_missing_service() {
        let field = field("greet").resolver(ResolverRef::service("@greeter", "sayHello"));
        assert_matches!(
            lookup(&field, &ServiceContainer::new()),
            Err(ResolveError::ResolverNotFound { ref service, ref field })
                if service == "greeter" && field == "greet"
        );
    }

    #[test]
    fn test_lookup_missing_method() {
        let container = ServiceContainer::builder()
            .add_service(
                "greeter",
                FnService::new().method("sayHello", |_, _, _| async { Ok(Value::Null) }),
            )
            .build();
        let field = field("greet").resolver(ResolverRef::service("@greeter", "sayGoodbye"));
        assert_matches!(
            lookup(&field, &container),
            Err(ResolveError::ResolverMethodNotFound { ref method, .. }) if method == "sayGoodbye"
        );
    }

    #[test]
    fn test_lookup_inline_wins_over_behavior() {
        struct Constant;

        #[async_trait::async_trait]
        impl FieldBehavior for Constant {
            async fn resolve(
                &self,
                _parent: Value,
                _args: Arguments,
                _info: ResolveInfo,
            ) -> anyhow::Result<Value> {
                Ok(Value::from("behavior"))
            }
        }

        let field = field("x")
            .behavior(Constant)
            .resolver(ResolverRef::inline(|_, _, _| async { Ok(Value::from("inline")) }));
        assert_matches!(lookup(&field, &ServiceContainer::new()), Ok(Handler::Inline(_)));

        let field = FieldDefinition::new("x", TypeRef::named(TypeRef::STRING)).behavior(Constant);
        assert_matches!(lookup(&field, &ServiceContainer::new()), Ok(Handler::Behavior(_)));
    }
}
