//! Service container for resolver services.
//!
//! Field resolvers written as `@service` / `method` are looked up here by
//! service id. The container is shared read-only across requests; registration
//! normally happens once, before the schema is built.
//!
//! # Example
//!
//! ```ignore
//! let container = ServiceContainer::builder()
//!     .add_service("greeter", FnService::new().method("sayHello", |_, args, _| async move {
//!         Ok(Value::from(format!("Hi {}", args.get_str("name").unwrap_or("there"))))
//!     }))
//!     .build();
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_graphql::Value;
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::graphql::{Arguments, ResolveInfo};

use super::resolver::{ResolverFn, resolver_fn};

/// A service whose methods can back field resolvers.
#[async_trait]
pub trait ResolverService: Send + Sync + 'static {
    /// Whether `method` can be invoked on this service.
    fn has_method(&self, method: &str) -> bool;

    /// Invoke `method` with the resolver arguments.
    async fn invoke(
        &self,
        method: &str,
        parent: Value,
        args: Arguments,
        info: ResolveInfo,
    ) -> anyhow::Result<Value>;
}

/// Closure-backed service: a table of named resolver functions.
#[derive(Clone, Default)]
pub struct FnService {
    methods: HashMap<String, ResolverFn>,
}

impl FnService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method<F, Fut>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value, Arguments, ResolveInfo) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.methods.insert(name.into(), resolver_fn(f));
        self
    }
}

#[async_trait]
impl ResolverService for FnService {
    fn has_method(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    async fn invoke(
        &self,
        method: &str,
        parent: Value,
        args: Arguments,
        info: ResolveInfo,
    ) -> anyhow::Result<Value> {
        match self.methods.get(method) {
            Some(f) => f(parent, args, info).await,
            None => anyhow::bail!("Method not found: {}", method),
        }
    }
}

/// Registry of resolver services keyed by id.
#[derive(Default)]
pub struct ServiceContainer {
    services: RwLock<HashMap<String, Arc<dyn ResolverService>>>,
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ServiceContainerBuilder {
        ServiceContainerBuilder::default()
    }

    /// Register a service. An existing service with the same id is replaced.
    pub fn register(&self, id: impl Into<String>, service: Arc<dyn ResolverService>) {
        let id = id.into();
        let mut guard = self.services.write();
        if guard.insert(id.clone(), service).is_some() {
            warn!(service = %id, "Service '{}' reregistered, overwriting previous", id);
        } else {
            info!(service = %id, "Service '{}' registered", id);
        }
    }

    /// Remove a service, returning it if it was registered.
    pub fn unregister(&self, id: &str) -> Option<Arc<dyn ResolverService>> {
        let out = self.services.write().remove(id);
        if out.is_some() {
            info!(service = %id, "Service '{}' unregistered", id);
        }
        out
    }

    pub fn has(&self, id: &str) -> bool {
        self.services.read().contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn ResolverService>> {
        self.services.read().get(id).cloned()
    }

    /// Registered ids, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.read().keys().cloned().collect();
        names.sort();
        names
    }
}

/// Collects services before the container is shared.
#[derive(Default)]
pub struct ServiceContainerBuilder {
    registrations: Vec<(String, Arc<dyn ResolverService>)>,
}

impl ServiceContainerBuilder {
    pub fn add_service(mut self, id: impl Into<String>, service: impl ResolverService) -> Self {
        let service: Arc<dyn ResolverService> = Arc::new(service);
        self.registrations.push((id.into(), service));
        self
    }

    pub fn add_shared(mut self, id: impl Into<String>, service: Arc<dyn ResolverService>) -> Self {
        self.registrations.push((id.into(), service));
        self
    }

    pub fn build(self) -> ServiceContainer {
        let container = ServiceContainer::new();
        for (id, service) in self.registrations {
            container.register(id, service);
        }
        container
    }
}

#[cfg(test)]
mod tests {
    use async_graphql::dynamic::TypeRef;

    use super::*;
    use crate::graphql::{ExecutionContext, FieldDefinition, FieldNode};

    fn info(container: Arc<ServiceContainer>) -> ResolveInfo {
        ResolveInfo::new(
            Arc::new(FieldDefinition::new("greet", TypeRef::named(TypeRef::STRING))),
            Arc::new(FieldNode::new("greet")),
            "Query",
            ExecutionContext::new(container, None),
        )
    }

    fn greeter() -> FnService {
        FnService::new().method("sayHello", |_, args: Arguments, _| async move {
            let name = args.get_str("name").unwrap_or("there").to_string();
            Ok(Value::from(format!("Hi {}", name)))
        })
    }

    #[test]
    fn test_has_and_get() {
        let container = ServiceContainer::builder()
            .add_service("greeter", greeter())
            .build();
        assert!(container.has("greeter"));
        assert!(!container.has("mailer"));
        assert!(container.get("greeter").is_some());
        assert!(container.get("mailer").is_none());
        assert_eq!(container.names(), vec!["greeter".to_string()]);
    }

    #[test]
    fn test_register_replaces_and_unregister_removes() {
        let container = ServiceContainer::new();
        container.register("greeter", Arc::new(FnService::new()));
        container.register("greeter", Arc::new(greeter()));
        assert!(container.get("greeter").unwrap().has_method("sayHello"));

        assert!(container.unregister("greeter").is_some());
        assert!(container.unregister("greeter").is_none());
        assert!(!container.has("greeter"));
    }

    #[test]
    fn test_fn_service_invoke() {
        let container = Arc::new(
            ServiceContainer::builder()
                .add_service("greeter", greeter())
                .build(),
        );
        let service = container.get("greeter").unwrap();
        let mut args = Arguments::new();
        args.insert("name", Value::from("Bob"));

        let value = tokio_test::block_on(service.invoke(
            "sayHello",
            Value::Null,
            args,
            info(container.clone()),
        ))
        .unwrap();
        assert_eq!(value, Value::from("Hi Bob"));

        let err = tokio_test::block_on(service.invoke(
            "missing",
            Value::Null,
            Arguments::new(),
            info(container),
        ));
        assert!(err.is_err());
    }
}
