//! Bundle: the service container, security manager and resolve hooks wired
//! into one executable schema.
//!
//! # Example
//!
//! ```ignore
//! let bundle = GraphqlBundle::builder(definition)
//!     .container(ServiceContainer::builder().add_service("greeter", greeter).build())
//!     .security(VoterSecurityManager::new(SecurityConfig::from(&config)))
//!     .build()?;
//!
//! bundle.events().on_post_resolve(|_, value| Ok(value));
//! let response = bundle.process_payload("{ greet(name: \"Bob\") }", Variables::default(), None).await;
//! ```

use std::sync::Arc;

use anyhow::Result;
use async_graphql::dynamic::Schema;
use async_graphql::{Request, Response, Variables};

use crate::events::EventDispatcher;
use crate::graphql::{Processor, SchemaDefinition, build_schema};
use crate::security::{DisabledSecurity, Principal, SecurityManager};
use crate::services::ServiceContainer;

/// Executable schema plus the collaborators its resolvers use.
#[derive(Clone)]
pub struct GraphqlBundle {
    processor: Arc<Processor>,
    schema: Schema,
}

impl GraphqlBundle {
    pub fn builder(definition: SchemaDefinition) -> GraphqlBundleBuilder {
        GraphqlBundleBuilder::new(definition)
    }

    pub fn processor(&self) -> &Arc<Processor> {
        &self.processor
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn container(&self) -> &Arc<ServiceContainer> {
        self.processor.container()
    }

    /// Hooks may be registered after the bundle is built.
    pub fn events(&self) -> &Arc<EventDispatcher> {
        self.processor.events()
    }

    /// Execute an engine request. The principal, if any, travels in the request data.
    pub async fn execute(&self, request: Request) -> Response {
        tracing::debug!(
            operation = ?request.operation_name,
            variables = %request.variables.clone().into_value(),
            "GraphQL query: {}",
            request.query
        );
        self.schema.execute(request).await
    }

    /// Execute a raw query string with variables on behalf of `principal`.
    pub async fn process_payload(
        &self,
        payload: &str,
        variables: Variables,
        principal: Option<Principal>,
    ) -> Response {
        let mut request = Request::new(payload).variables(variables);
        if let Some(principal) = principal {
            request = request.data(principal);
        }
        self.execute(request).await
    }
}

/// Collects the bundle's collaborators; anything not set gets a default.
pub struct GraphqlBundleBuilder {
    definition: SchemaDefinition,
    container: Option<Arc<ServiceContainer>>,
    security: Option<Arc<dyn SecurityManager>>,
    events: Option<Arc<EventDispatcher>>,
}

impl GraphqlBundleBuilder {
    pub fn new(definition: SchemaDefinition) -> Self {
        Self {
            definition,
            container: None,
            security: None,
            events: None,
        }
    }

    pub fn container(mut self, container: ServiceContainer) -> Self {
        self.container = Some(Arc::new(container));
        self
    }

    pub fn shared_container(mut self, container: Arc<ServiceContainer>) -> Self {
        self.container = Some(container);
        self
    }

    pub fn security(mut self, security: impl SecurityManager + 'static) -> Self {
        self.security = Some(Arc::new(security));
        self
    }

    pub fn shared_security(mut self, security: Arc<dyn SecurityManager>) -> Self {
        self.security = Some(security);
        self
    }

    pub fn events(mut self, events: EventDispatcher) -> Self {
        self.events = Some(Arc::new(events));
        self
    }

    /// Build the processor and register the schema with the engine.
    pub fn build(self) -> Result<GraphqlBundle> {
        let processor = Arc::new(Processor::new(
            self.container.unwrap_or_default(),
            self.security.unwrap_or_else(|| Arc::new(DisabledSecurity)),
            self.events.unwrap_or_default(),
        ));
        let schema = build_schema(&self.definition, processor.clone())?;
        tracing::info!(
            services = ?processor.container().names(),
            "GraphQL schema built"
        );
        Ok(GraphqlBundle { processor, schema })
    }
}
