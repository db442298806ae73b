//! The field resolution pipeline.
//!
//! The engine calls [Processor::resolve_query] for top-level fields and
//! [Processor::resolve_field] for everything below them. Each call runs one
//! pass of:
//!
//! 1. parse and validate arguments
//! 2. pre-resolve hooks
//! 3. field access check
//! 4. resolver lookup and dispatch
//! 5. post-resolve hooks
//!
//! and returns the value produced by the last post-resolve hook. A failure at
//! any step ends the pass for that field; later steps do not run.

use std::sync::Arc;

use async_graphql::Value;

use crate::error::ResolveError;
use crate::events::{EventDispatcher, ResolveEvent};
use crate::security::{Principal, SecurityManager, check_field_access, check_operation_access};
use crate::services::{ServiceContainer, lookup};

use super::{ExecutionContext, FieldDefinition, FieldNode, ResolveInfo, parse_arguments};

/// Resolves single field nodes on behalf of the engine.
pub struct Processor {
    container: Arc<ServiceContainer>,
    security: Arc<dyn SecurityManager>,
    events: Arc<EventDispatcher>,
}

impl Processor {
    pub fn new(
        container: Arc<ServiceContainer>,
        security: Arc<dyn SecurityManager>,
        events: Arc<EventDispatcher>,
    ) -> Self {
        Self {
            container,
            security,
            events,
        }
    }

    pub fn container(&self) -> &Arc<ServiceContainer> {
        &self.container
    }

    pub fn events(&self) -> &Arc<EventDispatcher> {
        &self.events
    }

    pub fn security(&self) -> &Arc<dyn SecurityManager> {
        &self.security
    }

    /// Execution context for one request.
    pub fn context(&self, principal: Option<Principal>) -> ExecutionContext {
        ExecutionContext::new(self.container.clone(), principal)
    }

    /// Resolve a top-level query: operation access check, then the field pipeline.
    pub async fn resolve_query(
        &self,
        field: &Arc<FieldDefinition>,
        node: Arc<FieldNode>,
        parent_type: &str,
        parent: Value,
        ctx: &ExecutionContext,
    ) -> Result<Value, ResolveError> {
        check_operation_access(self.security.as_ref(), &node, ctx)?;
        self.resolve_field(field, node, parent_type, parent, ctx).await
    }

    /// Resolve one field node against its parent value.
    pub async fn resolve_field(
        &self,
        field: &Arc<FieldDefinition>,
        node: Arc<FieldNode>,
        parent_type: &str,
        parent: Value,
        ctx: &ExecutionContext,
    ) -> Result<Value, ResolveError> {
        let arguments = parse_arguments(field, &node)?;

        let event = ResolveEvent::new(field, &node, parent_type, &parent);
        self.events.dispatch_pre_resolve(&event)?;

        let info = ResolveInfo::new(field.clone(), node.clone(), parent_type, ctx.clone());
        check_field_access(self.security.as_ref(), &info)?;

        let handler = lookup(field, ctx.container())?;
        tracing::trace!(field = %info.target(), handler = ?handler, "Dispatching resolver");
        let resolved = handler
            .invoke(parent.clone(), arguments, info)
            .await
            .map_err(|source| ResolveError::Resolve {
                field: field.name().to_string(),
                source,
            })?;

        self.events.run_post_resolve_hooks(&event, resolved)
    }
}
