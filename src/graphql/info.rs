//! Per-call context handed to resolvers and access checks.

use std::fmt;
use std::sync::Arc;

use crate::security::Principal;
use crate::services::ServiceContainer;

use super::{FieldDefinition, FieldNode};

/// Request-level state shared by every field resolution of one request.
///
/// Resolvers reach the service container through here instead of having it
/// injected into field definitions.
#[derive(Clone)]
pub struct ExecutionContext {
    container: Arc<ServiceContainer>,
    principal: Option<Principal>,
}

impl ExecutionContext {
    pub fn new(container: Arc<ServiceContainer>, principal: Option<Principal>) -> Self {
        Self {
            container,
            principal,
        }
    }

    pub fn container(&self) -> &Arc<ServiceContainer> {
        &self.container
    }

    /// The authenticated caller, `None` for anonymous requests.
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("services", &self.container.names())
            .field("principal", &self.principal)
            .finish()
    }
}

/// Metadata for one field resolution: the field, the query node, the parent
/// type and the execution context. Read-only for resolvers.
#[derive(Clone)]
pub struct ResolveInfo {
    field: Arc<FieldDefinition>,
    node: Arc<FieldNode>,
    parent_type: Arc<str>,
    context: ExecutionContext,
}

impl ResolveInfo {
    pub fn new(
        field: Arc<FieldDefinition>,
        node: Arc<FieldNode>,
        parent_type: impl Into<Arc<str>>,
        context: ExecutionContext,
    ) -> Self {
        Self {
            field,
            node,
            parent_type: parent_type.into(),
            context,
        }
    }

    pub fn field(&self) -> &FieldDefinition {
        &self.field
    }

    pub fn node(&self) -> &FieldNode {
        &self.node
    }

    pub fn parent_type(&self) -> &str {
        &self.parent_type
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Shorthand for the container in the execution context.
    pub fn container(&self) -> &Arc<ServiceContainer> {
        self.context.container()
    }

    /// `ParentType.field`, the identity used by access checks and errors.
    pub fn target(&self) -> String {
        format!("{}.{}", self.parent_type, self.field.name())
    }
}

impl fmt::Debug for ResolveInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveInfo")
            .field("field", &self.field.name())
            .field("node", &self.node)
            .field("parent_type", &self.parent_type)
            .field("context", &self.context)
            .finish()
    }
}
