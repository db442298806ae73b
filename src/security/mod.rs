//! Access control for operation and field resolution
//!
//! The [SecurityManager] decides whether access control is switched on for an
//! attribute and, if so, whether the caller may resolve a given root operation
//! or field. The gate functions [check_operation_access] and
//! [check_field_access] are what the pipeline calls; they never mutate state.
//!
//! ## Managers
//!
//! - [DisabledSecurity] turns both checks off (the default).
//! - [VoterSecurityManager] asks a list of [Voter]s, see [voter].

pub mod auth;
pub mod voter;

use std::fmt;

use crate::graphql::{ExecutionContext, FieldNode, ResolveInfo};

pub use auth::{Principal, verify_token};
pub use voter::{
    AuthenticatedVoter, RoleVoter, SecurityConfig, Subject, Vote, Voter, VoterSecurityManager,
};

/// What is being resolved when access is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityAttribute {
    /// A top-level query or mutation field.
    ResolveRootOperation,
    /// Any field, nested or not.
    ResolveField,
}

impl SecurityAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResolveRootOperation => "RESOLVE_ROOT_OPERATION",
            Self::ResolveField => "RESOLVE_FIELD",
        }
    }
}

impl fmt::Display for SecurityAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a denial concerns a root operation or a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessScope {
    Operation,
    Field,
}

/// Raised when the security manager refuses a resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AccessDenied {
    scope: AccessScope,
    target: String,
    message: String,
}

impl AccessDenied {
    pub fn new(scope: AccessScope, target: impl Into<String>) -> Self {
        let target = target.into();
        let message = match scope {
            AccessScope::Operation => format!("Access denied to operation \"{}\"", target),
            AccessScope::Field => format!("Access denied to field \"{}\"", target),
        };
        Self {
            scope,
            target,
            message,
        }
    }

    /// Denial for a root operation, named after the query node.
    pub fn operation(query: &FieldNode) -> Self {
        Self::new(AccessScope::Operation, query.name())
    }

    /// Denial for a field, named `ParentType.field`.
    pub fn field(info: &ResolveInfo) -> Self {
        Self::new(AccessScope::Field, info.target())
    }

    /// Replace the default message, keeping scope and target.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn scope(&self) -> AccessScope {
        self.scope
    }

    pub fn target(&self) -> String {
        self.target.clone()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Policy component consulted by the resolution pipeline.
///
/// Implementations must be pure predicates over (principal, target, enablement):
/// the pipeline may call them concurrently for sibling fields.
pub trait SecurityManager: Send + Sync {
    /// Whether access control runs at all for `attribute`.
    fn is_security_enabled_for(&self, attribute: SecurityAttribute) -> bool;

    fn is_granted_to_operation_resolve(&self, query: &FieldNode, ctx: &ExecutionContext) -> bool;

    fn is_granted_to_field_resolve(&self, info: &ResolveInfo) -> bool;

    /// Build the error returned when an operation is refused.
    fn operation_access_denied(&self, query: &FieldNode) -> AccessDenied {
        AccessDenied::operation(query)
    }

    /// Build the error returned when a field is refused.
    fn field_access_denied(&self, info: &ResolveInfo) -> AccessDenied {
        AccessDenied::field(info)
    }
}

/// Security manager with every check switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSecurity;

impl SecurityManager for DisabledSecurity {
    fn is_security_enabled_for(&self, _attribute: SecurityAttribute) -> bool {
        false
    }

    fn is_granted_to_operation_resolve(&self, _query: &FieldNode, _ctx: &ExecutionContext) -> bool {
        true
    }

    fn is_granted_to_field_resolve(&self, _info: &ResolveInfo) -> bool {
        true
    }
}

/// Operation-level gate, run once per top-level query before its field resolves.
pub fn check_operation_access(
    manager: &dyn SecurityManager,
    query: &FieldNode,
    ctx: &ExecutionContext,
) -> Result<(), AccessDenied> {
    if manager.is_security_enabled_for(SecurityAttribute::ResolveRootOperation)
        && !manager.is_granted_to_operation_resolve(query, ctx)
    {
        let denied = manager.operation_access_denied(query);
        tracing::debug!(operation = %query.name(), "{}", denied);
        return Err(denied);
    }
    Ok(())
}

/// Field-level gate, run once per field after the pre-resolve hooks.
pub fn check_field_access(
    manager: &dyn SecurityManager,
    info: &ResolveInfo,
) -> Result<(), AccessDenied> {
    if manager.is_security_enabled_for(SecurityAttribute::ResolveField)
        && !manager.is_granted_to_field_resolve(info)
    {
        let denied = manager.field_access_denied(info);
        tracing::debug!(field = %info.target(), "{}", denied);
        return Err(denied);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_graphql::dynamic::TypeRef;

    use super::*;
    use crate::graphql::FieldDefinition;
    use crate::services::ServiceContainer;

    /// Denies everything, counting how often it was asked.
    #[derive(Default)]
    struct DenyAll {
        operation_enabled: bool,
        field_enabled: bool,
        asked: AtomicUsize,
    }

    impl SecurityManager for DenyAll {
        fn is_security_enabled_for(&self, attribute: SecurityAttribute) -> bool {
            match attribute {
                SecurityAttribute::ResolveRootOperation => self.operation_enabled,
                SecurityAttribute::ResolveField => self.field_enabled,
            }
        }

        fn is_granted_to_operation_resolve(&self, _: &FieldNode, _: &ExecutionContext) -> bool {
            self.asked.fetch_add(1, Ordering::SeqCst);
            false
        }

        fn is_granted_to_field_resolve(&self, _: &ResolveInfo) -> bool {
            self.asked.fetch_add(1, Ordering::SeqCst);
            false
        }
    }

    fn ctx() -> ExecutionContext {
        ExecutionContext::new(Arc::new(ServiceContainer::new()), None)
    }

    #[test]
    fn test_disabled_operation_check_is_noop() {
        let manager = DenyAll::default();
        let query = FieldNode::new("me");
        assert!(check_operation_access(&manager, &query, &ctx()).is_ok());
        assert_eq!(manager.asked.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_enabled_operation_check_denies() {
        let manager = DenyAll {
            operation_enabled: true,
            ..Default::default()
        };
        let err = check_operation_access(&manager, &FieldNode::new("me"), &ctx()).unwrap_err();
        assert_eq!(err.scope(), AccessScope::Operation);
        assert_eq!(err.target(), "me");
        assert_eq!(err.message(), "Access denied to operation \"me\"");
    }

    #[test]
    fn test_field_check_names_parent_type() {
        let manager = DenyAll {
            field_enabled: true,
            ..Default::default()
        };
        let field = Arc::new(FieldDefinition::new("email", TypeRef::named(TypeRef::STRING)));
        let info = ResolveInfo::new(field, Arc::new(FieldNode::new("email")), "User", ctx());
        let err = check_field_access(&manager, &info).unwrap_err();
        assert_eq!(err.scope(), AccessScope::Field);
        assert_eq!(err.target(), "User.email");
        assert_eq!(manager.asked.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disabled_security_grants_everything() {
        let query = FieldNode::new("anything");
        assert!(check_operation_access(&DisabledSecurity, &query, &ctx()).is_ok());
        assert_eq!(SecurityAttribute::ResolveField.to_string(), "RESOLVE_FIELD");
    }
}
