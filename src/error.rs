//! Errors raised while resolving a field.
//!
//! Every variant is terminal for the field being resolved. Whether the rest of
//! the query still resolves is up to the engine's error collection.

use async_graphql::ErrorExtensions;

use crate::security::AccessDenied;

/// Failure of a single field resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Invalid argument \"{argument}\" for field \"{field}\": {message}")]
    ArgumentValidation {
        field: String,
        argument: String,
        message: String,
    },

    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    #[error("Resolve service \"{service}\" not found for field \"{field}\"")]
    ResolverNotFound { service: String, field: String },

    #[error("Resolve method \"{method}\" not found in \"{service}\" service for field \"{field}\"")]
    ResolverMethodNotFound {
        method: String,
        service: String,
        field: String,
    },

    #[error("Failed to resolve field \"{field}\": {source}")]
    Resolve {
        field: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Listener for \"{event}\" failed on field \"{field}\": {source}")]
    Listener {
        event: &'static str,
        field: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ResolveError {
    pub(crate) fn argument(
        field: impl Into<String>,
        argument: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ArgumentValidation {
            field: field.into(),
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code, exposed as the `code` error extension.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ArgumentValidation { .. } => "ARGUMENT_VALIDATION",
            Self::AccessDenied(_) => "FORBIDDEN",
            Self::ResolverNotFound { .. } => "RESOLVER_NOT_FOUND",
            Self::ResolverMethodNotFound { .. } => "RESOLVER_METHOD_NOT_FOUND",
            Self::Resolve { .. } => "RESOLVE_FAILED",
            Self::Listener { .. } => "LISTENER_FAILED",
        }
    }
}

impl ErrorExtensions for ResolveError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.code();
        let denied = match self {
            Self::AccessDenied(denied) => Some(denied.target()),
            _ => None,
        };
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| {
            e.set("code", code);
            if let Some(target) = denied {
                e.set("target", target);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::AccessScope;

    #[test]
    fn test_messages_name_the_implicated_parts() {
        let err = ResolveError::ResolverMethodNotFound {
            method: "sayHello".into(),
            service: "greeter".into(),
            field: "greet".into(),
        };
        assert_eq!(
            err.to_string(),
            "Resolve method \"sayHello\" not found in \"greeter\" service for field \"greet\""
        );

        let err = ResolveError::argument("greet", "name", "expected String, found 3");
        assert_eq!(err.code(), "ARGUMENT_VALIDATION");
        assert!(err.to_string().contains("\"name\""));
    }

    #[test]
    fn test_access_denied_extension_carries_target() {
        let err: ResolveError = AccessDenied::new(AccessScope::Field, "User.email").into();
        let gql = err.extend();
        let ext = gql.extensions.expect("extensions set");
        assert_eq!(ext.get("code"), Some(&async_graphql::Value::from("FORBIDDEN")));
        assert_eq!(
            ext.get("target"),
            Some(&async_graphql::Value::from("User.email"))
        );
    }
}
