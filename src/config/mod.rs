//! Application configuration management

use std::env;

use anyhow::{Context, Result};

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host (for logging the endpoint URL)
    pub host: Option<String>,

    /// Server port
    pub port: u16,

    /// JWT secret for bearer token verification; anonymous requests only when unset
    pub jwt_secret: Option<String>,

    /// Run the operation-level access check on top-level queries
    pub operation_security: bool,

    /// Run the field-level access check on every field
    pub field_security: bool,

    /// Grant access when every voter abstains
    pub allow_if_all_abstain: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: None,
            port: 3001,
            jwt_secret: None,
            operation_security: false,
            field_security: false,
            allow_if_all_abstain: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("HOST").ok(),

            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .context("Invalid PORT")?,

            jwt_secret: env::var("JWT_SECRET")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),

            operation_security: flag("GRAPHQL_SECURITY_OPERATION", false),

            field_security: flag("GRAPHQL_SECURITY_FIELD", false),

            allow_if_all_abstain: flag("GRAPHQL_ALLOW_IF_ALL_ABSTAIN", false),
        })
    }
}

fn flag(name: &str, default: bool) -> bool {
    env::var(name).map(|v| parse_flag(&v)).unwrap_or(default)
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
