//! graphql-bridge: GraphQL field resolution wired into a service container,
//! resolve hooks and access control.
//!
//! Every field the engine resolves goes through [graphql::Processor]: argument
//! parsing, pre-resolve hooks, the field access check, resolver dispatch
//! (inline closure or `@service` method) and post-resolve hooks. Root fields
//! additionally pass the operation access check first.
//!
//! [GraphqlBundle] assembles the pieces; [http::router] serves it over axum.

pub mod bundle;
pub mod config;
pub mod error;
pub mod events;
pub mod graphql;
pub mod http;
pub mod security;
pub mod services;

pub use bundle::{GraphqlBundle, GraphqlBundleBuilder};
pub use config::Config;
pub use error::ResolveError;
pub use events::{EventDispatcher, EventName, ResolveEvent, ResolveListener};
pub use security::{AccessDenied, Principal, SecurityManager};
pub use services::{FnService, ResolverRef, ResolverService, ServiceContainer};
