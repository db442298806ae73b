//! Resolver services and lookup

pub mod container;
pub mod resolver;

pub use container::{FnService, ResolverService, ServiceContainer, ServiceContainerBuilder};
pub use resolver::{Handler, ResolverFn, ResolverRef, lookup, property_value, resolver_fn};
