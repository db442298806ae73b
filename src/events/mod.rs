//! Resolve hooks fired around every field resolution.
//!
//! Pre-resolve hooks observe the field before access is checked and the
//! resolver runs. Post-resolve hooks see the resolved value and hand on the
//! value the next hook (and finally the engine) receives, so any of them can
//! override what the field returns.
//!
//! Hooks run synchronously, in registration order. The first failing hook
//! stops the chain and fails the field.

use std::fmt;
use std::sync::Arc;

use async_graphql::Value;
use parking_lot::RwLock;

use crate::error::ResolveError;
use crate::graphql::{FieldDefinition, FieldNode};

/// Names of the two resolve events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    PreResolve,
    PostResolve,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreResolve => "graphql.pre_resolve",
            Self::PostResolve => "graphql.post_resolve",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What hooks get to see about the field being resolved.
#[derive(Debug, Clone, Copy)]
pub struct ResolveEvent<'a> {
    pub field: &'a FieldDefinition,
    pub node: &'a FieldNode,
    pub parent_type: &'a str,
    pub parent_value: &'a Value,
}

impl<'a> ResolveEvent<'a> {
    pub fn new(
        field: &'a FieldDefinition,
        node: &'a FieldNode,
        parent_type: &'a str,
        parent_value: &'a Value,
    ) -> Self {
        Self {
            field,
            node,
            parent_type,
            parent_value,
        }
    }
}

pub type PreResolveHook = Arc<dyn Fn(&ResolveEvent<'_>) -> anyhow::Result<()> + Send + Sync>;

pub type PostResolveHook =
    Arc<dyn Fn(&ResolveEvent<'_>, Value) -> anyhow::Result<Value> + Send + Sync>;

/// Subscriber interested in both events. Both methods default to no-ops.
pub trait ResolveListener: Send + Sync + 'static {
    fn pre_resolve(&self, _event: &ResolveEvent<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Return the value to pass on; `value` unchanged to leave it alone.
    fn post_resolve(&self, _event: &ResolveEvent<'_>, value: Value) -> anyhow::Result<Value> {
        Ok(value)
    }
}

/// Ordered hook registry.
#[derive(Default)]
pub struct EventDispatcher {
    pre: RwLock<Vec<PreResolveHook>>,
    post: RwLock<Vec<PostResolveHook>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_pre_resolve<F>(&self, hook: F)
    where
        F: Fn(&ResolveEvent<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.pre.write().push(Arc::new(hook));
    }

    pub fn on_post_resolve<F>(&self, hook: F)
    where
        F: Fn(&ResolveEvent<'_>, Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.post.write().push(Arc::new(hook));
    }

    /// Register both halves of a listener.
    pub fn subscribe(&self, listener: Arc<dyn ResolveListener>) {
        let pre = listener.clone();
        self.on_pre_resolve(move |event| pre.pre_resolve(event));
        self.on_post_resolve(move |event, value| listener.post_resolve(event, value));
    }

    pub fn listener_count(&self, name: EventName) -> usize {
        match name {
            EventName::PreResolve => self.pre.read().len(),
            EventName::PostResolve => self.post.read().len(),
        }
    }

    /// Run the pre-resolve hooks.
    pub fn dispatch_pre_resolve(&self, event: &ResolveEvent<'_>) -> Result<(), ResolveError> {
        // snapshot so hooks may register further hooks without deadlocking
        let hooks = self.pre.read().clone();
        for hook in hooks {
            hook(event).map_err(|source| listener_error(EventName::PreResolve, event, source))?;
        }
        Ok(())
    }

    /// Thread `value` through the post-resolve hooks and return the final value.
    pub fn run_post_resolve_hooks(
        &self,
        event: &ResolveEvent<'_>,
        value: Value,
    ) -> Result<Value, ResolveError> {
        let hooks = self.post.read().clone();
        hooks.iter().try_fold(value, |value, hook| {
            hook(event, value).map_err(|source| listener_error(EventName::PostResolve, event, source))
        })
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("pre_resolve", &self.listener_count(EventName::PreResolve))
            .field("post_resolve", &self.listener_count(EventName::PostResolve))
            .finish()
    }
}

fn listener_error(name: EventName, event: &ResolveEvent<'_>, source: anyhow::Error) -> ResolveError {
    tracing::debug!(event = %name, field = %event.field.name(), error = %source, "Resolve listener failed");
    ResolveError::Listener {
        event: name.as_str(),
        field: event.field.name().to_string(),
        source,
    }
}
