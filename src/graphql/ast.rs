//! Query AST nodes handed to the pipeline.

use async_graphql::{Name, SelectionField, ServerResult, Value};
use indexmap::IndexMap;

/// One field of the client query, with its argument literals and sub-selection.
///
/// Top-level fields of an operation are the "queries" the operation-level
/// access check runs against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldNode {
    name: String,
    alias: Option<String>,
    arguments: IndexMap<Name, Value>,
    selection: Vec<FieldNode>,
}

impl FieldNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_argument(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.arguments.insert(Name::new(name), value.into());
        self
    }

    pub fn with_selection(mut self, child: FieldNode) -> Self {
        self.selection.push(child);
        self
    }

    /// Convert the engine's view of the field being executed, variables
    /// already substituted. The sub-selection is left empty.
    pub fn from_selection(field: SelectionField<'_>) -> ServerResult<Self> {
        Ok(Self {
            name: field.name().to_string(),
            alias: field.alias().map(str::to_string),
            arguments: field.arguments()?.into_iter().collect(),
            selection: Vec::new(),
        })
    }

    /// Like [FieldNode::from_selection], with the whole sub-selection tree.
    /// Only root fields need it: nested fields are converted once each as the
    /// engine reaches them.
    pub fn from_selection_tree(field: SelectionField<'_>) -> ServerResult<Self> {
        let mut node = Self::from_selection(field)?;
        node.selection = field
            .selection_set()
            .map(FieldNode::from_selection_tree)
            .collect::<ServerResult<Vec<_>>>()?;
        Ok(node)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Key the value appears under in the response.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn arguments(&self) -> &IndexMap<Name, Value> {
        &self.arguments
    }

    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }

    pub fn selection(&self) -> &[FieldNode] {
        &self.selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_key_prefers_alias() {
        let node = FieldNode::new("user");
        assert_eq!(node.response_key(), "user");
        let node = node.with_alias("admin");
        assert_eq!(node.response_key(), "admin");
        assert_eq!(node.name(), "user");
    }

    #[test]
    fn test_builder_keeps_argument_order() {
        let node = FieldNode::new("search")
            .with_argument("term", "ada")
            .with_argument("limit", 10)
            .with_selection(FieldNode::new("id"));
        let keys: Vec<&str> = node.arguments().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["term", "limit"]);
        assert_eq!(node.argument("limit"), Some(&Value::from(10)));
        assert_eq!(node.selection().len(), 1);
    }
}
