//! Argument parsing: the first step of every field resolution.
//!
//! Literals from the query node are checked against the field's declared
//! arguments and coerced to their input types. Declared defaults fill in
//! missing arguments.

use async_graphql::dynamic::TypeRef;
use async_graphql::{Name, Value};
use indexmap::IndexMap;

use crate::error::ResolveError;

use super::{FieldDefinition, FieldNode};

/// Parsed argument values, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(IndexMap<Name, Value>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: Value) {
        self.0.insert(Name::new(name), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The arguments as a GraphQL input object.
    pub fn into_value(self) -> Value {
        Value::Object(self.0.into_iter().collect())
    }
}

impl FromIterator<(Name, Value)> for Arguments {
    fn from_iter<T: IntoIterator<Item = (Name, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Validate and coerce the node's argument literals against the field's declarations.
pub fn parse_arguments(field: &FieldDefinition, node: &FieldNode) -> Result<Arguments, ResolveError> {
    if let Some((name, _)) = node
        .arguments()
        .iter()
        .find(|(name, _)| field.find_argument(name.as_str()).is_none())
    {
        return Err(ResolveError::argument(
            field.name(),
            name.as_str(),
            "unknown argument",
        ));
    }

    let mut arguments = Arguments::new();
    for definition in field.arguments() {
        let literal = match node.argument(definition.name()) {
            Some(value) => value,
            None => match definition.default() {
                Some(default) => default,
                None if is_non_null(definition.ty()) => {
                    return Err(ResolveError::argument(
                        field.name(),
                        definition.name(),
                        format!("required argument of type {} is missing", definition.ty()),
                    ));
                }
                None => {
                    arguments.insert(definition.name(), Value::Null);
                    continue;
                }
            },
        };
        let value = coerce(literal, definition.ty())
            .map_err(|message| ResolveError::argument(field.name(), definition.name(), message))?;
        arguments.insert(definition.name(), value);
    }
    Ok(arguments)
}

fn is_non_null(ty: &TypeRef) -> bool {
    matches!(ty, TypeRef::NonNull(_))
}

/// Coerce one input literal to `ty`.
pub fn coerce(value: &Value, ty: &TypeRef) -> Result<Value, String> {
    match ty {
        TypeRef::NonNull(inner) => match value {
            Value::Null => Err(format!("expected {}, found null", ty)),
            _ => coerce(value, inner),
        },
        TypeRef::List(inner) => match value {
            Value::Null => Ok(Value::Null),
            Value::List(items) => items
                .iter()
                .map(|item| coerce(item, inner))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            single => Ok(Value::List(vec![coerce(single, inner)?])),
        },
        TypeRef::Named(name) => match value {
            Value::Null => Ok(Value::Null),
            _ => coerce_named(value, name),
        },
    }
}

fn coerce_named(value: &Value, name: &str) -> Result<Value, String> {
    let mismatch = || format!("expected {}, found {}", name, value);
    match name {
        TypeRef::INT => match value {
            Value::Number(n)
                if n
                    .as_i64()
                    .is_some_and(|i| i32::try_from(i).is_ok()) =>
            {
                Ok(value.clone())
            }
            _ => Err(mismatch()),
        },
        TypeRef::FLOAT => match value {
            Value::Number(_) => Ok(value.clone()),
            _ => Err(mismatch()),
        },
        TypeRef::STRING => match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err(mismatch()),
        },
        TypeRef::BOOLEAN => match value {
            Value::Boolean(_) => Ok(value.clone()),
            _ => Err(mismatch()),
        },
        TypeRef::ID => match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Value::String(n.to_string())),
            _ => Err(mismatch()),
        },
        // enums, custom scalars and input objects are validated by the engine
        _ => Ok(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use async_graphql::Number;

    use super::*;
    use crate::graphql::ArgumentDefinition;

    fn greet() -> FieldDefinition {
        FieldDefinition::new("greet", TypeRef::named_nn(TypeRef::STRING))
            .argument(ArgumentDefinition::new("name", TypeRef::named_nn(TypeRef::STRING)))
            .argument(
                ArgumentDefinition::new("times", TypeRef::named(TypeRef::INT)).default_value(1),
            )
            .argument(ArgumentDefinition::new("tags", TypeRef::named_list(TypeRef::STRING)))
    }

    #[test]
    fn test_defaults_fill_missing_arguments() {
        let node = FieldNode::new("greet").with_argument("name", "Bob");
        let args = parse_arguments(&greet(), &node).unwrap();
        assert_eq!(args.get_str("name"), Some("Bob"));
        assert_eq!(args.get_i64("times"), Some(1));
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_missing_nullable_argument_is_null() {
        let node = FieldNode::new("greet").with_argument("name", "Bob");
        let args = parse_arguments(&greet(), &node).unwrap();
        assert!(args.contains("tags"));
        assert_eq!(args.get("tags"), Some(&Value::Null));
    }

    #[test]
    fn test_missing_required_argument() {
        let err = parse_arguments(&greet(), &FieldNode::new("greet")).unwrap_err();
        assert_matches!(
            err,
            ResolveError::ArgumentValidation { ref argument, .. } if argument == "name"
        );
    }

    #[test]
    fn test_unknown_argument() {
        let node = FieldNode::new("greet")
            .with_argument("name", "Bob")
            .with_argument("shout", true);
        let err = parse_arguments(&greet(), &node).unwrap_err();
        assert_matches!(
            err,
            ResolveError::ArgumentValidation { ref argument, ref message, .. }
                if argument == "shout" && message == "unknown argument"
        );
    }

    #[test]
    fn test_type_mismatch() {
        let node = FieldNode::new("greet").with_argument("name", 3);
        assert_matches!(
            parse_arguments(&greet(), &node),
            Err(ResolveError::ArgumentValidation { .. })
        );

        let node = FieldNode::new("greet").with_argument("name", Value::Null);
        assert_matches!(
            parse_arguments(&greet(), &node),
            Err(ResolveError::ArgumentValidation { .. })
        );
    }

    #[test]
    fn test_single_value_is_wrapped_into_list() {
        let node = FieldNode::new("greet")
            .with_argument("name", "Bob")
            .with_argument("tags", "vip");
        let args = parse_arguments(&greet(), &node).unwrap();
        assert_eq!(
            args.get("tags"),
            Some(&Value::List(vec![Value::from("vip")]))
        );
    }

    #[test]
    fn test_scalar_coercion_rules() {
        let int = TypeRef::named(TypeRef::INT);
        assert!(coerce(&Value::from(i64::from(i32::MAX) + 1), &int).is_err());
        assert!(coerce(&Value::Number(Number::from_f64(1.5).unwrap()), &int).is_err());

        let float = TypeRef::named(TypeRef::FLOAT);
        assert_eq!(coerce(&Value::from(2), &float), Ok(Value::from(2)));

        let id = TypeRef::named(TypeRef::ID);
        assert_eq!(coerce(&Value::from(42), &id), Ok(Value::from("42")));
        assert!(coerce(&Value::from(true), &id).is_err());

        let custom = TypeRef::named("Role");
        assert_eq!(
            coerce(&Value::Enum(Name::new("ADMIN")), &custom),
            Ok(Value::Enum(Name::new("ADMIN")))
        );
    }

    #[test]
    fn test_into_value() {
        let mut args = Arguments::new();
        args.insert("name", Value::from("Ada"));
        assert_matches!(
            args.into_value(),
            Value::Object(ref map) if map.get("name") == Some(&Value::from("Ada"))
        );
    }
}
