//! GraphQL schema model, field resolution pipeline and engine adapter
//!
//! Field definitions are declared with [FieldDefinition] / [ObjectDefinition]
//! and handed to [build_schema], which registers them with async-graphql's
//! dynamic schema. Every dynamic resolver calls back into the [Processor].
//!
//! ```rust,ignore
//! let definition = SchemaDefinition::new(
//!     ObjectDefinition::new("Query").field(
//!         FieldDefinition::new("greet", TypeRef::named_nn(TypeRef::STRING))
//!             .argument(ArgumentDefinition::new("name", TypeRef::named_nn(TypeRef::STRING)))
//!             .resolver(ResolverRef::service("@greeter", "sayHello")),
//!     ),
//! );
//! ```

mod args;
mod ast;
mod info;
mod processor;
mod schema;
mod types;

pub use args::{Arguments, coerce, parse_arguments};
pub use ast::FieldNode;
pub use info::{ExecutionContext, ResolveInfo};
pub use processor::Processor;
pub use schema::build_schema;
pub use types::{ArgumentDefinition, FieldBehavior, FieldDefinition, ObjectDefinition, SchemaDefinition};
