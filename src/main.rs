//! graphql-bridge server
//!
//! Serves a small built-in schema at /graphql so the resolution pipeline can
//! be tried from GraphiQL or curl.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use async_graphql::Value;
use async_graphql::dynamic::TypeRef;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use graphql_bridge::config::Config;
use graphql_bridge::graphql::{ArgumentDefinition, FieldDefinition, ObjectDefinition, SchemaDefinition};
use graphql_bridge::http::{self, HttpState};
use graphql_bridge::security::{
    AuthenticatedVoter, RoleVoter, SecurityAttribute, SecurityConfig, VoterSecurityManager,
};
use graphql_bridge::services::{FnService, ResolverRef, ServiceContainer};
use graphql_bridge::GraphqlBundle;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "graphql_bridge=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!("Starting graphql-bridge");
    tracing::info!(
        operation_security = config.operation_security,
        field_security = config.field_security,
        allow_if_all_abstain = config.allow_if_all_abstain,
        "Configuration loaded"
    );

    let security = VoterSecurityManager::new(SecurityConfig::from(&config))
        .with_voter(AuthenticatedVoter::new(SecurityAttribute::ResolveRootOperation))
        .with_voter(RoleVoter::new().require("User.email", "admin"));

    let bundle = GraphqlBundle::builder(demo_schema())
        .container(demo_services())
        .security(security)
        .build()?;

    let app = http::router(HttpState::new(Arc::new(bundle), config.jwt_secret.clone()))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("HTTP server: bind failed")?;

    tracing::info!("Listening on {}", addr);
    tracing::info!(
        "GraphQL playground: http://{}:{}/graphql",
        config.host.as_deref().unwrap_or("localhost"),
        config.port
    );

    axum::serve(listener, app).await.context("axum::serve")?;
    Ok(())
}

fn demo_services() -> ServiceContainer {
    ServiceContainer::builder()
        .add_service(
            "greeter",
            FnService::new().method("sayHello", |_, args, _| async move {
                let name = args.get_str("name").unwrap_or("World");
                Ok(Value::from(format!("Hi {}", name)))
            }),
        )
        .add_service(
            "users",
            FnService::new()
                .method("find", |_, args, _| async move {
                    let id = args.get_str("id").unwrap_or_default().to_string();
                    Ok(demo_user(&id, "Ada", "ada@example.com"))
                })
                .method("me", |_, _, info| async move {
                    Ok(match info.context().principal() {
                        Some(p) => demo_user(
                            &p.user_id,
                            &p.user_id,
                            p.email.as_deref().unwrap_or_default(),
                        ),
                        None => Value::Null,
                    })
                }),
        )
        .build()
}

fn demo_user(id: &str, name: &str, email: &str) -> Value {
    Value::Object(
        [
            ("id", Value::from(id)),
            ("name", Value::from(name)),
            ("email", Value::from(email)),
        ]
        .into_iter()
        .map(|(k, v)| (async_graphql::Name::new(k), v))
        .collect(),
    )
}

fn demo_schema() -> SchemaDefinition {
    let query = ObjectDefinition::new("Query")
        .field(
            FieldDefinition::new("hello", TypeRef::named_nn(TypeRef::STRING))
                .argument(
                    ArgumentDefinition::new("name", TypeRef::named(TypeRef::STRING))
                        .default_value("World"),
                )
                .resolver(ResolverRef::service("@greeter", "sayHello"))
                .description("Greets by name"),
        )
        .field(
            FieldDefinition::new("user", TypeRef::named("User"))
                .argument(ArgumentDefinition::new("id", TypeRef::named_nn(TypeRef::ID)))
                .resolver(ResolverRef::service("@users", "find")),
        )
        .field(
            FieldDefinition::new("me", TypeRef::named("User"))
                .resolver(ResolverRef::service("@users", "me"))
                .description("The authenticated caller"),
        );

    let mutation = ObjectDefinition::new("Mutation").field(
        FieldDefinition::new("echo", TypeRef::named_nn(TypeRef::STRING))
            .argument(ArgumentDefinition::new("message", TypeRef::named_nn(TypeRef::STRING)))
            .resolver(ResolverRef::inline(|_, args, _| async move {
                Ok(Value::from(args.get_str("message").unwrap_or_default()))
            })),
    );

    let user = ObjectDefinition::new("User")
        .field(FieldDefinition::new("id", TypeRef::named_nn(TypeRef::ID)))
        .field(FieldDefinition::new("name", TypeRef::named_nn(TypeRef::STRING)))
        .field(
            FieldDefinition::new("email", TypeRef::named(TypeRef::STRING))
                .description("Visible to admins when field security is on"),
        );

    SchemaDefinition::new(query).mutation(mutation).object(user)
}
