//! HTTP transport: `POST /graphql` runs queries, `GET /graphql` serves GraphiQL.
//!
//! A bearer token, when present and valid, becomes the request's [Principal].
//! Invalid tokens are logged and the request continues unauthenticated; the
//! access checks decide what an anonymous caller may resolve.

use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::Router;
use axum::extract::State;
use axum::http::header::{ACCEPT, AUTHORIZATION};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::get;

use crate::bundle::GraphqlBundle;
use crate::security::{Principal, verify_token};

/// State shared by the GraphQL handlers.
#[derive(Clone)]
pub struct HttpState {
    pub bundle: Arc<GraphqlBundle>,
    pub jwt_secret: Option<Arc<str>>,
}

impl HttpState {
    pub fn new(bundle: Arc<GraphqlBundle>, jwt_secret: Option<String>) -> Self {
        Self {
            bundle,
            jwt_secret: jwt_secret.map(Arc::from),
        }
    }

    fn authenticate(&self, headers: &HeaderMap) -> Option<Principal> {
        let Some(token) = extract_token(headers) else {
            tracing::debug!("No auth token in request headers");
            return None;
        };
        let Some(secret) = self.jwt_secret.as_deref() else {
            tracing::debug!("Bearer token ignored, JWT_SECRET not configured");
            return None;
        };
        match verify_token(&token, secret) {
            Ok(principal) => {
                tracing::debug!(user_id = %principal.user_id, "Auth successful");
                Some(principal)
            }
            Err(e) => {
                tracing::debug!(
                    "Token verification failed: {:#} (token prefix: {}...)",
                    e,
                    &token[..token.len().min(20)]
                );
                None
            }
        }
    }
}

/// Router with the `/graphql` routes, state already applied.
pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .with_state(state)
}

fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

async fn graphiql(headers: HeaderMap) -> impl IntoResponse {
    let accepts_html = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/html"))
        .unwrap_or(false);

    if accepts_html {
        Html(GraphiQLSource::build().endpoint("/graphql").finish()).into_response()
    } else {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            axum::Json(serde_json::json!({
                "error": "GET requests are not supported for GraphQL queries. Use POST with Content-Type: application/json"
            })),
        )
            .into_response()
    }
}

async fn graphql_handler(
    State(state): State<HttpState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    if let Some(principal) = state.authenticate(&headers) {
        request = request.data(principal);
    }
    state.bundle.execute(request).await.into()
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(extract_token(&headers("Bearer abc.def")), Some("abc.def".to_string()));
        assert_eq!(extract_token(&headers("Basic abc")), None);
        assert_eq!(extract_token(&headers("Bearer ")), None);
        assert_eq!(extract_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_get_without_html_is_method_not_allowed() {
        let response = graphiql(HeaderMap::new()).await.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("Use POST"));
    }

    #[tokio::test]
    async fn test_get_with_html_serves_graphiql() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, "text/html".parse().unwrap());
        let response = graphiql(headers).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_post_executes_query() {
        use async_graphql::Value;
        use async_graphql::dynamic::TypeRef;

        use crate::graphql::{FieldDefinition, ObjectDefinition, SchemaDefinition};
        use crate::services::ResolverRef;

        let definition = SchemaDefinition::new(ObjectDefinition::new("Query").field(
            FieldDefinition::new("ping", TypeRef::named_nn(TypeRef::STRING))
                .resolver(ResolverRef::inline(|_, _, _| async { Ok(Value::from("pong")) })),
        ));
        let bundle = GraphqlBundle::builder(definition).build().unwrap();
        let app = router(HttpState::new(Arc::new(bundle), None));

        let response = app
            .oneshot(
                Request::post("/graphql")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"query":"{ ping }"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["data"]["ping"], "pong");
    }
}
