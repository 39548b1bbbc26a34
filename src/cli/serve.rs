use anyhow::Context;
use async_graphql::dynamic::Schema;
use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse, GraphQLSubscription};
use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use contactgraph::schema::{MockSchemaBuilder, MockStore};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

const GRAPHQL_PATH: &str = "/graphql";
const SUBSCRIPTION_PATH: &str = "/graphql/ws";

/// Run the serve command to start the mock GraphQL backend
pub async fn run(config_path: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let config = super::config_or_default(config_path)?;

    let server_port = port.unwrap_or(config.server.port);

    tracing::info!("🔧 Building GraphQL schema for {} models...", config.model.len());

    let store = Arc::new(MockStore::new(&config.model));
    let schema = MockSchemaBuilder::new()
        .store(store)
        .build_schema(&config.model)?;

    tracing::info!("✅ Schema built successfully");
    tracing::info!("🚀 GraphQL server running on http://localhost:{}{}", server_port, GRAPHQL_PATH);
    tracing::info!("📡 Subscriptions: ws://localhost:{}{}", server_port, SUBSCRIPTION_PATH);
    tracing::info!("💡 Press Ctrl+C to stop the server");

    start_http_server(schema, &config.server.bind, server_port).await
}

async fn start_http_server(schema: Schema, bind: &str, port: u16) -> anyhow::Result<()> {
    let app = Router::new()
        .route(GRAPHQL_PATH, post(graphql_handler).get(graphql_playground))
        .route_service(SUBSCRIPTION_PATH, GraphQLSubscription::new(schema.clone()))
        .route("/health", get(health_check))
        .with_state(schema)
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()));

    let addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}. Port may be in use.", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
    }
}

async fn graphql_handler(State(schema): State<Schema>, request: GraphQLRequest) -> GraphQLResponse {
    schema.execute(request.into_inner()).await.into()
}

async fn graphql_playground() -> Html<String> {
    Html(playground_source(
        GraphQLPlaygroundConfig::new(GRAPHQL_PATH).subscription_endpoint(SUBSCRIPTION_PATH),
    ))
}

async fn health_check() -> &'static str {
    "OK"
}
