//! PeerForge API Gateway
//!
//! The main entry point for all external API requests.
//! Handles:
//! - Caller identification and authorization
//! - Request routing
//! - Observability (logging, metrics, tracing)

mod handlers;

use axum::{
    extract::{MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use peerforge_common::{config::AppConfig, metrics, services::Services};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Services,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    // Initialize tracing
    init_tracing(&config);

    info!("Starting PeerForge API Gateway v{}", peerforge_common::VERSION);

    // Initialize metrics
    metrics::register_metrics();
    if config.observability.metrics_port != 0 {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .install()?;
        info!("Metrics exporter listening on {}", metrics_addr);
    }

    // Open the entity stores and wire the services
    let services = Services::from_config(&config);

    // Seed the bootstrap admin so privileged operations are reachable
    // on a fresh data directory
    if !services.users.has_admin() {
        let admin = services.users.register_admin(
            &config.auth.bootstrap_admin_name,
            &config.auth.bootstrap_admin_email,
            &config.auth.bootstrap_admin_secret,
            &config.auth.bootstrap_admin_level,
        )?;
        info!(admin_id = %admin.id, "Bootstrap admin created");
    }

    // Create app state
    let state = AppState {
        config: config.clone(),
        services,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber from the observability config
fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.observability.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let api_routes = Router::new()
        // Health endpoints (no auth)
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        // Auth endpoints
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/password", post(handlers::auth::change_password))
        // User endpoints
        .route("/users", get(handlers::users::list_users))
        .route("/users/{id}", get(handlers::users::get_user))
        .route("/users/{id}", delete(handlers::users::delete_user))
        // Paper endpoints
        .route("/papers", post(handlers::papers::submit_paper))
        .route("/papers", get(handlers::papers::list_papers))
        .route("/papers/{id}", get(handlers::papers::get_paper))
        .route("/papers/{id}", delete(handlers::papers::delete_paper))
        .route("/papers/{id}/status", patch(handlers::papers::update_status))
        .route(
            "/papers/{id}/reviewers",
            get(handlers::papers::list_reviewers),
        )
        .route(
            "/papers/{id}/reviewers",
            post(handlers::papers::assign_reviewer),
        )
        .route(
            "/papers/{id}/reviewers/{reviewer_id}",
            delete(handlers::papers::remove_reviewer),
        )
        // Review endpoints
        .route("/papers/{id}/reviews", post(handlers::reviews::submit_review))
        .route("/papers/{id}/reviews", get(handlers::reviews::list_reviews))
        .route(
            "/papers/{id}/rating",
            get(handlers::reviews::average_rating),
        )
        .route(
            "/reviewers/{id}/reviews",
            get(handlers::reviews::reviews_by_reviewer),
        )
        .route("/reviews/{id}", delete(handlers::reviews::delete_review));

    // Compose the app
    Router::new()
        .nest("/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(middleware::from_fn(track_metrics))
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Record a counter and latency sample for every request
async fn track_metrics(request: Request, next: Next) -> Response {
    // matched route template, not the raw path, to keep label cardinality low
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let method = request.method().to_string();

    let recorder = metrics::RequestMetrics::start(&method, &endpoint);
    let response = next.run(request).await;
    recorder.finish(response.status().as_u16());
    response
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
