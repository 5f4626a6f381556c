use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use proxylink_api::config::ServerConfig;
use proxylink_api::notifications::NotificationMailer;
use proxylink_api::{routes, state};

use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("proxylink_api=debug,tower_http=debug"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = proxylink_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    proxylink_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    proxylink_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready, migrations applied");

    // --- Event bus + notification mailer ---
    let event_bus = Arc::new(proxylink_events::EventBus::default());

    // Without SMTP configuration the mailer still consumes events and logs
    // what it would have sent.
    let email_delivery =
        proxylink_events::EmailConfig::from_env().map(proxylink_events::EmailDelivery::new);
    if email_delivery.is_none() {
        tracing::info!("SMTP_HOST not set, email notifications disabled");
    }
    let mailer = NotificationMailer::new(pool.clone(), email_delivery);
    let mailer_handle = tokio::spawn(mailer.run(event_bus.subscribe()));
    tracing::info!("Notification mailer started");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
    };

    let request_id_header = HeaderName::from_static("x-request-id");

    // --- Router ---
    // Health stays at the root; everything else is versioned under /api/v1.
    // Layers apply bottom-up: request ids are set first, CORS outermost.
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(build_cors_layer(&config))
        .with_state(state);

    // --- Serve ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    // Dropping the bus sender closes the broadcast channel; the mailer loop
    // exits when it observes the closure.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), mailer_handle).await;
    tracing::info!("Notification mailer shut down, exiting");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Listens for SIGINT (Ctrl-C) and, on Unix, SIGTERM, so the server
/// stops cleanly under both interactive use and a process manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("SIGINT received, starting graceful shutdown"),
        () = terminate => tracing::info!("SIGTERM received, starting graceful shutdown"),
    }
}

/// Build the CORS middleware layer from server configuration.
///
/// Panics at startup on a malformed origin; CORS misconfiguration must
/// not survive into a running server.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{origin}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
