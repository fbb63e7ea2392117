use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ideaboard_events::integrations::http::{
    HttpIdeaGrader, HttpMailingList, HttpTransport, WebhookSpreadsheetSink,
};
use ideaboard_events::{EventBus, SideEffectDispatcher};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ideaboard_api::background;
use ideaboard_api::config::{IntegrationConfig, ServerConfig};
use ideaboard_api::router::build_app_router;
use ideaboard_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ideaboard_api=debug,ideaboard_db=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = ideaboard_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    ideaboard_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    ideaboard_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus and side effects ---
    let event_bus = Arc::new(EventBus::default());
    let background_cancel = CancellationToken::new();

    let dispatcher = build_dispatcher(pool.clone(), &config.integrations);
    let dispatcher_handle = tokio::spawn(dispatcher.run(
        event_bus.subscribe(),
        background_cancel.clone(),
    ));

    let sweep_handle = tokio::spawn(background::test_submission_sweep::run(
        pool.clone(),
        background_cancel.clone(),
    ));
    tracing::info!("Background services started (side-effect dispatcher, test submission sweep)");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    background_cancel.cancel();
    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    let _ = tokio::time::timeout(grace, dispatcher_handle).await;
    let _ = tokio::time::timeout(grace, sweep_handle).await;
    drop(event_bus);

    tracing::info!("Graceful shutdown complete");
}

/// Wire the configured HTTP collaborators into a dispatcher. Unset URLs
/// leave the matching side effect disabled.
fn build_dispatcher(pool: ideaboard_db::DbPool, integrations: &IntegrationConfig) -> SideEffectDispatcher {
    let mut dispatcher = SideEffectDispatcher::new(pool);

    let transport = match HttpTransport::new() {
        Ok(transport) => transport,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client, external integrations disabled");
            return dispatcher;
        }
    };

    if let Some(url) = &integrations.grader_url {
        dispatcher = dispatcher.with_grader(Arc::new(HttpIdeaGrader::new(transport.clone(), url)));
    }
    if let Some(url) = &integrations.mailing_list_url {
        dispatcher =
            dispatcher.with_mailing_list(Arc::new(HttpMailingList::new(transport.clone(), url)));
    }
    if let Some(url) = &integrations.spreadsheet_webhook_url {
        dispatcher =
            dispatcher.with_spreadsheet(Arc::new(WebhookSpreadsheetSink::new(transport, url)));
    }
    dispatcher
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
