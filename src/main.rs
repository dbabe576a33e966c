//! Webchat host - serves one widget instance over HTTP and SSE

use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use webchat_widget::api::{create_router, AppState};
use webchat_widget::config::{port_from_env, WidgetConfig};
use webchat_widget::widget::HostedWidget;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webchat_widget=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = WidgetConfig::from_env()?;
    let port = port_from_env()?;

    tracing::info!(
        endpoint = %config.webhook_url,
        timeout_secs = config.request_timeout.as_secs(),
        busy_policy = %config.busy_policy,
        "Widget configured"
    );

    let state = AppState::new(HostedWidget::from_config(config)?);
    let widget = state.widget.clone();

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Webchat host listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await?;

    widget.shutdown();
    Ok(())
}
