use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use funeral_desk::api::{ApiState, api_routes};
use funeral_desk::config::AppConfig;
use funeral_desk::session::{ProfileService, SessionService};

#[tokio::main]
async fn main() -> funeral_desk::error::Result<()> {
    let config = AppConfig::from_env()?;

    // Initialize tracing; keep the appender guard alive so file logs flush.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let (file_layer, _log_guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "funeral-desk.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    eprintln!("⚱️  Funeral Desk v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/api", config.http_port);
    eprintln!("   Sign-in redirect: {}", config.redirects.sign_in);
    match config.wizard_fallback_step {
        Some(step) => eprintln!("   Wizard fallback step: {step}"),
        None => eprintln!("   Wizard fallback step: none"),
    }

    // ── Session feeds ────────────────────────────────────────────────────
    let session = Arc::new(SessionService::new());
    let profile = Arc::new(ProfileService::new());

    let state = ApiState {
        session,
        profile,
        redirects: config.redirects.clone(),
        wizard_fallback_step: config.wizard_fallback_step,
    };
    let app = api_routes(state).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port)).await?;
    tracing::info!(port = config.http_port, "API server started");
    axum::serve(listener, app).await?;

    Ok(())
}
