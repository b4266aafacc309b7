//! LearnEssence API server.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use learnessence_api::{build_rate_limiter, build_router, AppState, Repositories, ServerConfig};
use learnessence_core::InputGuardrail;
use learnessence_db::{log_pool_metrics, Database, PoolConfig};
use learnessence_inference::{OpenAIBackend, StudyAgents, WhisperBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "learnessence_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "learnessence_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("learnessence-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            // No ANSI in files unless asked for.
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = ServerConfig::from_env()?;

    let pool_config = PoolConfig::from_max_connections(config.database_max_connections)?;
    let db = Database::connect_with_config(&config.database_url, pool_config).await?;
    db.migrate().await?;
    log_pool_metrics(db.pool());
    info!(subsystem = "db", "Migrations applied");

    let mut state = AppState::new(Repositories::from(db))
        .with_session_cookie_name(config.session_cookie_name.clone())
        .with_max_upload_bytes(config.max_upload_bytes);

    match OpenAIBackend::from_env()? {
        Some(backend) => {
            info!(
                subsystem = "inference",
                component = "openai",
                model = backend.config().gen_model.as_str(),
                guardrail = ?config.guardrail_strategy,
                "Generation backend configured"
            );
            state = state.with_agents(StudyAgents::new(
                Arc::new(backend),
                InputGuardrail::new(config.guardrail_strategy),
            ));
        }
        None => warn!(
            subsystem = "inference",
            "No generation backend configured; note generation disabled, \
             flashcards and summaries use text heuristics"
        ),
    }

    match WhisperBackend::from_env() {
        Some(backend) => {
            info!(
                subsystem = "inference",
                component = "whisper",
                "Transcription backend configured"
            );
            state = state.with_transcriber(Arc::new(backend));
        }
        None => warn!(
            subsystem = "inference",
            "No transcription backend configured; /api/transcribe disabled"
        ),
    }

    if config.rate_limit_enabled {
        info!(
            requests = config.rate_limit_requests,
            period_secs = config.rate_limit_period_secs,
            "Rate limiting enabled"
        );
        state = state.with_rate_limiter(build_rate_limiter(
            config.rate_limit_requests,
            config.rate_limit_period_secs,
        ));
    }

    let app = build_router(state, &config.allowed_origins);

    let addr: SocketAddr = config.bind_address().parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
