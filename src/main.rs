use std::sync::Arc;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use palaam::api::{self, AppState};
use palaam::config::AppConfig;
use palaam::onboarding::OnboardingManager;
use palaam::store::{Database, LibSqlBackend};

/// Console logging, plus a daily-rolling file when `LOG_DIR` is set.
/// The returned guard flushes the file writer on drop.
fn init_tracing(config: &AppConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let console = tracing_subscriber::fmt::layer().with_target(false);

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "palaam.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file = tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(file)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .init();
            None
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received ctrl-c, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    let _log_guard = init_tracing(&config);

    // ── Database ─────────────────────────────────────────────────────────
    let backend = if config.db_path.as_os_str() == ":memory:" {
        LibSqlBackend::new_memory().await
    } else {
        LibSqlBackend::new_local(&config.db_path).await
    }
    .with_context(|| format!("failed to open database at {}", config.db_path.display()))?;
    let db: Arc<dyn Database> = Arc::new(backend);
    tracing::info!(path = %config.db_path.display(), "Database ready");

    // ── Onboarding catalog ───────────────────────────────────────────────
    OnboardingManager::new(Arc::clone(&db))
        .seed_catalog()
        .await
        .context("failed to seed onboarding catalog")?;

    // ── HTTP server ──────────────────────────────────────────────────────
    let app = api::router(AppState::new(db), &config);
    let addr = config.bind_addr().context("invalid bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, service = %config.name, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}
