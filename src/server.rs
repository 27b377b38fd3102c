//! HTTP server lifecycle: startup, background reporter and graceful shutdown.

use std::future::IntoFuture;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::api::routes::create_router;
use crate::config::Settings;
use crate::db::{establish_async_connection_pool, run_pending_migrations};
use crate::error::{AppError, AppResult};
use crate::jobs::UserCountReporter;
use crate::repositories::Repositories;
use crate::state::AppState;

/// HTTP server manager
pub struct Server {
    settings: Settings,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Start the server and run until a shutdown signal.
    ///
    /// Ctrl+C or SIGTERM cancels one process-wide token. That stops
    /// accepting connections, ends the user count reporter and aborts
    /// in-flight store calls. Open requests get `server.shutdown_timeout`
    /// seconds to finish.
    ///
    /// # Errors
    /// - Invalid configuration
    /// - Connection pool or migration failures
    /// - Address binding errors
    pub async fn run(self) -> AppResult<()> {
        self.settings.validate()?;

        tracing::info!(
            app_name = %self.settings.application.name,
            app_version = %self.settings.application.version,
            "Application starting"
        );
        tracing::info!(
            host = %self.settings.server.host,
            port = self.settings.server.port,
            shutdown_timeout = self.settings.server.shutdown_timeout,
            max_connections = self.settings.database.max_connections,
            "Configuration loaded"
        );

        let pool = establish_async_connection_pool(&self.settings.database).await?;
        tracing::info!("Database connection pool initialized");

        if self.settings.database.auto_migrate {
            let applied = run_pending_migrations(&self.settings.database.url).await?;
            tracing::info!(applied = applied.len(), "Pending migrations applied");
        }

        let shutdown = CancellationToken::new();
        let repos = Repositories::postgres(pool, shutdown.clone());

        let reporter = tokio::spawn(
            UserCountReporter::new(repos.users.clone()).run(shutdown.clone()),
        );

        let router = create_router(AppState::new(repos, &self.settings.jwt.secret));

        let address = self.settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            AppError::Internal {
                source: anyhow::anyhow!("Failed to bind to {}: {}", address, e),
            }
        })?;
        tracing::info!(address = %address, "Server listening");

        tokio::spawn(cancel_on_signal(shutdown.clone()));

        let grace = Duration::from_secs(self.settings.server.shutdown_timeout);
        let served = serve_until_cancelled(listener, router, shutdown.clone(), grace).await;

        // A serve error ends the process too; stop the reporter either way.
        shutdown.cancel();
        if let Err(e) = reporter.await {
            tracing::error!(error = %e, "User count reporter task failed");
        }

        served?;
        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Serve `router` until `shutdown` fires, then allow `grace` for open
/// requests before abandoning them.
pub async fn serve_until_cancelled(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
    grace: Duration,
) -> AppResult<()> {
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .into_future();
    tokio::pin!(server);

    let deadline = async {
        shutdown.cancelled().await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = &mut server => result.map_err(|e| AppError::Internal {
            source: anyhow::Error::from(e).context("HTTP server failed"),
        }),
        _ = deadline => {
            tracing::warn!(
                grace_secs = grace.as_secs(),
                "Graceful shutdown timed out, dropping open connections"
            );
            Ok(())
        }
    }
}

/// Cancel `shutdown` on Ctrl+C or SIGTERM.
async fn cancel_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
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
        _ = ctrl_c => tracing::info!("Received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => tracing::info!("Received SIGTERM, initiating graceful shutdown"),
        _ = shutdown.cancelled() => return,
    }
    shutdown.cancel();
}
