use crate::config::{StoreBackend, StreetConfig};
use crate::handlers;
use crate::services::{InMemoryStore, MongoDb, StreetStore};
use axum::{
    body::Body,
    middleware::from_fn,
    routing::{delete, get},
    Router,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: StreetConfig,
    pub store: Arc<dyn StreetStore>,
}

pub fn build_router(state: AppState) -> Router {
    let v1 = Router::new()
        .route(
            "/v1/streets",
            get(handlers::streets::find_streets).post(handlers::streets::create_street),
        )
        .route(
            "/v1/streets/:street_id",
            get(handlers::streets::get_street)
                .put(handlers::streets::update_street)
                .delete(handlers::streets::delete_street),
        )
        .route(
            "/v1/streets/:street_id/capacity",
            get(handlers::streets::get_capacity),
        )
        .route("/v1/users/:user_id", get(handlers::users::get_user))
        .route(
            "/v1/users/:user_id/login-token",
            delete(handlers::users::delete_login_token),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .merge(v1)
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        .with_state(state)
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    pub async fn build(config: StreetConfig) -> Result<Self, AppError> {
        let store: Arc<dyn StreetStore> = match config.store {
            StoreBackend::Mongo => {
                let db = MongoDb::connect(
                    config.mongodb.uri.expose_secret(),
                    &config.mongodb.database,
                )
                .await?;
                db.initialize_indexes().await.map_err(|e| {
                    tracing::error!("Failed to initialize database indexes: {}", e);
                    e
                })?;
                Arc::new(db)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory street store; data will not survive a restart");
                Arc::new(InMemoryStore::new())
            }
        };

        Self::with_store(config, store).await
    }

    /// Build around an already-constructed store.
    pub async fn with_store(
        config: StreetConfig,
        store: Arc<dyn StreetStore>,
    ) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port, store = store.backend_name(), "Street service bound");

        Ok(Self {
            port,
            listener,
            state: AppState { config, store },
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        axum::serve(
            self.listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
