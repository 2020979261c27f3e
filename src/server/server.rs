//! HTTP server core implementation

use crate::config::{Config, ServerConfig};
use crate::limiter::RateLimiter;
use crate::server::handlers::{echo, health_check};
use crate::server::middleware::{RateLimitMiddleware, RequestIdMiddleware};
use crate::server::state::AppState;
use crate::storage::CounterStore;
use crate::storage::InMemoryCounterStore;
use crate::utils::error::{Result, ThrottleError};
use actix_web::{web, App, HttpServer as ActixHttpServer};
use std::sync::Arc;
use tracing::{info, warn};

/// HTTP server fronting the protected service with the admission filter
pub struct HttpServer {
    config: ServerConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server
    ///
    /// Connects the counter store (Redis when enabled, in-process otherwise)
    /// and builds the shared limiter.
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");

        let store = Self::connect_store(config).await?;
        let limiter = Arc::new(RateLimiter::new(config.rate_limit().clone(), store));
        let state = AppState::new(config.clone(), limiter);

        Ok(Self {
            config: config.server().clone(),
            state,
        })
    }

    async fn connect_store(config: &Config) -> Result<Arc<dyn CounterStore>> {
        #[cfg(feature = "redis")]
        if config.redis().enabled {
            let store = crate::storage::RedisCounterStore::new(config.redis()).await?;
            store.ping().await?;
            return Ok(Arc::new(store));
        }

        #[cfg(not(feature = "redis"))]
        if config.redis().enabled {
            return Err(ThrottleError::Config(
                "Redis is enabled in configuration but this build lacks the redis feature"
                    .to_string(),
            ));
        }

        warn!("Redis disabled, using in-process counter store (single instance only)");
        Ok(Arc::new(InMemoryCounterStore::new()))
    }

    /// Start the HTTP server
    pub async fn start(self) -> Result<()> {
        let bind_addr = format!("{}:{}", self.config.host, self.config.port);
        info!("Starting HTTP server on {}", bind_addr);

        let state = web::Data::new(self.state);
        let workers = self.config.workers;

        let mut server = ActixHttpServer::new(move || {
            let limiter = Arc::clone(&state.limiter);
            // /health sits outside the rate-limited scope: probes must not
            // consume a client's quota.
            App::new()
                .app_data(state.clone())
                .wrap(RequestIdMiddleware)
                .route("/health", web::get().to(health_check))
                .service(
                    web::scope("")
                        .wrap(RateLimitMiddleware::new(limiter))
                        .route("/{path:.*}", web::get().to(echo)),
                )
        })
        .bind(&bind_addr)
        .map_err(|e| {
            ThrottleError::Server(format!("Failed to bind {}: {}", bind_addr, e))
        })?;

        if workers > 0 {
            server = server.workers(workers);
        }

        info!("HTTP server listening on {}", bind_addr);

        server
            .run()
            .await
            .map_err(|e| ThrottleError::Server(format!("Server error: {}", e)))?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Load configuration and run the server until shutdown
pub async fn run_server() -> Result<()> {
    let config = match std::env::var("THROTTLEGUARD_CONFIG") {
        Ok(path) => Config::from_file(path).await?,
        Err(_) => Config::from_env()?,
    };

    let server = HttpServer::new(&config).await?;
    server.start().await
}
