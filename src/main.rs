//! contact-guard
//!
//! Contact form endpoint that rate-limits and sanitizes submissions before
//! handing them to a mail transport.
//!
//! # Architecture Overview
//!
//! ```text
//!     POST /api/contact
//!         │
//!         ▼
//!   ┌──────────┐   ┌──────────────┐   ┌──────────────────────────────┐   ┌────────┐
//!   │   http   │──▶│   security   │──▶│           contact            │──▶│  mail  │
//!   │  server  │   │ rate limiter │   │ validate → sanitize → review │   │ Mailer │
//!   └──────────┘   └──────────────┘   │  → safety predicates         │   └────────┘
//!                         ▲           └──────────────────────────────┘
//!                         │
//!                  ┌──────────────┐
//!                  │    admin     │  stats / status / reset (bearer token)
//!                  └──────────────┘
//!
//!   config · lifecycle · observability are shared by every subsystem
//! ```
//!
//! Usage: `contact-guard [CONFIG.toml]`. Without a path, `CONTACT_GUARD_CONFIG`
//! is tried, then defaults plus environment overrides.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;

use contact_guard::admin::setup_admin_router;
use contact_guard::config::{load_config, ServiceConfig};
use contact_guard::mail::{LogMailer, Mailer};
use contact_guard::observability::{logging, metrics};
use contact_guard::{lifecycle, ContactService, HttpServer, RateLimiter, Shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match config_path() {
        Some(path) => load_config(&path)?,
        None => ServiceConfig::from_env()?,
    };

    logging::init(&config.observability);
    tracing::info!("contact-guard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_requests = config.rate_limit.max_requests,
        window_ms = config.rate_limit.window_ms,
        recipients = config.mail.to_addresses.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let limiter = Arc::new(RateLimiter::new(config.rate_limit));
    let _sweep = limiter.start_cleanup();

    let mailer: Arc<dyn Mailer> = Arc::new(LogMailer);
    let contact = Arc::new(ContactService::new(
        limiter.clone(),
        mailer,
        config.mail.clone(),
    ));

    let shutdown = Shutdown::new();

    let admin_task = if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        tracing::info!(address = %listener.local_addr()?, "Admin API listening");
        let router = setup_admin_router(limiter.clone(), &config.admin.api_key);
        let stop = shutdown.wait();
        Some(tokio::spawn(async move {
            axum::serve(listener, router).with_graceful_shutdown(stop).await
        }))
    } else {
        None
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(&config, contact);
    let server_task = tokio::spawn(server.run(listener, shutdown.wait()));

    lifecycle::wait_for_shutdown().await;
    shutdown.trigger();

    server_task.await??;
    if let Some(task) = admin_task {
        task.await??;
    }

    limiter.destroy();
    tracing::info!("Shutdown complete");
    Ok(())
}

fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("CONTACT_GUARD_CONFIG"))
        .map(PathBuf::from)
}
