// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Form Service
//!
//! Serves a contact form and accepts submissions two ways:
//!
//! 1. **Synchronous**: the form posts back to its own path and the browser
//!    is redirected with `cf_sent=1` or `cf_error=<reason>`.
//!
//! 2. **Asynchronous**: a script posts the same fields plus
//!    `action=contact_form_submit` to the AJAX path and gets JSON back.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (and `.env`):
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `ADMIN_EMAIL`: Notification recipient (default: admin@example.com)
//! - `RATE_LIMIT_MAX`: Submissions per client per window (default: 3)
//! - `RATE_LIMIT_WINDOW_SECS`: Window length (default: 3600)
//! - `NONCE_SECRET`: Security token secret (default: random per process)
//! - `MAIL_TRANSPORT`: `log` or `sendmail` (default: log)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_form::{
    config::{Config, MailTransport},
    handlers::{router, AppState},
    mailer::{LogMailer, Mailer, SendmailMailer},
    metrics::Metrics,
    nonce::NonceManager,
    pipeline::SubmissionHandler,
    store::{MemoryStore, TransientStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        form_path = %config.site.form_path,
        ajax_path = %config.site.ajax_path,
        max_submissions = config.rate_limit.max_submissions,
        window_secs = config.rate_limit.window_secs,
        transport = ?config.mail.transport,
        "Starting contact form service"
    );

    let lifetime = config.security.nonce_lifetime();
    let nonces = match &config.security.nonce_secret {
        Some(secret) => NonceManager::from_secret(secret, lifetime),
        None => {
            warn!("NONCE_SECRET not set, using a per-process key");
            NonceManager::random(lifetime)
        }
    };

    let mailer: Arc<dyn Mailer> = match config.mail.transport {
        MailTransport::Log => Arc::new(LogMailer),
        MailTransport::Sendmail => Arc::new(SendmailMailer::new(
            config.mail.sendmail_path.clone(),
            config.mail.from_address.clone(),
        )),
    };

    // Create application state
    let store = Arc::new(MemoryStore::new());
    let handler = SubmissionHandler::new(&config, nonces, store.clone(), mailer);

    let state = Arc::new(AppState {
        handler,
        metrics: Metrics::new()?,
        config: config.clone(),
    });

    // Spawn cleanup task
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            store.purge_expired().await;
        }
    });

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
