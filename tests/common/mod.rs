//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::net::TcpListener;

use contact_guard::config::{MailConfig, RateLimitConfig, ServiceConfig};
use contact_guard::contact::ContactFormInput;
use contact_guard::mail::{EmailMessage, MailError, Mailer};
use contact_guard::{ContactService, HttpServer, RateLimiter, Shutdown};

pub const ADMIN_KEY: &str = "test-admin-key";

/// Mailer that keeps every message in memory.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> Result<String, MailError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(message);
        Ok(format!("<{}@test>", sent.len()))
    }
}

pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.rate_limit = RateLimitConfig {
        max_requests: 5,
        window_ms: 60_000,
        cleanup_interval_ms: 300_000,
    };
    config.mail = MailConfig {
        to_addresses: vec!["office@example.org".into()],
        site_name: "テスト協会".into(),
        ..MailConfig::default()
    };
    config
}

pub fn contact_service(config: &ServiceConfig) -> (ContactService, Arc<RecordingMailer>) {
    let limiter = Arc::new(RateLimiter::new(config.rate_limit));
    let mailer = Arc::new(RecordingMailer::default());
    let service = ContactService::new(limiter, mailer.clone(), config.mail.clone());
    (service, mailer)
}

pub fn sample_form() -> ContactFormInput {
    ContactFormInput::new("山田太郎", "yamada@example.com", "お問い合わせです。")
}

/// Running public server bound to an ephemeral port.
pub struct TestApp {
    pub addr: SocketAddr,
    pub limiter: Arc<RateLimiter>,
    pub mailer: Arc<RecordingMailer>,
    pub shutdown: Shutdown,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn spawn_app(config: ServiceConfig) -> TestApp {
    let limiter = Arc::new(RateLimiter::new(config.rate_limit));
    let mailer = Arc::new(RecordingMailer::default());
    let contact = Arc::new(ContactService::new(
        limiter.clone(),
        mailer.clone(),
        config.mail.clone(),
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, contact);
    tokio::spawn(server.run(listener, shutdown.wait()));

    TestApp { addr, limiter, mailer, shutdown }
}

/// Serve the admin router for `limiter` on an ephemeral port.
pub async fn spawn_admin(limiter: Arc<RateLimiter>) -> SocketAddr {
    let router = contact_guard::admin::setup_admin_router(limiter, ADMIN_KEY);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
