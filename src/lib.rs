//! Contact form service with rate limiting and input hardening.

pub mod admin;
pub mod config;
pub mod contact;
pub mod http;
pub mod lifecycle;
pub mod mail;
pub mod observability;
pub mod security;

pub use config::schema::ServiceConfig;
pub use contact::ContactService;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use security::RateLimiter;
