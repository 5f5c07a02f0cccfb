//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Rate limiter, contact service, HTTP layer produce:
//!     → logging.rs (structured tracing events, security events)
//!     → metrics.rs (counters and gauges)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Security events carry field names and client identity, never content
//! - Metrics calls are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
