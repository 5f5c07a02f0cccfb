//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming contact submission:
//!     → client_ip.rs (derive client identity from proxy headers)
//!     → rate_limit.rs (admit/refuse per identity, fixed window)
//!     → headers.rs (X-RateLimit-* on the response)
//!     → contact pipeline (validation + sanitization)
//! ```
//!
//! # Design Decisions
//! - Admission happens before any validation work
//! - The limiter never errors; callers inspect `admitted`
//! - State is in-memory only and lost on restart

pub mod client_ip;
pub mod headers;
pub mod rate_limit;

pub use client_ip::{client_identifier, FALLBACK_CLIENT_ID};
pub use headers::rate_limit_headers;
pub use rate_limit::{
    CleanupHandle, RateLimitEntry, RateLimitResult, RateLimitStatus, RateLimiter,
    RateLimiterStats,
};
