//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → wait_for_shutdown() resolves
//!
//! Shutdown (shutdown.rs):
//!     trigger() → HTTP servers stop accepting and drain
//!               → rate limiter sweep exits
//!               → RateLimiter::destroy() clears the store
//! ```
//!
//! # Design Decisions
//! - Teardown is explicit: the binary calls it, no exit hooks
//! - Background tasks subscribe to one broadcast channel

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_shutdown;
