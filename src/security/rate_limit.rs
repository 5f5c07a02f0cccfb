//! Fixed-window rate limiting for contact submissions, keyed by client identity.
//!
//! Each identifier gets a counter and a window deadline. The first request
//! (or the first one after the deadline) opens a fresh window; requests past
//! `max_requests` inside the window are refused without touching the entry.
//! Fixed windows keep memory and check cost O(1) per identifier at the price of
//! allowing up to `2 × max_requests` around a window boundary.
//!
//! Entries live in a [`DashMap`], so a check is an atomic read-modify-write on
//! one key while different keys proceed independently. A background sweep
//! (see [`RateLimiter::start_cleanup`]) removes expired entries.

use std::sync::{Arc, Weak};
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::config::RateLimitConfig;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Per-identifier state. Timestamps are milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// Requests admitted in the current window.
    pub count: u32,
    pub window_reset_at: u64,
    /// Diagnostic only.
    pub first_request_at: u64,
}

impl RateLimitEntry {
    fn open(now: u64, window_ms: u64) -> Self {
        Self {
            count: 1,
            window_reset_at: now.saturating_add(window_ms),
            first_request_at: now,
        }
    }

    fn is_expired(&self, now: u64) -> bool {
        now >= self.window_reset_at
    }
}

/// Outcome of one admit check. Built fresh per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitResult {
    pub admitted: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Window deadline in epoch milliseconds.
    pub reset_at: u64,
    /// Seconds until the window resets; only set on rejection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Read-only view of an identifier's quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimiterStats {
    pub active_entries: usize,
    /// Earliest `first_request_at` among stored entries.
    pub oldest_entry: Option<u64>,
}

/// Process-wide counter store. Construct one and share it behind an `Arc`.
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    config: RateLimitConfig,
    sweep_stop: Shutdown,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
            sweep_stop: Shutdown::new(),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Admit or refuse one request from `identifier`.
    pub fn check(&self, identifier: &str) -> RateLimitResult {
        self.check_at(identifier, now_ms())
    }

    pub(crate) fn check_at(&self, identifier: &str, now: u64) -> RateLimitResult {
        let max = self.config.max_requests;
        let window_ms = self.config.window_ms;

        // The entry guard holds the shard lock until the match arm returns.
        match self.entries.entry(identifier.to_string()) {
            Entry::Vacant(slot) => {
                let entry = slot.insert(RateLimitEntry::open(now, window_ms));
                self.admitted(max.saturating_sub(1), entry.window_reset_at)
            }
            Entry::Occupied(mut slot) => {
                let entry = slot.get_mut();
                if entry.is_expired(now) {
                    *entry = RateLimitEntry::open(now, window_ms);
                    return self.admitted(max.saturating_sub(1), entry.window_reset_at);
                }

                if entry.count >= max {
                    let retry_after = entry.window_reset_at.saturating_sub(now).div_ceil(1000);
                    return RateLimitResult {
                        admitted: false,
                        limit: max,
                        remaining: 0,
                        reset_at: entry.window_reset_at,
                        retry_after_secs: Some(retry_after),
                        error: Some(format!(
                            "Rate limit exceeded. Try again in {} seconds.",
                            retry_after
                        )),
                    };
                }

                entry.count += 1;
                self.admitted(max.saturating_sub(entry.count), entry.window_reset_at)
            }
        }
    }

    fn admitted(&self, remaining: u32, reset_at: u64) -> RateLimitResult {
        RateLimitResult {
            admitted: true,
            limit: self.config.max_requests,
            remaining,
            reset_at,
            retry_after_secs: None,
            error: None,
        }
    }

    /// Forget `identifier` unconditionally.
    pub fn reset(&self, identifier: &str) {
        self.entries.remove(identifier);
    }

    /// Current quota for `identifier` without consuming any of it.
    pub fn status(&self, identifier: &str) -> RateLimitStatus {
        self.status_at(identifier, now_ms())
    }

    pub(crate) fn status_at(&self, identifier: &str, now: u64) -> RateLimitStatus {
        let limit = self.config.max_requests;
        match self.entries.get(identifier) {
            Some(entry) if !entry.is_expired(now) => RateLimitStatus {
                limit,
                remaining: limit.saturating_sub(entry.count),
                reset_at: entry.window_reset_at,
            },
            _ => RateLimitStatus {
                limit,
                remaining: limit,
                reset_at: now.saturating_add(self.config.window_ms),
            },
        }
    }

    pub fn stats(&self) -> RateLimiterStats {
        let oldest_entry = self
            .entries
            .iter()
            .map(|e| e.value().first_request_at)
            .min();
        RateLimiterStats {
            active_entries: self.entries.len(),
            oldest_entry,
        }
    }

    /// Remove every entry whose window has passed. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(now_ms())
    }

    pub(crate) fn sweep_expired_at(&self, now: u64) -> usize {
        let before = self.entries.len();
        // retain takes each shard's write lock, so a concurrent check on the
        // same key either runs before (and refreshes the entry) or after.
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before.saturating_sub(self.entries.len());

        metrics::record_rate_limit_entries(self.entries.len());
        if removed > 0 {
            metrics::record_rate_limit_swept(removed);
            tracing::debug!(removed, remaining = self.entries.len(), "Rate limit sweep");
        }
        removed
    }

    /// Spawn the periodic sweep on the current Tokio runtime.
    ///
    /// The task holds only a weak reference, so it never keeps the limiter
    /// alive; it exits when the limiter is dropped, when [`destroy`] is called,
    /// or when the returned handle is stopped.
    ///
    /// [`destroy`]: RateLimiter::destroy
    pub fn start_cleanup(self: &Arc<Self>) -> CleanupHandle {
        let limiter: Weak<Self> = Arc::downgrade(self);
        let mut stop = self.sweep_stop.subscribe();
        let period = self.config.cleanup_interval();

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let Some(limiter) = limiter.upgrade() else { break };
                        limiter.sweep_expired();
                    }
                    _ = stop.recv() => break,
                }
            }
            tracing::debug!("Rate limit sweep stopped");
        });

        tracing::info!(interval_ms = self.config.cleanup_interval_ms, "Rate limit sweep started");
        CleanupHandle { handle }
    }

    /// Stop every sweep task and drop all stored entries.
    pub fn destroy(&self) {
        self.sweep_stop.trigger();
        self.entries.clear();
        metrics::record_rate_limit_entries(0);
        tracing::info!("Rate limiter destroyed");
    }
}

/// Handle to a running sweep task.
pub struct CleanupHandle {
    handle: JoinHandle<()>,
}

impl CleanupHandle {
    /// Cancel the sweep without touching stored entries.
    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task to exit after `stop` or `destroy`.
    pub async fn join(self) {
        let _ = self.handle.await;
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
