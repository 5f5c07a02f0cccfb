//! Admin API: bearer auth, inspection and manual reset.

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::Value;

use contact_guard::config::RateLimitConfig;
use contact_guard::RateLimiter;

mod common;

fn limiter() -> Arc<RateLimiter> {
    Arc::new(RateLimiter::new(RateLimitConfig {
        max_requests: 3,
        window_ms: 60_000,
        cleanup_interval_ms: 300_000,
    }))
}

#[tokio::test]
async fn test_requires_bearer_token() {
    let addr = common::spawn_admin(limiter()).await;
    let client = reqwest::Client::new();
    let url = format!("http://{addr}/admin/status");

    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client.get(&url).bearer_auth("wrong").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client.get(&url).bearer_auth(common::ADMIN_KEY).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "operational");
    assert_eq!(body["max_requests"], 3);
}

#[tokio::test]
async fn test_stats_show_and_reset() {
    let limiter = limiter();
    let addr = common::spawn_admin(limiter.clone()).await;
    let client = reqwest::Client::new();
    let base = format!("http://{addr}/admin/rate-limit");

    for _ in 0..3 {
        assert!(limiter.check("192.0.2.1").admitted);
    }
    limiter.check("192.0.2.2");
    assert!(!limiter.check("192.0.2.1").admitted);

    let stats: Value = client
        .get(format!("{base}/stats"))
        .bearer_auth(common::ADMIN_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["active_entries"], 2);
    assert!(stats["oldest_entry"].is_u64());

    let shown: Value = client
        .get(format!("{base}/192.0.2.1"))
        .bearer_auth(common::ADMIN_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(shown["identifier"], "192.0.2.1");
    assert_eq!(shown["limit"], 3);
    assert_eq!(shown["remaining"], 0);

    let res = client
        .delete(format!("{base}/192.0.2.1"))
        .bearer_auth(common::ADMIN_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["reset"], true);

    let after = limiter.check("192.0.2.1");
    assert!(after.admitted);
    assert_eq!(after.remaining, 2);
    assert_eq!(limiter.stats().active_entries, 2);
}

#[tokio::test]
async fn test_unknown_identifier_reports_full_quota() {
    let addr = common::spawn_admin(limiter()).await;
    let shown: Value = reqwest::Client::new()
        .get(format!("http://{addr}/admin/rate-limit/198.51.100.99"))
        .bearer_auth(common::ADMIN_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(shown["remaining"], 3);
}
