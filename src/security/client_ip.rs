//! Client identity extraction from proxy headers.
//!
//! The service runs behind a CDN/reverse proxy, so the peer address is the
//! proxy's. Headers are consulted in order: `x-forwarded-for` (first hop),
//! `cf-connecting-ip`, `x-real-ip`, `remote-addr`. When none is usable every
//! request shares [`FALLBACK_CLIENT_ID`], i.e. one rate-limit bucket.

use axum::http::HeaderMap;

/// Identity used when no proxy header is present (local development).
pub const FALLBACK_CLIENT_ID: &str = "127.0.0.1";

const SINGLE_VALUE_HEADERS: [&str; 3] = ["cf-connecting-ip", "x-real-ip", "remote-addr"];

pub fn client_identifier(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    SINGLE_VALUE_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|v| v.to_str().ok())
        .map(str::trim)
        .find(|ip| !ip.is_empty())
        .unwrap_or(FALLBACK_CLIENT_ID)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let h = headers(&[
            ("x-forwarded-for", "192.168.1.1, 10.0.0.1"),
            ("x-real-ip", "10.9.9.9"),
        ]);
        assert_eq!(client_identifier(&h), "192.168.1.1");
    }

    #[test]
    fn test_header_precedence() {
        assert_eq!(
            client_identifier(&headers(&[("x-real-ip", "192.168.1.1")])),
            "192.168.1.1"
        );
        assert_eq!(
            client_identifier(&headers(&[
                ("x-real-ip", "10.0.0.2"),
                ("cf-connecting-ip", "203.0.113.7"),
            ])),
            "203.0.113.7"
        );
        assert_eq!(
            client_identifier(&headers(&[("x-forwarded-for", " , "), ("remote-addr", "10.0.0.3")])),
            "10.0.0.3"
        );
    }

    #[test]
    fn test_fallback() {
        assert_eq!(client_identifier(&HeaderMap::new()), FALLBACK_CLIENT_ID);
    }
}
