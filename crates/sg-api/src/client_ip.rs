//! Best-known caller address for audit lines

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use std::convert::Infallible;
use std::net::SocketAddr;

pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Caller address as text: the first `X-Forwarded-For` entry when present,
/// otherwise the peer address of the connection.
///
/// Only used for logging. Rate limiting keys on the peer address, which the
/// caller cannot forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

pub fn resolve_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').map(str::trim).find(|entry| !entry.is_empty()));

    match (forwarded, peer) {
        (Some(entry), _) => entry.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(ClientIp(resolve_client_ip(&parts.headers, peer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("192.0.2.10:51000".parse().unwrap())
    }

    #[test]
    fn test_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static("203.0.113.5, 10.0.0.1"));

        assert_eq!(resolve_client_ip(&headers, peer()), "203.0.113.5");
    }

    #[test]
    fn test_falls_back_to_peer() {
        assert_eq!(resolve_client_ip(&HeaderMap::new(), peer()), "192.0.2.10");

        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static(" , "));
        assert_eq!(resolve_client_ip(&headers, peer()), "192.0.2.10");
    }

    #[test]
    fn test_unknown_without_any_source() {
        assert_eq!(resolve_client_ip(&HeaderMap::new(), None), "unknown");
    }
}
