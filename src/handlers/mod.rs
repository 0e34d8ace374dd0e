use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, request::Parts},
};

use crate::{AppState, error::AppError};

pub mod admin;
pub mod settings;
pub mod votes;
pub mod widget;

/// Best-effort client address. Proxy headers are only read when
/// `trust_proxy_headers` is set; otherwise the socket peer is used.
#[derive(Debug, Clone)]
pub struct ClientAddr(pub Option<String>);

impl FromRequestParts<AppState> for ClientAddr {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(ClientAddr(resolve_client_addr(
            &parts.headers,
            peer,
            state.config.trust_proxy_headers,
        )))
    }
}

fn resolve_client_addr(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy_headers: bool,
) -> Option<String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let proxied = trust_proxy_headers
        .then(|| header("x-forwarded-for").or_else(|| header("x-real-ip")))
        .flatten();

    proxied.or_else(|| peer.map(|addr| addr.ip().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forwarded() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "198.51.100.7, 10.0.0.1".parse().unwrap());
        headers
    }

    #[test]
    fn forwarded_header_is_ignored_unless_trusted() {
        let peer: SocketAddr = "203.0.113.9:51000".parse().unwrap();

        assert_eq!(
            resolve_client_addr(&forwarded(), Some(peer), false),
            Some("203.0.113.9".to_string())
        );
        assert_eq!(resolve_client_addr(&forwarded(), None, false), None);
    }

    #[test]
    fn trusted_proxy_headers_win_over_peer() {
        let peer: SocketAddr = "10.0.0.1:51000".parse().unwrap();
        assert_eq!(
            resolve_client_addr(&forwarded(), Some(peer), true),
            Some("198.51.100.7".to_string())
        );

        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "192.0.2.4".parse().unwrap());
        assert_eq!(
            resolve_client_addr(&headers, Some(peer), true),
            Some("192.0.2.4".to_string())
        );
        assert_eq!(
            resolve_client_addr(&HeaderMap::new(), Some(peer), true),
            Some("10.0.0.1".to_string())
        );
    }
}
