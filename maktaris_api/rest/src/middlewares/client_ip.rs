//! Determine the ip address of the connecting client, optionally resolving a
//! real ip header set by a trusted reverse proxy.

use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{
    extract::{ConnectInfo, Request},
    middleware::{from_fn, Next},
    Router,
};
use tracing::{debug, error, warn};

use crate::RealIpConfig;

pub fn add<S: Clone + Send + Sync + 'static>(
    router: Router<S>,
    real_ip_config: Option<Arc<RealIpConfig>>,
) -> Router<S> {
    router.layer(from_fn(move |mut request: Request, next: Next| {
        let client_ip = ClientIp::from_request(&request, real_ip_config.as_deref());
        request.extensions_mut().insert(client_ip);
        next.run(request)
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientIp(pub IpAddr);

impl ClientIp {
    fn from_request(request: &Request, real_ip_config: Option<&RealIpConfig>) -> Self {
        let peer_ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .expect("connect info is set by the server")
            .ip();

        let Some(RealIpConfig { header, set_from }) = real_ip_config else {
            return Self(peer_ip);
        };

        let header_value = request.headers().get(header);

        if *set_from != peer_ip {
            if let Some(header_value) = header_value {
                debug!(%peer_ip, ?header_value, "ignoring real ip header from untrusted source");
            }
            return Self(peer_ip);
        }

        let Some(header_value) = header_value else {
            warn!(%peer_ip, "real ip header not found");
            return Self(peer_ip);
        };

        let Some(real_ip) = header_value
            .to_str()
            .ok()
            .and_then(|real_ip| real_ip.parse().ok())
        else {
            error!(%peer_ip, ?header_value, "failed to parse real ip header value");
            return Self(peer_ip);
        };

        Self(real_ip)
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request as HttpRequest};

    use super::*;

    const PEER: IpAddr = IpAddr::V4(std::net::Ipv4Addr::new(10, 0, 0, 2));
    const PROXY: IpAddr = IpAddr::V4(std::net::Ipv4Addr::new(10, 0, 0, 1));
    const REAL: IpAddr = IpAddr::V4(std::net::Ipv4Addr::new(203, 0, 113, 7));

    #[test]
    fn uses_peer_address_without_real_ip_config() {
        // Arrange
        let request = request(PEER, Some(REAL));

        // Act
        let result = ClientIp::from_request(&request, None);

        // Assert
        assert_eq!(result, ClientIp(PEER));
    }

    #[test]
    fn resolves_header_from_trusted_proxy() {
        // Arrange
        let request = request(PROXY, Some(REAL));

        // Act
        let result = ClientIp::from_request(&request, Some(&config()));

        // Assert
        assert_eq!(result, ClientIp(REAL));
    }

    #[test]
    fn ignores_header_from_untrusted_peer() {
        // Arrange
        let request = request(PEER, Some(REAL));

        // Act
        let result = ClientIp::from_request(&request, Some(&config()));

        // Assert
        assert_eq!(result, ClientIp(PEER));
    }

    #[test]
    fn falls_back_to_peer_address_when_header_is_missing() {
        // Arrange
        let request = request(PROXY, None);

        // Act
        let result = ClientIp::from_request(&request, Some(&config()));

        // Assert
        assert_eq!(result, ClientIp(PROXY));
    }

    fn config() -> RealIpConfig {
        RealIpConfig {
            header: "X-Real-Ip".into(),
            set_from: PROXY,
        }
    }

    fn request(peer: IpAddr, real_ip_header: Option<IpAddr>) -> Request {
        let mut builder = HttpRequest::builder()
            .uri("/api/send-email")
            .extension(ConnectInfo(SocketAddr::new(peer, 49152)));
        if let Some(real_ip) = real_ip_header {
            builder = builder.header("X-Real-Ip", real_ip.to_string());
        }
        builder.body(Body::empty()).unwrap()
    }
}
