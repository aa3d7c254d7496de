//! Client IP extraction for click metadata
//!
//! - `None` mode trusts only the socket peer address
//! - `Cloudflare` mode reads `CF-Connecting-IP`
//! - `Standard` mode walks `X-Forwarded-For` from the right, skipping
//!   configured trusted proxies, and only when the peer itself is trusted

use axum::http::HeaderMap;
use std::net::IpAddr;
use tracing::warn;

use crate::config::{AnalyticsConfig, TrustedProxyMode};

/// Extract the client IP address according to the trust configuration,
/// falling back to the socket address whenever headers cannot be trusted.
pub fn extract_client_ip(headers: &HeaderMap, socket_addr: IpAddr, config: &AnalyticsConfig) -> IpAddr {
    match config.trusted_proxy_mode {
        TrustedProxyMode::Cloudflare => extract_cloudflare_ip(headers).unwrap_or_else(|| {
            warn!("CF-Connecting-IP header missing in Cloudflare mode, using socket address");
            socket_addr
        }),
        TrustedProxyMode::Standard => {
            extract_from_x_forwarded_for(headers, socket_addr, config).unwrap_or(socket_addr)
        }
        TrustedProxyMode::None => socket_addr,
    }
}

fn extract_cloudflare_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("cf-connecting-ip")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

fn is_trusted(ip: IpAddr, config: &AnalyticsConfig) -> bool {
    config.trusted_proxies.iter().any(|net| net.contains(&ip))
}

fn extract_from_x_forwarded_for(
    headers: &HeaderMap,
    socket_addr: IpAddr,
    config: &AnalyticsConfig,
) -> Option<IpAddr> {
    // With a trust list, a peer outside it may have forged the header
    if !config.trusted_proxies.is_empty() && !is_trusted(socket_addr, config) {
        return None;
    }

    let xff = headers.get("x-forwarded-for")?.to_str().ok()?;
    let ips: Vec<IpAddr> = xff
        .split(',')
        .filter_map(|s| s.trim().parse::<IpAddr>().ok())
        .collect();

    ips.iter()
        .rev()
        .find(|ip| !is_trusted(**ip, config))
        .or_else(|| ips.first())
        .copied()
}
