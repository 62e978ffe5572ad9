//! 客户端 IP 提取
//!
//! 直连客户端使用 TCP 对端地址；对端为私有或本机地址（通常是反向代理）时，
//! 才读取 Forwarded / X-Forwarded-For。

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use tracing::trace;

/// Identity used when no client address is known.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// 检查 IP 是否为私有地址或 localhost
pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || (v6.segments()[0] & 0xfe00) == 0xfc00 // fc00::/7
                || (v6.segments()[0] & 0xffc0) == 0xfe80 // fe80::/10
        }
    }
}

/// Parse `ip` or `ip:port` into an address.
fn parse_ip(raw: &str) -> Option<IpAddr> {
    let raw = raw.trim();
    raw.parse::<SocketAddr>()
        .map(|addr| addr.ip())
        .or_else(|_| raw.parse::<IpAddr>())
        .ok()
}

/// Client IP for `req`, or `None` when the connection has no peer address.
pub fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    let peer = req.peer_addr()?.ip();
    if !is_private_or_local(&peer) {
        return Some(peer.to_string());
    }

    let forwarded = req
        .connection_info()
        .realip_remote_addr()
        .and_then(parse_ip);
    match forwarded {
        Some(ip) if ip != peer => {
            trace!("Client IP {} forwarded by proxy {}", ip, peer);
            Some(ip.to_string())
        }
        _ => Some(peer.to_string()),
    }
}

/// Rate limiter identity for `req`.
pub fn client_identity(req: &HttpRequest) -> String {
    extract_client_ip(req).unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
