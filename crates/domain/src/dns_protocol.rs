use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

/// One concrete upstream endpoint an exchange can be attempted against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DnsProtocol {
    Udp {
        addr: SocketAddr,
    },
    Tcp {
        addr: SocketAddr,
    },
    Tls {
        addr: SocketAddr,
        hostname: Arc<str>,
    },
    /// `addrs` pins the URL host so no system resolver is consulted.
    Https {
        url: Arc<str>,
        hostname: Arc<str>,
        addrs: Arc<[SocketAddr]>,
    },
}

impl DnsProtocol {
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        match self {
            DnsProtocol::Udp { addr } | DnsProtocol::Tcp { addr } | DnsProtocol::Tls { addr, .. } => {
                Some(*addr)
            }
            DnsProtocol::Https { .. } => None,
        }
    }

    pub fn hostname(&self) -> Option<&str> {
        match self {
            DnsProtocol::Tls { hostname, .. } | DnsProtocol::Https { hostname, .. } => {
                Some(hostname)
            }
            _ => None,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            DnsProtocol::Udp { .. } => "UDP",
            DnsProtocol::Tcp { .. } => "TCP",
            DnsProtocol::Tls { .. } => "TLS",
            DnsProtocol::Https { .. } => "HTTPS",
        }
    }

    /// Address part used as a metrics label.
    pub fn address_label(&self) -> String {
        match self {
            DnsProtocol::Https { url, .. } => url.to_string(),
            other => other
                .socket_addr()
                .map(|addr| addr.to_string())
                .unwrap_or_default(),
        }
    }
}

impl fmt::Display for DnsProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DnsProtocol::Udp { addr } => write!(f, "udp://{}", addr),
            DnsProtocol::Tcp { addr } => write!(f, "tcp://{}", addr),
            DnsProtocol::Tls { addr, hostname } => write!(f, "tls://{}@{}", hostname, addr),
            DnsProtocol::Https { url, .. } => write!(f, "{}", url),
        }
    }
}
