use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// A well-known public resolver reachable over DoT, DoH and plaintext.
#[derive(Debug, PartialEq, Eq)]
pub struct Provider {
    pub name: &'static str,
    pub tls_name: &'static str,
    pub doh_url: &'static str,
    pub ipv4: &'static [Ipv4Addr],
    pub ipv6: &'static [Ipv6Addr],
}

const PROVIDERS: &[Provider] = &[
    Provider {
        name: "cloudflare",
        tls_name: "cloudflare-dns.com",
        doh_url: "https://cloudflare-dns.com/dns-query",
        ipv4: &[Ipv4Addr::new(1, 1, 1, 1), Ipv4Addr::new(1, 0, 0, 1)],
        ipv6: &[
            Ipv6Addr::new(0x2606, 0x4700, 0x4700, 0, 0, 0, 0, 0x1111),
            Ipv6Addr::new(0x2606, 0x4700, 0x4700, 0, 0, 0, 0, 0x1001),
        ],
    },
    Provider {
        name: "google",
        tls_name: "dns.google",
        doh_url: "https://dns.google/dns-query",
        ipv4: &[Ipv4Addr::new(8, 8, 8, 8), Ipv4Addr::new(8, 8, 4, 4)],
        ipv6: &[
            Ipv6Addr::new(0x2001, 0x4860, 0x4860, 0, 0, 0, 0, 0x8888),
            Ipv6Addr::new(0x2001, 0x4860, 0x4860, 0, 0, 0, 0, 0x8844),
        ],
    },
    Provider {
        name: "quad9",
        tls_name: "dns.quad9.net",
        doh_url: "https://dns.quad9.net/dns-query",
        ipv4: &[Ipv4Addr::new(9, 9, 9, 9), Ipv4Addr::new(149, 112, 112, 112)],
        ipv6: &[
            Ipv6Addr::new(0x2620, 0xfe, 0, 0, 0, 0, 0, 0xfe),
            Ipv6Addr::new(0x2620, 0xfe, 0, 0, 0, 0, 0, 0x9),
        ],
    },
    Provider {
        name: "cleanbrowsing",
        tls_name: "security-filter-dns.cleanbrowsing.org",
        doh_url: "https://doh.cleanbrowsing.org/doh/security-filter/",
        ipv4: &[
            Ipv4Addr::new(185, 228, 168, 9),
            Ipv4Addr::new(185, 228, 169, 9),
        ],
        ipv6: &[
            Ipv6Addr::new(0x2a0d, 0x2a00, 1, 0, 0, 0, 0, 2),
            Ipv6Addr::new(0x2a0d, 0x2a00, 2, 0, 0, 0, 0, 2),
        ],
    },
];

impl Provider {
    pub fn by_name(name: &str) -> Option<&'static Provider> {
        PROVIDERS
            .iter()
            .find(|provider| provider.name.eq_ignore_ascii_case(name))
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        PROVIDERS.iter().map(|provider| provider.name)
    }

    /// IPv4 addresses first, then IPv6 ones when `ipv6` is set.
    pub fn addresses(&self, ipv6: bool) -> Vec<IpAddr> {
        let v4 = self.ipv4.iter().copied().map(IpAddr::V4);
        if ipv6 {
            v4.chain(self.ipv6.iter().copied().map(IpAddr::V6)).collect()
        } else {
            v4.collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let provider = Provider::by_name("Cloudflare").unwrap();
        assert_eq!(provider.tls_name, "cloudflare-dns.com");
        assert!(Provider::by_name("unknown").is_none());
    }

    #[test]
    fn test_addresses_respect_ipv6_toggle() {
        let google = Provider::by_name("google").unwrap();
        assert_eq!(google.addresses(false).len(), 2);
        let all = google.addresses(true);
        assert_eq!(all.len(), 4);
        assert!(all[0].is_ipv4());
        assert!(all[3].is_ipv6());
    }
}
