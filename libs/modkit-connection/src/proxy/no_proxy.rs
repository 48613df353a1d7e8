use std::net::IpAddr;

/// Hosts exempted from environment-derived proxies.
///
/// Parsed from a comma-separated `no_proxy` value. Hostname entries match the
/// host itself and any subdomain (`example.com` matches `a.example.com` but
/// not `prefixedexample.com`), case-insensitively. IP entries match only the
/// identical IP literal. A single `*` entry matches every host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoProxyList {
    domains: Vec<String>,
    ips: Vec<IpAddr>,
    wildcard: bool,
}

enum Entry {
    Wildcard,
    Ip(IpAddr),
    Domain(String),
}

fn strip_brackets(s: &str) -> &str {
    s.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(s)
}

fn classify(raw: &str) -> Option<Entry> {
    let entry = raw.trim();
    if entry.is_empty() {
        return None;
    }
    if entry == "*" {
        return Some(Entry::Wildcard);
    }

    if let Ok(ip) = strip_brackets(entry).parse::<IpAddr>() {
        return Some(Entry::Ip(ip));
    }

    // host:port and [v6]:port; the port plays no part in matching
    let host = match entry.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            strip_brackets(host)
        }
        _ => entry,
    };
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Some(Entry::Ip(ip));
    }

    let domain = host
        .trim_start_matches("*.")
        .trim_start_matches('.')
        .trim_end_matches('.')
        .to_ascii_lowercase();
    if domain.is_empty() {
        None
    } else {
        Some(Entry::Domain(domain))
    }
}

impl NoProxyList {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut list = Self::default();
        for entry in raw.split(',').filter_map(classify) {
            match entry {
                Entry::Wildcard => list.wildcard = true,
                Entry::Ip(ip) => list.ips.push(ip),
                Entry::Domain(domain) => list.domains.push(domain),
            }
        }
        list
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.wildcard && self.domains.is_empty() && self.ips.is_empty()
    }

    /// Whether `host` is exempt from proxying
    #[must_use]
    pub fn matches(&self, host: &str) -> bool {
        if self.wildcard {
            return true;
        }

        let host = strip_brackets(host.trim());
        if let Ok(ip) = host.parse::<IpAddr>() {
            return self.ips.contains(&ip);
        }

        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.domains.iter().any(|domain| {
            host == *domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|head| head.ends_with('.'))
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_subdomain_match() {
        let list = NoProxyList::parse("example.com");
        assert!(list.matches("example.com"));
        assert!(list.matches("subdomain.example.com"));
        assert!(list.matches("EXAMPLE.com"));
        assert!(!list.matches("prefixedexample.com"));
        assert!(!list.matches("example.com.evil.org"));
    }

    #[test]
    fn test_multi_element_list() {
        let list = NoProxyList::parse("example0.com, example.com ,example1.com,,");
        assert!(list.matches("example0.com"));
        assert!(list.matches("example.com"));
        assert!(list.matches("example1.com"));
        assert!(!list.matches("example2.com"));
    }

    #[test]
    fn test_ip_entries_match_only_ip_literals() {
        let by_ip = NoProxyList::parse("127.0.0.1");
        assert!(by_ip.matches("127.0.0.1"));
        assert!(!by_ip.matches("localhost"));
        assert!(!by_ip.matches("127.0.0.2"));

        let by_name = NoProxyList::parse("localhost");
        assert!(by_name.matches("localhost"));
        assert!(!by_name.matches("127.0.0.1"));
    }

    #[test]
    fn test_ipv6_entries() {
        let list = NoProxyList::parse("[::1],fe80::1");
        assert!(list.matches("[::1]"));
        assert!(list.matches("::1"));
        assert!(list.matches("fe80::1"));
    }

    #[test]
    fn test_leading_dot_wildcard_prefix_and_port() {
        let list = NoProxyList::parse(".example.com,*.internal,svc.local:8080,10.0.0.1:3128");
        assert!(list.matches("a.example.com"));
        assert!(list.matches("example.com"));
        assert!(list.matches("db.internal"));
        assert!(list.matches("svc.local"));
        assert!(list.matches("10.0.0.1"));
    }

    #[test]
    fn test_star_matches_everything() {
        let list = NoProxyList::parse("*");
        assert!(list.matches("anything.org"));
        assert!(list.matches("192.168.0.1"));
    }

    #[test]
    fn test_empty_list() {
        let list = NoProxyList::parse(" , ");
        assert!(list.is_empty());
        assert!(!list.matches("example.com"));
    }
}
