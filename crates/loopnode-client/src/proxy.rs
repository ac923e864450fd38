//! Proxy address classification.

use std::fmt;
use url::Url;

/// How a request leaves this machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyRoute {
    Direct,
    /// `socks4://`, `socks5://`, `socks5h://`
    Socks(Url),
    /// Anything else, tunnelled with HTTP CONNECT
    Http(Url),
}

impl ProxyRoute {
    /// Classify a proxy address. `None` or blank selects a direct connection.
    pub fn parse(address: Option<&str>) -> Result<Self, url::ParseError> {
        let address = match address.map(str::trim) {
            None | Some("") => return Ok(ProxyRoute::Direct),
            Some(address) => address,
        };

        let url = Url::parse(address)?;
        if url.scheme().starts_with("socks") {
            Ok(ProxyRoute::Socks(url))
        } else {
            Ok(ProxyRoute::Http(url))
        }
    }

    /// The reqwest proxy for this route, `None` when direct.
    pub fn to_reqwest(&self) -> reqwest::Result<Option<reqwest::Proxy>> {
        match self {
            ProxyRoute::Direct => Ok(None),
            ProxyRoute::Socks(url) | ProxyRoute::Http(url) => {
                reqwest::Proxy::all(url.as_str()).map(Some)
            }
        }
    }
}

impl fmt::Display for ProxyRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyRoute::Direct => write!(f, "direct"),
            ProxyRoute::Socks(url) => write!(f, "socks {}:{}", host(url), port(url)),
            ProxyRoute::Http(url) => write!(f, "http {}:{}", host(url), port(url)),
        }
    }
}

// Keeps proxy credentials out of log lines.
fn host(url: &Url) -> &str {
    url.host_str().unwrap_or("?")
}

fn port(url: &Url) -> String {
    url.port_or_known_default()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "?".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_is_direct() {
        assert_eq!(ProxyRoute::parse(None).unwrap(), ProxyRoute::Direct);
        assert_eq!(ProxyRoute::parse(Some("  ")).unwrap(), ProxyRoute::Direct);
    }

    #[test]
    fn socks_scheme_selects_socks() {
        let route = ProxyRoute::parse(Some("socks5://user:pw@10.1.2.3:1080")).unwrap();
        assert!(matches!(route, ProxyRoute::Socks(_)));
        assert_eq!(route.to_string(), "socks 10.1.2.3:1080");
    }

    #[test]
    fn other_schemes_select_http() {
        let route = ProxyRoute::parse(Some("http://proxy.local:3128")).unwrap();
        assert!(matches!(route, ProxyRoute::Http(_)));
        let tls = ProxyRoute::parse(Some("https://proxy.local")).unwrap();
        assert!(tls.to_string().ends_with(":443"));
    }

    #[test]
    fn malformed_address_is_an_error() {
        assert!(ProxyRoute::parse(Some("not a proxy")).is_err());
    }
}
