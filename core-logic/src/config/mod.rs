use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

const SUPPORTED_SCHEMES: [&str; 4] = ["http", "https", "socks5", "socks5h"];

/// One outbound proxy, parsed from a `proxies.txt` line or a wallet line.
///
/// Accepted forms:
/// - `host:port`
/// - `host:port:username:password`
/// - `username:password@host:port`
///
/// each optionally prefixed with `http://`, `https://`, `socks5://` or `socks5h://`.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyDescriptor {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyDescriptor {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        let invalid = |reason: &str| ConfigError::InvalidProxy {
            proxy: redact(trimmed),
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(invalid("empty proxy string"));
        }

        let (scheme, rest) = match trimmed.split_once("://") {
            Some((scheme, rest)) => {
                let scheme = scheme.to_ascii_lowercase();
                if !SUPPORTED_SCHEMES.contains(&scheme.as_str()) {
                    return Err(invalid("unsupported scheme"));
                }
                (scheme, rest)
            }
            None => ("http".to_string(), trimmed),
        };

        let (host, port, username, password) = if let Some((creds, host_port)) = rest.rsplit_once('@')
        {
            let (user, pass) = creds
                .split_once(':')
                .ok_or_else(|| invalid("credentials must be username:password"))?;
            let (host, port) = host_port
                .split_once(':')
                .ok_or_else(|| invalid("missing port"))?;
            (host, port, Some(user), Some(pass))
        } else {
            let parts: Vec<&str> = rest.split(':').collect();
            match parts.as_slice() {
                [host, port] => (*host, *port, None, None),
                [host, port, user, pass] => (*host, *port, Some(*user), Some(*pass)),
                _ => return Err(invalid("expected host:port or host:port:username:password")),
            }
        };

        if host.is_empty() {
            return Err(invalid("missing host"));
        }

        let port: u16 = port.parse().map_err(|_| invalid("port is not a number"))?;
        if port == 0 {
            return Err(invalid("port must be non-zero"));
        }

        let username = username.filter(|u| !u.is_empty()).map(str::to_string);
        let password = password.map(str::to_string);

        Ok(Self {
            scheme,
            host: host.to_string(),
            port,
            username,
            password,
        })
    }

    /// Proxy URL without credentials, e.g. `http://10.0.0.1:8080`.
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// `host:port`, safe to log.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(u), Some(p)) => Some((u.as_str(), p.as_str())),
            _ => None,
        }
    }
}

impl FromStr for ProxyDescriptor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for ProxyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyDescriptor")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***REDACTED***"))
            .finish()
    }
}

impl fmt::Display for ProxyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.endpoint())
    }
}

/// Keeps only the host part so credentials never reach the logs.
fn redact(raw: &str) -> String {
    if let Some((_, host)) = raw.rsplit_once('@') {
        return format!("***@{}", host);
    }
    let without_scheme = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let mut parts = without_scheme.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(host), Some(port), Some(_)) => format!("{}:{}:***", host, port),
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_port() {
        let proxy = ProxyDescriptor::parse("10.0.0.1:8080").unwrap();
        assert_eq!(proxy.host, "10.0.0.1");
        assert_eq!(proxy.port, 8080);
        assert_eq!(proxy.url(), "http://10.0.0.1:8080");
        assert!(proxy.credentials().is_none());
    }

    #[test]
    fn test_parse_colon_credentials() {
        let proxy = ProxyDescriptor::parse("proxy.example.com:3128:alice:s3cret").unwrap();
        assert_eq!(proxy.endpoint(), "proxy.example.com:3128");
        assert_eq!(proxy.credentials(), Some(("alice", "s3cret")));
    }

    #[test]
    fn test_parse_at_credentials_with_scheme() {
        let proxy = ProxyDescriptor::parse("socks5://bob:pw@1.2.3.4:1080").unwrap();
        assert_eq!(proxy.scheme, "socks5");
        assert_eq!(proxy.url(), "socks5://1.2.3.4:1080");
        assert_eq!(proxy.credentials(), Some(("bob", "pw")));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ProxyDescriptor::parse("").is_err());
        assert!(ProxyDescriptor::parse("justahost").is_err());
        assert!(ProxyDescriptor::parse("host:notaport").is_err());
        assert!(ProxyDescriptor::parse("host:0").is_err());
        assert!(ProxyDescriptor::parse("a:1:b").is_err());
        assert!(ProxyDescriptor::parse("ftp://host:21").is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let proxy = ProxyDescriptor::parse("h:1:user:topsecret").unwrap();
        let printed = format!("{:?}", proxy);
        assert!(!printed.contains("topsecret"));
        assert!(printed.contains("REDACTED"));
    }

    #[test]
    fn test_error_message_hides_credentials() {
        let err = ProxyDescriptor::parse("host:port:user:topsecret").unwrap_err();
        assert!(!err.to_string().contains("topsecret"));
    }
}
