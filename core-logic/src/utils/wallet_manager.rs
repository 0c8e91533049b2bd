use crate::error::WalletError;
use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{error, info};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// One line of `wallets.txt`: `privateKey[:name[:proxy]]`.
///
/// The key stays a hex string here; the chain crate turns it into a signer.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct WalletRecord {
    pub private_key: String,
    #[zeroize(skip)]
    pub name: String,
    #[zeroize(skip)]
    pub proxy: Option<String>,
    #[zeroize(skip)]
    pub line: usize,
}

impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("name", &self.name)
            .field("line", &self.line)
            .field("proxy", &self.proxy.as_ref().map(|_| "<set>"))
            .field("private_key", &"***REDACTED***")
            .finish()
    }
}

pub struct WalletManager;

impl WalletManager {
    pub const WALLET_FILE: &'static str = "wallets.txt";

    /// Reads and parses the wallet file. Malformed lines are dropped with a
    /// diagnostic; an absent file or zero valid records is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Vec<WalletRecord>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(WalletError::SourceMissing {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let records = Self::parse(&content);
        if records.is_empty() {
            return Err(WalletError::NoValidWallets {
                path: path.display().to_string(),
            }
            .into());
        }

        info!("Loaded {} wallet(s) from {}", records.len(), path.display());
        Ok(records)
    }

    pub fn parse(content: &str) -> Vec<WalletRecord> {
        content
            .lines()
            .filter(|line| {
                let trimmed = line.trim();
                !trimmed.is_empty() && !trimmed.starts_with('#')
            })
            .enumerate()
            .filter_map(|(index, line)| match Self::parse_line(index + 1, line.trim()) {
                Ok(record) => Some(record),
                Err(e) => {
                    error!("{}", e);
                    None
                }
            })
            .collect()
    }

    fn parse_line(line_no: usize, line: &str) -> Result<WalletRecord, WalletError> {
        let mut parts = line.splitn(3, ':');
        let key = parts.next().unwrap_or_default().trim();
        let name = parts
            .next()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Wallet-{}", line_no));
        let proxy = parts
            .next()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        let hex_part = key.strip_prefix("0x").unwrap_or(key);
        if hex_part.len() != 64 {
            return Err(WalletError::InvalidKey {
                line: line_no,
                reason: WalletError::InvalidKeyLength {
                    length: hex_part.len(),
                }
                .to_string(),
            });
        }
        if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(WalletError::InvalidKey {
                line: line_no,
                reason: "expected hex string".to_string(),
            });
        }

        Ok(WalletRecord {
            private_key: hex_part.to_string(),
            name,
            proxy,
            line: line_no,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_A: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const KEY_B: &str = "8da4ef21b864d2cc526dbdb2a120bd2874c36c9d0a1fb7f8c63d7f7a8b41de8f";

    #[test]
    fn test_bare_key_gets_default_name() {
        let records = WalletManager::parse(KEY_B);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Wallet-1");
        assert!(records[0].proxy.is_none());
    }

    #[test]
    fn test_name_and_proxy_with_colons() {
        let content = format!("{}:alpha:1.2.3.4:8080:user:pass", KEY_A);
        let records = WalletManager::parse(&content);
        assert_eq!(records[0].name, "alpha");
        assert_eq!(records[0].proxy.as_deref(), Some("1.2.3.4:8080:user:pass"));
        assert!(!records[0].private_key.starts_with("0x"));
    }

    #[test]
    fn test_malformed_lines_are_dropped() {
        let content = format!("{}:one\nnot-a-key:two\n\n{}:three", KEY_A, KEY_B);
        let records = WalletManager::parse(&content);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["one", "three"]);
    }

    #[test]
    fn test_debug_hides_key() {
        let records = WalletManager::parse(KEY_B);
        assert!(!format!("{:?}", records[0]).contains(KEY_B));
    }
}
