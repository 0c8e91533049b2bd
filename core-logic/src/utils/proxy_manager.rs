use crate::config::ProxyDescriptor;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};

pub struct ProxyManager;

impl ProxyManager {
    pub const PROXY_FILE: &'static str = "proxies.txt";

    /// Loads proxies from `path`, one per line.
    /// A missing or empty file means "no proxy" mode, never an error.
    pub fn load_proxies(path: impl AsRef<Path>) -> Result<Vec<ProxyDescriptor>> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("{} not found. Running without proxies.", path.display());
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let proxies = Self::parse_lines(&content);
        if proxies.is_empty() {
            warn!("No valid proxies found in {}", path.display());
        } else {
            info!("Loaded {} proxies from {}", proxies.len(), path.display());
        }
        Ok(proxies)
    }

    pub fn parse_lines(content: &str) -> Vec<ProxyDescriptor> {
        content
            .lines()
            .enumerate()
            .filter_map(|(i, line)| {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    return None;
                }
                match ProxyDescriptor::parse(line) {
                    Ok(proxy) => Some(proxy),
                    Err(e) => {
                        warn!("Skipping invalid proxy line {}: {}", i + 1, e);
                        None
                    }
                }
            })
            .collect()
    }
}

/// Ordered proxy pool with a round-robin cursor.
///
/// The cursor is advanced with a single `fetch_add`, so concurrent callers
/// still see an even distribution. It never moves while the pool is empty.
#[derive(Debug, Default)]
pub struct ProxyRotation {
    proxies: Vec<ProxyDescriptor>,
    cursor: AtomicUsize,
}

impl ProxyRotation {
    pub fn new(proxies: Vec<ProxyDescriptor>) -> Self {
        Self {
            proxies,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn proxies(&self) -> &[ProxyDescriptor] {
        &self.proxies
    }

    /// Current cursor position, always in `[0, len)` when the pool is non-empty.
    pub fn position(&self) -> usize {
        match self.proxies.len() {
            0 => 0,
            len => self.cursor.load(Ordering::SeqCst) % len,
        }
    }

    pub fn next_proxy(&self) -> Option<&ProxyDescriptor> {
        if self.proxies.is_empty() {
            return None;
        }
        let idx = self.cursor.fetch_add(1, Ordering::SeqCst);
        self.proxies.get(idx % self.proxies.len())
    }
}
