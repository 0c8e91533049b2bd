use anyhow::{Context, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fixed-delay retry policy. No backoff, no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay: Duration::from_millis(delay_ms),
        }
    }

    /// Attempts actually made; a zero configuration still runs once.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Bookkeeping for one [`with_retry`] invocation.
#[derive(Debug, Clone)]
pub struct RetryContext {
    pub label: String,
    pub attempts_made: u32,
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryContext {
    fn new(config: &RetryConfig, label: &str) -> Self {
        Self {
            label: label.to_string(),
            attempts_made: 0,
            max_attempts: config.attempts(),
            delay: config.delay,
        }
    }

    fn is_last_attempt(&self) -> bool {
        self.attempts_made >= self.max_attempts
    }
}

/// Runs `operation` up to `config.max_attempts` times, sleeping `config.delay`
/// between failed attempts. The first success is returned immediately; when
/// every attempt fails the last error is returned with the label attached as
/// context, so `root_cause()` is still the operation's own error.
pub async fn with_retry<T, F, Fut>(config: RetryConfig, label: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut ctx = RetryContext::new(&config, label);

    loop {
        ctx.attempts_made += 1;

        match operation().await {
            Ok(result) => {
                if ctx.attempts_made > 1 {
                    debug!("{} succeeded on attempt {}", ctx.label, ctx.attempts_made);
                }
                return Ok(result);
            }
            Err(e) => {
                warn!(
                    "{} attempt {}/{} failed: {:#}",
                    ctx.label, ctx.attempts_made, ctx.max_attempts, e
                );

                if ctx.is_last_attempt() {
                    return Err(e).context(format!(
                        "{} failed after {} attempt(s)",
                        ctx.label, ctx.attempts_made
                    ));
                }

                info!("Retrying in {:.1} seconds...", ctx.delay.as_secs_f64());
                tokio::time::sleep(ctx.delay).await;
            }
        }
    }
}
