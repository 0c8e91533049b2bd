use core_logic::{with_retry, RetryConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_retry_success_first_try() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(3, 10);

    let result: Result<String, anyhow::Error> = with_retry(config, "test_op", || async {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok("success".to_string())
    })
    .await;

    assert!(result.is_ok());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retry_success_after_failures() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(3, 10);

    let result: Result<String, anyhow::Error> = with_retry(config, "test_op", || async {
        let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
        if count < 3 {
            Err(anyhow::anyhow!("temporary error"))
        } else {
            Ok("success".to_string())
        }
    })
    .await;

    assert_eq!(result.unwrap(), "success");
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_all_failures_surfaces_last_error() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(3, 10);

    let result: Result<String, anyhow::Error> = with_retry(config, "test_op", || async {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        Err(anyhow::anyhow!("error #{}", n))
    })
    .await;

    let err = result.unwrap_err();
    assert_eq!(counter.load(Ordering::SeqCst), 3);
    assert_eq!(err.root_cause().to_string(), "error #3");
    assert!(format!("{:#}", err).contains("after 3 attempt"));
}

#[tokio::test]
async fn test_retry_waits_between_attempts() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(3, 50);

    let start = Instant::now();
    let _: Result<(), anyhow::Error> = with_retry(config, "test_op", || async {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(anyhow::anyhow!("fail"))
    })
    .await;

    // two sleeps between three attempts, none after the last
    assert!(start.elapsed() >= Duration::from_millis(100));
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_zero_attempts_still_runs_once() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(0, 10);
    assert_eq!(config.attempts(), 1);

    let result: Result<(), anyhow::Error> = with_retry(config, "test_op", || async {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(anyhow::anyhow!("fail"))
    })
    .await;

    assert!(result.is_err());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}
