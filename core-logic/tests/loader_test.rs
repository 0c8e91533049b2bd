use core_logic::{ProxyManager, ProxyRotation, WalletError, WalletManager};
use std::io::Write;
use tempfile::NamedTempFile;

const KEY_A: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
const KEY_B: &str = "0x8da4ef21b864d2cc526dbdb2a120bd2874c36c9d0a1fb7f8c63d7f7a8b41de8f";

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_wallet_file_loads_valid_lines() {
    let file = write_temp(&format!(
        "# wallets\n{}:main\n\nbadkey:broken\n{}:second:user:pass@1.2.3.4:8080\n",
        KEY_A, KEY_B
    ));

    let records = WalletManager::load(file.path()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "main");
    assert_eq!(records[1].name, "second");
    assert_eq!(records[1].proxy.as_deref(), Some("user:pass@1.2.3.4:8080"));
}

#[test]
fn test_missing_wallet_file_is_fatal() {
    let err = WalletManager::load("/nonexistent/wallets.txt").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<WalletError>(),
        Some(WalletError::SourceMissing { .. })
    ));
}

#[test]
fn test_wallet_file_without_valid_keys_is_fatal() {
    let file = write_temp("# nothing\nnot-a-key\n");
    let err = WalletManager::load(file.path()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<WalletError>(),
        Some(WalletError::NoValidWallets { .. })
    ));
}

#[test]
fn test_missing_proxy_file_means_no_proxies() {
    let proxies = ProxyManager::load_proxies("/nonexistent/proxies.txt").unwrap();
    assert!(proxies.is_empty());
}

#[test]
fn test_proxy_file_feeds_rotation() {
    let file = write_temp("1.1.1.1:8080\nsocks5://2.2.2.2:1080\nuser:pw@3.3.3.3:3128\n");
    let rotation = ProxyRotation::new(ProxyManager::load_proxies(file.path()).unwrap());

    assert_eq!(rotation.len(), 3);
    let hosts: Vec<String> = (0..4)
        .map(|_| rotation.next_proxy().unwrap().host.clone())
        .collect();
    assert_eq!(hosts, vec!["1.1.1.1", "2.2.2.2", "3.3.3.3", "1.1.1.1"]);
}
