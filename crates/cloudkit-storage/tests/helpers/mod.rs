#![allow(dead_code)]

use cloudkit_storage::Storage;
use std::sync::Once;
use uuid::Uuid;

static TRACING: Once = Once::new();

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// A prefix no other test run shares.
pub fn random_prefix(name: &str) -> String {
    format!("cloudkit-test/{}-{}", name, Uuid::new_v4())
}

/// True when every variable is set to a non-empty value (after loading `.env`).
pub fn env_present(vars: &[&str]) -> bool {
    dotenvy::dotenv().ok();
    vars.iter()
        .all(|var| std::env::var(var).map(|v| !v.trim().is_empty()).unwrap_or(false))
}

/// Save, read back, inspect, list and delete one object under `prefix`.
pub async fn run_lifecycle(storage: &dyn Storage, prefix: &str) {
    let key = format!("{}/a.bin", prefix);
    let data: Vec<u8> = (0..1024 * 1024).map(|i| (i % 251) as u8).collect();

    assert!(!storage.exists(&key).await.unwrap(), "fresh key must not exist");

    storage.save(&key, data.clone()).await.unwrap();
    assert!(storage.exists(&key).await.unwrap());
    assert_eq!(storage.load(&key).await.unwrap(), data);

    let state = storage.state(&key).await.unwrap();
    assert_eq!(state.size, data.len() as u64);

    let entries = storage.list(prefix).await.unwrap();
    let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["a.bin"]);
    assert!(entries.iter().all(|e| !e.is_dir));

    storage.delete(&key).await.unwrap();
    assert!(!storage.exists(&key).await.unwrap());
    assert!(storage.list(prefix).await.unwrap().is_empty());

    // Deleting again is not an error.
    storage.delete(&key).await.unwrap();
}
