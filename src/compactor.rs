use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::engine::Engine;

/// Background task that compacts the WAL whenever the append count since the
/// last compaction crosses `threshold`.
pub async fn run_compactor(engine: Arc<Engine>, threshold: u64, every: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        let appends = engine.wal_appends_since_compact().await;
        if appends < threshold {
            continue;
        }
        match engine.compact_wal().await {
            Ok(()) => info!("compacted WAL after {appends} appends"),
            Err(e) => tracing::warn!("WAL compaction failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::NullDirectory;
    use crate::notify::NotifyHub;
    use std::path::PathBuf;

    fn test_wal_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("vacancy_test_compactor");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let _ = std::fs::remove_file(&path);
        path
    }

    #[tokio::test]
    async fn compactor_resets_append_counter() {
        let path = test_wal_path("compactor_reset.wal");
        let engine = Arc::new(
            Engine::new(&path, Arc::new(NotifyHub::new()), Arc::new(NullDirectory)).unwrap(),
        );

        // Churn: create and cancel a booking a few times
        for _ in 0..3 {
            let booking = engine
                .propose_booking("Ada", "ada@x.com", 1000, 2000, None, 0)
                .await
                .unwrap();
            let admin = crate::identity::CallerIdentity::admin("1", "root@x.com");
            engine.cancel_booking(booking.id, Some(&admin)).await.unwrap();
        }
        assert!(engine.wal_appends_since_compact().await > 0);

        let handle = tokio::spawn(run_compactor(
            engine.clone(),
            1,
            Duration::from_millis(10),
        ));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        assert_eq!(engine.wal_appends_since_compact().await, 0);
    }
}
