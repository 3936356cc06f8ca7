use super::*;

#[test]
fn test_counters_start_at_zero() {
    let progress = PhaseProgress::new("Downloading", 3);
    assert_eq!(progress.ok_count(), 0);
    assert_eq!(progress.failed_count(), 0);
    assert_eq!(progress.position(), 0);
    assert_eq!(progress.summary(), "Downloading: 0 ok, 0 failed");
}

#[test]
fn test_ok_and_failed_tick_the_bar() {
    let progress = PhaseProgress::new("Resolving", 4);

    progress.ok();
    progress.ok();
    progress.failed();

    assert_eq!(progress.ok_count(), 2);
    assert_eq!(progress.failed_count(), 1);
    assert_eq!(progress.position(), 3);
    assert_eq!(progress.summary(), "Resolving: 2 ok, 1 failed");
}

#[test]
fn test_clones_share_counters() {
    let progress = PhaseProgress::hidden();
    let worker = progress.clone();

    worker.ok();
    worker.failed();

    assert_eq!(progress.ok_count(), 1);
    assert_eq!(progress.failed_count(), 1);
}

#[tokio::test]
async fn test_counters_survive_concurrent_workers() {
    let progress = PhaseProgress::hidden();

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let progress = progress.clone();
            tokio::spawn(async move {
                if i % 4 == 0 {
                    progress.failed();
                } else {
                    progress.ok();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(progress.ok_count(), 24);
    assert_eq!(progress.failed_count(), 8);
}

#[test]
fn test_finish_does_not_panic_either_way() {
    let styling = StyleManager::plain();

    let clean = PhaseProgress::new("Downloading", 1);
    clean.ok();
    clean.finish(&styling);

    let dirty = PhaseProgress::new("Downloading", 1);
    dirty.failed();
    dirty.finish(&styling);
}
