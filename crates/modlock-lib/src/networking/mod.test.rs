use super::*;
use mockito::Server;
use std::sync::atomic::{AtomicUsize, Ordering};

async fn manager() -> NetworkingManager {
    NetworkingManager::new(NetworkingConfig {
        max_jobs: Some(2),
        timeout_seconds: 5,
        trace_requests: true,
    })
    .await
    .expect("networking manager")
}

#[tokio::test]
async fn test_job_calculation_with_limit() {
    let manager = manager().await;
    let permits = manager.semaphore.available_permits();
    assert!(permits >= 1);
    assert!(permits <= 2);
}

#[tokio::test]
async fn test_get_json_sends_headers() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/mods/42")
        .match_header("x-api-key", "secret")
        .with_status(200)
        .with_body(r#"{"data":{"name":"Sodium"}}"#)
        .create_async()
        .await;

    let manager = manager().await;
    let body: serde_json::Value = manager
        .get_json(
            &format!("{}/v1/mods/42", server.url()),
            &[("x-api-key", "secret")],
        )
        .await
        .unwrap();

    assert_eq!(body["data"]["name"], "Sodium");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_json_reports_status_and_decode_errors() {
    let mut server = Server::new_async().await;
    let _mock1 = server
        .mock("GET", "/missing")
        .with_status(404)
        .create_async()
        .await;
    let _mock2 = server
        .mock("GET", "/garbage")
        .with_status(200)
        .with_body("<html>")
        .create_async()
        .await;

    let manager = manager().await;

    let missing = manager
        .get_json::<serde_json::Value>(&format!("{}/missing", server.url()), &[])
        .await;
    assert!(matches!(
        missing,
        Err(NetworkingError::Status { status, .. }) if status == reqwest::StatusCode::NOT_FOUND
    ));

    let garbage = manager
        .get_json::<serde_json::Value>(&format!("{}/garbage", server.url()), &[])
        .await;
    assert!(matches!(garbage, Err(NetworkingError::Decode { .. })));
}

#[tokio::test]
async fn test_download_to_file_streams_and_verifies() {
    let mut server = Server::new_async().await;
    let _mock3 = server
        .mock("GET", "/files/mod.jar")
        .with_status(200)
        .with_body("abc")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("mod.jar");
    let manager = manager().await;

    // sha1("abc")
    let written = manager
        .download_to_file(
            &format!("{}/files/mod.jar", server.url()),
            &destination,
            Some("A9993E364706816ABA3E25717850C26C9CD0D89D"),
        )
        .await
        .unwrap();

    assert_eq!(written, 3);
    assert_eq!(std::fs::read_to_string(&destination).unwrap(), "abc");
}

#[tokio::test]
async fn test_download_checksum_mismatch_leaves_no_file() {
    let mut server = Server::new_async().await;
    let _mock4 = server
        .mock("GET", "/files/mod.jar")
        .with_status(200)
        .with_body("tampered")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("mod.jar");
    let manager = manager().await;

    let result = manager
        .download_to_file(
            &format!("{}/files/mod.jar", server.url()),
            &destination,
            Some("a9993e364706816aba3e25717850c26c9cd0d89d"),
        )
        .await;

    assert!(matches!(result, Err(NetworkingError::ChecksumMismatch { .. })));
    assert!(!destination.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_failed_download_keeps_existing_file() {
    let mut server = Server::new_async().await;
    let _missing = server
        .mock("GET", "/files/missing.jar")
        .with_status(404)
        .create_async()
        .await;
    let _tampered = server
        .mock("GET", "/files/tampered.jar")
        .with_status(200)
        .with_body("tampered")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("mod.jar");
    std::fs::write(&destination, "good").unwrap();
    let manager = manager().await;

    let missing = manager
        .download_to_file(&format!("{}/files/missing.jar", server.url()), &destination, None)
        .await;
    let tampered = manager
        .download_to_file(
            &format!("{}/files/tampered.jar", server.url()),
            &destination,
            Some("a9993e364706816aba3e25717850c26c9cd0d89d"),
        )
        .await;

    assert!(matches!(missing, Err(NetworkingError::Status { .. })));
    assert!(matches!(tampered, Err(NetworkingError::ChecksumMismatch { .. })));
    assert_eq!(std::fs::read_to_string(&destination).unwrap(), "good");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_run_batch_preserves_order_and_bounds_concurrency() {
    let manager = manager().await;
    let limit = manager.semaphore.available_permits();
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let results = manager
        .run_batch((0..10).collect(), {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            move |n: u32| {
                let in_flight = in_flight.clone();
                let peak = peak.clone();
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    n * 2
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(results, (0..10).map(|n| n * 2).collect::<Vec<_>>());
    assert!(peak.load(Ordering::SeqCst) <= limit);
}

#[tokio::test]
async fn test_run_batch_surfaces_panics() {
    let manager = manager().await;

    let result = manager
        .run_batch(vec![1u32, 2, 3], |n| async move {
            if n == 2 {
                panic!("worker blew up");
            }
            n
        })
        .await;

    assert!(matches!(result, Err(NetworkingError::TaskJoinError { .. })));
}
