use super::*;
use crate::modpack::ModLoader;
use crate::networking::NetworkingConfig;
use mockito::{Matcher, Server, ServerGuard};
use std::time::Duration;

async fn client(server: &ServerGuard, api_key: Option<&str>) -> LiveCurseForgeClient {
    let networking = NetworkingManager::new(NetworkingConfig::default())
        .await
        .unwrap();
    LiveCurseForgeClient::with_base_url(
        Arc::new(networking),
        api_key.map(str::to_string),
        RetryPolicy::new(2, Duration::from_millis(1)),
        server.url(),
    )
}

fn environment() -> Environment {
    Environment::new("1.20.1", ModLoader::Fabric)
}

fn page_query(index: usize) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("index".into(), index.to_string()),
        Matcher::UrlEncoded("pageSize".into(), "50".into()),
    ])
}

const FORGE_ONLY: &str = r#"{"id": 900, "displayName": "Forge build", "downloadUrl": "https://edge.forgecdn.net/files/forge.jar", "gameVersions": ["1.20.1", "Forge"]}"#;

const FABRIC_FILE: &str = r#"{
    "id": 901,
    "displayName": "Fabric build",
    "downloadUrl": "https://edge.forgecdn.net/files/9/01/My Mod 1.0.jar",
    "gameVersions": ["1.20.1", "Fabric", "Client"],
    "dependencies": [
        {"modId": 306612, "relationType": 3},
        {"modId": 238222, "relationType": 2},
        {"relationType": 3},
        "garbage"
    ],
    "hashes": [{"value": "abc123", "algo": 1}, {"value": "def", "algo": 2}]
}"#;

#[tokio::test]
async fn test_metadata_unwraps_data() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/mods/394468")
        .match_header("x-api-key", "key")
        .with_status(200)
        .with_body(
            r#"{"data": {"name": "Sodium", "downloadCount": 1234.0, "dateModified": "2024-03-01T00:00:00Z",
                "summary": "Fast", "links": {"websiteUrl": "https://www.curseforge.com/minecraft/mc-mods/sodium"}}}"#,
        )
        .create_async()
        .await;

    let client = client(&server, Some("key")).await;
    let metadata = client.get_metadata("394468").await.unwrap();

    assert_eq!(metadata.name, "Sodium");
    assert_eq!(metadata.downloads, Some(1234));
    assert_eq!(metadata.last_updated.as_deref(), Some("2024-03-01T00:00:00Z"));
    assert!(metadata.website.unwrap().ends_with("/sodium"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_scan_picks_first_compatible_file() {
    let mut server = Server::new_async().await;
    let first_page = server
        .mock("GET", "/v1/mods/42/files")
        .match_query(page_query(0))
        .with_status(200)
        .with_body(format!(r#"{{"data": [{FORGE_ONLY}, {FABRIC_FILE}]}}"#))
        .create_async()
        .await;

    let client = client(&server, Some("key")).await;
    let file = client
        .get_compatible_file("42", &environment(), None)
        .await
        .unwrap();

    assert_eq!(file.version_id, "901");
    assert_eq!(
        file.download_url.as_deref(),
        Some("https://edge.forgecdn.net/files/9/01/My%20Mod%201.0.jar")
    );
    assert_eq!(file.dependencies, vec!["306612".to_string()]);
    assert_eq!(file.sha1.as_deref(), Some("abc123"));
    first_page.assert_async().await;
}

#[tokio::test]
async fn test_scan_continues_to_next_page_and_stops_on_empty() {
    let mut server = Server::new_async().await;
    let _mock1 = server
        .mock("GET", "/v1/mods/42/files")
        .match_query(page_query(0))
        .with_status(200)
        .with_body(format!(r#"{{"data": [{FORGE_ONLY}]}}"#))
        .create_async()
        .await;
    let empty = server
        .mock("GET", "/v1/mods/42/files")
        .match_query(page_query(50))
        .with_status(200)
        .with_body(r#"{"data": []}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client(&server, Some("key")).await;
    let result = client.get_compatible_file("42", &environment(), None).await;

    assert!(matches!(result, Err(RegistryError::NotFound { .. })));
    empty.assert_async().await;
}

#[tokio::test]
async fn test_pinned_file_must_support_environment() {
    let mut server = Server::new_async().await;
    let _mock2 = server
        .mock("GET", "/v1/mods/42/files/900")
        .with_status(200)
        .with_body(format!(r#"{{"data": {FORGE_ONLY}}}"#))
        .create_async()
        .await;
    let _mock3 = server
        .mock("GET", "/v1/mods/42/files/901")
        .with_status(200)
        .with_body(format!(r#"{{"data": {FABRIC_FILE}}}"#))
        .create_async()
        .await;

    let client = client(&server, Some("key")).await;

    let incompatible = client
        .get_compatible_file("42", &environment(), Some("900"))
        .await;
    assert!(matches!(
        incompatible,
        Err(RegistryError::Incompatible { ref version, .. }) if version == "900"
    ));

    let pinned = client
        .get_compatible_file("42", &environment(), Some("901"))
        .await
        .unwrap();
    assert_eq!(pinned.version_id, "901");
}

#[tokio::test]
async fn test_server_errors_exhaust_retries() {
    let mut server = Server::new_async().await;
    let failing = server
        .mock("GET", "/v1/mods/42")
        .with_status(503)
        .expect(2)
        .create_async()
        .await;

    let client = client(&server, Some("key")).await;
    let result = client.get_metadata("42").await;

    assert!(matches!(
        result,
        Err(RegistryError::RequestFailed { attempts: 2, .. })
    ));
    failing.assert_async().await;
}

#[tokio::test]
async fn test_missing_api_key_skips_network() {
    let mut server = Server::new_async().await;
    let untouched = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = client(&server, Some("  ")).await;
    let result = client.get_metadata("42").await;

    assert_eq!(result, Err(RegistryError::MissingApiKey));
    untouched.assert_async().await;
}

#[tokio::test]
async fn test_search_filters_by_environment() {
    let mut server = Server::new_async().await;
    let search = server
        .mock("GET", "/v1/mods/search")
        .match_header("x-api-key", "key")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("gameId".into(), "432".into()),
            Matcher::UrlEncoded("searchFilter".into(), "just enough".into()),
            Matcher::UrlEncoded("gameVersion".into(), "1.20.1".into()),
            Matcher::UrlEncoded("modLoaderType".into(), "4".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"data": [
                {"id": 238222, "name": "Just Enough Items", "downloadCount": 300000000.0,
                 "dateModified": "2024-05-02T12:00:00Z"},
                {"id": 5, "name": "Bare"}
            ]}"#,
        )
        .create_async()
        .await;

    let client = client(&server, Some("key")).await;
    let hits = client
        .search_mods("just enough", Some(&environment()))
        .await
        .unwrap();

    assert_eq!(
        hits,
        vec![
            SearchHit {
                mod_id: "238222".to_string(),
                name: "Just Enough Items".to_string(),
                downloads: Some(300_000_000),
                last_updated: Some("2024-05-02T12:00:00Z".to_string()),
            },
            SearchHit {
                mod_id: "5".to_string(),
                name: "Bare".to_string(),
                ..Default::default()
            },
        ]
    );
    search.assert_async().await;
}

#[test]
fn test_encode_download_url_only_touches_spaces() {
    assert_eq!(
        encode_download_url("https://cdn.example/a b/c%20d.jar"),
        "https://cdn.example/a%20b/c%20d.jar"
    );
}
