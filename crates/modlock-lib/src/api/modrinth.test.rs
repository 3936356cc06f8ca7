use super::*;
use crate::modpack::ModLoader;
use crate::networking::NetworkingConfig;
use mockito::{Matcher, Server, ServerGuard};
use std::time::Duration;

async fn client(server: &ServerGuard) -> LiveModrinthClient {
    let networking = NetworkingManager::new(NetworkingConfig::default())
        .await
        .unwrap();
    LiveModrinthClient::with_base_url(
        Arc::new(networking),
        RetryPolicy::new(2, Duration::from_millis(1)),
        server.url(),
    )
}

fn environment() -> Environment {
    Environment::new("1.20.1", ModLoader::Fabric)
}

const VERSIONS: &str = r#"[
    {"id": "quilt1", "name": "Lithium Quilt", "game_versions": ["1.20.1"], "loaders": ["quilt"],
     "files": [{"url": "https://cdn.modrinth.com/q.jar", "primary": true}]},
    {"id": "fab1", "name": "Lithium 0.11.2", "game_versions": ["1.20", "1.20.1"], "loaders": ["fabric"],
     "files": [
        {"url": "https://cdn.modrinth.com/sources.jar", "primary": false},
        {"url": "https://cdn.modrinth.com/lithium.jar", "primary": true, "hashes": {"sha1": "ff00"}}
     ],
     "dependencies": [
        {"project_id": "P7dR8mSH", "dependency_type": "required"},
        {"project_id": "optional1", "dependency_type": "optional"},
        {"version_id": "abc", "dependency_type": "required"}
     ]},
    {"id": "fab0", "name": "Lithium 0.11.1", "game_versions": ["1.20.1"], "loaders": ["fabric"], "files": []}
]"#;

#[tokio::test]
async fn test_metadata_sends_user_agent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v2/project/lithium")
        .match_header("user-agent", USER_AGENT)
        .with_status(200)
        .with_body(
            r#"{"slug": "lithium", "title": "Lithium", "description": "Optimizes things",
                "downloads": 5000, "updated": "2024-02-01T00:00:00Z", "project_type": "mod"}"#,
        )
        .create_async()
        .await;

    let client = client(&server).await;
    let metadata = client.get_metadata("lithium").await.unwrap();

    assert_eq!(metadata.name, "Lithium");
    assert_eq!(metadata.downloads, Some(5000));
    assert_eq!(
        metadata.website.as_deref(),
        Some("https://modrinth.com/mod/lithium")
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_first_matching_version_uses_primary_file() {
    let mut server = Server::new_async().await;
    let _mock1 = server
        .mock("GET", "/v2/project/lithium/version")
        .with_status(200)
        .with_body(VERSIONS)
        .create_async()
        .await;

    let client = client(&server).await;
    let file = client
        .get_compatible_file("lithium", &environment(), None)
        .await
        .unwrap();

    assert_eq!(file.version_id, "fab1");
    assert_eq!(
        file.download_url.as_deref(),
        Some("https://cdn.modrinth.com/lithium.jar")
    );
    assert_eq!(file.sha1.as_deref(), Some("ff00"));
    assert_eq!(file.dependencies, vec!["P7dR8mSH".to_string()]);
}

#[tokio::test]
async fn test_no_matching_version_is_not_found() {
    let mut server = Server::new_async().await;
    let _mock2 = server
        .mock("GET", "/v2/project/lithium/version")
        .with_status(200)
        .with_body(VERSIONS)
        .create_async()
        .await;

    let client = client(&server).await;
    let forge = Environment::new("1.20.1", ModLoader::Forge);
    let result = client.get_compatible_file("lithium", &forge, None).await;

    assert!(matches!(result, Err(RegistryError::NotFound { .. })));
}

#[tokio::test]
async fn test_pinned_version_checked_against_environment() {
    let mut server = Server::new_async().await;
    let _mock3 = server
        .mock("GET", "/v2/version/quilt1")
        .with_status(200)
        .with_body(
            r#"{"id": "quilt1", "name": "Lithium Quilt", "game_versions": ["1.20.1"], "loaders": ["quilt"],
                "files": [{"url": "https://cdn.modrinth.com/q.jar", "primary": true}]}"#,
        )
        .create_async()
        .await;

    let client = client(&server).await;

    let result = client
        .get_compatible_file("lithium", &environment(), Some("quilt1"))
        .await;
    assert!(matches!(result, Err(RegistryError::Incompatible { .. })));

    let quilt = Environment::new("1.20.1", ModLoader::Quilt);
    let file = client
        .get_compatible_file("lithium", &quilt, Some("quilt1"))
        .await
        .unwrap();
    assert_eq!(file.download_url.as_deref(), Some("https://cdn.modrinth.com/q.jar"));
}

#[tokio::test]
async fn test_version_without_files_is_unavailable_downstream() {
    let mut server = Server::new_async().await;
    let _mock4 = server
        .mock("GET", "/v2/version/fab0")
        .with_status(200)
        .with_body(
            r#"{"id": "fab0", "name": "Lithium 0.11.1", "game_versions": ["1.20.1"], "loaders": ["fabric"], "files": []}"#,
        )
        .create_async()
        .await;

    let client = client(&server).await;
    let file = client
        .get_compatible_file("lithium", &environment(), Some("fab0"))
        .await
        .unwrap();

    assert_eq!(file.download_url, None);
}

#[tokio::test]
async fn test_malformed_json_is_reported() {
    let mut server = Server::new_async().await;
    let _mock5 = server
        .mock("GET", "/v2/project/lithium")
        .with_status(200)
        .with_body("{not json")
        .expect(2)
        .create_async()
        .await;

    let client = client(&server).await;
    let result = client.get_metadata("lithium").await;

    assert!(matches!(result, Err(RegistryError::Json { .. })));
}

#[tokio::test]
async fn test_search_sends_facets_and_prefers_slugs() {
    let mut server = Server::new_async().await;
    let search = server
        .mock("GET", "/v2/search")
        .match_header("user-agent", USER_AGENT)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "sodium".into()),
            Matcher::UrlEncoded(
                "facets".into(),
                r#"[["versions:1.20.1"],["categories:fabric"]]"#.into(),
            ),
        ]))
        .with_status(200)
        .with_body(
            r#"{"hits": [
                {"project_id": "AANobbMI", "slug": "sodium", "title": "Sodium", "downloads": 900,
                 "date_modified": "2024-01-10T08:00:00Z"},
                {"project_id": "abcd1234", "title": "Sodium Extra"}
            ], "total_hits": 2}"#,
        )
        .create_async()
        .await;

    let client = client(&server).await;
    let hits = client
        .search_projects("sodium", Some(&environment()))
        .await
        .unwrap();

    let ids: Vec<&str> = hits.iter().map(|hit| hit.mod_id.as_str()).collect();
    assert_eq!(ids, vec!["sodium", "abcd1234"]);
    assert_eq!(hits[0].downloads, Some(900));
    assert_eq!(hits[1].last_updated, None);
    search.assert_async().await;
}

#[tokio::test]
async fn test_search_without_environment_sends_no_facets() {
    let mut server = Server::new_async().await;
    let search = server
        .mock("GET", "/v2/search")
        .match_query(Matcher::Exact("query=iris".into()))
        .with_status(200)
        .with_body(r#"{"hits": []}"#)
        .create_async()
        .await;

    let client = client(&server).await;
    let hits = client.search_projects("iris", None).await.unwrap();

    assert!(hits.is_empty());
    search.assert_async().await;
}
