use super::*;
use crate::modpack::{ModLoader, Registry};
use crate::networking::NetworkingConfig;

#[tokio::test]
async fn test_registries_route_by_registry() {
    let registries = Registries::new(
        Arc::new(MockRegistryClient::new(Registry::CurseForge)),
        Arc::new(MockRegistryClient::new(Registry::Modrinth)),
    );

    assert_eq!(
        registries.client(Registry::CurseForge).registry(),
        Registry::CurseForge
    );
    assert_eq!(
        registries.client(Registry::Modrinth).registry(),
        Registry::Modrinth
    );
}

#[tokio::test]
async fn test_live_registries_without_key_refuse_curseforge() {
    let networking = Arc::new(
        NetworkingManager::new(NetworkingConfig::default())
            .await
            .unwrap(),
    );
    let registries = Registries::live(networking, None, RetryPolicy::default());
    let environment = Environment::new("1.20.1", ModLoader::Fabric);

    let result = registries
        .client(Registry::CurseForge)
        .latest_compatible_file("238222", &environment, None)
        .await;

    assert_eq!(result, Err(RegistryError::MissingApiKey));
}

#[test]
fn test_exhausted_decode_error_maps_to_json() {
    let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let exhausted = RetryExhausted {
        attempts: 3,
        last_error: NetworkingError::Decode {
            url: "https://x/y".to_string(),
            source,
        },
    };

    assert!(matches!(
        RegistryError::from_exhausted("https://x/y", exhausted),
        RegistryError::Json { .. }
    ));
}

#[test]
fn test_exhausted_status_maps_to_request_failed() {
    let exhausted = RetryExhausted {
        attempts: 3,
        last_error: NetworkingError::Status {
            url: "https://x/y".to_string(),
            status: reqwest::StatusCode::BAD_GATEWAY,
        },
    };

    let error = RegistryError::from_exhausted("https://x/y", exhausted);
    assert!(matches!(error, RegistryError::RequestFailed { attempts: 3, .. }));
    assert!(error.to_string().contains("502"));
}
