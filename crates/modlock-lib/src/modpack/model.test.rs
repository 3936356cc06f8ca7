use super::*;
use crate::api::MockRegistryClient;
use std::collections::HashSet;

fn environment() -> Environment {
    Environment::new("1.20.1", ModLoader::Fabric)
}

#[test]
fn test_registry_routing_is_static() {
    assert_eq!(Registry::route("123456"), Registry::CurseForge);
    assert_eq!(Registry::route("-7"), Registry::CurseForge);
    assert_eq!(Registry::route("sodium"), Registry::Modrinth);
    assert_eq!(Registry::route("12ab"), Registry::Modrinth);
    assert_eq!(Registry::route(""), Registry::Modrinth);
}

#[test]
fn test_mod_loader_names() {
    assert_eq!("FABRIC".parse::<ModLoader>().unwrap(), ModLoader::Fabric);
    assert_eq!("neoforge".parse::<ModLoader>().unwrap(), ModLoader::NeoForge);
    assert_eq!(ModLoader::NeoForge.curseforge_name(), "NeoForge");
    assert_eq!(ModLoader::Forge.as_str(), "forge");
    assert!("rift".parse::<ModLoader>().is_err());
}

#[test]
fn test_install_root_is_mods_dir_parent() {
    let target = InstallTarget::new(environment(), "/games/minecraft/mods");
    assert_eq!(target.install_root(), Some(Path::new("/games/minecraft")));

    let bare = InstallTarget::new(environment(), "mods");
    assert_eq!(bare.install_root(), None);
}

#[test]
fn test_mod_identity_ignores_state() {
    let plain = Mod::new(ModId::parse("sodium"), None);
    let resolved = Mod::with_state(
        ModId::parse("sodium"),
        Some("abc".to_string()),
        ModState {
            metadata: Some(ModMetadata {
                name: "Sodium".to_string(),
                ..Default::default()
            }),
            file: None,
        },
    );

    assert_eq!(plain, resolved);
    let set: HashSet<Mod> = [plain, resolved].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn test_same_id_in_different_registries_differs() {
    let curseforge = Mod::new(ModId::new(Registry::CurseForge, "1234"), None);
    let modrinth = Mod::new(ModId::new(Registry::Modrinth, "1234"), None);
    assert_ne!(curseforge, modrinth);
}

#[test]
fn test_unresolved_mod_has_no_url_or_dependencies() {
    let m = Mod::new(ModId::parse("238222"), None);
    assert!(matches!(m.download_url(), Err(RegistryError::Unresolved { .. })));
    assert!(matches!(m.dependencies(), Err(RegistryError::Unresolved { .. })));
    assert_eq!(m.display_name(), "238222");
    assert_eq!(m.version_id(), None);
}

#[tokio::test]
async fn test_resolve_file_fetches_once() {
    let client = MockRegistryClient::new(Registry::Modrinth).with_file(
        "lithium",
        ResolvedFile {
            version_id: "v1".to_string(),
            display_name: "Lithium 0.11".to_string(),
            download_url: Some("https://cdn.example/lithium.jar".to_string()),
            dependencies: vec!["fabric-api".to_string()],
            sha1: None,
        },
    );

    let mut m = Mod::new(ModId::parse("lithium"), None);
    m.resolve_file(&client, &environment()).await.unwrap();
    m.resolve_file(&client, &environment()).await.unwrap();

    assert_eq!(client.file_calls(), 1);
    assert_eq!(m.download_url().unwrap(), "https://cdn.example/lithium.jar");
    assert_eq!(m.version_id(), Some("v1"));
    assert_eq!(m.display_name(), "Lithium 0.11");

    let deps = m.dependencies().unwrap();
    assert_eq!(deps.len(), 1);
    let dep = deps.iter().next().unwrap();
    assert_eq!(dep.id(), &ModId::new(Registry::Modrinth, "fabric-api"));
}

#[tokio::test]
async fn test_resolve_metadata_failure_leaves_state_empty() {
    let client = MockRegistryClient::new(Registry::CurseForge).with_metadata_failure(
        "42",
        RegistryError::RequestFailed {
            url: "https://api.example/v1/mods/42".to_string(),
            attempts: 3,
            reason: "HTTP 500".to_string(),
        },
    );

    let mut m = Mod::new(ModId::parse("42"), None);
    assert!(m.resolve_metadata(&client).await.is_err());
    assert!(m.state().metadata.is_none());
}

#[test]
fn test_missing_download_url_is_unavailable() {
    let m = Mod::with_state(
        ModId::parse("77"),
        None,
        ModState {
            metadata: None,
            file: Some(ResolvedFile {
                version_id: "1".to_string(),
                ..Default::default()
            }),
        },
    );
    assert!(matches!(m.download_url(), Err(RegistryError::Unavailable { .. })));
}

#[test]
fn test_url_identity_and_display() {
    let attributed = Url::new("https://example.com/x.jar", Some("123".to_string()));
    let bare = Url::new("https://example.com/x.jar", None);

    assert_eq!(attributed, bare);
    assert_eq!(attributed.to_string(), "https://example.com/x.jar for mod 123");
    assert_eq!(bare.to_string(), "https://example.com/x.jar");
}

#[test]
fn test_downloadable_identifier() {
    let m: Downloadable = Mod::new(ModId::parse("sodium"), None).into();
    let owned: Downloadable = Url::new("https://example.com/a.jar", Some("99".to_string())).into();
    let bare: Downloadable = Url::new("https://example.com/b.jar", None).into();

    assert_eq!(m.identifier(), "sodium");
    assert_eq!(owned.identifier(), "99");
    assert_eq!(bare.identifier(), "https://example.com/b.jar");
    assert_eq!(bare.display_name(), "https://example.com/b.jar");
}
