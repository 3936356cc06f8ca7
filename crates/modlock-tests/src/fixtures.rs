//! Response bodies shaped like the registry APIs
//!
//! Only the fields the clients read are filled in.

use anyhow::Result;
use serde_json::{Value, json};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// `GET /v1/mods/{id}` on CurseForge
pub fn curseforge_mod(name: &str) -> String {
    json!({
        "data": {
            "name": name,
            "downloadCount": 1234.0,
            "dateModified": "2024-01-01T00:00:00Z",
            "links": { "websiteUrl": format!("https://www.curseforge.com/minecraft/mc-mods/{}", name.to_lowercase()) }
        }
    })
    .to_string()
}

/// One CurseForge file entry; `required` are mod ids of required dependencies
pub fn curseforge_file(
    id: u64,
    download_url: &str,
    game_versions: &[&str],
    required: &[u64],
) -> Value {
    let dependencies: Vec<Value> = required
        .iter()
        .map(|mod_id| json!({ "modId": mod_id, "relationType": 3 }))
        .collect();

    json!({
        "id": id,
        "displayName": format!("file-{id}"),
        "downloadUrl": download_url,
        "gameVersions": game_versions,
        "dependencies": dependencies,
        "hashes": []
    })
}

/// A page of CurseForge files, `{"data": [...]}`
pub fn curseforge_files(files: &[Value]) -> String {
    json!({ "data": files }).to_string()
}

/// `GET /v2/project/{id}` on Modrinth
pub fn modrinth_project(slug: &str, title: &str) -> String {
    json!({
        "slug": slug,
        "title": title,
        "downloads": 99,
        "updated": "2024-02-02T00:00:00Z",
        "project_type": "mod"
    })
    .to_string()
}

/// One Modrinth version; `required` are project ids of required dependencies
pub fn modrinth_version(
    id: &str,
    url: &str,
    game_versions: &[&str],
    loaders: &[&str],
    required: &[&str],
) -> Value {
    let dependencies: Vec<Value> = required
        .iter()
        .map(|project| json!({ "project_id": project, "dependency_type": "required" }))
        .collect();

    json!({
        "id": id,
        "name": format!("{id} release"),
        "game_versions": game_versions,
        "loaders": loaders,
        "files": [{ "url": url, "primary": true, "hashes": {} }],
        "dependencies": dependencies
    })
}

/// `GET /v2/project/{id}/version` on Modrinth
pub fn modrinth_versions(versions: &[Value]) -> String {
    Value::Array(versions.to_vec()).to_string()
}

/// Write a zip archive holding `entries` (path, contents) and return its path
pub fn write_zip(dir: &Path, name: &str, entries: &[(&str, &str)]) -> Result<PathBuf> {
    let path = dir.join(name);
    let mut zip = zip::ZipWriter::new(File::create(&path)?);
    let options = zip::write::SimpleFileOptions::default();

    for (entry, contents) in entries {
        zip.start_file(*entry, options)?;
        zip.write_all(contents.as_bytes())?;
    }
    zip.finish()?;

    Ok(path)
}
