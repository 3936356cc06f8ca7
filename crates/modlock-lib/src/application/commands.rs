//! Command execution handlers
//!
//! `execute_command` owns process-level setup (display, logger, networking);
//! the handlers take their collaborators as arguments so tests can swap them.

use crate::api::{Registries, SearchHit};
use crate::application::session::{InteractiveProvider, LiveInteractiveProvider};
use crate::application::{CliConfig, Commands};
use crate::display::Display;
use crate::logger::Logger;
use crate::modpack::{BuildOutcome, BuildPipeline, Environment, Mod, ModId, lock_file_path};
use crate::networking::NetworkingManager;
use crate::primitives::LoggerError;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

/// Execute CLI commands
pub async fn execute_command(config: CliConfig) -> Result<()> {
    let app_config = config.app_config;

    Display::init(app_config.color.resolve());
    match Logger::init(app_config.to_logger_config()) {
        Ok(_) | Err(LoggerError::AlreadyInitialized) => {}
        Err(e) => return Err(e).context("Failed to initialize logging"),
    }

    let command = match config.command {
        Some(cmd) => cmd,
        None => {
            Display::status().message("modlock - reproducible Minecraft mod sets");
            Display::status().subtle("Run 'modlock --help' for usage information");
            return Ok(());
        }
    };

    match command {
        Commands::LockPath { manifest } => handle_lock_path(&manifest),
        Commands::Info { mod_id, pin } => {
            let networking = Arc::new(
                NetworkingManager::new(app_config.networking_config())
                    .await
                    .context("Failed to set up networking")?,
            );
            let registries = Registries::live(
                networking,
                app_config.curseforge_api_key.clone(),
                app_config.retry_policy(),
            );
            let environment = app_config.environment().ok();
            handle_info(&registries, environment.as_ref(), &mod_id, pin).await
        }
        Commands::Search { keyword } => {
            let networking = Arc::new(
                NetworkingManager::new(app_config.networking_config())
                    .await
                    .context("Failed to set up networking")?,
            );
            let registries = Registries::live(
                networking,
                app_config.curseforge_api_key.clone(),
                app_config.retry_policy(),
            );
            let environment = app_config.environment().ok();
            handle_search(&registries, environment.as_ref(), &keyword).await
        }
        Commands::Build { manifest } => {
            let target = app_config.validate()?;
            let networking = Arc::new(
                NetworkingManager::new(app_config.networking_config())
                    .await
                    .context("Failed to set up networking")?,
            );
            let retry = app_config.retry_policy();
            let registries = Registries::live(
                networking.clone(),
                app_config.curseforge_api_key.clone(),
                retry,
            );
            let pipeline = BuildPipeline::new(networking, registries, target, retry)
                .with_config_source(app_config.describe_source());
            let interactive = LiveInteractiveProvider::new(app_config.yes);

            handle_build(&pipeline, &manifest, &interactive).await
        }
    }
}

fn handle_lock_path(manifest: &Path) -> Result<()> {
    println!("{}", lock_file_path(manifest).display());
    Ok(())
}

/// Run a build; a declined confirmation is not an error
pub async fn handle_build(
    pipeline: &BuildPipeline,
    manifest: &Path,
    interactive: &dyn InteractiveProvider,
) -> Result<()> {
    match pipeline.run(manifest, interactive).await? {
        BuildOutcome::Completed(report) => {
            tracing::info!(
                source = %report.source.display(),
                replayed = report.replayed,
                clean = report.lock.is_clean(),
                "build completed"
            );
            Ok(())
        }
        BuildOutcome::Cancelled => Ok(()),
    }
}

/// Look up a mod and print what a build would use.
///
/// Lookup failures are reported on the status line; only missing
/// configuration for the file lookup is skipped silently.
pub async fn handle_info(
    registries: &Registries,
    environment: Option<&Environment>,
    mod_id: &str,
    pin: Option<String>,
) -> Result<()> {
    let status = Display::status();
    let id = ModId::parse(mod_id);
    let client = registries.client(id.registry);
    let mut entry = Mod::new(id, pin);

    status.section(&format!("{} on {}", mod_id, entry.registry()));

    match entry.resolve_metadata(client.as_ref()).await {
        Ok(metadata) => {
            status.field("Name", &metadata.name);
            status.field(
                "Downloads",
                &metadata.downloads.map(|d| d.to_string()).unwrap_or_default(),
            );
            status.field("Last updated", metadata.last_updated.as_deref().unwrap_or(""));
            status.field("Website", metadata.website.as_deref().unwrap_or(""));
            status.field("Summary", metadata.summary.as_deref().unwrap_or(""));
        }
        Err(e) => status.error("Metadata lookup failed", &e.to_string()),
    }

    let Some(environment) = environment else {
        status.subtle("Set a game version and loader to see which file a build would pick");
        return Ok(());
    };

    let resolved = entry
        .resolve_file(client.as_ref(), environment)
        .await
        .map(|_| ());
    match resolved {
        Ok(()) => {
            status.field("Environment", &environment.to_string());
            status.field("Version", entry.version_id().unwrap_or(""));
            match entry.download_url() {
                Ok(url) => status.field("Download", url),
                Err(e) => status.warning(&format!("No download: {e}")),
            }
            let dependencies = entry.dependencies().unwrap_or_default();
            if !dependencies.is_empty() {
                status.message("Dependencies:");
                let ids: Vec<String> = dependencies.iter().map(Mod::to_string).collect();
                status.list(&ids);
            }
        }
        Err(e) => status.error(&format!("No file for {environment}"), &e.to_string()),
    }

    Ok(())
}

/// Search every registry for `keyword`, one section per registry.
///
/// A registry that fails is reported and the next one is still searched.
pub async fn handle_search(
    registries: &Registries,
    environment: Option<&Environment>,
    keyword: &str,
) -> Result<()> {
    let status = Display::status();

    match environment {
        Some(environment) => status.message(&format!("Searching for '{keyword}' for {environment}")),
        None => status.message(&format!("Searching for '{keyword}' in every version")),
    }

    for client in registries.all() {
        status.section(&client.registry().to_string());
        match client.search(keyword, environment).await {
            Ok(hits) if hits.is_empty() => status.subtle("No results"),
            Ok(hits) => {
                let lines: Vec<String> = hits.iter().map(search_line).collect();
                status.list(&lines);
            }
            Err(e) => status.error("Search failed", &e.to_string()),
        }
    }

    Ok(())
}

/// `Name (id), 1234 downloads, updated 2024-03-01`
fn search_line(hit: &SearchHit) -> String {
    let mut line = format!("{} ({})", hit.name, hit.mod_id);
    if let Some(downloads) = hit.downloads {
        line.push_str(&format!(", {downloads} downloads"));
    }
    if let Some(updated) = &hit.last_updated {
        let date = updated.get(..10).unwrap_or(updated);
        line.push_str(&format!(", updated {date}"));
    }
    line
}

#[cfg(test)]
mod tests {
    include!("commands.test.rs");
}
