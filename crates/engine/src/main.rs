//! Charsheet Engine - loads a catalog and roster, then prints each sheet.

use std::sync::Arc;

use anyhow::Context;
use charsheet_domain::RuleCatalog;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use charsheet_engine::infrastructure::{app_settings::EngineSettings, importers::JsonImporter};
use charsheet_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root so `cargo run -p charsheet-engine` works from anywhere.
    load_dotenv_from_repo_root();

    // Logging comes up before settings so settings warnings are visible.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EngineSettings::log_filter_from_env().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Charsheet Engine");

    let settings = EngineSettings::from_env();
    settings
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid engine settings")?;

    let importer = JsonImporter::new();
    let catalog = match &settings.catalog_path {
        Some(path) => importer
            .load_catalog(path)
            .await
            .with_context(|| format!("loading catalog from {}", path.display()))?,
        None => {
            tracing::warn!("No rule catalog configured, using an empty catalog");
            RuleCatalog::new()
        }
    };

    let app = Arc::new(App::in_memory(settings, catalog));

    if let Some(path) = &app.settings.roster_path {
        let roster = importer
            .load_roster(path)
            .await
            .with_context(|| format!("loading roster from {}", path.display()))?;
        for character in &roster {
            app.repositories.characters.save(character).await?;
        }
    }

    let characters = app.repositories.characters.list().await?;
    if characters.is_empty() {
        tracing::info!("Roster is empty, nothing to derive");
    }

    for character in characters {
        let stats = app
            .use_cases
            .character_sheet
            .derived_stats
            .execute(character.id())
            .await?;
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
