//! Libris application library
//!
//! Catalog modules plus the [`serve`] entry point shared by the server
//! binary and the CLI.

pub mod modules;

use anyhow::Context;
use libris_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub use modules::books::catalog::{BookCatalog, CatalogError};
pub use modules::books::models::{Book, BookEnvelope, NewBook};

/// Build the module registry for `settings`
pub fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    let catalog = modules::books::catalog_from_settings(&settings.storage);
    modules::register_all(&mut registry, settings, catalog)?;
    Ok(registry)
}

/// Run the HTTP server until a shutdown signal arrives
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry(&settings)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry
        .init_all(&ctx)
        .await
        .context("module initialization failed")?;
    registry
        .start_all(&ctx)
        .await
        .context("module startup failed")?;

    let served =
        libris_http::start_server(&registry, &settings, libris_http::shutdown_signal()).await;

    registry.stop_all().await.context("module shutdown failed")?;
    served
}
