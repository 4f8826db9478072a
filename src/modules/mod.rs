pub mod books;
pub mod ui;

use std::sync::Arc;

use libris_kernel::{settings::Settings, ModuleRegistry};

use books::catalog::BookCatalog;

/// Register every application module with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    settings: &Settings,
    catalog: Arc<BookCatalog>,
) -> anyhow::Result<()> {
    registry.register(books::create_module(catalog));
    registry.register(ui::create_module(&settings.ui)?);
    Ok(())
}
