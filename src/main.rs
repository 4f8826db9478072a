use anyhow::Context;
use libris_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load Libris settings")?;
    libris_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        storage = %settings.storage.path.display(),
        "libris-app v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    libris_app::serve(settings).await
}
