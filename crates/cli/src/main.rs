use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use libris_app::{modules::books::catalog_from_settings, NewBook};
use libris_kernel::settings::Settings;

/// Manage a Libris catalog from the command line
#[derive(Debug, Parser)]
#[command(name = "libris-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Create an empty catalog document if none exists
    Init,
    /// Print every book
    List,
    /// Add a book
    Add { title: String, author: String },
    /// Mark a book as lent out
    Borrow { id: u64 },
    /// Mark a lent-out book as available again
    Return { id: u64 },
    /// Remove a book
    Delete { id: u64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load Libris settings")?;
    // stdout carries command output
    libris_telemetry::init_stderr(&settings.telemetry)?;

    run(cli.command, settings).await
}

async fn run(command: Command, settings: Settings) -> anyhow::Result<()> {
    let catalog = catalog_from_settings(&settings.storage);
    let path = settings.storage.path.display().to_string();

    match command {
        Command::Serve => libris_app::serve(settings).await?,
        Command::Init => {
            let created = catalog
                .bootstrap()
                .await
                .with_context(|| format!("failed to create {}", path))?;
            if created {
                println!("created {}", path);
            } else {
                println!("{} already exists", path);
            }
        }
        Command::List => print_json(&catalog.list().await?)?,
        Command::Add { title, author } => {
            let book = catalog.add(NewBook::new(title, author)?).await?;
            print_json(&book)?;
        }
        Command::Borrow { id } => print_json(&catalog.borrow(id).await?)?,
        Command::Return { id } => print_json(&catalog.return_book(id).await?)?,
        Command::Delete { id } => print_json(&catalog.delete(id).await?)?,
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
