// LocalTab - new-tab dashboard storage core
// Entry point: open the data directory, then export, import, or summarize

use anyhow::Context;
use clap::{Parser, Subcommand};
use localtab::{app, config, dashboard::Dashboard};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Local storage for the LocalTab new-tab dashboard
#[derive(Debug, Parser)]
#[command(name = "localtab", version, about)]
struct Cli {
    /// Directory holding the database, blobs and backups
    #[arg(long, env = config::DATA_DIR_ENV, default_value = config::DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write a JSON backup (defaults to the backups directory)
    Export { dir: Option<PathBuf> },
    /// Replace all data with the contents of a JSON backup
    Import { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "localtab=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LocalTab");

    let state = app::setup(cli.data_dir)
        .await
        .context("failed to open data directory")?;

    match cli.command {
        Some(Command::Export { dir }) => {
            let path = state.backup.export_to_file(dir.as_deref()).await?;
            tracing::info!("Backup written to {:?}", path);
        }
        Some(Command::Import { file }) => {
            let summary = state.backup.import_from_file(&file).await?;
            tracing::info!(
                "Imported {} categories, {} links, {} link groups",
                summary.categories,
                summary.links,
                summary.link_groups
            );
        }
        None => {
            let dashboard = Dashboard::load(state).await?;
            for info in dashboard.categories() {
                tracing::info!(
                    "[{}] {} ({} links)",
                    info.category.sort,
                    info.category.name,
                    info.links.len()
                );
            }
            tracing::info!("Search engine: {}", dashboard.search_engine().display_name());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["localtab", "--data-dir", "/tmp/lt", "import", "backup.json"]).unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/lt"));
        assert!(matches!(cli.command, Some(Command::Import { file }) if file == PathBuf::from("backup.json")));

        let cli = Cli::try_parse_from(["localtab", "--data-dir", "/tmp/lt", "export"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Export { dir: None })));
    }

    #[test]
    fn test_import_requires_file() {
        assert!(Cli::try_parse_from(["localtab", "import"]).is_err());
    }
}
