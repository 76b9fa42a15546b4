use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{HttpInventoryStore, InventoryController};
use shared::domain::{InventoryItem, DEFAULT_COLLECTION};
use storage::{InventoryStore, SqliteInventoryStore};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_DATABASE_URL: &str = "sqlite://./data/pantry.db";

#[derive(Parser, Debug)]
#[command(name = "pantry", about = "Count what is in the pantry")]
struct Cli {
    /// Document store service, e.g. http://127.0.0.1:8080
    #[arg(long, env = "PANTRY_SERVER_URL", conflicts_with = "database_url")]
    server_url: Option<String>,
    /// Local SQLite file used when no server is given
    #[arg(long, env = "PANTRY_DATABASE_URL")]
    database_url: Option<String>,
    #[arg(long, env = "PANTRY_COLLECTION", default_value = DEFAULT_COLLECTION)]
    collection: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every item
    List,
    /// Add one unit, creating the item if needed
    Add { name: String },
    /// Take one unit away, deleting the item at zero
    Remove { name: String },
    /// Show items whose name contains the query, ignoring case
    Search { query: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let store = open_store(&cli).await?;
    let mut controller = InventoryController::new(store);
    controller.load().await?;

    match cli.command {
        Command::List => {}
        Command::Add { name } => {
            controller.open_add_dialog();
            controller.set_draft(name);
            controller.submit_add().await?;
        }
        Command::Remove { name } => controller.remove_item(&name).await?,
        Command::Search { query } => controller.set_search_query(query),
    }

    for line in render(&controller.filtered_view()) {
        println!("{line}");
    }
    Ok(())
}

async fn open_store(cli: &Cli) -> Result<Arc<dyn InventoryStore>> {
    if let Some(server_url) = &cli.server_url {
        debug!(%server_url, collection = %cli.collection, "using remote document store");
        return Ok(Arc::new(HttpInventoryStore::new(server_url, cli.collection.clone())?));
    }
    let database_url = cli.database_url.as_deref().unwrap_or(DEFAULT_DATABASE_URL);
    debug!(%database_url, collection = %cli.collection, "using local sqlite store");
    Ok(Arc::new(
        SqliteInventoryStore::new(database_url, cli.collection.clone()).await?,
    ))
}

fn render(items: &[&InventoryItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| format!("{}\t{}", item.name.display_name(), item.quantity))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use clap::CommandFactory;
    use shared::domain::ItemName;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn server_and_database_are_exclusive() {
        let parsed = Cli::try_parse_from([
            "pantry",
            "--server-url",
            "http://127.0.0.1:8080",
            "--database-url",
            "sqlite::memory:",
            "list",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn rows_show_capitalised_name_and_count() {
        let item = InventoryItem::new(
            ItemName::parse("rice").expect("name"),
            NonZeroU32::new(3).expect("non-zero"),
        );
        assert_eq!(render(&[&item]), vec!["Rice\t3".to_string()]);
    }
}
