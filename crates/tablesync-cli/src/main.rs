//! tablesync CLI - Browse restaurants and reviews from the terminal
//!
//! Reads go through the local read-through cache, so they keep working when
//! the service is unreachable. Writes made while offline are queued and sent
//! by `tablesync sync`.

mod cli;
mod commands;
mod error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, ReviewCommands};
use crate::commands::common::{resolve_config, App};
use crate::commands::favorite::run_favorite;
use crate::commands::pending::run_pending;
use crate::commands::restaurants::{
    run_cuisines, run_neighborhoods, run_restaurant, run_restaurants,
};
use crate::commands::reviews::{run_review_add, run_reviews};
use crate::commands::status::run_status;
use crate::commands::sync::run_sync;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tablesync=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.api_url, cli.db_path)?;
    let app = App::open(config, cli.offline).await?;

    match cli.command {
        Commands::Restaurants {
            cuisine,
            neighborhood,
            favorites,
            json,
        } => {
            run_restaurants(
                &app,
                cuisine.as_deref(),
                neighborhood.as_deref(),
                favorites,
                json,
            )
            .await?;
        }
        Commands::Restaurant { id, json } => run_restaurant(&app, id, json).await?,
        Commands::Neighborhoods => run_neighborhoods(&app).await?,
        Commands::Cuisines => run_cuisines(&app).await?,
        Commands::Reviews {
            restaurant_id,
            json,
        } => run_reviews(&app, restaurant_id, json).await?,
        Commands::Review {
            command:
                ReviewCommands::Add {
                    restaurant_id,
                    name,
                    rating,
                    comments,
                },
        } => run_review_add(&app, restaurant_id, &name, rating, &comments).await?,
        Commands::Favorite { id, off } => run_favorite(&app, id, !off).await?,
        Commands::Pending { json } => run_pending(&app, json).await?,
        Commands::Sync { json } => run_sync(&app, json).await?,
        Commands::Status => run_status(&app).await?,
    }

    Ok(())
}
