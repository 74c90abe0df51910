use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tablesync")]
#[command(about = "Browse restaurants and reviews, online or off")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the restaurant service
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Optional path to the local store file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Treat the network as down: writes are queued for the next sync
    #[arg(long, global = true)]
    pub offline: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List restaurants ("*" favorite, "+" favorite not synced yet)
    #[command(alias = "ls")]
    Restaurants {
        /// Only this cuisine ("all" for any)
        #[arg(long)]
        cuisine: Option<String>,
        /// Only this neighborhood ("all" for any)
        #[arg(long)]
        neighborhood: Option<String>,
        /// Only favorite restaurants, counting queued toggles
        #[arg(long)]
        favorites: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one restaurant
    Restaurant {
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List neighborhoods
    Neighborhoods,
    /// List cuisines
    Cuisines,
    /// Show reviews of a restaurant, including ones not yet synced
    Reviews {
        restaurant_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write reviews
    Review {
        #[command(subcommand)]
        command: ReviewCommands,
    },
    /// Mark a restaurant as favorite
    Favorite {
        id: i64,
        /// Remove the favorite mark instead
        #[arg(long)]
        off: bool,
    },
    /// Show writes waiting to be synced
    Pending {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Send queued writes to the service
    Sync {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show configuration and local store state
    Status,
}

#[derive(Subcommand)]
pub enum ReviewCommands {
    /// Submit a review
    #[command(alias = "new")]
    Add {
        restaurant_id: i64,
        /// Reviewer name
        #[arg(long)]
        name: String,
        /// Star rating, 1 to 5
        #[arg(long)]
        rating: u8,
        /// Review text
        comments: Vec<String>,
    },
}
