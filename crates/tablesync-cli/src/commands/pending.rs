use crate::commands::common::{format_pending_lines, App, PendingItems};
use crate::error::CliError;

pub async fn run_pending(app: &App, as_json: bool) -> Result<(), CliError> {
    let reviews = app.queue.pending_reviews().await?;
    let favorites = app.queue.pending_favorites().await?;

    if as_json {
        let items = PendingItems {
            reviews: &reviews,
            favorites: &favorites,
        };
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if reviews.is_empty() && favorites.is_empty() {
        println!("Nothing waiting to sync.");
        return Ok(());
    }
    for line in format_pending_lines(&reviews, &favorites) {
        println!("{line}");
    }
    Ok(())
}
