use tablesync_core::{NewReview, WriteOutcome};

use crate::commands::common::{format_review_lines, normalize_comments, now_ms, App};
use crate::error::CliError;

pub async fn run_reviews(app: &App, restaurant_id: i64, as_json: bool) -> Result<(), CliError> {
    let entries = app.queue.reviews_for_restaurant(restaurant_id).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No reviews yet.");
        return Ok(());
    }
    for line in format_review_lines(&entries, now_ms()) {
        println!("{line}");
    }
    Ok(())
}

pub async fn run_review_add(
    app: &App,
    restaurant_id: i64,
    name: &str,
    rating: u8,
    comments: &[String],
) -> Result<(), CliError> {
    let comments = normalize_comments(comments)?;
    let review = NewReview::new(restaurant_id, name, rating, comments);

    match app.queue.submit_review(review).await? {
        WriteOutcome::Delivered(review) => println!("Review {} posted", review.id),
        WriteOutcome::Queued(pending) => println!(
            "Offline: review saved and will be posted on the next sync ({})",
            pending.created_at
        ),
    }
    Ok(())
}
