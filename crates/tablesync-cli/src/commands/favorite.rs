use tablesync_core::WriteOutcome;

use crate::commands::common::App;
use crate::error::CliError;

pub async fn run_favorite(app: &App, id: i64, checked: bool) -> Result<(), CliError> {
    let verb = if checked { "marked" } else { "unmarked" };

    match app.queue.toggle_favorite(id, checked).await? {
        WriteOutcome::Delivered(restaurant) => {
            println!("{} {verb} as favorite", restaurant.name);
        }
        WriteOutcome::Queued(_) => {
            println!("Offline: restaurant {id} will be {verb} as favorite on the next sync");
        }
    }
    Ok(())
}
