use crate::commands::common::App;
use crate::error::CliError;

pub async fn run_status(app: &App) -> Result<(), CliError> {
    println!("API:          {}", app.config.api_base_url);
    println!(
        "Connectivity: {}",
        if app.offline { "offline (forced)" } else { "online" }
    );

    let Some(store) = &app.store else {
        println!("Store:        unavailable (remote-only)");
        return Ok(());
    };

    println!("Store:        {}", app.config.store_path.display());
    println!("Version:      {}", store.version().await);
    let partitions = store
        .partitions()
        .await?
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    println!("Partitions:   {}", partitions.join(", "));
    println!(
        "Pending:      {} reviews, {} favorites",
        app.queue.pending_reviews().await?.len(),
        app.queue.pending_favorites().await?.len()
    );
    Ok(())
}
