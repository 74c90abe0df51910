use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] tablesync_core::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Review comments cannot be empty")]
    EmptyComments,
    #[error("Offline writes need a local store, but none could be opened")]
    NoLocalStore,
}
