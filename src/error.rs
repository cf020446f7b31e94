use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store is not initialized yet")]
    StoreUnavailable,

    #[error("Invalid record: {0}")]
    Validation(String),

    #[error("Not logged in. Run `tally login` first.")]
    NotLoggedIn,

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TallyError>;
