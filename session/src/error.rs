use thiserror::Error;

/// Failure talking to the game backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("could not decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// HTTP status of the response, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to start game session: {0}")]
    Start(#[source] ApiError),

    #[error("failed to load food catalog: {0}")]
    Catalog(#[source] ApiError),

    #[error("backend returned an empty food catalog")]
    EmptyCatalog,

    #[error("session task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("session closed before producing a summary")]
    Closed,
}
