use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FunnelError {
    #[error("request to the quiz backend failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("quiz backend returned {status} for {url}")]
    BackendStatus { status: StatusCode, url: String },

    #[error("result store failure: {0}")]
    Store(#[from] sqlx::Error),

    #[error("could not encode result payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("cannot score a quiz attempt with no answers")]
    NoAnswers,

    #[error("answers carry no style points, primary style is undefined")]
    ZeroScore,

    #[error("quiz '{0}' has no questions configured")]
    EmptyQuiz(String),
}

impl FunnelError {
    /// Degenerate scoring input rather than a real failure. Callers render
    /// the empty-state fallback for these instead of aborting.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, FunnelError::NoAnswers | FunnelError::ZeroScore)
    }
}
