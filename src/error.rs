use crate::source::SourceError;

#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    /// Store mode was changed after the store was created by `start()` or `scrape()`.
    #[error("collector '{0}' already started: store mode must be chosen before start()")]
    AlreadyStarted(String),

    #[error("sampling interval must be > 0")]
    InvalidInterval,

    /// The counter source's target is absent; the caller decides whether to back off.
    #[error("counter source unavailable: {0}")]
    Unavailable(String),

    /// One cycle failed; scheduled cycles log this and retry on the next tick.
    #[error("collection failed: {0}")]
    Collection(String),

    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl From<SourceError> for CollectorError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::Unavailable(msg) => Self::Unavailable(msg),
            SourceError::Failed(msg) => Self::Collection(msg),
        }
    }
}

impl CollectorError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
