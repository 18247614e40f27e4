use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaceError {
    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),
    #[error("tick interval must be at least 1 ms")]
    InvalidTickInterval,
    #[error("ticker has stopped and no longer accepts events")]
    TickerStopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("rendering sink is detached")]
    Detached,
    #[error("rendering sink rejected update: {0}")]
    Rejected(String),
}
