use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unable to get target element: {0}")]
    TargetNotFound(String),

    #[error("Unable to get container element: {0}")]
    ContainerNotFound(String),

    #[error("Unsupported event '{0}'")]
    UnsupportedTriggerEvent(String),

    #[error("Unknown easing function '{0}'")]
    UnknownEasing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
