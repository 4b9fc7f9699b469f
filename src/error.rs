use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("terminal i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "gui")]
    #[error("window platform error: {0}")]
    Platform(#[from] druid::PlatformError),
}

pub type Result<T> = std::result::Result<T, Error>;
