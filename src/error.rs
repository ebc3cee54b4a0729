use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid snippet directory: {0}")]
    InvalidPath(String),

    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The snippet name must not be empty.")]
    EmptyName,

    #[error("There is already a snippet called '{0}'.")]
    NameTaken(String),

    #[error("Invalid snippet name '{0}'")]
    InvalidName(String),

    #[error("Failed to spawn indexer thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
