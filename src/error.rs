use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConvertError {
    #[error("file {0:?} does not exist")]
    MissingInputFile(PathBuf),

    #[error("directory {0:?} does not exist")]
    MissingDirectory(PathBuf),

    #[error("failed to read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {path:?}: {message}")]
    Serialize { path: PathBuf, message: String },

    #[error("index file {path:?} is unreadable: {message}")]
    UnreadableIndex { path: PathBuf, message: String },
}
