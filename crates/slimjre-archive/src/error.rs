use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("failed to open archive {path}")]
    Open { path: PathBuf, #[source] source: io::Error },

    #[error("failed to read zip structure of {path}")]
    InvalidZip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to read entry {entry} from {path}")]
    ReadEntry {
        path: PathBuf,
        entry: String,
        #[source]
        source: io::Error,
    },

    #[error("{path} does not look like a .jmod file (missing `JM` magic header)")]
    InvalidJmodMagic { path: PathBuf },
}
