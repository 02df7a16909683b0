#[derive(Debug, thiserror::Error)]
pub enum DepotError {
    #[error("Invalid path: empty")]
    EmptyPath,
    #[error("Invalid path: path traversal detected")]
    Traversal,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("File not found: {}", .0.display())]
    NotFound(std::path::PathBuf),
    #[error("Target directory does not exist: {}", .0.display())]
    TargetDirMissing(std::path::PathBuf),
    #[error("Unable to read directory: {0}")]
    DirRead(std::io::Error),
    #[error("failed to create directory: {0}")]
    DirCreation(std::io::Error),
    #[error("failed to write file: {0}")]
    FileWrite(std::io::Error),
    #[error("Failed to delete file: {0}")]
    Delete(std::io::Error),
    #[error("failed to rename: {0}")]
    Rename(std::io::Error),
}

pub type DepotResult<T> = std::result::Result<T, DepotError>;
