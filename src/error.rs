use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by [Store](crate::store::Store) operations.
///
/// All of them are recoverable per request. The `Display` text is what the client gets to
/// see on the info page.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The root directory could not be opened or enumerated.
    #[error("failed to read directory '{}': {}", .path.display(), .source)]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Upload target name is already taken.
    #[error("file already exists: '{0}'")]
    AlreadyExists(String),

    /// Delete or download target is missing.
    #[error("file does not exist: '{0}'")]
    NotFound(String),

    /// Delete or download target is a directory.
    #[error("cannot use directory: '{0}'")]
    IsDirectory(String),

    /// Creating or filling the upload target failed. A partial file may remain.
    #[error("failed to save file '{name}': {source}")]
    WriteFailed {
        name: String,
        #[source]
        source: io::Error,
    },

    /// Any other filesystem failure on an existing entry.
    #[error("failed to access '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use std::io;
    use super::StoreError;

    #[test]
    fn test_reason_strings() {
        let e = StoreError::AlreadyExists(String::from("a.txt"));
        assert_eq!(e.to_string(), "file already exists: 'a.txt'");

        let e = StoreError::NotFound(String::from("b.txt"));
        assert_eq!(e.to_string(), "file does not exist: 'b.txt'");

        let e = StoreError::IsDirectory(String::from("sub"));
        assert_eq!(e.to_string(), "cannot use directory: 'sub'");

        let e = StoreError::WriteFailed {
            name: String::from("c.txt"),
            source: io::Error::new(io::ErrorKind::Other, "disk full"),
        };
        assert_eq!(e.to_string(), "failed to save file 'c.txt': disk full");
    }
}
