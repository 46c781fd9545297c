//! Reading the description document.

use std::path::Path;

use crate::error::ValidationError;

/// Where the raw description document comes from
pub trait DocumentSource {
    fn read_document(&self, path: &Path) -> Result<String, ValidationError>;
}

/// Reads documents from the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsDocumentSource;

impl DocumentSource for FsDocumentSource {
    fn read_document(&self, path: &Path) -> Result<String, ValidationError> {
        std::fs::read_to_string(path).map_err(|e| {
            tracing::debug!(path = %path.display(), error = %e, "could not read blueprint");
            ValidationError::DocumentNotFound {
                path: path.to_path_buf(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_existing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"# API\n").unwrap();
        assert_eq!(FsDocumentSource.read_document(file.path()).unwrap(), "# API\n");
    }

    #[test]
    fn missing_file_is_document_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apiary.apib");
        let err = FsDocumentSource.read_document(&path).unwrap_err();
        assert_eq!(err, ValidationError::DocumentNotFound { path: path.clone() });
        assert_eq!(
            err.to_string(),
            format!("API Blueprint file was not found at {}.", path.display())
        );
    }
}
