use std::path::Path;

use serde::Serialize;

use crate::error::IoError;
use crate::kind::{FileKind, extension_of};

/// A file as handed to ingestion: name, declared size and raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub name: String,
    pub size_bytes: u64,
    /// Lowercased text after the last `.`; may be anything, checked later.
    pub extension: String,
    pub content: Vec<u8>,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        let name = name.into();
        let extension = extension_of(&name).to_ascii_lowercase();
        Self {
            size_bytes: content.len() as u64,
            name,
            extension,
            content,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let content = std::fs::read(path).map_err(|source| IoError::ReadFailure {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, content))
    }

    pub fn kind(&self) -> Option<FileKind> {
        FileKind::from_extension(&self.extension)
    }
}

/// Record of an accepted file. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    pub name: String,
    pub size_bytes: u64,
    pub kind: FileKind,
}

#[cfg(test)]
mod tests {
    use super::FileUpload;
    use crate::error::IoError;
    use crate::kind::FileKind;
    use std::path::Path;

    #[test]
    fn derives_extension_and_size() {
        let up = FileUpload::new("Scan.XYZ", b"0 0 0\n".to_vec());
        assert_eq!(up.extension, "xyz");
        assert_eq!(up.size_bytes, 6);
        assert_eq!(up.kind(), Some(FileKind::Xyz));

        let up = FileUpload::new("README", Vec::new());
        assert_eq!(up.extension, "");
        assert_eq!(up.kind(), None);
    }

    #[test]
    fn missing_path_is_read_failure() {
        let err = FileUpload::from_path(Path::new("/definitely/not/here.xyz"))
            .expect_err("missing file");
        let IoError::ReadFailure { path, .. } = err;
        assert_eq!(path, Path::new("/definitely/not/here.xyz"));
    }
}
