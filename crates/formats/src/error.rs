use std::path::PathBuf;

use crate::kind::FileCategory;

/// Why a single uploaded file (or a whole batch) was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("file is empty")]
    Empty,
    #[error("file is {size_bytes} bytes, exceeding the {limit_bytes} byte limit")]
    TooLarge { size_bytes: u64, limit_bytes: u64 },
    #[error("unsupported file type `{extension}` (expected .xyz, .pcd or .geojson)")]
    UnsupportedType { extension: String },
    #[error("a file with this name has already been uploaded")]
    Duplicate,
    #[error("only one {category} file may be loaded per session, found {count}")]
    MultiplicityViolation {
        category: FileCategory,
        count: usize,
    },
    #[error("malformed XYZ data{}: {reason}", line_suffix(.line))]
    MalformedXyz { line: Option<usize>, reason: String },
    #[error("malformed PCD header: {reason}")]
    MalformedPcdHeader { reason: String },
    #[error("malformed PCD data: {reason}")]
    MalformedPcdData { reason: String },
    #[error("PCD `DATA {encoding}` payloads are not supported, only `DATA ascii`")]
    UnsupportedPcdEncoding { encoding: String },
    #[error("invalid GeoJSON: {0}")]
    InvalidGeoJson(#[from] GeoJsonError),
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(n) => format!(" on line {n}"),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoJsonError {
    #[error("JSON parse error: {reason}")]
    Json { reason: String },
    #[error("{reason}")]
    InvalidRoot { reason: String },
    #[error("invalid feature at index {index}: {reason}")]
    InvalidFeature { index: usize, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("failed to read {}: {source}", path.display())]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
