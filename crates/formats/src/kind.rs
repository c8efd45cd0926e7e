use std::fmt;

use serde::{Deserialize, Serialize};

pub const ALLOWED_EXTENSIONS: [&str; 3] = ["xyz", "pcd", "geojson"];

/// Supported upload formats.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Plain-text `x y z` rows
    Xyz,
    /// Point Cloud Library, ASCII payload only
    Pcd,
    GeoJson,
}

/// Multiplicity buckets: one file of each category per session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileCategory {
    PointCloud,
    GeoData,
}

impl FileKind {
    pub const ALL: [FileKind; 3] = [FileKind::Xyz, FileKind::Pcd, FileKind::GeoJson];

    /// Case-insensitive; a leading dot is tolerated.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "xyz" => Some(Self::Xyz),
            "pcd" => Some(Self::Pcd),
            "geojson" => Some(Self::GeoJson),
            _ => None,
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::from_extension(extension_of(name))
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xyz => "xyz",
            Self::Pcd => "pcd",
            Self::GeoJson => "geojson",
        }
    }

    pub fn category(&self) -> FileCategory {
        match self {
            Self::Xyz | Self::Pcd => FileCategory::PointCloud,
            Self::GeoJson => FileCategory::GeoData,
        }
    }

    pub fn is_point_cloud(&self) -> bool {
        self.category() == FileCategory::PointCloud
    }
}

/// Text after the last `.` of a file name, or `""` when there is none.
pub fn extension_of(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => "",
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileCategory::PointCloud => f.write_str("point cloud (.xyz/.pcd)"),
            FileCategory::GeoData => f.write_str("GeoJSON"),
        }
    }
}
