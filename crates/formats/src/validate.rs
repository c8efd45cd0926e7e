//! Per-file and batch checks, applied in a fixed order: extension, size,
//! duplicate name, multiplicity, then structure. The first failure wins.

use std::collections::BTreeSet;

use crate::config::IngestConfig;
use crate::error::{GeoJsonError, ValidationError};
use crate::geojson::FeatureCollection;
use crate::kind::{FileCategory, FileKind};
use crate::pcd::{PcdHeader, parse_pcd};
use crate::point_set::PointSet;
use crate::upload::FileUpload;
use crate::xyz::parse_xyz;

pub fn check_extension(upload: &FileUpload) -> Result<FileKind, ValidationError> {
    upload
        .kind()
        .ok_or_else(|| ValidationError::UnsupportedType {
            extension: upload.extension.clone(),
        })
}

/// `0 < size_bytes <= limit_bytes`.
pub fn check_size(size_bytes: u64, limit_bytes: u64) -> Result<(), ValidationError> {
    if size_bytes == 0 {
        return Err(ValidationError::Empty);
    }
    if size_bytes > limit_bytes {
        return Err(ValidationError::TooLarge {
            size_bytes,
            limit_bytes,
        });
    }
    Ok(())
}

pub fn check_duplicate(name: &str, seen: &BTreeSet<String>) -> Result<(), ValidationError> {
    if seen.contains(name) {
        Err(ValidationError::Duplicate)
    } else {
        Ok(())
    }
}

/// At most one file per [`FileCategory`] across everything given. Reports the
/// point-cloud bucket first when both overflow.
pub fn check_multiplicity(kinds: impl IntoIterator<Item = FileKind>) -> Result<(), ValidationError> {
    let (mut clouds, mut geo) = (0usize, 0usize);
    for kind in kinds {
        match kind.category() {
            FileCategory::PointCloud => clouds += 1,
            FileCategory::GeoData => geo += 1,
        }
    }
    if clouds > 1 {
        return Err(ValidationError::MultiplicityViolation {
            category: FileCategory::PointCloud,
            count: clouds,
        });
    }
    if geo > 1 {
        return Err(ValidationError::MultiplicityViolation {
            category: FileCategory::GeoData,
            count: geo,
        });
    }
    Ok(())
}

/// Structurally valid content of one file.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedContent {
    PointCloud {
        points: PointSet,
        /// Present for `.pcd` sources.
        header: Option<PcdHeader>,
    },
    GeoData(FeatureCollection),
}

pub fn validate_content(
    kind: FileKind,
    bytes: &[u8],
    config: &IngestConfig,
) -> Result<ParsedContent, ValidationError> {
    match kind {
        FileKind::Xyz => {
            let text = std::str::from_utf8(bytes).map_err(|e| ValidationError::MalformedXyz {
                line: None,
                reason: format!("not valid UTF-8 text ({e})"),
            })?;
            Ok(ParsedContent::PointCloud {
                points: parse_xyz(text, config.min_xyz_points)?,
                header: None,
            })
        }
        FileKind::Pcd => {
            let (header, points) = parse_pcd(bytes)?;
            Ok(ParsedContent::PointCloud {
                points,
                header: Some(header),
            })
        }
        FileKind::GeoJson => {
            let text = std::str::from_utf8(bytes).map_err(|e| GeoJsonError::Json {
                reason: format!("not valid UTF-8 text ({e})"),
            })?;
            Ok(ParsedContent::GeoData(FeatureCollection::from_geojson_str(
                text,
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ParsedContent, check_duplicate, check_extension, check_multiplicity, check_size,
        validate_content,
    };
    use crate::config::IngestConfig;
    use crate::error::ValidationError;
    use crate::kind::{FileCategory, FileKind};
    use crate::upload::FileUpload;
    use std::collections::BTreeSet;

    #[test]
    fn extension_check() {
        let up = FileUpload::new("cloud.las", vec![1]);
        assert_eq!(
            check_extension(&up),
            Err(ValidationError::UnsupportedType {
                extension: "las".to_string()
            })
        );
        let up = FileUpload::new("sites.GeoJSON", vec![1]);
        assert_eq!(check_extension(&up), Ok(FileKind::GeoJson));
    }

    #[test]
    fn size_bounds_are_inclusive_at_the_limit() {
        assert_eq!(check_size(0, 10), Err(ValidationError::Empty));
        assert_eq!(check_size(10, 10), Ok(()));
        assert_eq!(
            check_size(11, 10),
            Err(ValidationError::TooLarge {
                size_bytes: 11,
                limit_bytes: 10
            })
        );
    }

    #[test]
    fn duplicate_check() {
        let seen: BTreeSet<String> = ["a.xyz".to_string()].into();
        assert_eq!(check_duplicate("a.xyz", &seen), Err(ValidationError::Duplicate));
        assert_eq!(check_duplicate("b.xyz", &seen), Ok(()));
    }

    #[test]
    fn multiplicity_counts_categories() {
        assert_eq!(
            check_multiplicity([FileKind::Xyz, FileKind::GeoJson]),
            Ok(())
        );
        assert_eq!(
            check_multiplicity([FileKind::Xyz, FileKind::Pcd]),
            Err(ValidationError::MultiplicityViolation {
                category: FileCategory::PointCloud,
                count: 2
            })
        );
        assert_eq!(
            check_multiplicity([FileKind::GeoJson, FileKind::Xyz, FileKind::GeoJson]),
            Err(ValidationError::MultiplicityViolation {
                category: FileCategory::GeoData,
                count: 2
            })
        );
    }

    #[test]
    fn content_dispatches_by_kind() {
        let config = IngestConfig::default();
        let parsed = validate_content(FileKind::Xyz, b"0 0 0\n1 1 1\n2 2 2\n", &config)
            .expect("xyz");
        assert!(matches!(
            parsed,
            ParsedContent::PointCloud { ref points, header: None } if points.count() == 3
        ));

        let err = validate_content(FileKind::GeoJson, b"[1, 2]", &config).expect_err("array root");
        assert!(matches!(err, ValidationError::InvalidGeoJson(_)));

        let err = validate_content(FileKind::Xyz, &[0xff, 0xfe, 0x00], &config).expect_err("binary");
        assert!(matches!(err, ValidationError::MalformedXyz { line: None, .. }));
    }
}
