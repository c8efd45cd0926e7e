use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rayon::prelude::*;
use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use foundation::bounds::{Aabb2, Aabb3};

use crate::config::IngestConfig;
use crate::error::ValidationError;
use crate::geojson::FeatureCollection;
use crate::kind::FileKind;
use crate::point_set::PointSet;
use crate::upload::{FileUpload, UploadedFile};
use crate::validate::{
    ParsedContent, check_duplicate, check_extension, check_multiplicity, check_size,
    validate_content,
};

/// What ingestion learned about one accepted file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileMetadata {
    pub kind: FileKind,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<Aabb3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_count: Option<usize>,
    /// Lon/lat extent of a GeoJSON file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_bounds: Option<Aabb2>,
    /// PCD header block, key to raw value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<BTreeMap<String, String>>,
}

/// A rejected file, or a rejected batch when `file` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportError {
    pub file: Option<String>,
    pub error: ValidationError,
}

impl ImportError {
    fn for_file(name: &str, error: ValidationError) -> Self {
        Self {
            file: Some(name.to_string()),
            error,
        }
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(name) => write!(f, "{name}: {}", self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

impl Serialize for ImportError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ImportError", 2)?;
        s.serialize_field("file", &self.file)?;
        s.serialize_field("message", &self.error.to_string())?;
        s.end()
    }
}

/// Outcome of one ingestion batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ImportResult {
    pub metadata_by_file: BTreeMap<String, FileMetadata>,
    /// In input order.
    pub accepted: Vec<UploadedFile>,
    #[serde(skip)]
    pub point_cloud: Option<PointSet>,
    #[serde(skip)]
    pub geo_data: Option<FeatureCollection>,
    pub errors: Vec<ImportError>,
}

impl ImportResult {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn accepted_names(&self) -> impl Iterator<Item = &str> {
        self.accepted.iter().map(|f| f.name.as_str())
    }
}

/// Runs one batch through validation and parsing.
///
/// `prior_accepted_names` are files accepted earlier in the session; they take
/// part in the duplicate and multiplicity checks (their kinds are derived
/// from their extensions). Structural parsing of the files that pass the
/// cheap checks runs in parallel and is joined before anything is accepted.
/// Multiplicity is then counted over the prior files and the structurally
/// valid ones, so a malformed file never blocks a valid one of its category;
/// a violation rejects the whole batch with a single error.
pub fn ingest(
    files: &[FileUpload],
    prior_accepted_names: &BTreeSet<String>,
    config: &IngestConfig,
) -> ImportResult {
    let mut result = ImportResult::default();
    let mut seen = prior_accepted_names.clone();
    let mut survivors: Vec<(&FileUpload, FileKind)> = Vec::with_capacity(files.len());

    for file in files {
        let checked = check_extension(file).and_then(|kind| {
            check_size(file.size_bytes, config.max_file_size_bytes)?;
            check_duplicate(&file.name, &seen)?;
            Ok(kind)
        });
        match checked {
            Ok(kind) => {
                seen.insert(file.name.clone());
                survivors.push((file, kind));
            }
            Err(err) => {
                if err == ValidationError::Duplicate {
                    seen.insert(file.name.clone());
                }
                tracing::warn!(file = %file.name, error = %err, "file rejected");
                result.errors.push(ImportError::for_file(&file.name, err));
            }
        }
    }

    let parsed: Vec<Result<ParsedContent, ValidationError>> = survivors
        .par_iter()
        .map(|(file, kind)| validate_content(*kind, &file.content, config))
        .collect();

    let prior_kinds = prior_accepted_names
        .iter()
        .filter_map(|name| FileKind::from_file_name(name));
    let valid_kinds = survivors
        .iter()
        .zip(&parsed)
        .filter(|(_, outcome)| outcome.is_ok())
        .map(|((_, kind), _)| *kind);
    if let Err(err) = check_multiplicity(prior_kinds.chain(valid_kinds)) {
        tracing::warn!(error = %err, files = files.len(), "batch rejected");
        return ImportResult {
            errors: vec![ImportError { file: None, error: err }],
            ..ImportResult::default()
        };
    }

    for ((file, kind), outcome) in survivors.into_iter().zip(parsed) {
        match outcome {
            Ok(content) => {
                let metadata = accept(&mut result, file, kind, content);
                tracing::info!(
                    file = %file.name,
                    kind = %kind,
                    points = ?metadata.point_count,
                    features = ?metadata.feature_count,
                    "file accepted"
                );
                result.metadata_by_file.insert(file.name.clone(), metadata);
            }
            Err(err) => {
                tracing::warn!(file = %file.name, error = %err, "file rejected");
                result.errors.push(ImportError::for_file(&file.name, err));
            }
        }
    }

    tracing::info!(
        accepted = result.accepted.len(),
        errors = result.errors.len(),
        "ingestion batch done"
    );
    result
}

fn accept(
    result: &mut ImportResult,
    file: &FileUpload,
    kind: FileKind,
    content: ParsedContent,
) -> FileMetadata {
    result.accepted.push(UploadedFile {
        name: file.name.clone(),
        size_bytes: file.size_bytes,
        kind,
    });
    let mut metadata = FileMetadata {
        kind,
        size_bytes: file.size_bytes,
        point_count: None,
        bounding_box: None,
        feature_count: None,
        geo_bounds: None,
        header: None,
    };
    match content {
        ParsedContent::PointCloud { points, header } => {
            metadata.point_count = Some(points.count());
            metadata.bounding_box = points.bounding_box();
            metadata.header = header.map(|h| h.entries);
            result.point_cloud = Some(points);
        }
        ParsedContent::GeoData(collection) => {
            metadata.feature_count = Some(collection.len());
            metadata.geo_bounds = collection.bounds();
            result.geo_data = Some(collection);
        }
    }
    metadata
}

/// Session-scoped ingestion: remembers what has been accepted so later
/// batches are checked against it.
#[derive(Debug, Clone, Default)]
pub struct Ingestor {
    config: IngestConfig,
    accepted: BTreeSet<String>,
}

impl Ingestor {
    pub fn new(config: IngestConfig) -> Self {
        Self {
            config,
            accepted: BTreeSet::new(),
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn accepted_names(&self) -> &BTreeSet<String> {
        &self.accepted
    }

    pub fn ingest(&mut self, files: &[FileUpload]) -> ImportResult {
        let result = ingest(files, &self.accepted, &self.config);
        self.accepted
            .extend(result.accepted.iter().map(|f| f.name.clone()));
        result
    }

    /// Forgets every accepted file, e.g. when the session's data is cleared.
    pub fn clear(&mut self) {
        self.accepted.clear();
    }
}
