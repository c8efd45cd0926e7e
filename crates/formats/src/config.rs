use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const MIB: u64 = 1024 * 1024;
pub const DEFAULT_MAX_FILE_SIZE: u64 = 250 * MIB;
pub const DEFAULT_MIN_XYZ_POINTS: usize = 3;

/// Ingestion limits. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Inclusive upper bound on a single upload.
    pub max_file_size_bytes: u64,
    /// Minimum number of data rows for an `.xyz` file to be accepted.
    pub min_xyz_points: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE,
            min_xyz_points: DEFAULT_MIN_XYZ_POINTS,
        }
    }
}

impl IngestConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: IngestConfig = serde_json::from_str(payload)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_file_size_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_file_size_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_MAX_FILE_SIZE, IngestConfig, MIB};
    use crate::error::ConfigError;

    #[test]
    fn empty_object_uses_defaults() {
        let config = IngestConfig::from_json_str("{}").expect("parse config");
        assert_eq!(config, IngestConfig::default());
        assert_eq!(config.max_file_size_bytes, DEFAULT_MAX_FILE_SIZE);
    }

    #[test]
    fn overrides_single_field() {
        let config =
            IngestConfig::from_json_str(r#"{ "max_file_size_bytes": 1048576 }"#).expect("parse");
        assert_eq!(config.max_file_size_bytes, MIB);
        assert_eq!(config.min_xyz_points, 3);
    }

    #[test]
    fn rejects_zero_ceiling() {
        let err = IngestConfig::from_json_str(r#"{ "max_file_size_bytes": 0 }"#)
            .expect_err("zero ceiling");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
