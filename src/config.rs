//! Dataset layout and query limits.
//!
//! Every handler receives a [`QueryConfig`] explicitly; nothing here is
//! process-global.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::genomics::DEFAULT_MIN_CONFIDENT_SIZE;

/// Default cap on forward + reverse matches before a query is refused.
pub const DEFAULT_MAX_MATCHES: usize = 10_000;
/// Default cap on bases appended by a single path extension.
pub const DEFAULT_MAX_PATH_EXTENSION: usize = 10_000;

/// Errors raised while building or consulting the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Dataset id was not of the form `<group>-<name>`.
    #[error("invalid dataset id '{0}': expected <group>-<name>")]
    MalformedDatasetId(String),

    /// Dataset id referenced a group that is not configured.
    #[error("dataset group {index} out of range ({groups} configured)")]
    UnknownGroup {
        /// Requested group index.
        index: usize,
        /// Number of configured groups.
        groups: usize,
    },

    /// Group specification could not be parsed.
    #[error("invalid group specification '{0}': expected LABEL=DIR[:READLEN]")]
    MalformedGroup(String),

    /// Limits are out of range.
    #[error("invalid query configuration: {0}")]
    InvalidLimit(String),
}

/// Directory of datasets shown under one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetGroup {
    /// Label shown to users.
    pub label: String,
    /// Directory containing one sub-directory per dataset.
    pub directory: PathBuf,
    /// Read length (terminator included) shared by every dataset in the
    /// group, or `None` to derive it per dataset.
    pub uniform_length: Option<usize>,
}

impl DatasetGroup {
    /// Group without a uniform read length.
    pub fn new(label: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            directory: directory.into(),
            uniform_length: None,
        }
    }

    /// Declare the read length shared by the group; zero means "derive".
    pub fn with_uniform_length(mut self, length: usize) -> Self {
        self.uniform_length = (length > 0).then_some(length);
        self
    }
}

impl FromStr for DatasetGroup {
    type Err = ConfigError;

    /// Parse `LABEL=DIR` or `LABEL=DIR:READLEN`.
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let malformed = || ConfigError::MalformedGroup(spec.to_string());
        let (label, location) = spec.split_once('=').ok_or_else(malformed)?;
        if label.trim().is_empty() || location.trim().is_empty() {
            return Err(malformed());
        }

        let group = match location.rsplit_once(':') {
            Some((directory, length)) if !directory.is_empty() => match length.parse::<usize>() {
                Ok(length) => {
                    DatasetGroup::new(label.trim(), directory).with_uniform_length(length)
                }
                Err(_) => DatasetGroup::new(label.trim(), location),
            },
            _ => DatasetGroup::new(label.trim(), location),
        };
        Ok(group)
    }
}

/// Resolved location of a single dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLocation {
    /// Id as supplied by the caller (`<group>-<name>`).
    pub id: String,
    /// Label of the owning group.
    pub group_label: String,
    /// Dataset name within the group.
    pub name: String,
    /// Directory holding the dataset's index files.
    pub directory: PathBuf,
    /// Read length inherited from the group.
    pub uniform_length: Option<usize>,
}

/// Configuration passed to every query handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// Dataset groups, addressed by position.
    pub groups: Vec<DatasetGroup>,
    /// Queries matching more rows than this are refused.
    pub max_matches: usize,
    /// Groups with at least this many reads are reported individually.
    pub min_confident_size: usize,
    /// Upper bound on bases appended by path extension.
    pub max_path_extension: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            max_matches: DEFAULT_MAX_MATCHES,
            min_confident_size: DEFAULT_MIN_CONFIDENT_SIZE,
            max_path_extension: DEFAULT_MAX_PATH_EXTENSION,
        }
    }
}

impl QueryConfig {
    /// Configuration with default limits over the given groups.
    pub fn new(groups: Vec<DatasetGroup>) -> Self {
        Self {
            groups,
            ..Self::default()
        }
    }

    /// Append a dataset group.
    pub fn with_group(mut self, group: DatasetGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Set the match cap.
    pub fn with_max_matches(mut self, max_matches: usize) -> Self {
        self.max_matches = max_matches;
        self
    }

    /// Set the confident-group threshold.
    pub fn with_min_confident_size(mut self, min_confident_size: usize) -> Self {
        self.min_confident_size = min_confident_size;
        self
    }

    /// Set the path extension cap.
    pub fn with_max_path_extension(mut self, max_path_extension: usize) -> Self {
        self.max_path_extension = max_path_extension;
        self
    }

    /// Reject zero-valued limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_matches == 0 {
            return Err(ConfigError::InvalidLimit("max matches must be > 0".to_string()));
        }
        if self.min_confident_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "minimum confident group size must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve `<group>-<name>` into a dataset directory.
    pub fn resolve(&self, dataset_id: &str) -> Result<DatasetLocation, ConfigError> {
        let malformed = || ConfigError::MalformedDatasetId(dataset_id.to_string());
        let (group, name) = dataset_id.split_once('-').ok_or_else(malformed)?;
        let index: usize = group.parse().map_err(|_| malformed())?;
        if name.is_empty() {
            return Err(malformed());
        }
        let owner = self.groups.get(index).ok_or(ConfigError::UnknownGroup {
            index,
            groups: self.groups.len(),
        })?;

        Ok(DatasetLocation {
            id: dataset_id.to_string(),
            group_label: owner.label.clone(),
            name: name.to_string(),
            directory: owner.directory.join(name),
            uniform_length: owner.uniform_length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config() -> QueryConfig {
        QueryConfig::default()
            .with_group(DatasetGroup::new("Reads 20", "/data/samples20").with_uniform_length(21))
            .with_group(DatasetGroup::new("Mixed", "/data/mixed"))
    }

    #[test]
    fn defaults_follow_documented_limits() {
        let config = QueryConfig::default();
        assert_eq!(config.max_matches, 10_000);
        assert_eq!(config.min_confident_size, 5);
        assert!(config.validate().is_ok());
        assert!(config.with_max_matches(0).validate().is_err());
    }

    #[test]
    fn resolves_dataset_ids() {
        let location = config().resolve("0-mouse-liver").unwrap();
        assert_eq!(location.group_label, "Reads 20");
        assert_eq!(location.name, "mouse-liver");
        assert_eq!(location.directory, Path::new("/data/samples20/mouse-liver"));
        assert_eq!(location.uniform_length, Some(21));

        assert_eq!(config().resolve("1-x").unwrap().uniform_length, None);
    }

    #[test]
    fn rejects_bad_dataset_ids() {
        assert!(matches!(
            config().resolve("mouse"),
            Err(ConfigError::MalformedDatasetId(_))
        ));
        assert!(matches!(
            config().resolve("a-mouse"),
            Err(ConfigError::MalformedDatasetId(_))
        ));
        assert_eq!(
            config().resolve("5-mouse"),
            Err(ConfigError::UnknownGroup { index: 5, groups: 2 })
        );
    }

    #[test]
    fn parses_group_specs() {
        let group: DatasetGroup = "Reads 100=/data/s100:101".parse().unwrap();
        assert_eq!(group.label, "Reads 100");
        assert_eq!(group.directory, Path::new("/data/s100"));
        assert_eq!(group.uniform_length, Some(101));

        let group: DatasetGroup = "mixed=/data/mixed".parse().unwrap();
        assert_eq!(group.uniform_length, None);

        let group: DatasetGroup = "zero=/data/z:0".parse().unwrap();
        assert_eq!(group.uniform_length, None);

        assert!("no-directory".parse::<DatasetGroup>().is_err());
        assert!("=/data".parse::<DatasetGroup>().is_err());
    }
}
