use serde::{Deserialize, Serialize};

use ripple_diff::DiffConfig;

use crate::error::{ChangesetError, ChangesetResult};

/// Configuration for a [`ChangesetContainer`](crate::ChangesetContainer).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Capacity of per-subscriber broadcast channels.
    pub channel_capacity: usize,
    /// Snapshot diffing used by the `replace_with_diff` mutators.
    pub diff: DiffConfig,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
            diff: DiffConfig::default(),
        }
    }
}

impl ContainerConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> ChangesetResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| ChangesetError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no container can run with.
    pub fn validate(&self) -> ChangesetResult<()> {
        if self.channel_capacity == 0 {
            return Err(ChangesetError::Config("channel_capacity must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_diff::DiffAlgorithm;

    #[test]
    fn defaults() {
        let config = ContainerConfig::default();
        assert_eq!(config.channel_capacity, 1024);
        assert_eq!(config.diff, DiffConfig::default());
    }

    #[test]
    fn from_toml_with_nested_diff_table() {
        let config = ContainerConfig::from_toml_str(
            r#"
            channel_capacity = 16

            [diff]
            algorithm = "lcs"
            detect_moves = false
            "#,
        )
        .unwrap();
        assert_eq!(config.channel_capacity, 16);
        assert_eq!(config.diff.algorithm, DiffAlgorithm::Lcs);
        assert!(!config.diff.detect_moves);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(ContainerConfig::from_toml_str("").unwrap(), ContainerConfig::default());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            ContainerConfig::from_toml_str("channel_capacity = \"many\""),
            Err(ChangesetError::Config(_))
        ));
        assert!(matches!(
            ContainerConfig::from_toml_str("channel_capacity = 0"),
            Err(ChangesetError::Config(_))
        ));
    }

    #[test]
    fn validate_rejects_zero_capacity() {
        let config = ContainerConfig {
            channel_capacity: 0,
            ..ContainerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ChangesetError::Config(_))));
        assert!(ContainerConfig::default().validate().is_ok());
    }

    #[test]
    fn json_roundtrip() {
        let config = ContainerConfig {
            channel_capacity: 8,
            diff: DiffConfig::without_moves(),
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<ContainerConfig>(&json).unwrap(), config);
    }
}
