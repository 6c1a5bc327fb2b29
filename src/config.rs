//! Document info overrides, from a JSON config file and the command line.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Caller-supplied values for the document `info` block.
///
/// `None` means "not set" and falls back to the package doclet; `Some("")`
/// is a deliberate empty value and is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Overrides {
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub license: Option<String>,
}

impl Overrides {
    /// Read overrides from a JSON file such as `{"name": "api", "license": "MIT"}`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid config: {}", path.display()))
    }

    /// Layer `other` on top of `self`, field by field.
    pub fn merged_with(self, other: Overrides) -> Overrides {
        Overrides {
            name: other.name.or(self.name),
            description: other.description.or(self.description),
            version: other.version.or(self.version),
            license: other.license.or(self.license),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"name":"api","license":""}"#).unwrap();
        let overrides = Overrides::load(file.path()).unwrap();
        assert_eq!(overrides.name.as_deref(), Some("api"));
        assert_eq!(overrides.license.as_deref(), Some(""));
        assert_eq!(overrides.version, None);
    }

    #[test]
    fn load_rejects_unknown_keys() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"nmae":"api"}"#).unwrap();
        let err = Overrides::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("invalid config"));
    }

    #[test]
    fn later_layer_wins_per_field() {
        let file = Overrides {
            name: Some("file".to_string()),
            version: Some("1.0".to_string()),
            ..Default::default()
        };
        let cli = Overrides {
            name: Some("cli".to_string()),
            ..Default::default()
        };
        let merged = file.merged_with(cli);
        assert_eq!(merged.name.as_deref(), Some("cli"));
        assert_eq!(merged.version.as_deref(), Some("1.0"));
    }
}
