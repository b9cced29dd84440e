//! Configuration loading
//!
//! The wiki endpoint and schema locations come from a small YAML config
//! file. Credentials are read from the environment so they stay out of
//! the config file.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Environment variable holding the wiki user
pub const USER_VAR: &str = "SCHEMAWIKI_USER";

/// Environment variable holding the wiki password
pub const PSWD_VAR: &str = "SCHEMAWIKI_PSWD";

/// Wiki publisher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    /// Base URL of the wiki
    pub wiki_url: String,
    /// Namespace listed when no other is given
    pub default_namespace: String,
    /// Location of the working draft schema
    pub working_draft: String,
    /// Folder schema dumps are read from
    pub schema_folder: PathBuf,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            wiki_url: "https://wiki.example.org".to_string(),
            default_namespace: "schema".to_string(),
            working_draft: String::new(),
            schema_folder: PathBuf::from("schemas"),
        }
    }
}

impl WikiConfig {
    /// Load the configuration from a YAML file.
    ///
    /// The wiki URL is validated before the config is returned.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: WikiConfig = serde_yaml::from_str(&text).map_err(|e| {
            Error::Config(format!("invalid config '{}': {}", path.display(), e))
        })?;
        Url::parse(&config.wiki_url)?;
        Ok(config)
    }

    /// Wiki credentials from the environment.
    pub fn credentials() -> Result<(String, String)> {
        let user = env::var(USER_VAR)
            .map_err(|_| Error::Config(format!("{} is not set", USER_VAR)))?;
        let pswd = env::var(PSWD_VAR)
            .map_err(|_| Error::Config(format!("{} is not set", PSWD_VAR)))?;
        Ok((user, pswd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = WikiConfig::default();
        assert_eq!(config.default_namespace, "schema");
        assert_eq!(config.schema_folder, PathBuf::from("schemas"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        write!(
            file,
            "wiki_url: https://wiki.3docx.org\ndefault_namespace: ocx\nschema_folder: dumps\n"
        )
        .unwrap();
        let config = WikiConfig::from_file(file.path()).unwrap();
        assert_eq!(config.wiki_url, "https://wiki.3docx.org");
        assert_eq!(config.default_namespace, "ocx");
        assert_eq!(config.schema_folder, PathBuf::from("dumps"));
        // Unset keys fall back to defaults
        assert_eq!(config.working_draft, "");
    }

    #[test]
    fn test_from_file_rejects_invalid_url() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        write!(file, "wiki_url: not a url\n").unwrap();
        assert!(WikiConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = WikiConfig::from_file(Path::new("no/such/config.yaml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
