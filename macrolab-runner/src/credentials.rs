//! Credentials file loading.
//!
//! The file is JSON with at least a `fred_api_key` field; unknown fields are
//! ignored so the same file can carry keys for other tools.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("cannot read credentials file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid credentials file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("credentials file {path} has an empty fred_api_key")]
    EmptyKey { path: PathBuf },
}

#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub fred_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("fred_api_key", &"<redacted>").finish()
    }
}

impl Credentials {
    pub fn from_file(path: &Path) -> Result<Self, CredentialsError> {
        let content = std::fs::read_to_string(path).map_err(|source| CredentialsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let creds: Credentials = serde_json::from_str(&content).map_err(|source| CredentialsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if creds.fred_api_key.trim().is_empty() {
            return Err(CredentialsError::EmptyKey {
                path: path.to_path_buf(),
            });
        }
        Ok(creds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn reads_key_and_ignores_extra_fields() {
        let f = write_temp(r#"{"fred_api_key": "abc123", "other": 1}"#);
        let creds = Credentials::from_file(f.path()).unwrap();
        assert_eq!(creds.fred_api_key, "abc123");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Credentials::from_file(&dir.path().join("config.json")).unwrap_err();
        assert!(matches!(err, CredentialsError::Io { .. }));
    }

    #[test]
    fn missing_field_is_parse_error() {
        let f = write_temp(r#"{"api_key": "abc"}"#);
        assert!(matches!(
            Credentials::from_file(f.path()).unwrap_err(),
            CredentialsError::Parse { .. }
        ));
    }

    #[test]
    fn parse_error_message_leaves_cause_to_source() {
        let f = write_temp(r#"{"api_key": "abc"}"#);
        let err = Credentials::from_file(f.path()).unwrap_err();
        assert!(!err.to_string().contains("missing field"));

        let chain = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(chain.matches("missing field").count(), 1);
    }

    #[test]
    fn blank_key_rejected() {
        let f = write_temp(r#"{"fred_api_key": "  "}"#);
        assert!(matches!(
            Credentials::from_file(f.path()).unwrap_err(),
            CredentialsError::EmptyKey { .. }
        ));
    }

    #[test]
    fn debug_output_hides_key() {
        let creds = Credentials {
            fred_api_key: "secret".into(),
        };
        assert!(!format!("{creds:?}").contains("secret"));
    }
}
