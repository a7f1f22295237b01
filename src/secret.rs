//! Kubernetes `Secret` objects for the create workflow
//!
//! Only the subset of the object model the workflow emits is modelled. Data
//! values are base64-encoded, as the Kubernetes API expects for `data`.

use std::collections::BTreeMap;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use serde::Serialize;

use crate::error::{Error, Result};

const ANNOTATION_PUBLIC_KEY: &str = "public-key";
const ANNOTATION_SHOULD_ENCRYPT: &str = "should-encrypt";
const ANNOTATION_IS_SECRET_KEY: &str = "is-secret-key";
const SECRET_DATA_KEY: &str = "secret";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    pub creation_timestamp: Option<String>,
    pub annotations: BTreeMap<String, String>,
}

/// A `v1/Secret` of type `Opaque`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Secret {
    pub api_version: String,
    pub data: BTreeMap<String, String>,
    pub kind: String,
    pub metadata: ObjectMeta,
    #[serde(rename = "type")]
    pub secret_type: String,
}

impl Secret {
    fn opaque(name: &str, annotations: BTreeMap<String, String>) -> Self {
        Self {
            api_version: "v1".to_string(),
            data: BTreeMap::new(),
            kind: "Secret".to_string(),
            metadata: ObjectMeta {
                name: name.to_string(),
                creation_timestamp: None,
                annotations,
            },
            secret_type: "Opaque".to_string(),
        }
    }

    /// The application secret: env values to encrypt plus the public key
    #[must_use]
    pub fn primary<'a>(
        name: &str,
        public_key: &[u8],
        env: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let annotations = BTreeMap::from([
            (ANNOTATION_PUBLIC_KEY.to_string(), B64.encode(public_key)),
            (ANNOTATION_SHOULD_ENCRYPT.to_string(), "true".to_string()),
        ]);
        let mut secret = Self::opaque(name, annotations);
        for (key, value) in env {
            secret.insert_data(key, value.as_bytes());
        }
        secret
    }

    /// The secret carrying one private key share for a custodian
    #[must_use]
    pub fn private_key(name: &str, key: &[u8]) -> Self {
        let annotations = BTreeMap::from([
            (ANNOTATION_SHOULD_ENCRYPT.to_string(), "false".to_string()),
            (ANNOTATION_IS_SECRET_KEY.to_string(), "true".to_string()),
        ]);
        let mut secret = Self::opaque(name, annotations);
        secret.insert_data(SECRET_DATA_KEY, key);
        secret
    }

    pub fn insert_data(&mut self, key: &str, value: &[u8]) {
        self.data.insert(key.to_string(), B64.encode(value));
    }

    /// File name of the rendered object
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.secret.yaml", self.metadata.name)
    }

    /// Renders the object as YAML
    ///
    /// # Errors
    /// Returns [`Error::Render`] if serialization fails
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Longest object name Kubernetes accepts (DNS-1123 subdomain)
const MAX_NAME_LEN: usize = 253;

/// Longest dot-separated label inside a name
const MAX_LABEL_LEN: usize = 63;

/// Checks that `name` is a DNS-1123 subdomain
///
/// Names become both the object name and a file stem, so anything with path
/// separators, uppercase letters or leading dots is refused.
///
/// # Errors
/// Returns a validation error describing the first violated rule
///
/// # Examples
///
/// ```rust
/// use keyquorum::secret::validate_name;
///
/// assert!(validate_name("billing").is_ok());
/// assert!(validate_name("billing.prod-eu").is_ok());
/// assert!(validate_name("../billing").is_err());
/// assert!(validate_name("Billing").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(Error::validation(format!(
            "secret name must be 1 to {MAX_NAME_LEN} characters, got {}",
            name.len()
        )));
    }

    for label in name.split('.') {
        let valid = !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && label
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
            && !label.starts_with('-')
            && !label.ends_with('-');
        if !valid {
            return Err(Error::validation(format!(
                "invalid secret name '{name}': use lowercase letters, digits, '-' and '.', \
                 starting and ending with a letter or digit"
            )));
        }
    }
    Ok(())
}

/// Reads a `KEY=value` env file into ordered pairs
///
/// # Errors
/// Returns [`Error::NotFound`] if the file is missing, or [`Error::InvalidInput`]
/// if a line cannot be parsed
pub fn load_env_file(path: &Path) -> Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    let iter = dotenvy::from_path_iter(path).map_err(|e| env_error(path, e))?;
    let mut env = BTreeMap::new();
    for item in iter {
        let (key, value) = item.map_err(|e| env_error(path, e))?;
        env.insert(key, value);
    }
    Ok(env)
}

fn env_error(path: &Path, err: dotenvy::Error) -> Error {
    match err {
        dotenvy::Error::Io(source) => Error::io(path, source),
        other => Error::InvalidInput(format!("{}: {other}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_primary_secret_yaml() {
        let secret = Secret::primary(
            "app",
            &[1, 2, 3],
            [("DB_PASSWORD", "hunter2"), ("API_TOKEN", "abc")],
        );
        let yaml = secret.to_yaml().unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(value["apiVersion"].as_str(), Some("v1"));
        assert_eq!(value["kind"].as_str(), Some("Secret"));
        assert_eq!(value["type"].as_str(), Some("Opaque"));
        assert_eq!(value["metadata"]["name"].as_str(), Some("app"));
        assert!(value["metadata"]["creationTimestamp"].is_null());

        let annotations = &value["metadata"]["annotations"];
        assert_eq!(annotations["public-key"].as_str(), Some("AQID"));
        assert_eq!(annotations["should-encrypt"].as_str(), Some("true"));

        assert_eq!(value["data"]["DB_PASSWORD"].as_str(), Some("aHVudGVyMg=="));
        assert_eq!(value["data"]["API_TOKEN"].as_str(), Some("YWJj"));
        assert_eq!(secret.file_name(), "app.secret.yaml");
    }

    #[test]
    fn test_private_key_secret() {
        let secret = Secret::private_key("app-private-0", &[0xFF, 0x00]);
        assert_eq!(secret.data.get("secret").map(String::as_str), Some("/wA="));
        assert_eq!(
            secret.metadata.annotations.get("is-secret-key").map(String::as_str),
            Some("true")
        );
        assert_eq!(
            secret.metadata.annotations.get("should-encrypt").map(String::as_str),
            Some("false")
        );
        assert_eq!(secret.file_name(), "app-private-0.secret.yaml");
    }

    #[test]
    fn test_validate_name() {
        for name in ["app", "app-1", "a.b.c", "0db"] {
            assert!(validate_name(name).is_ok(), "{name} should be accepted");
        }
        let too_long = "a".repeat(254);
        let long_label = "a".repeat(64);
        for name in [
            "",
            "../x",
            "a/b",
            "a\\b",
            "App",
            "-app",
            "app-",
            ".app",
            "a..b",
            "a_b",
            too_long.as_str(),
            long_label.as_str(),
        ] {
            let err = validate_name(name).unwrap_err();
            assert!(err.is_validation(), "{name} should be rejected");
        }
    }

    #[test]
    fn test_load_env_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "# comment\nUSER=admin\nPASSWORD=\"s3cr=t\"\n").unwrap();

        let env = load_env_file(&path).unwrap();
        assert_eq!(env.len(), 2);
        assert_eq!(env["USER"], "admin");
        assert_eq!(env["PASSWORD"], "s3cr=t");
    }

    #[test]
    fn test_load_env_file_missing() {
        let result = load_env_file(Path::new("/nonexistent/.env"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_load_env_file_malformed_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "NOT A PAIR\n").unwrap();

        assert!(matches!(load_env_file(&path), Err(Error::InvalidInput(_))));
    }
}
