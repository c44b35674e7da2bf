//! Tool configuration: backend selection, credentials and search defaults.
//!
//! Defines the YAML-serializable configuration that tells the tool where
//! the product sheet lives, which credentials open it, and how searches and
//! derived names behave.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! backend:
//!   kind: sheet
//!   path: products.json
//! credentials:
//!   identity: search-engine@example.iam.gserviceaccount.com
//!   scopes:
//!     - https://spreadsheets.google.com/feeds
//!     - https://www.googleapis.com/auth/drive
//! search:
//!   field: Detailed Name
//!   threshold: 80
//!   case: sensitive
//! layout:
//!   brand: Marque
//!   product: Produit
//!   formulation: N-P-K | N-P2O5-K2O
//!   details: Details
//!   target: Detailed Name
//! ```

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use product_search_core::{DetailedNameLayout, MatchOptions};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StoreError};

/// Default table prefix for the SQLite backend.
pub const DEFAULT_SQLITE_PREFIX: &str = "ps_";

fn default_prefix() -> String {
    DEFAULT_SQLITE_PREFIX.to_string()
}

/// Where the product sheet is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// A JSON sheet file (`{"columns": [...], "rows": [[...]]}`).
    Sheet {
        /// Path to the sheet file.
        path: PathBuf,
    },
    /// A SQLite database.
    Sqlite {
        /// Path to the database file.
        path: PathBuf,
        /// Table prefix.
        #[serde(default = "default_prefix")]
        prefix: String,
    },
}

impl BackendConfig {
    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        match self {
            BackendConfig::Sheet { path } | BackendConfig::Sqlite { path, .. } => path,
        }
    }

    fn path_mut(&mut self) -> &mut PathBuf {
        match self {
            BackendConfig::Sheet { path } | BackendConfig::Sqlite { path, .. } => path,
        }
    }
}

/// Opaque credentials for the backing service.
///
/// Only `identity` and `scopes` are looked at; every other key is carried
/// through untouched so service-account files can be pasted in whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account identity (e.g., a service account email).
    pub identity: String,
    /// Access scopes requested for the session.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Uninterpreted credential material.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// An authorized session handed to a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Identity the session runs as.
    pub identity: String,
    /// Granted scopes.
    pub scopes: Vec<String>,
}

impl Credentials {
    /// Establishes a session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AuthenticationFailure`] if the identity is
    /// blank or no scope is requested. There is no retry.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::collections::BTreeMap;
    /// use product_search_store::Credentials;
    ///
    /// let creds = Credentials {
    ///     identity: "svc@example.iam".into(),
    ///     scopes: vec!["spreadsheets".into()],
    ///     extra: BTreeMap::new(),
    /// };
    /// assert_eq!(creds.authorize().unwrap().identity, "svc@example.iam");
    ///
    /// let anonymous = Credentials { identity: " ".into(), ..creds };
    /// assert!(anonymous.authorize().is_err());
    /// ```
    pub fn authorize(&self) -> Result<Session> {
        let identity = self.identity.trim();
        if identity.is_empty() {
            return Err(StoreError::AuthenticationFailure(
                "credentials carry no identity".to_string(),
            ));
        }
        if self.scopes.iter().all(|s| s.trim().is_empty()) {
            return Err(StoreError::AuthenticationFailure(format!(
                "no scopes requested for '{identity}'"
            )));
        }
        debug!(identity, scopes = self.scopes.len(), "session authorized");
        Ok(Session {
            identity: identity.to_string(),
            scopes: self.scopes.clone(),
        })
    }
}

/// Top-level tool configuration.
///
/// Loaded from a YAML file (typically `product-search.yml`).
///
/// # Examples
///
/// ```no_run
/// use product_search_store::StoreConfig;
///
/// let config = StoreConfig::load("product-search.yml").unwrap();
/// println!("searching '{}' at >= {}", config.search.field, config.search.threshold);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Backend location.
    pub backend: BackendConfig,
    /// Optional credentials; authorized before the store is opened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
    /// Search defaults.
    #[serde(default)]
    pub search: MatchOptions,
    /// Derived name columns.
    #[serde(default)]
    pub layout: DetailedNameLayout,
}

impl StoreConfig {
    /// Creates a configuration with default search and layout settings.
    pub fn new(backend: BackendConfig) -> Self {
        Self {
            version: "1.0".to_string(),
            backend,
            credentials: None,
            search: MatchOptions::default(),
            layout: DetailedNameLayout::default(),
        }
    }

    /// Loads configuration from a YAML file.
    ///
    /// A relative backend path is resolved against the directory holding
    /// the configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](StoreError::IoError) if the file cannot be read,
    /// [`YamlError`](StoreError::YamlError) if parsing fails, or
    /// [`InvalidConfig`](StoreError::InvalidConfig) if the search field is
    /// blank.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let mut config: Self = serde_yaml::from_reader(reader)?;
        if let Some(dir) = path.parent() {
            config.resolve_relative_to(dir);
        }
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Makes a relative backend path absolute against `base`.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        let path = self.backend.path_mut();
        if path.is_relative() {
            *path = base.join(&*path);
        }
    }

    /// Checks settings that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.search.field.trim().is_empty() {
            return Err(StoreError::InvalidConfig(
                "search field cannot be empty".to_string(),
            ));
        }
        if self.backend.path().as_os_str().is_empty() {
            return Err(StoreError::InvalidConfig(
                "backend path cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Authorizes the configured credentials, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AuthenticationFailure`] when credentials are
    /// present but unusable.
    pub fn session(&self) -> Result<Option<Session>> {
        self.credentials.as_ref().map(Credentials::authorize).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use product_search_core::CaseMode;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
backend:
  kind: sqlite
  path: /var/lib/products.db
  prefix: fert_
credentials:
  identity: svc@example.iam
  scopes: [spreadsheets, drive]
  private_key_id: abc123
search:
  field: Produit
  threshold: 90
  case: insensitive
layout:
  brand: Brand
"#
    }

    fn minimal_yaml() -> &'static str {
        r#"
version: "1.0"
backend:
  kind: sheet
  path: products.json
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: StoreConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(
            config.backend,
            BackendConfig::Sqlite {
                path: PathBuf::from("/var/lib/products.db"),
                prefix: "fert_".to_string(),
            }
        );
        assert_eq!(config.search.field, "Produit");
        assert_eq!(config.search.threshold, 90);
        assert_eq!(config.search.case, CaseMode::Insensitive);
        assert_eq!(config.layout.brand, "Brand");
        assert_eq!(config.layout.target, "Detailed Name");
    }

    #[test]
    fn test_deserialize_minimal_uses_defaults() {
        let config: StoreConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        assert!(config.credentials.is_none());
        assert_eq!(config.search, MatchOptions::default());
        assert_eq!(config.layout, DetailedNameLayout::default());
        assert!(config.session().unwrap().is_none());
    }

    #[test]
    fn test_sqlite_prefix_defaults() {
        let yaml = "version: \"1.0\"\nbackend: { kind: sqlite, path: x.db }\n";
        let config: StoreConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            config.backend,
            BackendConfig::Sqlite { ref prefix, .. } if prefix == DEFAULT_SQLITE_PREFIX
        ));
    }

    #[test]
    fn test_credentials_pass_through_unknown_keys() {
        let config: StoreConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        let creds = config.credentials.as_ref().unwrap();
        assert!(creds.extra.contains_key("private_key_id"));
        let session = config.session().unwrap().unwrap();
        assert_eq!(session.identity, "svc@example.iam");
        assert_eq!(session.scopes, vec!["spreadsheets", "drive"]);
    }

    #[test]
    fn test_credentials_without_scopes_fail() {
        let creds = Credentials {
            identity: "svc@example.iam".into(),
            scopes: vec![],
            extra: BTreeMap::new(),
        };
        assert!(matches!(
            creds.authorize(),
            Err(StoreError::AuthenticationFailure(_))
        ));
    }

    #[test]
    fn test_resolve_relative_path() {
        let mut config: StoreConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        config.resolve_relative_to(Path::new("/etc/products"));
        assert_eq!(
            config.backend.path(),
            Path::new("/etc/products/products.json")
        );

        let mut absolute: StoreConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        absolute.resolve_relative_to(Path::new("/elsewhere"));
        assert_eq!(absolute.backend.path(), Path::new("/var/lib/products.db"));
    }

    #[test]
    fn test_blank_search_field_rejected() {
        let mut config = StoreConfig::new(BackendConfig::Sheet {
            path: PathBuf::from("p.json"),
        });
        config.search.field = "  ".to_string();
        assert!(matches!(config.validate(), Err(StoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("product-search.yml");

        let original: StoreConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = StoreConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }
}
