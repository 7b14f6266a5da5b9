//! Route table persistence.
//!
//! Only route templates are written; compiled patterns are rebuilt on load.
//! The file is replaced by writing a sibling `.tmp` file and renaming it.
//!
//! A single process is expected to own the file. Two gateways sharing one
//! path will overwrite each other's registrations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::routing::table::Route;

const FORMAT_VERSION: u32 = 1;

/// Routes as persisted: method -> routes in registration order.
pub type StoredRoutes = BTreeMap<String, Vec<Route>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt routes file {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode routes: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("routes file {} has unsupported version {version}", path.display())]
    UnsupportedVersion { path: PathBuf, version: u32 },
}

#[derive(Debug, Serialize, Deserialize)]
struct RoutesDocument {
    version: u32,
    routes: StoredRoutes,
}

/// JSON file holding the registered route templates.
#[derive(Debug, Clone)]
pub struct RouteStore {
    path: PathBuf,
}

impl RouteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored routes. Returns `Ok(None)` when no file exists yet.
    pub fn load(&self) -> Result<Option<StoredRoutes>, StoreError> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io_error(source)),
        };

        let document: RoutesDocument =
            serde_json::from_slice(&content).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        if document.version != FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                path: self.path.clone(),
                version: document.version,
            });
        }

        Ok(Some(document.routes))
    }

    /// Overwrite the file with the given routes.
    pub fn save(&self, routes: StoredRoutes) -> Result<(), StoreError> {
        let document = RoutesDocument {
            version: FORMAT_VERSION,
            routes,
        };
        let content = serde_json::to_vec_pretty(&document).map_err(StoreError::Encode)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let tmp = self.tmp_path();
        fs::write(&tmp, content).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = RouteStore::new(dir.path().join("routes.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_keeps_templates_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = RouteStore::new(dir.path().join("nested").join("routes.json"));

        let mut routes = StoredRoutes::new();
        routes.insert(
            "GET".into(),
            vec![
                Route::new("foo.asyncyapp.com", "/:from/*/:id", "story-1"),
                Route::new("foo.asyncyapp.com", "/héllo/(x)~", "story-2"),
            ],
        );
        store.save(routes.clone()).unwrap();

        assert_eq!(store.load().unwrap(), Some(routes));
        assert!(!store.tmp_path().exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.json");
        fs::write(&path, b"not json").unwrap();

        let err = RouteStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.json");
        fs::write(&path, br#"{"version": 99, "routes": {}}"#).unwrap();

        let err = RouteStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedVersion { version: 99, .. }));
    }
}
