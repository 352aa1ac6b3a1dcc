use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde_json::{Map, Value};
use tracing::warn;

use crate::{auth::dto::PublicUser, client::api::ClientError};

/// Key the logged-in user is stored under.
pub const USER_KEY: &str = "user";

/// File-backed key/value store holding the logged-in user between runs.
///
/// There is no token or expiry: whoever can read the file is "logged in".
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Map<String, Value> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "session file unreadable");
                return Map::new();
            }
        };
        match serde_json::from_str::<Map<String, Value>>(&raw) {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "session file corrupt; ignoring");
                Map::new()
            }
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<(), ClientError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(map)?)?;
        Ok(())
    }

    /// The saved user, or `None` when absent or unreadable.
    pub fn load(&self) -> Option<PublicUser> {
        let value = self.read_map().remove(USER_KEY)?;
        serde_json::from_value(value)
            .map_err(|e| warn!(error = %e, "stored user has unexpected shape"))
            .ok()
    }

    pub fn save(&self, user: &PublicUser) -> Result<(), ClientError> {
        let mut map = self.read_map();
        map.insert(USER_KEY.to_string(), serde_json::to_value(user)?);
        self.write_map(&map)
    }

    pub fn clear(&self) -> Result<(), ClientError> {
        let mut map = self.read_map();
        if map.remove(USER_KEY).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> PublicUser {
        PublicUser {
            id: 1,
            username: "admin".into(),
            email: "admin@bookstore.com".into(),
        }
    }

    #[test]
    fn save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));
        assert_eq!(store.load(), None);

        store.save(&admin()).unwrap();
        assert_eq!(store.load(), Some(admin()));

        store.clear().unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn other_keys_survive_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let store = SessionStore::new(&path);
        store.save(&admin()).unwrap();
        store.clear().unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({"theme": "dark"}));
    }

    #[test]
    fn corrupt_file_means_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{{{").unwrap();
        assert_eq!(SessionStore::new(&path).load(), None);
    }
}
