//! Dark/light preference persisted in a key-value store.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub const DARK_MODE_KEY: &str = "darkMode";

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("preference file {path}: {source}")]
    Io { path: PathBuf, #[source] source: io::Error },
    #[error("preference file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key-value storage, the native counterpart of browser `localStorage`.
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryPreferences(HashMap<String, String>);

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> { self.0.get(key).cloned() }
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.0.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences kept in a flat JSON object on disk, rewritten on every set.
#[derive(Debug)]
pub struct JsonFilePreferences {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl JsonFilePreferences {
    /// A missing file starts empty; an unreadable or corrupt one is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PreferenceError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(source) => return Err(PreferenceError::Io { path, source }),
        };
        Ok(Self { path, values })
    }
}

impl PreferenceStore for JsonFilePreferences {
    fn get(&self, key: &str) -> Option<String> { self.values.get(key).cloned() }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        let text = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, text).map_err(|source| PreferenceError::Io { path: self.path.clone(), source })
    }
}

/// Theme preference. Read once on load, written on every change.
pub struct Theme {
    dark: bool,
    store: Box<dyn PreferenceStore>,
}

impl Theme {
    pub fn load(store: Box<dyn PreferenceStore>) -> Self {
        let dark = store.get(DARK_MODE_KEY).as_deref() == Some("true");
        Self { dark, store }
    }

    pub fn is_dark(&self) -> bool { self.dark }

    pub fn toggle(&mut self) -> bool {
        self.set_dark(!self.dark);
        self.dark
    }

    /// The in-memory value wins when persisting fails.
    pub fn set_dark(&mut self, dark: bool) {
        self.dark = dark;
        if let Err(e) = self.store.set(DARK_MODE_KEY, if dark { "true" } else { "false" }) {
            tracing::warn!(error = %e, "could not persist theme preference");
        }
    }
}

impl std::fmt::Debug for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Theme").field("dark", &self.dark).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_light() {
        let theme = Theme::load(Box::<MemoryPreferences>::default());
        assert!(!theme.is_dark());

        let mut prefs = MemoryPreferences::default();
        prefs.set(DARK_MODE_KEY, "yes").unwrap();
        assert!(!Theme::load(Box::new(prefs)).is_dark());
    }

    #[test]
    fn test_toggle_persists() {
        let path = std::env::temp_dir().join(format!("storefront-theme-{}.json", uuid::Uuid::new_v4()));
        let mut theme = Theme::load(Box::new(JsonFilePreferences::open(&path).unwrap()));
        assert!(theme.toggle());

        let reopened = JsonFilePreferences::open(&path).unwrap();
        assert_eq!(reopened.get(DARK_MODE_KEY).as_deref(), Some("true"));
        assert!(Theme::load(Box::new(reopened)).is_dark());

        assert!(!theme.toggle());
        assert_eq!(JsonFilePreferences::open(&path).unwrap().get(DARK_MODE_KEY).as_deref(), Some("false"));
        let _ = fs::remove_file(&path);
    }

    struct ReadOnly;
    impl PreferenceStore for ReadOnly {
        fn get(&self, _: &str) -> Option<String> { Some("true".into()) }
        fn set(&mut self, _: &str, _: &str) -> Result<(), PreferenceError> {
            Err(PreferenceError::Io { path: "/readonly".into(), source: io::Error::from(io::ErrorKind::PermissionDenied) })
        }
    }

    #[test]
    fn test_write_failure_keeps_value() {
        let mut theme = Theme::load(Box::new(ReadOnly));
        assert!(theme.is_dark());
        assert!(!theme.toggle());
        assert!(!theme.is_dark());
    }
}
