/// Durable user settings
///
/// A flat string key/value store behind a small trait so the application
/// shell never touches the filesystem directly and tests can substitute an
/// in-memory store. The only key today is the theme preference.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Key holding the theme preference, serialized as "true"/"false"
pub const DARK_MODE_KEY: &str = "dark_mode";

/// Get/set string values by key; writes are durable per implementation
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// Resolve the startup theme: stored preference first, OS preference after
pub fn initial_dark_mode(store: &dyn SettingsStore) -> bool {
    match store.get(DARK_MODE_KEY).as_deref() {
        Some("true") => true,
        Some("false") => false,
        _ => system_prefers_dark(),
    }
}

/// Persist a theme change
pub fn persist_dark_mode(store: &mut dyn SettingsStore, dark_mode: bool) {
    store.set(DARK_MODE_KEY, if dark_mode { "true" } else { "false" });
}

/// OS-level dark/light detection; dark when the OS won't say
fn system_prefers_dark() -> bool {
    match dark_light::detect() {
        Ok(dark_light::Mode::Light) => false,
        Ok(dark_light::Mode::Dark | dark_light::Mode::Unspecified) | Err(_) => true,
    }
}

/// JSON-file-backed settings under the user config directory
///
/// Every `set` writes the file through immediately, so a crash never loses
/// a toggle. Read/write failures are logged and degrade to defaults.
pub struct FileSettings {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileSettings {
    /// Load the default per-user settings file
    pub fn load_default() -> Self {
        Self::load(Self::default_path())
    }

    /// Load settings from an explicit path, starting empty if absent
    pub fn load(path: PathBuf) -> Self {
        let values = fs::read_to_string(&path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default();

        Self { path, values }
    }

    /// Settings live next to the other per-user app data:
    /// - Linux: ~/.config/image-to-music/settings.json
    /// - macOS: ~/Library/Application Support/image-to-music/settings.json
    /// - Windows: %APPDATA%\image-to-music\settings.json
    fn default_path() -> PathBuf {
        let mut path = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        path.push("image-to-music");
        path.push("settings.json");
        path
    }

    fn write_through(&self) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), error = %err, "Could not create settings directory");
                return;
            }
        }

        match serde_json::to_string_pretty(&self.values) {
            Ok(contents) => {
                if let Err(err) = fs::write(&self.path, contents) {
                    tracing::warn!(path = %self.path.display(), error = %err, "Could not write settings");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "Could not serialize settings");
            }
        }
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        self.write_through();
    }
}

impl std::fmt::Debug for FileSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSettings")
            .field("path", &self.path)
            .finish()
    }
}

/// In-memory store for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: HashMap<String, String>,
}

#[cfg(test)]
impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}
