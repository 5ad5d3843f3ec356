//! User settings shared by the clipper front end and the native host.
//!
//! Settings live in one JSON file, `~/.config/logseq-clipper/config.json`.
//! Keys are camelCase so the file can be edited by hand or written by the
//! browser side through the native host's `setConfig` action.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::logseq::OutputFormat;
use crate::patterns::ENV_VAR;

/// Most recent page names kept in [`Settings::recent_pages`].
pub const MAX_RECENT_PAGES: usize = 20;

/// Where a clip goes by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultDestination {
    /// Today's journal page.
    #[default]
    Journal,
    /// A named page.
    Page,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Persisted settings. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Root folder of the Logseq graph; may start with `~` or contain `$VAR`.
    ///
    /// Default: `~/Documents/logseq`
    pub graph_path: String,

    /// Journal filename pattern using `yyyy`, `MM` and `dd`.
    ///
    /// Default: `yyyy-MM-dd`
    pub journal_format: String,

    pub theme: Theme,

    /// Default: [`OutputFormat::Markdown`]
    pub default_format: OutputFormat,

    pub default_destination: DefaultDestination,

    /// Custom templates by key.
    pub templates: BTreeMap<String, String>,

    /// Recently used page names, newest first.
    pub recent_pages: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            graph_path: "~/Documents/logseq".to_string(),
            journal_format: "yyyy-MM-dd".to_string(),
            theme: Theme::Light,
            default_format: OutputFormat::Markdown,
            default_destination: DefaultDestination::Journal,
            templates: BTreeMap::new(),
            recent_pages: Vec::new(),
        }
    }
}

impl Settings {
    /// Move `page` to the front of the recent list.
    pub fn add_recent_page(&mut self, page: &str) {
        self.recent_pages.retain(|p| p != page);
        self.recent_pages.insert(0, page.to_string());
        self.recent_pages.truncate(MAX_RECENT_PAGES);
    }

    /// [`Self::graph_path`] with `~` and environment variables expanded.
    #[must_use]
    pub fn resolved_graph_path(&self) -> PathBuf {
        expand_path(&self.graph_path)
    }
}

/// Expand `$VAR`, `${VAR}` and a leading `~`.
///
/// Unset variables are left as written.
#[must_use]
pub fn expand_path(path: &str) -> PathBuf {
    let expanded = ENV_VAR.replace_all(path, |caps: &regex::Captures<'_>| {
        let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
    });

    let home = dirs::home_dir();
    match (&*expanded, home) {
        ("~", Some(home)) => home,
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}

/// Reads and writes the settings file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at an explicit path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.config/logseq-clipper/config.json`, or in the working
    /// directory when no home directory is known.
    #[must_use]
    pub fn default_location() -> Self {
        let base = dirs::home_dir().map(|h| h.join(".config")).unwrap_or_default();
        Self::new(base.join("logseq-clipper").join("config.json"))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current settings; defaults when the file does not exist yet.
    ///
    /// # Errors
    ///
    /// I/O errors other than a missing file, and malformed JSON.
    pub fn load(&self) -> Result<Settings> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write all settings, replacing the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        let value = serde_json::to_value(settings)?;
        self.write_raw(&value)
    }

    /// Set a single key, keeping every other key in the file (including ones
    /// this version does not know about).
    ///
    /// # Errors
    ///
    /// Returns an error if the existing file is not a JSON object or cannot
    /// be read or written.
    pub fn set_key(&self, key: &str, value: Value) -> Result<()> {
        let mut object = match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str::<Map<String, Value>>(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };
        object.insert(key.to_string(), value);
        tracing::debug!(key, path = %self.path.display(), "setting updated");
        self.write_raw(&Value::Object(object))
    }

    fn write_raw(&self, value: &Value) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(value)?)?;
        Ok(())
    }
}
