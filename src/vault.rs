//! Persistence destinations for formatted clips.
//!
//! A clip is addressed by a [`SaveTarget`]: the graph subfolder, the file
//! name, and whether the clip goes before or after what the file already
//! holds. [`GraphFolder`] writes into a Logseq graph on disk; [`DeepLink`]
//! hands the clip to a running Logseq app through its URL scheme instead.

use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::logseq;

pub const JOURNALS_FOLDER: &str = "journals";
pub const PAGES_FOLDER: &str = "pages";

/// Where new content goes relative to a file's existing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Append,
    Prepend,
}

impl Position {
    /// Combine new content with a file's existing content, one newline apart.
    #[must_use]
    pub fn combine(self, existing: &str, content: &str) -> String {
        if existing.is_empty() {
            return content.to_string();
        }
        match self {
            Self::Append => format!("{existing}\n{content}"),
            Self::Prepend => format!("{content}\n{existing}"),
        }
    }
}

/// Folder, file and position of a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveTarget {
    pub folder: String,
    pub filename: String,
    #[serde(default)]
    pub position: Position,
}

impl SaveTarget {
    /// The journal page for `date`, named with `journal_format`.
    #[must_use]
    pub fn journal(date: NaiveDate, journal_format: &str, position: Position) -> Self {
        Self {
            folder: JOURNALS_FOLDER.to_string(),
            filename: logseq::journal_filename(date, journal_format),
            position,
        }
    }

    /// The page file for `page`.
    #[must_use]
    pub fn page(page: &str, position: Position) -> Self {
        Self {
            folder: PAGES_FOLDER.to_string(),
            filename: logseq::page_filename(page),
            position,
        }
    }

    /// `folder/filename`, rejecting anything that would leave the graph.
    fn relative_path(&self) -> Result<PathBuf> {
        let relative = Path::new(&self.folder).join(&self.filename);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || self.filename.is_empty() {
            return Err(Error::Vault(format!("invalid target {}", relative.display())));
        }
        Ok(relative)
    }
}

/// Outcome of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveReceipt {
    /// Content was written to this file.
    Written(PathBuf),
    /// Content was encoded into this URL for the app to open.
    Link(String),
}

/// Something that accepts formatted clip text.
pub trait Destination {
    /// Store `content` at `target`.
    ///
    /// # Errors
    ///
    /// Returns an error when the destination cannot accept the content.
    fn save(&self, target: &SaveTarget, content: &str) -> Result<SaveReceipt>;
}

/// A Logseq graph folder on the local filesystem.
#[derive(Debug, Clone)]
pub struct GraphFolder {
    root: PathBuf,
}

impl GraphFolder {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A graph folder has a `journals` or a `pages` subfolder.
    ///
    /// # Errors
    ///
    /// [`Error::Vault`] when neither exists.
    pub fn validate(&self) -> Result<()> {
        let looks_like_graph = [JOURNALS_FOLDER, PAGES_FOLDER]
            .iter()
            .any(|sub| self.root.join(sub).is_dir());
        if looks_like_graph {
            Ok(())
        } else {
            Err(Error::Vault(format!(
                "{} does not contain a journals or pages folder",
                self.root.display()
            )))
        }
    }

    /// Page names in the graph, sorted. Namespace separators are restored
    /// from `___`. A graph without a pages folder has no pages.
    ///
    /// # Errors
    ///
    /// Returns an error if the pages folder exists but cannot be read.
    pub fn list_pages(&self) -> Result<Vec<String>> {
        let dir = self.root.join(PAGES_FOLDER);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut pages = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.ends_with(".md") {
                pages.push(logseq::page_name(&name));
            }
        }
        pages.sort();
        Ok(pages)
    }
}

impl Destination for GraphFolder {
    fn save(&self, target: &SaveTarget, content: &str) -> Result<SaveReceipt> {
        let path = self.root.join(target.relative_path()?);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let existing = match fs::read_to_string(&path) {
            Ok(existing) => existing,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        fs::write(&path, target.position.combine(&existing, content))?;
        tracing::debug!(path = %path.display(), position = ?target.position, "clip saved");
        Ok(SaveReceipt::Written(path))
    }
}

/// Hands clips to the Logseq app via `logseq://x-callback-url/quickCapture`.
#[derive(Debug, Clone, Default)]
pub struct DeepLink {
    /// Source page URL passed along with the clip.
    pub page_url: Option<String>,
    /// Source page title passed along with the clip.
    pub title: Option<String>,
}

impl DeepLink {
    pub const BASE: &'static str = "logseq://x-callback-url/quickCapture";

    /// The quick-capture URL for a clip.
    ///
    /// # Errors
    ///
    /// Only if the base URL fails to parse, which it does not.
    pub fn link(&self, target: &SaveTarget, content: &str) -> Result<String> {
        let mut link = Url::parse(Self::BASE).map_err(|e| Error::Vault(e.to_string()))?;
        {
            let mut query = link.query_pairs_mut();
            if let Some(url) = &self.page_url {
                query.append_pair("url", url);
            }
            if let Some(title) = &self.title {
                query.append_pair("title", title);
            }
            query.append_pair("content", content);
            if target.folder == PAGES_FOLDER {
                query.append_pair("page", &logseq::page_name(&target.filename));
            }
            query.append_pair("append", if target.position == Position::Append { "true" } else { "false" });
        }
        Ok(link.into())
    }
}

impl Destination for DeepLink {
    fn save(&self, target: &SaveTarget, content: &str) -> Result<SaveReceipt> {
        self.link(target, content).map(SaveReceipt::Link)
    }
}
