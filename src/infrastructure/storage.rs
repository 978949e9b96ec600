//! Artifact store - output directory layout and synchronous writes
//!
//! All artifacts are append-once and written synchronously. Chapter
//! and entity files land in subdirectories; the bible, outline, cover
//! and final documents sit at the root of the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use rand::distributions::Alphanumeric;
use rand::Rng;
use thiserror::Error;

use crate::domain::entities::{Outline, StoryBible, StoryEntity};

pub const BIBLE_TXT_FILE: &str = "narrative_bible.txt";
pub const BIBLE_JSON_FILE: &str = "narrative_bible.json";
pub const OUTLINE_FILE: &str = "outline.json";
pub const COVER_FILE: &str = "cover.png";
pub const CHAPTER_DIR: &str = "chapters";
pub const ENTITY_DIR: &str = "entities";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("required artifact missing: {0} (run the earlier stage first)")]
    MissingInput(PathBuf),
    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Owns the output directory for one run.
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        for dir in [root.clone(), root.join(CHAPTER_DIR), root.join(ENTITY_DIR)] {
            fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn write(&self, path: PathBuf, contents: &[u8]) -> Result<PathBuf, StorageError> {
        fs::write(&path, contents).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Persist one chapter, zero-padded. Single-book runs keep the
    /// short chapter-only name.
    pub fn save_chapter(
        &self,
        book: u32,
        chapter: u32,
        book_count: u32,
        text: &str,
    ) -> Result<PathBuf, StorageError> {
        let name = if book_count > 1 {
            format!("book_{:02}_chapter_{:02}.txt", book, chapter)
        } else {
            format!("chapter_{:02}.txt", chapter)
        };
        self.write(self.root.join(CHAPTER_DIR).join(name), text.as_bytes())
    }

    /// Persist an accepted entity as a standalone file named by label,
    /// category tag, timestamp and a short random suffix.
    pub fn save_entity(
        &self,
        label: &str,
        entity: &StoryEntity,
    ) -> Result<PathBuf, StorageError> {
        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect();
        let name = format!("{}_{}_{}_{}.txt", label, entity.category, timestamp, suffix);
        self.write(
            self.root.join(ENTITY_DIR).join(name),
            entity.description.as_bytes(),
        )
    }

    /// Persist the bible as markdown plus a JSON section map.
    pub fn save_bible(&self, bible: &StoryBible) -> Result<(PathBuf, PathBuf), StorageError> {
        let txt = self.write(self.root.join(BIBLE_TXT_FILE), bible.raw.as_bytes())?;

        let json_path = self.root.join(BIBLE_JSON_FILE);
        let encoded =
            serde_json::to_string_pretty(&bible.sections).map_err(|source| StorageError::Encode {
                path: json_path.clone(),
                source,
            })?;
        let json = self.write(json_path, encoded.as_bytes())?;
        Ok((txt, json))
    }

    /// Read the bible back; absence is fatal for later stages.
    pub fn load_bible(&self) -> Result<StoryBible, StorageError> {
        let path = self.root.join(BIBLE_TXT_FILE);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(StoryBible::parse(raw)),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::MissingInput(path))
            }
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    pub fn save_outline(&self, outline: &Outline) -> Result<PathBuf, StorageError> {
        let path = self.root.join(OUTLINE_FILE);
        let encoded = serde_json::to_string_pretty(&outline.chapters).map_err(|source| {
            StorageError::Encode {
                path: path.clone(),
                source,
            }
        })?;
        self.write(path, encoded.as_bytes())
    }

    pub fn save_cover(&self, image: &[u8]) -> Result<PathBuf, StorageError> {
        self.write(self.root.join(COVER_FILE), image)
    }

    pub fn cover_path(&self) -> PathBuf {
        self.root.join(COVER_FILE)
    }
}
