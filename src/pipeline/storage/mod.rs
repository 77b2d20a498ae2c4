pub mod plan_store;
pub mod html;

pub use plan_store::*;
pub use html::*;

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::pipeline::generation::ArticleDocument;

/// Maximum slug length in characters.
const SLUG_MAX_CHARS: usize = 30;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// File-name stem for an article title: lowercase, every non-alphanumeric
/// character as `_`, at most 30 characters. An empty title maps to `article`.
pub fn slugify(title: &str) -> String {
    let slug: String = title
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .take(SLUG_MAX_CHARS)
        .collect();
    if slug.is_empty() {
        "article".to_string()
    } else {
        slug
    }
}

/// Pretty-printed JSON written into `dir` (created if missing).
pub(crate) fn write_json<T: Serialize + ?Sized>(
    dir: &Path,
    file_name: &str,
    value: &T,
) -> Result<PathBuf, StorageError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

/// Save the finished document as `<slug>.json`.
pub fn save_article_json(dir: &Path, document: &ArticleDocument) -> Result<PathBuf, StorageError> {
    write_json(dir, &format!("{}.json", slugify(&document.title)), document)
}
