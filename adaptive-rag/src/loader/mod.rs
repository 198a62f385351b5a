//! Document ingestion: read text files and split them into corpus documents.
//!
//! Each chunk becomes a [`Document`] with `source` (the file path) and `chunk`
//! (its index within the file) metadata, ready for `VectorStore::add_documents`.

mod splitter;

pub use splitter::{
    RecursiveTextSplitter, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_SEPARATORS,
};

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::memory::Document;

/// Metadata key holding the file a chunk came from.
pub const SOURCE_METADATA_KEY: &str = "source";
/// Metadata key holding the chunk index within its file.
pub const CHUNK_METADATA_KEY: &str = "chunk";

/// File extensions picked up when loading a directory.
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown"];

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid splitter config: {0}")]
    InvalidConfig(String),
}

impl LoaderError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Splits already-loaded text into documents tagged with `source`.
pub fn split_into_documents(
    text: &str,
    source: &str,
    splitter: &RecursiveTextSplitter,
) -> Vec<Document> {
    splitter
        .split_text(text)
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            Document::new(chunk)
                .with_metadata(SOURCE_METADATA_KEY, source)
                .with_metadata(CHUNK_METADATA_KEY, i.to_string())
        })
        .collect()
}

/// Reads one UTF-8 text file and splits it.
pub async fn load_file(
    path: impl AsRef<Path>,
    splitter: &RecursiveTextSplitter,
) -> Result<Vec<Document>, LoaderError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LoaderError::io(path, e))?;
    let documents = split_into_documents(&text, &path.display().to_string(), splitter);
    tracing::debug!(path = %path.display(), chunks = documents.len(), "loaded file");
    Ok(documents)
}

/// Loads a file, or every `.txt`/`.md` file directly inside a directory
/// (sorted by name, not recursive).
pub async fn load_path(
    path: impl AsRef<Path>,
    splitter: &RecursiveTextSplitter,
) -> Result<Vec<Document>, LoaderError> {
    let path = path.as_ref();
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| LoaderError::io(path, e))?;
    if !meta.is_dir() {
        return load_file(path, splitter).await;
    }

    let mut entries = tokio::fs::read_dir(path)
        .await
        .map_err(|e| LoaderError::io(path, e))?;
    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| LoaderError::io(path, e))?
    {
        let file = entry.path();
        let is_text = file
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.to_lowercase().as_str()));
        if is_text && file.is_file() {
            files.push(file);
        }
    }
    files.sort();

    let mut documents = Vec::new();
    for file in files {
        documents.extend(load_file(&file, splitter).await?);
    }
    Ok(documents)
}
