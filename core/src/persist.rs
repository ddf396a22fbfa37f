//! JSON persistence for the collection and the stop-word list. Indexes are
//! never stored; they are rebuilt from the collection every session.

use crate::document::Document;
use crate::error::Result;
use crate::stopwords::StopWords;
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

pub struct DataPaths {
    pub root: PathBuf,
}

impl DataPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn collection(&self) -> PathBuf { self.root.join("collection.json") }
    pub fn stop_words(&self) -> PathBuf { self.root.join("stopwords.json") }
}

pub fn save_collection(path: &Path, collection: &[Document]) -> Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let mut w = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut w, collection)?;
    w.flush()?;
    Ok(())
}

pub fn load_collection(path: &Path) -> Result<Vec<Document>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Like [`load_collection`], but a missing file is an empty collection.
pub fn load_collection_or_default(path: &Path) -> Result<Vec<Document>> {
    match load_collection(path) {
        Err(crate::Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "no collection found, starting empty");
            Ok(Vec::new())
        }
        other => other,
    }
}

pub fn save_stop_words(path: &Path, stop_words: &StopWords) -> Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let mut w = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut w, &stop_words.to_sorted_vec())?;
    w.flush()?;
    Ok(())
}

pub fn load_stop_words(path: &Path) -> Result<StopWords> {
    let reader = BufReader::new(File::open(path)?);
    let words: Vec<String> = serde_json::from_reader(reader)?;
    Ok(words.into_iter().collect())
}
