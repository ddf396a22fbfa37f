//! Splitting a raw fable collection into documents.
//!
//! A story starts at a non-empty line preceded by at least two blank lines;
//! that line is its title. The story runs until two consecutive blank lines.

use crate::document::{DocId, Document};
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn extract_collection(source: &str) -> Vec<Document> {
    extract_from(source, 0)
}

/// Extract from a single file, or from every `.txt` file below a directory
/// (sorted by path). Ids continue across files.
pub fn extract_path<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let mut files: Vec<PathBuf> = Vec::new();
    if path.is_dir() {
        for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("txt") {
                files.push(p.to_path_buf());
            }
        }
    } else {
        files.push(path.to_path_buf());
    }

    let mut docs = Vec::new();
    for file in files {
        let text = fs::read_to_string(&file)?;
        let extracted = extract_from(&text, docs.len() as DocId);
        tracing::info!(file = %file.display(), num_docs = extracted.len(), "extracted documents");
        docs.extend(extracted);
    }
    Ok(docs)
}

fn extract_from(source: &str, first_id: DocId) -> Vec<Document> {
    let lines: Vec<&str> = source.lines().map(str::trim).collect();
    let blank = |i: usize| lines.get(i).is_some_and(|l| l.is_empty());

    let mut docs = Vec::new();
    let mut current: Option<(&str, Vec<&str>)> = None;
    for (i, &line) in lines.iter().enumerate() {
        if current.is_none() {
            if !line.is_empty() && i >= 2 && blank(i - 1) && blank(i - 2) {
                current = Some((line, Vec::new()));
            }
            continue;
        }
        if line.is_empty() && blank(i + 1) {
            if let Some((title, body)) = current.take() {
                docs.push(finish(first_id + docs.len() as DocId, title, &body));
            }
        } else if !line.is_empty() {
            if let Some((_, body)) = current.as_mut() {
                body.push(line);
            }
        }
    }
    if let Some((title, body)) = current {
        docs.push(finish(first_id + docs.len() as DocId, title, &body));
    }
    docs
}

fn finish(id: DocId, title: &str, body: &[&str]) -> Document {
    Document::new(id, title, body.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FABLES: &str = "AESOP'S FABLES\n\n\n\nThe Fox and the Grapes\n\nA hungry Fox saw some\nfine bunches of Grapes.\n\n\n\nThe Cat and the Mice\n\nA Cat lived in a house\nfull of Mice.\n";

    #[test]
    fn splits_titles_and_bodies() {
        let docs = extract_collection(FABLES);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, 0);
        assert_eq!(docs[0].title, "The Fox and the Grapes");
        assert_eq!(docs[0].raw_text, "A hungry Fox saw some fine bunches of Grapes.");
        assert_eq!(docs[0].terms[..3], ["a", "hungry", "fox"]);
        assert_eq!(docs[1].id, 1);
        assert_eq!(docs[1].title, "The Cat and the Mice");
        assert_eq!(docs[1].raw_text, "A Cat lived in a house full of Mice.");
    }

    #[test]
    fn numbers_documents_across_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), FABLES).unwrap();
        fs::write(dir.path().join("b.txt"), FABLES).unwrap();
        fs::write(dir.path().join("notes.md"), FABLES).unwrap();
        let docs = extract_path(dir.path()).unwrap();
        let ids: Vec<DocId> = docs.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }
}
