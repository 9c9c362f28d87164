//! Directory-backed book library.
//!
//! Layout, one directory per book:
//!
//! ```text
//! <root>/<id>/timestamps.json
//! <root>/<id>/audio.wav
//! <root>/<id>/image.png      (or .jpg / .jpeg, optional)
//! <root>/<id>/book.toml      (optional, `title = "..."`)
//! ```

use super::store::{AssetStore, AudioRef, BookEntry, Catalog, ImageRef};
use crate::book::word::{TimedWord, parse_timestamps};
use crate::defaults;
use crate::error::LoadError;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BookMeta {
    title: Option<String>,
}

/// Asset store and catalog over a library directory.
#[derive(Debug, Clone)]
pub struct FsLibrary {
    root: PathBuf,
}

impl FsLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn book_dir(&self, book_id: &str) -> Result<PathBuf, LoadError> {
        // Ids are directory names; anything that could escape the root is unknown.
        let valid = !book_id.is_empty()
            && book_id != "."
            && book_id != ".."
            && !book_id.contains(['/', '\\']);
        let dir = self.root.join(book_id);
        if valid && dir.is_dir() {
            Ok(dir)
        } else {
            Err(LoadError::BookNotFound {
                book_id: book_id.to_string(),
            })
        }
    }

    fn title_for(&self, book_id: &str, dir: &Path) -> String {
        let meta_path = dir.join(defaults::BOOK_META_FILE);
        let meta = match fs::read_to_string(&meta_path) {
            Ok(contents) => toml::from_str::<BookMeta>(&contents).unwrap_or_else(|e| {
                log::warn!("ignoring malformed {}: {}", meta_path.display(), e);
                BookMeta::default()
            }),
            Err(_) => BookMeta::default(),
        };
        meta.title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| book_id.to_string())
    }
}

impl AssetStore for FsLibrary {
    fn timestamps(&self, book_id: &str) -> Result<Vec<TimedWord>, LoadError> {
        let path = self.book_dir(book_id)?.join(defaults::TIMESTAMPS_FILE);
        let contents = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => LoadError::TimestampsNotFound {
                book_id: book_id.to_string(),
                path: path.display().to_string(),
            },
            _ => LoadError::Read {
                path: path.display().to_string(),
                source: e,
            },
        })?;

        parse_timestamps(&contents).map_err(|source| LoadError::MalformedTimestamps {
            book_id: book_id.to_string(),
            source,
        })
    }

    fn audio(&self, book_id: &str) -> Result<AudioRef, LoadError> {
        let path = self.book_dir(book_id)?.join(defaults::AUDIO_FILE);
        if path.is_file() {
            Ok(AudioRef::File(path))
        } else {
            Err(LoadError::AudioUnavailable {
                book_id: book_id.to_string(),
                message: format!("{} not found", path.display()),
            })
        }
    }

    fn image(&self, book_id: &str) -> Result<Option<ImageRef>, LoadError> {
        let dir = self.book_dir(book_id)?;
        Ok(defaults::IMAGE_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}.{}", defaults::IMAGE_STEM, ext)))
            .find(|p| p.is_file())
            .map(|path| ImageRef { path }))
    }
}

impl Catalog for FsLibrary {
    fn list_books(&self) -> Result<Vec<BookEntry>, LoadError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(LoadError::Read {
                    path: self.root.display().to_string(),
                    source: e,
                });
            }
        };

        let mut books = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LoadError::Read {
                path: self.root.display().to_string(),
                source: e,
            })?;
            let dir = entry.path();
            if !dir.join(defaults::TIMESTAMPS_FILE).is_file() {
                continue;
            }
            let Some(id) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let title = self.title_for(&id, &dir);
            books.push(BookEntry { id, title });
        }
        books.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(books)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const WORDS: &str = r#"[
        {"text": "Once", "start": 0.0, "end": 0.5},
        {"text": "upon.", "start": 0.5, "end": 1.0}
    ]"#;

    fn add_book(root: &Path, id: &str, title: Option<&str>) -> PathBuf {
        let dir = root.join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("timestamps.json"), WORDS).unwrap();
        if let Some(title) = title {
            fs::write(dir.join("book.toml"), format!("title = \"{title}\"\n")).unwrap();
        }
        dir
    }

    #[test]
    fn lists_books_with_titles_sorted() {
        let tmp = TempDir::new().unwrap();
        add_book(tmp.path(), "pigs", Some("The Three Little Pigs"));
        add_book(tmp.path(), "goats", None);
        fs::create_dir_all(tmp.path().join("not-a-book")).unwrap();

        let library = FsLibrary::new(tmp.path());
        let books = library.list_books().unwrap();

        assert_eq!(
            books,
            vec![
                BookEntry {
                    id: "goats".into(),
                    title: "goats".into()
                },
                BookEntry {
                    id: "pigs".into(),
                    title: "The Three Little Pigs".into()
                },
            ]
        );
    }

    #[test]
    fn missing_root_lists_nothing() {
        let library = FsLibrary::new("/nonexistent/readalong/library");
        assert!(library.list_books().unwrap().is_empty());
    }

    #[test]
    fn malformed_meta_falls_back_to_id() {
        let tmp = TempDir::new().unwrap();
        let dir = add_book(tmp.path(), "pigs", None);
        fs::write(dir.join("book.toml"), "title = ").unwrap();

        let books = FsLibrary::new(tmp.path()).list_books().unwrap();
        assert_eq!(books[0].title, "pigs");
    }

    #[test]
    fn reads_timestamps() {
        let tmp = TempDir::new().unwrap();
        add_book(tmp.path(), "pigs", None);

        let words = FsLibrary::new(tmp.path()).timestamps("pigs").unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[1].text, "upon.");
    }

    #[test]
    fn missing_timestamps_is_not_found() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("empty")).unwrap();

        let err = FsLibrary::new(tmp.path()).timestamps("empty").unwrap_err();
        assert!(matches!(err, LoadError::TimestampsNotFound { .. }));
    }

    #[test]
    fn unknown_or_escaping_id_is_book_not_found() {
        let tmp = TempDir::new().unwrap();
        let library = FsLibrary::new(tmp.path().join("lib"));
        fs::create_dir_all(tmp.path().join("lib")).unwrap();

        for id in ["missing", "..", "../lib", ""] {
            assert!(
                matches!(
                    library.timestamps(id),
                    Err(LoadError::BookNotFound { .. })
                ),
                "id {id:?}"
            );
        }
    }

    #[test]
    fn audio_requires_wav_file() {
        let tmp = TempDir::new().unwrap();
        let dir = add_book(tmp.path(), "pigs", None);
        let library = FsLibrary::new(tmp.path());

        assert!(matches!(
            library.audio("pigs"),
            Err(LoadError::AudioUnavailable { .. })
        ));

        fs::write(dir.join("audio.wav"), b"RIFF").unwrap();
        assert_eq!(
            library.audio("pigs").unwrap(),
            AudioRef::File(dir.join("audio.wav"))
        );
    }

    #[test]
    fn image_probes_known_extensions() {
        let tmp = TempDir::new().unwrap();
        let dir = add_book(tmp.path(), "pigs", None);
        let library = FsLibrary::new(tmp.path());

        assert_eq!(library.image("pigs").unwrap(), None);

        fs::write(dir.join("image.jpg"), b"jpg").unwrap();
        assert_eq!(
            library.image("pigs").unwrap(),
            Some(ImageRef {
                path: dir.join("image.jpg")
            })
        );
    }
}
