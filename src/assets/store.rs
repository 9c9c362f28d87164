use crate::book::word::{TimedWord, parse_timestamps};
use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::Arc;

/// Catalog entry shown at book-selection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookEntry {
    pub id: String,
    pub title: String,
}

/// Reference to a narration audio resource.
///
/// Opaque to the engine; only audio primitives open it.
#[derive(Clone, PartialEq)]
pub enum AudioRef {
    File(PathBuf),
    Memory { name: String, bytes: Arc<[u8]> },
}

impl AudioRef {
    /// Open the resource for reading.
    pub fn open(&self) -> std::io::Result<Box<dyn Read + Send>> {
        match self {
            AudioRef::File(path) => Ok(Box::new(std::io::BufReader::new(
                std::fs::File::open(path)?,
            ))),
            AudioRef::Memory { bytes, .. } => Ok(Box::new(Cursor::new(Arc::clone(bytes)))),
        }
    }

    /// Human-readable name for messages.
    pub fn describe(&self) -> String {
        match self {
            AudioRef::File(path) => path.display().to_string(),
            AudioRef::Memory { name, .. } => name.clone(),
        }
    }
}

impl fmt::Debug for AudioRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioRef::File(path) => f.debug_tuple("File").field(path).finish(),
            AudioRef::Memory { name, bytes } => f
                .debug_struct("Memory")
                .field("name", name)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

/// Reference to a book illustration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub path: PathBuf,
}

/// Source of per-book assets.
pub trait AssetStore {
    /// Ordered word timestamps for a book.
    fn timestamps(&self, book_id: &str) -> Result<Vec<TimedWord>, LoadError>;

    /// The narration audio for a book.
    fn audio(&self, book_id: &str) -> Result<AudioRef, LoadError>;

    /// The illustration for a book, if it has one.
    fn image(&self, book_id: &str) -> Result<Option<ImageRef>, LoadError>;
}

/// Lists the books available for reading.
pub trait Catalog {
    fn list_books(&self) -> Result<Vec<BookEntry>, LoadError>;

    /// Catalog entry for `book_id`.
    fn find_book(&self, book_id: &str) -> Result<BookEntry, LoadError> {
        self.list_books()?
            .into_iter()
            .find(|entry| entry.id == book_id)
            .ok_or_else(|| LoadError::BookNotFound {
                book_id: book_id.to_string(),
            })
    }
}

struct MemoryBook {
    title: String,
    timestamps: String,
    audio: Option<AudioRef>,
    image: Option<ImageRef>,
}

/// In-memory asset store and catalog.
///
/// Timestamps are kept as raw JSON so malformed payloads surface through the
/// same parser as on-disk books.
#[derive(Default)]
pub struct MemoryAssetStore {
    books: BTreeMap<String, MemoryBook>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a book with a timestamps payload and no audio yet.
    pub fn with_book(mut self, id: &str, title: &str, timestamps_json: &str) -> Self {
        self.books.insert(
            id.to_string(),
            MemoryBook {
                title: title.to_string(),
                timestamps: timestamps_json.to_string(),
                audio: None,
                image: None,
            },
        );
        self
    }

    /// Attach audio bytes to a previously added book.
    pub fn with_audio(mut self, id: &str, bytes: Vec<u8>) -> Self {
        if let Some(book) = self.books.get_mut(id) {
            book.audio = Some(AudioRef::Memory {
                name: format!("{id}.wav"),
                bytes: bytes.into(),
            });
        }
        self
    }

    /// Attach an illustration path to a previously added book.
    pub fn with_image(mut self, id: &str, path: impl Into<PathBuf>) -> Self {
        if let Some(book) = self.books.get_mut(id) {
            book.image = Some(ImageRef { path: path.into() });
        }
        self
    }

    fn book(&self, book_id: &str) -> Result<&MemoryBook, LoadError> {
        self.books
            .get(book_id)
            .ok_or_else(|| LoadError::BookNotFound {
                book_id: book_id.to_string(),
            })
    }
}

impl AssetStore for MemoryAssetStore {
    fn timestamps(&self, book_id: &str) -> Result<Vec<TimedWord>, LoadError> {
        let book = self.book(book_id)?;
        parse_timestamps(&book.timestamps).map_err(|source| LoadError::MalformedTimestamps {
            book_id: book_id.to_string(),
            source,
        })
    }

    fn audio(&self, book_id: &str) -> Result<AudioRef, LoadError> {
        self.book(book_id)?
            .audio
            .clone()
            .ok_or_else(|| LoadError::AudioUnavailable {
                book_id: book_id.to_string(),
                message: "no audio attached".to_string(),
            })
    }

    fn image(&self, book_id: &str) -> Result<Option<ImageRef>, LoadError> {
        Ok(self.book(book_id)?.image.clone())
    }
}

impl Catalog for MemoryAssetStore {
    fn list_books(&self) -> Result<Vec<BookEntry>, LoadError> {
        Ok(self
            .books
            .iter()
            .map(|(id, book)| BookEntry {
                id: id.clone(),
                title: book.title.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimestampError;

    const WORDS: &str = r#"[{"text": "Hi", "start": 0.0, "end": 1.0}]"#;

    #[test]
    fn memory_store_lists_books_sorted_by_id() {
        let store = MemoryAssetStore::new()
            .with_book("pigs", "The Three Little Pigs", WORDS)
            .with_book("goats", "Three Billy Goats", WORDS);

        let books = store.list_books().unwrap();
        let ids: Vec<&str> = books.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["goats", "pigs"]);
        assert_eq!(books[1].title, "The Three Little Pigs");
    }

    #[test]
    fn find_book_looks_up_catalog_entry() {
        let store = MemoryAssetStore::new().with_book("pigs", "The Three Little Pigs", WORDS);

        assert_eq!(store.find_book("pigs").unwrap().title, "The Three Little Pigs");
        assert!(matches!(
            store.find_book("wolves"),
            Err(LoadError::BookNotFound { .. })
        ));
    }

    #[test]
    fn unknown_book_is_not_found() {
        let store = MemoryAssetStore::new();
        assert!(matches!(
            store.timestamps("missing"),
            Err(LoadError::BookNotFound { .. })
        ));
    }

    #[test]
    fn malformed_timestamps_surface_as_load_error() {
        let store = MemoryAssetStore::new().with_book("bad", "Bad", "[{\"text\": 1}]");
        assert!(matches!(
            store.timestamps("bad"),
            Err(LoadError::MalformedTimestamps {
                source: TimestampError::Entry { index: 0, .. },
                ..
            })
        ));
    }

    #[test]
    fn missing_audio_is_unavailable() {
        let store = MemoryAssetStore::new().with_book("pigs", "Pigs", WORDS);
        assert!(matches!(
            store.audio("pigs"),
            Err(LoadError::AudioUnavailable { .. })
        ));
    }

    #[test]
    fn memory_audio_opens_its_bytes() {
        let store = MemoryAssetStore::new()
            .with_book("pigs", "Pigs", WORDS)
            .with_audio("pigs", vec![1, 2, 3]);

        let audio = store.audio("pigs").unwrap();
        let mut buf = Vec::new();
        audio.open().unwrap().read_to_end(&mut buf).unwrap();
        assert_eq!(buf, vec![1, 2, 3]);
        assert_eq!(audio.describe(), "pigs.wav");
    }

    #[test]
    fn image_is_optional() {
        let store = MemoryAssetStore::new()
            .with_book("a", "A", WORDS)
            .with_book("b", "B", WORDS)
            .with_image("b", "/art/b.png");

        assert_eq!(store.image("a").unwrap(), None);
        assert_eq!(
            store.image("b").unwrap(),
            Some(ImageRef {
                path: PathBuf::from("/art/b.png")
            })
        );
    }
}
