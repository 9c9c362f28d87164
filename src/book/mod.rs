//! Books as the engine sees them: paginated timed words plus asset references.

pub mod page;
pub mod paginator;
pub mod word;

pub use page::{Page, TimeWindow};
pub use paginator::paginate;
pub use word::{Seconds, TimedWord, parse_timestamps};

use crate::assets::{AssetStore, AudioRef, BookEntry, ImageRef};
use crate::error::LoadError;

/// A loaded book, ready to hand to the navigation controller.
#[derive(Debug, Clone)]
pub struct Book {
    pub id: String,
    pub title: String,
    pages: Vec<Page>,
    audio: AudioRef,
    image: Option<ImageRef>,
}

impl Book {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        pages: Vec<Page>,
        audio: AudioRef,
        image: Option<ImageRef>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            pages,
            audio,
            image,
        }
    }

    /// Fetch a book's assets and paginate its words.
    ///
    /// Any store failure is returned as-is; a book without words is
    /// [`LoadError::EmptyBook`].
    pub fn load(
        store: &dyn AssetStore,
        entry: &BookEntry,
        min_words_per_page: usize,
    ) -> Result<Self, LoadError> {
        let words = store.timestamps(&entry.id)?;
        let audio = store.audio(&entry.id)?;
        let image = store.image(&entry.id)?;

        let pages = paginate(words, min_words_per_page);
        if pages.is_empty() {
            return Err(LoadError::EmptyBook {
                book_id: entry.id.clone(),
            });
        }

        log::debug!(
            "loaded {}: {} pages, audio {}",
            entry.id,
            pages.len(),
            audio.describe()
        );
        Ok(Self::new(
            entry.id.clone(),
            entry.title.clone(),
            pages,
            audio,
            image,
        ))
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn word_count(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }

    pub fn audio(&self) -> &AudioRef {
        &self.audio
    }

    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssetStore;

    fn entry(id: &str) -> BookEntry {
        BookEntry {
            id: id.to_string(),
            title: format!("Title of {id}"),
        }
    }

    #[test]
    fn load_paginates_words() {
        let store = MemoryAssetStore::new()
            .with_book(
                "pigs",
                "Pigs",
                r#"[
                    {"text": "One.", "start": 0.0, "end": 1.0},
                    {"text": "Two.", "start": 1.0, "end": 2.0},
                    {"text": "Three", "start": 2.0, "end": 3.0}
                ]"#,
            )
            .with_audio("pigs", vec![0; 4]);

        let book = Book::load(&store, &entry("pigs"), 1).unwrap();

        assert_eq!(book.page_count(), 3);
        assert_eq!(book.word_count(), 3);
        assert_eq!(book.title, "Title of pigs");
        assert!(book.image().is_none());
    }

    #[test]
    fn load_rejects_empty_book() {
        let store = MemoryAssetStore::new()
            .with_book("blank", "Blank", "[]")
            .with_audio("blank", vec![0; 4]);

        assert!(matches!(
            Book::load(&store, &entry("blank"), 160),
            Err(LoadError::EmptyBook { .. })
        ));
    }

    #[test]
    fn load_propagates_missing_audio() {
        let store = MemoryAssetStore::new().with_book(
            "pigs",
            "Pigs",
            r#"[{"text": "Hi", "start": 0.0, "end": 1.0}]"#,
        );

        assert!(matches!(
            Book::load(&store, &entry("pigs"), 160),
            Err(LoadError::AudioUnavailable { .. })
        ));
    }
}
