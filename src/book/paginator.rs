//! Splits a book's word stream into pages.

use super::page::Page;
use super::word::TimedWord;

/// Batch `words` into pages.
///
/// A page closes once it holds at least `min_words_per_page` words and the word
/// just added ends a sentence (trimmed text ends in "."). Whatever remains
/// after the last close becomes a final, possibly short, page.
pub fn paginate<I>(words: I, min_words_per_page: usize) -> Vec<Page>
where
    I: IntoIterator<Item = TimedWord>,
{
    let mut pages = Vec::new();
    let mut current: Vec<TimedWord> = Vec::new();

    for word in words {
        let ends_sentence = word.ends_sentence();
        current.push(word);

        if current.len() >= min_words_per_page && ends_sentence {
            pages.extend(Page::new(std::mem::take(&mut current)));
        }
    }

    pages.extend(Page::new(current));
    pages
}
