//! Exact-match queries over an already materialized set of books.
//!
//! Matching is case-sensitive and whole-field: no substrings, no ranking.

use crate::model::{Author, Book};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookQuery {
    Title(String),
    Author(Author),
}

impl BookQuery {
    pub fn apply(&self, books: &[Book]) -> Vec<Book> {
        match self {
            BookQuery::Title(title) => by_title(books, title),
            BookQuery::Author(author) => by_author(books, author),
        }
    }
}

pub fn by_title(books: &[Book], title: &str) -> Vec<Book> {
    books.iter().filter(|b| b.title == title).cloned().collect()
}

pub fn by_author(books: &[Book], author: &Author) -> Vec<Book> {
    books
        .iter()
        .filter(|b| {
            b.author.last_name == author.last_name && b.author.first_name == author.first_name
        })
        .cloned()
        .collect()
}

/// Sorts by last name, then first name, then title.
pub fn sort_books(books: &mut [Book]) {
    books.sort_by_cached_key(|b| b.key());
}
