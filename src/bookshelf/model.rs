use serde::{Deserialize, Serialize};
use std::fmt;

use crate::validation::has_first_and_last_name;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub last_name: String,
    pub first_name: String,
}

impl Author {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            last_name: last_name.into(),
            first_name: first_name.into(),
        }
    }

    /// Parses a free-form "First [Middle...] Last" name.
    ///
    /// The last whitespace-separated word becomes the last name and everything
    /// before it the first name. Returns `None` unless there are at least two
    /// non-blank parts.
    pub fn parse(input: &str) -> Option<Self> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        if !has_first_and_last_name(&parts) {
            return None;
        }
        let (last, first) = parts.split_last()?;
        Some(Self::new(first.join(" "), *last))
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// A catalog entry: metadata plus a reference to the cover image.
///
/// `cover` is relative to the application root at save time. Once saved, the
/// image store keeps its own copy, so the source may go away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: Author,
    pub cover: String,
}

impl Book {
    pub fn new(title: impl Into<String>, author: Author, cover: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author,
            cover: cover.into(),
        }
    }

    pub fn key(&self) -> BookKey {
        BookKey {
            last_name: self.author.last_name.clone(),
            first_name: self.author.first_name.clone(),
            title: self.title.clone(),
        }
    }

    /// Same book under a different cover reference.
    pub fn with_cover(&self, cover: impl Into<String>) -> Self {
        Self {
            cover: cover.into(),
            ..self.clone()
        }
    }

    /// Lower-cased extension of the cover reference, if any.
    pub fn cover_extension(&self) -> Option<String> {
        std::path::Path::new(&self.cover)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }
}

/// Identity of a catalog entry.
///
/// Field order matters: the derived `Ord` sorts by last name, then first name,
/// then title, which is the listing order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BookKey {
    pub last_name: String,
    pub first_name: String,
    pub title: String,
}

impl fmt::Display for BookKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" by {} {}",
            self.title, self.first_name, self.last_name
        )
    }
}
