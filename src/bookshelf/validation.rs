//! Well-formedness checks for books and user input.
//!
//! A book is valid when:
//! - The title is not blank
//! - Both author names are not blank
//! - The cover has a `gif`, `png` or `jpg` extension (any case)
//! - The cover file exists under the application root ([`validate_book`] only)
//!
//! Everything here is side-effect free except [`validate_book`], which looks
//! at the filesystem to check the cover exists.

use crate::error::{CatalogError, Result};
use crate::model::Book;
use std::path::Path;

pub const SUPPORTED_COVER_EXTENSIONS: &[&str] = &["gif", "png", "jpg"];

/// Outcome of parsing a numbered menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// A 1-based option within range
    Option(usize),
    /// Not a number, or out of range
    Invalid,
    /// The user asked to leave the menu
    Quit,
}

pub fn is_non_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Checks the path's extension against [`SUPPORTED_COVER_EXTENSIONS`].
///
/// ```
/// use bookshelf::validation::has_supported_extension;
///
/// assert!(has_supported_extension("covers/wonder.png"));
/// assert!(has_supported_extension("SCAN.JPG"));
/// assert!(!has_supported_extension("cover.jpeg"));
/// assert!(!has_supported_extension("cover"));
/// ```
pub fn has_supported_extension<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_COVER_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// True when at least two of the given name parts are non-blank.
pub fn has_first_and_last_name(parts: &[&str]) -> bool {
    parts.iter().filter(|part| is_non_blank(part)).count() >= 2
}

/// Parses a menu selection against options numbered `1..=max`.
///
/// ```
/// use bookshelf::validation::{parse_menu_choice, MenuChoice};
///
/// assert_eq!(parse_menu_choice(" 2 ", 5), MenuChoice::Option(2));
/// assert_eq!(parse_menu_choice("Q", 5), MenuChoice::Quit);
/// assert_eq!(parse_menu_choice("0", 5), MenuChoice::Invalid);
/// assert_eq!(parse_menu_choice("6", 5), MenuChoice::Invalid);
/// ```
pub fn parse_menu_choice(input: &str, max: usize) -> MenuChoice {
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit") {
        return MenuChoice::Quit;
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=max).contains(&n) => MenuChoice::Option(n),
        _ => MenuChoice::Invalid,
    }
}

/// Checks title, author names and cover extension without touching the disk.
pub fn validate_fields(book: &Book) -> Result<()> {
    if !is_non_blank(&book.title) {
        return Err(CatalogError::Validation("title cannot be empty".into()));
    }
    if !is_non_blank(&book.author.first_name) || !is_non_blank(&book.author.last_name) {
        return Err(CatalogError::Validation(
            "author needs both a first and a last name".into(),
        ));
    }
    if !is_non_blank(&book.cover) {
        return Err(CatalogError::Validation("cover cannot be empty".into()));
    }
    if !has_supported_extension(&book.cover) {
        return Err(CatalogError::Format(book.cover.clone()));
    }
    Ok(())
}

/// Full validation: [`validate_fields`] plus the cover must be an existing
/// file under `app_root`.
pub fn validate_book(book: &Book, app_root: &Path) -> Result<()> {
    validate_fields(book)?;
    let source = app_root.join(&book.cover);
    if !source.is_file() {
        return Err(CatalogError::Validation(format!(
            "cover file not found: {}",
            source.display()
        )));
    }
    Ok(())
}
