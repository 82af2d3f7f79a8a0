use bookshelf::model::Book;
use colored::Colorize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const TITLE_WIDTH: usize = 40;
const AUTHOR_WIDTH: usize = 28;

pub(super) fn print_success(message: impl AsRef<str>) {
    println!("{}", message.as_ref().green());
}

pub(super) fn print_warning(message: impl AsRef<str>) {
    println!("{}", message.as_ref().yellow());
}

pub(super) fn print_error(message: impl AsRef<str>) {
    println!("{}", message.as_ref().red());
}

pub(super) fn print_books(books: &[Book]) {
    if books.is_empty() {
        println!("No books found.");
        return;
    }

    for (i, book) in books.iter().enumerate() {
        let idx = format!("{:>3}. ", i + 1);
        let title = pad_to_width(&book.title, TITLE_WIDTH);
        let author = pad_to_width(&book.author.to_string(), AUTHOR_WIDTH);
        println!(
            "{}{}{}{}",
            idx.dimmed(),
            title.bold(),
            author,
            book.cover.dimmed()
        );
    }
}

/// Truncates with an ellipsis or pads with spaces to exactly `width` columns,
/// leaving one column of gap.
fn pad_to_width(s: &str, width: usize) -> String {
    let truncated = truncate_to_width(s, width.saturating_sub(1));
    let padding = width.saturating_sub(truncated.width());
    format!("{}{}", truncated, " ".repeat(padding))
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_strings_are_padded() {
        assert_eq!(pad_to_width("abc", 6), "abc   ");
    }

    #[test]
    fn long_strings_are_truncated_with_ellipsis() {
        let out = pad_to_width("abcdefghij", 6);
        assert_eq!(out, "abcd… ");
        assert_eq!(out.width(), 6);
    }

    #[test]
    fn wide_characters_count_double() {
        let out = truncate_to_width("日本語の本", 5);
        assert_eq!(out, "日本…");
    }
}
