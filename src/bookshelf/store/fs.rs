use super::paths::{self, ensure_dir, key_from_path, prune_empty_dirs, same_file, temp_path};
use super::DocumentStore;
use crate::error::{CatalogError, Result};
use crate::filter::sort_books;
use crate::model::{Book, BookKey};
use crate::validation::validate_fields;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const RECORD_EXT: &str = "json";

/// File-backed metadata store: one JSON file per book.
///
/// Uses `RefCell` for the cache since the store is single-threaded and
/// `list` takes `&self`.
pub struct FsDocumentStore {
    root: PathBuf,
    cache: RefCell<Option<Vec<Book>>>,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: RefCell::new(None),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the metadata for `key` lives (whether or not it exists yet).
    pub fn record_path(&self, key: &BookKey) -> Result<PathBuf> {
        paths::entry_path(&self.root, key, RECORD_EXT)
    }

    fn load_all(&self) -> Result<Vec<Book>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        // An unreadable root fails the listing; only entries below it are skipped
        fs::read_dir(&self.root).map_err(CatalogError::Io)?;

        let mut books = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(3).max_depth(3) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(CatalogError::Io(e.into())),
                Err(e) => {
                    log::error!("skipping unreadable catalog entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            let is_record = entry.file_type().is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(RECORD_EXT);
            if !is_record {
                continue;
            }
            if let Some(book) = self.read_record(path) {
                books.push(book);
            }
        }

        sort_books(&mut books);
        Ok(books)
    }

    /// Reads one metadata file, logging and returning `None` for anything
    /// that cannot be addressed by its key.
    fn read_record(&self, path: &Path) -> Option<Book> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::error!("cannot read {}: {}", path.display(), e);
                return None;
            }
        };
        let book: Book = match serde_json::from_str(&content) {
            Ok(book) => book,
            Err(e) => {
                log::error!("skipping malformed record {}: {}", path.display(), e);
                return None;
            }
        };
        if key_from_path(&self.root, path, RECORD_EXT).as_ref() != Some(&book.key()) {
            log::warn!(
                "skipping {}: record {} does not match its location",
                path.display(),
                book.key()
            );
            return None;
        }
        Some(book)
    }

    /// Rebuild the cache from disk after a mutation.
    fn refresh(&self) {
        let rebuilt = match self.load_all() {
            Ok(books) => Some(books),
            Err(e) => {
                log::warn!("could not rebuild catalog cache, will retry on next read: {}", e);
                None
            }
        };
        *self.cache.borrow_mut() = rebuilt;
    }
}

impl DocumentStore for FsDocumentStore {
    fn list(&self) -> Result<Vec<Book>> {
        if let Some(books) = self.cache.borrow().as_ref() {
            return Ok(books.clone());
        }
        let books = self.load_all()?;
        log::debug!("loaded {} records from {}", books.len(), self.root.display());
        *self.cache.borrow_mut() = Some(books.clone());
        Ok(books)
    }

    fn contains(&self, key: &BookKey) -> Result<bool> {
        Ok(self.record_path(key)?.is_file())
    }

    fn get(&self, key: &BookKey) -> Result<Option<Book>> {
        let path = self.record_path(key)?;
        if !path.is_file() {
            return Ok(None);
        }
        Ok(self.read_record(&path))
    }

    fn aliases(&self, a: &BookKey, b: &BookKey) -> Result<bool> {
        Ok(same_file(&self.record_path(a)?, &self.record_path(b)?))
    }

    fn save(&mut self, book: &Book) -> Result<()> {
        validate_fields(book)?;

        let key = book.key();
        let dir = paths::key_dir(&self.root, &key)?;
        let target = dir.join(paths::entry_file_name(&key, RECORD_EXT)?);
        let replacing = target.is_file();

        ensure_dir(&dir)?;
        let content = serde_json::to_string_pretty(book).map_err(CatalogError::Serialization)?;

        // Atomic write: the rename also replaces an entry with the same key
        let tmp = temp_path(&dir);
        if let Err(e) = fs::write(&tmp, content).and_then(|_| fs::rename(&tmp, &target)) {
            let _ = fs::remove_file(&tmp);
            return Err(CatalogError::Io(e));
        }

        if replacing {
            log::info!("overwrote record {}", key);
        } else {
            log::info!("saved record {}", key);
        }
        self.refresh();
        Ok(())
    }

    fn delete(&mut self, book: &Book) -> Result<()> {
        let key = book.key();
        let path = self.record_path(&key)?;
        if !path.is_file() {
            return Err(CatalogError::NotFound(key));
        }

        fs::remove_file(&path).map_err(CatalogError::Io)?;
        if let Some(dir) = path.parent() {
            prune_empty_dirs(&self.root, dir)?;
        }

        log::info!("deleted record {}", key);
        self.refresh();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Author;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FsDocumentStore) {
        let dir = TempDir::new().unwrap();
        let store = FsDocumentStore::new(dir.path().join("books"));
        (dir, store)
    }

    fn wonder(cover: &str) -> Book {
        Book::new("Wonder", Author::new("R.J.", "Palacio"), cover)
    }

    #[test]
    fn save_writes_record_under_key_path() {
        let (_dir, mut store) = setup();
        store.save(&wonder("wonder.png")).unwrap();

        let path = store.root().join("Palacio/R.J./Wonder.json");
        assert!(path.is_file());
        let on_disk: Book = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(on_disk, wonder("wonder.png"));
    }

    #[test]
    fn save_leaves_no_temp_files() {
        let (_dir, mut store) = setup();
        store.save(&wonder("wonder.png")).unwrap();

        let names: Vec<String> = fs::read_dir(store.root().join("Palacio/R.J."))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Wonder.json".to_string()]);
    }

    #[test]
    fn save_same_key_overwrites() {
        let (_dir, mut store) = setup();
        store.save(&wonder("wonder.png")).unwrap();
        store.save(&wonder("wonder2.png")).unwrap();

        let books = store.list().unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].cover, "wonder2.png");
    }

    #[test]
    fn save_rejects_invalid_record_without_writing() {
        let (_dir, mut store) = setup();
        let err = store
            .save(&Book::new("", Author::new("A", "B"), "x.png"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert!(!store.root().exists());
    }

    #[test]
    fn list_is_sorted_by_key() {
        let (_dir, mut store) = setup();
        store
            .save(&Book::new("Zeta", Author::new("Ann", "Smith"), "z.png"))
            .unwrap();
        store
            .save(&Book::new("Alpha", Author::new("Ann", "Smith"), "a.png"))
            .unwrap();
        store
            .save(&Book::new("Middle", Author::new("Zoe", "Adams"), "m.png"))
            .unwrap();

        let titles: Vec<String> = store.list().unwrap().into_iter().map(|b| b.title).collect();
        assert_eq!(titles, vec!["Middle", "Alpha", "Zeta"]);
    }

    #[test]
    fn list_skips_malformed_and_misplaced_records() {
        let (_dir, mut store) = setup();
        store.save(&wonder("wonder.png")).unwrap();

        let stray_dir = store.root().join("Foo/Bar");
        fs::create_dir_all(&stray_dir).unwrap();
        fs::write(stray_dir.join("Broken.json"), "{ not json").unwrap();
        // Valid JSON, but its key says it belongs under Palacio/R.J.
        fs::write(
            stray_dir.join("Elsewhere.json"),
            serde_json::to_string(&wonder("x.png")).unwrap(),
        )
        .unwrap();

        let fresh = FsDocumentStore::new(store.root());
        let books = fresh.list().unwrap();
        assert_eq!(books, vec![wonder("wonder.png")]);
    }

    #[test]
    fn list_on_missing_root_is_empty() {
        let (_dir, store) = setup();
        assert!(store.list().unwrap().is_empty());
        assert!(!store.has_books().unwrap());
    }

    #[test]
    fn cache_is_rebuilt_after_mutation() {
        let (_dir, mut store) = setup();
        assert!(store.list().unwrap().is_empty());

        store.save(&wonder("wonder.png")).unwrap();
        assert_eq!(store.list().unwrap().len(), 1);

        store.delete(&wonder("wonder.png")).unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn delete_prunes_empty_directories() {
        let (_dir, mut store) = setup();
        let sibling = Book::new("Other", Author::new("Ann", "Palacio"), "o.png");
        store.save(&wonder("wonder.png")).unwrap();
        store.save(&sibling).unwrap();

        store.delete(&wonder("wonder.png")).unwrap();
        assert!(!store.root().join("Palacio/R.J.").exists());
        assert!(store.root().join("Palacio/Ann").exists());

        store.delete(&sibling).unwrap();
        assert!(!store.root().join("Palacio").exists());
        assert!(store.root().exists());
    }

    #[test]
    fn delete_missing_is_not_found() {
        let (_dir, mut store) = setup();
        let err = store.delete(&wonder("wonder.png")).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[test]
    fn edit_preserving_cover_moves_record() {
        let (_dir, mut store) = setup();
        let old = Book::new("Title", Author::new("A", "Author"), "x.jpg");
        let new = Book::new("Title2", Author::new("A", "Author"), "ignored.png");
        store.save(&old).unwrap();

        store.edit(&old, &new, true).unwrap();

        assert!(store.find_by_title("Title").unwrap().is_empty());
        let moved = store.find_by_title("Title2").unwrap();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].cover, "x.jpg");
    }

    #[test]
    fn edit_preserving_cover_uses_persisted_cover() {
        let (_dir, mut store) = setup();
        let old = Book::new("Title", Author::new("A", "Author"), "x.jpg");
        store.save(&old).unwrap();

        let stale = old.with_cover("other.gif");
        let new = Book::new("Title2", Author::new("A", "Author"), "ignored.png");
        store.edit(&stale, &new, true).unwrap();

        assert_eq!(store.list().unwrap(), vec![new.with_cover("x.jpg")]);
    }

    #[test]
    fn save_rejects_overlong_author_name() {
        let (_dir, mut store) = setup();
        let book = Book::new("Title", Author::new("A", "x".repeat(300)), "x.png");
        let err = store.save(&book).unwrap_err();
        assert!(matches!(err, CatalogError::Encoding { .. }));
        assert!(!store.root().exists());
    }

    #[cfg(unix)]
    #[test]
    fn failed_cache_rebuild_is_retried_on_next_read() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, mut store) = setup();
        store.save(&wonder("wonder.png")).unwrap();
        let root = store.root().to_path_buf();

        // Writable and traversable, but not listable
        fs::set_permissions(&root, fs::Permissions::from_mode(0o300)).unwrap();
        if fs::read_dir(&root).is_ok() {
            // Permission bits are not enforced for this user
            fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let other = Book::new("Other", Author::new("Ann", "Smith"), "o.png");
        let saved = store.save(&other);
        let listed = store.list();
        fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();

        saved.unwrap();
        assert!(listed.is_err());
        let books = store.list().unwrap();
        assert_eq!(books, vec![wonder("wonder.png"), other]);
    }

    #[cfg(unix)]
    #[test]
    fn edit_between_aliased_keys_keeps_the_record() {
        let (_dir, mut store) = setup();
        store.save(&wonder("wonder.png")).unwrap();
        std::os::unix::fs::symlink(store.root().join("Palacio"), store.root().join("Alias"))
            .unwrap();
        let aliased = Book::new("Wonder", Author::new("R.J.", "Alias"), "wonder.png");

        store.edit(&wonder("wonder.png"), &aliased, false).unwrap();

        let path = store.record_path(&aliased.key()).unwrap();
        let on_disk: Book = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(on_disk, aliased);
    }

    #[test]
    fn edit_with_same_key_keeps_single_entry() {
        let (_dir, mut store) = setup();
        store.save(&wonder("wonder.png")).unwrap();

        store
            .edit(&wonder("wonder.png"), &wonder("wonder2.png"), false)
            .unwrap();
        assert_eq!(store.list().unwrap(), vec![wonder("wonder2.png")]);

        store
            .edit(&wonder("wonder2.png"), &wonder("other.png"), true)
            .unwrap();
        assert_eq!(store.list().unwrap(), vec![wonder("wonder2.png")]);
    }

    #[test]
    fn edit_of_absent_record_writes_nothing() {
        let (_dir, mut store) = setup();
        let new = Book::new("New", Author::new("A", "B"), "n.png");
        let err = store.edit(&wonder("wonder.png"), &new, false).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn encoded_names_round_trip() {
        let (_dir, mut store) = setup();
        let book = Book::new(
            "Live: 100% AC/DC?",
            Author::new("Tim", "O'Brien"),
            "cover.gif",
        );
        store.save(&book).unwrap();

        assert!(store.root().join("O'Brien/Tim").is_dir());
        let fresh = FsDocumentStore::new(store.root());
        assert_eq!(fresh.list().unwrap(), vec![book]);
    }
}
