//! # Catalog Facade
//!
//! [`Catalog`] is the single entry point for catalog operations, whatever the
//! UI. It composes a [`DocumentStore`] and an [`ImageStore`] and decides the
//! order in which they are called.
//!
//! ## Ordering
//!
//! Every mutation runs the document half first, then the image half:
//!
//! | Operation | Document store | Image store | If the document half fails |
//! |-----------|----------------|-------------|----------------------------|
//! | save      | `save`         | `save`      | image half not attempted   |
//! | edit      | `edit`         | `edit`      | image half not attempted   |
//! | delete    | `delete`       | `delete`    | image half not attempted   |
//!
//! Within `edit`, both stores write the new entry before removing the old
//! one. An interruption between steps can leave a duplicate, never a loss.
//! When preserving the cover, the cover reference comes from the record
//! already stored under the old key, not from the caller's copy.
//!
//! On a case-insensitive filesystem, `wonder` and `Wonder` name the same
//! file. An edit between such keys overwrites in place and skips the removal
//! step, which would otherwise delete the entry just written. The on-disk
//! file name keeps the casing it was first created with.
//!
//! ## Not Atomic
//!
//! The two halves are not transactional. If the document half succeeds and
//! the image half fails, the metadata stays written and the error is
//! returned; nothing is rolled back and nothing is retried.
//!
//! ## Generic Over Stores
//!
//! `Catalog<D, I>` is generic over both stores:
//! - Production: `Catalog<FsDocumentStore, FsImageStore>`
//! - Testing: `Catalog<MemDocumentStore, MemImageStore>`

use crate::config::CatalogPaths;
use crate::error::Result;
use crate::filter::BookQuery;
use crate::model::{Author, Book};
use crate::store::fs::FsDocumentStore;
use crate::store::images::FsImageStore;
use crate::store::{DocumentStore, ImageStore};
use crate::validation::{validate_book, validate_fields};
use std::path::{Path, PathBuf};

pub struct Catalog<D: DocumentStore, I: ImageStore> {
    documents: D,
    images: I,
    app_root: PathBuf,
}

impl Catalog<FsDocumentStore, FsImageStore> {
    /// File-backed catalog rooted at the given paths.
    pub fn open(paths: &CatalogPaths) -> Self {
        Self::new(
            FsDocumentStore::new(&paths.documents),
            FsImageStore::new(&paths.covers, &paths.app_root),
            &paths.app_root,
        )
    }
}

impl<D: DocumentStore, I: ImageStore> Catalog<D, I> {
    pub fn new(documents: D, images: I, app_root: impl Into<PathBuf>) -> Self {
        Self {
            documents,
            images,
            app_root: app_root.into(),
        }
    }

    /// Validates `book` and stores both halves.
    pub fn save_book(&mut self, book: &Book) -> Result<()> {
        validate_book(book, &self.app_root)?;
        self.documents.save(book)?;
        self.images.save(book)
    }

    /// Replaces `old` with `new` in both stores.
    ///
    /// With `preserve_cover`, `new.cover` is ignored and the cover stored for
    /// `old` moves to the new entry.
    pub fn edit_book(&mut self, old: &Book, new: &Book, preserve_cover: bool) -> Result<()> {
        if preserve_cover {
            validate_fields(&new.with_cover(old.cover.clone()))?;
        } else {
            validate_book(new, &self.app_root)?;
        }
        self.documents.edit(old, new, preserve_cover)?;
        self.images.edit(old, new, preserve_cover)
    }

    pub fn delete_book(&mut self, book: &Book) -> Result<()> {
        validate_fields(book)?;
        self.documents.delete(book)?;
        self.images.delete(book)
    }

    pub fn find_books(&self, query: &BookQuery) -> Result<Vec<Book>> {
        self.documents.find(query)
    }

    pub fn find_by_title(&self, title: &str) -> Result<Vec<Book>> {
        self.documents.find_by_title(title)
    }

    pub fn find_by_author(&self, author: &Author) -> Result<Vec<Book>> {
        self.documents.find_by_author(author)
    }

    pub fn list_books(&self) -> Result<Vec<Book>> {
        self.documents.list()
    }

    pub fn has_books(&self) -> Result<bool> {
        self.documents.has_books()
    }

    pub fn resolve_cover(&self, book: &Book) -> Result<PathBuf> {
        self.images.resolve_cover(book)
    }

    pub fn documents(&self) -> &D {
        &self.documents
    }

    pub fn images(&self) -> &I {
        &self.images
    }

    pub fn app_root(&self) -> &Path {
        &self.app_root
    }
}
