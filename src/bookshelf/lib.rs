//! # Bookshelf Architecture
//!
//! Bookshelf is a **UI-agnostic catalog library** for book records (title,
//! author, cover image). The `bookshelf` binary is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (cli/, wired by main.rs)                               │
//! │  - Parses arguments, runs the menu, prints results          │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Catalog facade (catalog.rs)                                │
//! │  - Validates, then calls document store → image store       │
//! │  - Returns structured Result types                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage (store/)                                           │
//! │  - DocumentStore / ImageStore traits                        │
//! │  - Fs* (production), Mem* (testing)                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//!
//! A book is identified by `(last name, first name, title)`, compared exactly.
//! Saving a book with an existing identity overwrites it.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `catalog.rs` inward, code never writes to stdout/stderr and never
//! exits the process. Diagnostics go through the `log` facade; the binary
//! decides where they end up.
//!
//! ## Module Overview
//!
//! - [`catalog`]: The facade, entry point for all operations
//! - [`store`]: Storage traits, implementations and path encoding
//! - [`model`]: `Book`, `Author`, `BookKey`
//! - [`validation`]: Well-formedness checks for books and menu input
//! - [`filter`]: Exact-match queries over listed books
//! - [`config`]: Configuration file and path resolution
//! - [`error`]: Error types

pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod store;
pub mod validation;
