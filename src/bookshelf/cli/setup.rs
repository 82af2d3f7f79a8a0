use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bookshelf", bin_name = "bookshelf", version)]
#[command(about = "Catalog books and their cover images", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (sets the log level to debug unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a book, replacing any book with the same title and author
    #[command(alias = "a")]
    Add {
        /// Title of the book
        title: String,

        /// Author as "First Last"
        author: String,

        /// Cover image (gif, png or jpg), relative to the app root
        cover: String,
    },

    /// Change the title, author or cover of a book
    #[command(alias = "e")]
    Edit {
        /// Current title
        title: String,

        /// Current author as "First Last"
        author: String,

        /// New title
        #[arg(long)]
        new_title: Option<String>,

        /// New author as "First Last"
        #[arg(long)]
        new_author: Option<String>,

        /// New cover image; the current cover is kept when omitted
        #[arg(long)]
        cover: Option<String>,
    },

    /// Delete a book and its cover
    #[command(alias = "rm")]
    Delete {
        /// Title of the book
        title: String,

        /// Author as "First Last"
        author: String,
    },

    /// Find books by exact title or exact author
    #[command(alias = "f")]
    Find {
        /// Exact title
        #[arg(short, long, conflicts_with = "author", required_unless_present = "author")]
        title: Option<String>,

        /// Exact author as "First Last"
        #[arg(short, long)]
        author: Option<String>,
    },

    /// List all books
    #[command(alias = "ls")]
    List,

    /// Print the path of a book's stored cover
    Cover {
        /// Title of the book
        title: String,

        /// Author as "First Last"
        author: String,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (app-root, documents-dir, covers-dir)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,

        /// Remove the key from the config file
        #[arg(long, conflicts_with = "value", requires = "key")]
        unset: bool,
    },

    /// Interactive menu
    Menu,
}
