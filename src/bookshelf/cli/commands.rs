use super::menu;
use super::print::{print_books, print_success};
use super::setup::{Cli, Commands};
use bookshelf::catalog::Catalog;
use bookshelf::config::{CatalogConfig, CatalogPaths, CONFIG_KEYS};
use bookshelf::error::{CatalogError, Result};
use bookshelf::filter::BookQuery;
use bookshelf::model::{Author, Book, BookKey};
use bookshelf::store::fs::FsDocumentStore;
use bookshelf::store::images::FsImageStore;
use bookshelf::store::DocumentStore;
use clap::Parser;
use directories::ProjectDirs;
use std::path::PathBuf;

const HOME_ENV: &str = "BOOKSHELF_HOME";

pub(super) struct AppContext {
    pub(super) catalog: Catalog<FsDocumentStore, FsImageStore>,
    pub(super) paths: CatalogPaths,
    pub(super) config: CatalogConfig,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut ctx = init_context()?;

    match cli.command {
        Some(Commands::Add {
            title,
            author,
            cover,
        }) => handle_add(&mut ctx, title, &author, cover),
        Some(Commands::Edit {
            title,
            author,
            new_title,
            new_author,
            cover,
        }) => handle_edit(&mut ctx, &title, &author, new_title, new_author, cover),
        Some(Commands::Delete { title, author }) => handle_delete(&mut ctx, &title, &author),
        Some(Commands::Find { title, author }) => handle_find(&ctx, title, author),
        Some(Commands::Cover { title, author }) => handle_cover(&ctx, &title, &author),
        Some(Commands::Config { key, value, unset }) => handle_config(&mut ctx, key, value, unset),
        Some(Commands::Menu) => menu::run(&mut ctx, std::io::stdin().lock()),
        Some(Commands::List) | None => handle_list(&ctx),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn init_context() -> Result<AppContext> {
    let data_dir = match std::env::var_os(HOME_ENV) {
        Some(home) => PathBuf::from(home),
        None => ProjectDirs::from("com", "bookshelf", "bookshelf")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| CatalogError::Store("Could not determine data dir".to_string()))?,
    };
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let config = CatalogConfig::load(&data_dir)?;
    let paths = CatalogPaths::resolve(&config, &data_dir, &cwd);
    log::debug!(
        "documents at {}, covers at {}, app root {}",
        paths.documents.display(),
        paths.covers.display(),
        paths.app_root.display()
    );

    Ok(AppContext {
        catalog: Catalog::open(&paths),
        paths,
        config,
    })
}

pub(super) fn parse_author(input: &str) -> Result<Author> {
    Author::parse(input).ok_or_else(|| {
        CatalogError::Validation(format!(
            "author must have a first and a last name, got {:?}",
            input
        ))
    })
}

/// The persisted book with this exact title and author.
pub(super) fn lookup(ctx: &AppContext, title: &str, author: &str) -> Result<Book> {
    let author = parse_author(author)?;
    ctx.catalog
        .find_by_author(&author)?
        .into_iter()
        .find(|b| b.title == title)
        .ok_or_else(|| {
            CatalogError::NotFound(BookKey {
                last_name: author.last_name.clone(),
                first_name: author.first_name.clone(),
                title: title.to_string(),
            })
        })
}

pub(super) fn handle_add(
    ctx: &mut AppContext,
    title: String,
    author: &str,
    cover: String,
) -> Result<()> {
    let book = Book::new(title, parse_author(author)?, cover);
    let replacing = ctx.catalog.documents().contains(&book.key())?;
    ctx.catalog.save_book(&book)?;
    if replacing {
        print_success(format!("Book replaced: {}", book.key()));
    } else {
        print_success(format!("Book added: {}", book.key()));
    }
    Ok(())
}

pub(super) fn handle_edit(
    ctx: &mut AppContext,
    title: &str,
    author: &str,
    new_title: Option<String>,
    new_author: Option<String>,
    cover: Option<String>,
) -> Result<()> {
    let old = lookup(ctx, title, author)?;
    let new_author = match new_author {
        Some(name) => parse_author(&name)?,
        None => old.author.clone(),
    };
    let preserve_cover = cover.is_none();
    let new = Book::new(
        new_title.unwrap_or_else(|| old.title.clone()),
        new_author,
        cover.unwrap_or_else(|| old.cover.clone()),
    );

    ctx.catalog.edit_book(&old, &new, preserve_cover)?;
    print_success(format!("Book updated: {}", new.key()));
    Ok(())
}

pub(super) fn handle_delete(ctx: &mut AppContext, title: &str, author: &str) -> Result<()> {
    let book = lookup(ctx, title, author)?;
    ctx.catalog.delete_book(&book)?;
    print_success(format!("Book deleted: {}", book.key()));
    Ok(())
}

pub(super) fn handle_find(
    ctx: &AppContext,
    title: Option<String>,
    author: Option<String>,
) -> Result<()> {
    let query = match (title, author) {
        (Some(title), _) => BookQuery::Title(title),
        (None, Some(author)) => BookQuery::Author(parse_author(&author)?),
        (None, None) => {
            return Err(CatalogError::Validation(
                "give a title or an author to search for".into(),
            ))
        }
    };
    print_books(&ctx.catalog.find_books(&query)?);
    Ok(())
}

pub(super) fn handle_list(ctx: &AppContext) -> Result<()> {
    print_books(&ctx.catalog.list_books()?);
    Ok(())
}

fn handle_cover(ctx: &AppContext, title: &str, author: &str) -> Result<()> {
    let book = lookup(ctx, title, author)?;
    println!("{}", ctx.catalog.resolve_cover(&book)?.display());
    Ok(())
}

fn handle_config(
    ctx: &mut AppContext,
    key: Option<String>,
    value: Option<String>,
    unset: bool,
) -> Result<()> {
    let data_dir = ctx.paths.data_dir.clone();
    match (key, value) {
        (None, _) => {
            println!("data-dir = {}", data_dir.display());
            println!("app-root = {}", ctx.paths.app_root.display());
            println!("documents-dir = {}", ctx.paths.documents.display());
            println!("covers-dir = {}", ctx.paths.covers.display());
        }
        (Some(key), None) if unset => {
            ctx.config.unset(&key)?;
            ctx.config.save(&data_dir)?;
            print_success(format!("{} reset to default", key));
        }
        (Some(key), None) => match ctx.config.get(&key)? {
            Some(value) => println!("{} = {}", key, value.display()),
            None => println!("{} is not set (one of {})", key, CONFIG_KEYS.join(", ")),
        },
        (Some(key), Some(value)) => {
            ctx.config.set(&key, value)?;
            ctx.config.save(&data_dir)?;
            print_success(format!("{} updated", key));
        }
    }
    Ok(())
}
