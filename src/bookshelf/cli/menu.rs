//! Interactive numbered menu over the same handlers the subcommands use.
//!
//! Errors from an action are printed and the menu keeps going; only EOF or a
//! quit word ends it.

use super::commands::{
    handle_add, handle_delete, handle_edit, handle_find, handle_list, AppContext,
};
use super::print::{print_error, print_warning};
use bookshelf::error::Result;
use bookshelf::validation::{parse_menu_choice, MenuChoice};
use std::io::{BufRead, Write};

const OPTIONS: &[&str] = &[
    "List books",
    "Find by title",
    "Find by author",
    "Add a book",
    "Edit a book",
    "Delete a book",
];

pub(super) fn run<R: BufRead>(ctx: &mut AppContext, mut input: R) -> Result<()> {
    loop {
        println!();
        for (i, label) in OPTIONS.iter().enumerate() {
            println!("  {}. {}", i + 1, label);
        }
        println!("  q. Quit");

        let Some(line) = prompt(&mut input, "Choice")? else {
            return Ok(());
        };

        let outcome = match parse_menu_choice(&line, OPTIONS.len()) {
            MenuChoice::Quit => return Ok(()),
            MenuChoice::Invalid => {
                print_warning(format!("Pick a number from 1 to {}", OPTIONS.len()));
                continue;
            }
            MenuChoice::Option(choice) => match dispatch(ctx, &mut input, choice)? {
                Some(outcome) => outcome,
                None => return Ok(()),
            },
        };

        if let Err(e) = outcome {
            print_error(format!("Error: {}", e));
        }
    }
}

/// Runs one menu action. `Ok(None)` means input ended mid-prompt.
fn dispatch<R: BufRead>(
    ctx: &mut AppContext,
    input: &mut R,
    choice: usize,
) -> Result<Option<Result<()>>> {
    let outcome = match choice {
        1 => handle_list(ctx),
        2 => {
            let Some(title) = prompt(input, "Title")? else {
                return Ok(None);
            };
            handle_find(ctx, Some(title), None)
        }
        3 => {
            let Some(author) = prompt(input, "Author (First Last)")? else {
                return Ok(None);
            };
            handle_find(ctx, None, Some(author))
        }
        4 => {
            let Some([title, author, cover]) =
                prompt_all(input, ["Title", "Author (First Last)", "Cover"])?
            else {
                return Ok(None);
            };
            handle_add(ctx, title, &author, cover)
        }
        5 => {
            let Some([title, author, new_title, new_author, cover]) = prompt_all(
                input,
                [
                    "Current title",
                    "Current author",
                    "New title (blank keeps)",
                    "New author (blank keeps)",
                    "New cover (blank keeps)",
                ],
            )?
            else {
                return Ok(None);
            };
            handle_edit(
                ctx,
                &title,
                &author,
                non_empty(new_title),
                non_empty(new_author),
                non_empty(cover),
            )
        }
        6 => {
            let Some([title, author]) = prompt_all(input, ["Title", "Author (First Last)"])?
            else {
                return Ok(None);
            };
            handle_delete(ctx, &title, &author)
        }
        _ => unreachable!("parse_menu_choice bounds the option"),
    };
    Ok(Some(outcome))
}

/// Prints `label` and reads one line. `None` on EOF.
fn prompt<R: BufRead>(input: &mut R, label: &str) -> Result<Option<String>> {
    print!("{}: ", label);
    std::io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn prompt_all<R: BufRead, const N: usize>(
    input: &mut R,
    labels: [&str; N],
) -> Result<Option<[String; N]>> {
    let mut answers: [String; N] = std::array::from_fn(|_| String::new());
    for (slot, label) in answers.iter_mut().zip(labels) {
        match prompt(input, label)? {
            Some(answer) => *slot = answer,
            None => return Ok(None),
        }
    }
    Ok(Some(answers))
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
