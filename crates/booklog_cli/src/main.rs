//! Command-line shell for the booklog catalog.
//!
//! # Responsibility
//! - Map each subcommand to one `LibraryService` call.
//! - Own the store connection for the process lifetime.

use anyhow::{bail, Context, Result};
use booklog_core::config::{LOG_LEVEL_VAR, STORE_URI_VAR};
use booklog_core::db::{close_store, open_store, ping};
use booklog_core::{
    init_logging, Book, LibraryConfig, LibraryService, LibraryStats, LogTarget,
    SqliteBookRepository,
};
use clap::{Parser, Subcommand};
use log::info;

#[derive(Parser)]
#[command(
    name = "booklog",
    version = booklog_core::core_version(),
    about = "Personal book catalog"
)]
struct Cli {
    /// Store connection string; overrides LIBRARY_STORE_URI.
    #[arg(long, global = true)]
    store_uri: Option<String>,

    /// Log level (trace|debug|info|warn|error); overrides LIBRARY_LOG_LEVEL.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a book to the catalog
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        /// Publication year
        #[arg(long)]
        year: u32,
        #[arg(long, default_value = "")]
        genre: String,
        /// Mark the book as read
        #[arg(long)]
        read: bool,
    },
    /// Remove one book by exact title
    Remove { title: String },
    /// Search titles and authors, ignoring case
    Search { query: String },
    /// List every book
    List,
    /// List every title
    Titles,
    /// Show total count and read percentage
    Stats,
    /// Insert the sample books
    Seed,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = LibraryConfig::from_env_with(|key| match key {
        STORE_URI_VAR => cli.store_uri.clone(),
        LOG_LEVEL_VAR => cli.log_level.clone(),
        _ => None,
    })
    .context("failed to load configuration")?;

    init_logging(
        config.log_level,
        &LogTarget::from_dir(config.log_dir.as_deref()),
    )
    .map_err(anyhow::Error::msg)
    .context("failed to initialize logging")?;

    let conn = open_store(&config.store_uri).context("failed to open book store")?;
    ping(&conn).context("book store is not reachable")?;

    {
        let repo = SqliteBookRepository::open(&conn, &config.collection);
        let service = LibraryService::new(repo);
        run(&service, cli.command)?;
    }

    close_store(conn).context("failed to close book store")?;
    info!("event=app_exit module=cli status=ok");
    Ok(())
}

fn run(service: &LibraryService<SqliteBookRepository<'_>>, command: Command) -> Result<()> {
    match command {
        Command::Add {
            title,
            author,
            year,
            genre,
            read,
        } => {
            service.add_book(title, author, year, genre, read)?;
            println!("Book added.");
        }
        Command::Remove { title } => {
            if service.remove_book(&title)? {
                println!("Book removed.");
            } else {
                println!("No book titled `{title}`.");
            }
        }
        Command::Search { query } => {
            if query.trim().is_empty() {
                bail!("enter a title or author to search for");
            }
            let books = service.search_books(&query)?;
            if books.is_empty() {
                println!("No matching books found.");
            } else {
                print_books(&books);
            }
        }
        Command::List => {
            let books = service.list_books()?;
            if books.is_empty() {
                println!("Your library is empty.");
            } else {
                print_books(&books);
            }
        }
        Command::Titles => {
            for title in service.list_titles()? {
                println!("{title}");
            }
        }
        Command::Stats => print_stats(&service.statistics()?),
        Command::Seed => {
            let inserted = service.seed_sample_books()?;
            println!("Inserted {inserted} sample books.");
        }
    }
    Ok(())
}

fn print_books(books: &[Book]) {
    let rows: Vec<[String; 5]> = books
        .iter()
        .map(|book| {
            [
                book.title.clone(),
                book.author.clone(),
                book.year.to_string(),
                book.genre.clone(),
                read_label(book.read).to_string(),
            ]
        })
        .collect();

    let header = ["TITLE", "AUTHOR", "YEAR", "GENRE", "STATUS"].map(String::from);
    let mut widths = header.clone().map(|cell| cell.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    for row in std::iter::once(&header).chain(&rows) {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", line.trim_end());
    }
}

fn print_stats(stats: &LibraryStats) {
    println!("Total books: {}", stats.total);
    println!("Percentage read: {:.2}%", stats.percentage_read);
}

fn read_label(read: bool) -> &'static str {
    if read {
        "Read"
    } else {
        "Unread"
    }
}
