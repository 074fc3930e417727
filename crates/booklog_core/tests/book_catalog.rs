use booklog_core::db::{close_store, open_db_in_memory, open_store};
use booklog_core::{
    Book, BookRepository, LibraryService, RepoError, SqliteBookRepository,
    DEFAULT_BOOK_COLLECTION,
};
use rusqlite::{params, Connection};

fn service(conn: &Connection) -> LibraryService<SqliteBookRepository<'_>> {
    LibraryService::new(SqliteBookRepository::open(conn, DEFAULT_BOOK_COLLECTION))
}

fn titles(books: &[Book]) -> Vec<&str> {
    books.iter().map(|book| book.title.as_str()).collect()
}

#[test]
fn add_then_list_returns_the_record() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .add_book("Existing", "Someone", 1999, "Essay", true)
        .unwrap();

    service.add_book("T", "A", 2020, "G", false).unwrap();

    let books = service.list_books().unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(
        books[1],
        Book {
            title: "T".to_string(),
            author: "A".to_string(),
            year: 2020,
            genre: "G".to_string(),
            read: false,
        }
    );
}

#[test]
fn list_preserves_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    for title in ["first", "second", "third"] {
        service.add_book(title, "author", 2000, "", false).unwrap();
    }

    let books = service.list_books().unwrap();
    assert_eq!(titles(&books), vec!["first", "second", "third"]);
}

#[test]
fn remove_deletes_matching_title() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service.add_book("X", "A", 2001, "", false).unwrap();
    service.add_book("Y", "B", 2002, "", false).unwrap();

    assert!(service.remove_book("X").unwrap());

    let books = service.list_books().unwrap();
    assert_eq!(titles(&books), vec!["Y"]);
}

#[test]
fn remove_missing_title_is_silent_noop() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service.add_book("Kept", "A", 2001, "", false).unwrap();
    let before = service.list_books().unwrap();

    assert!(!service.remove_book("Missing").unwrap());
    assert!(!service.remove_book("kept").unwrap());

    assert_eq!(service.list_books().unwrap(), before);
}

#[test]
fn remove_with_duplicate_titles_deletes_only_one() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service.add_book("D", "First", 2001, "", false).unwrap();
    service.add_book("D", "Second", 2002, "", true).unwrap();

    assert!(service.remove_book("D").unwrap());

    let books = service.list_books().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "D");
    assert_eq!(books[0].author, "Second");
}

#[test]
fn search_is_case_insensitive_and_partial() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .add_book("Atomic Habits", "James Clear", 2018, "Self-help", false)
        .unwrap();
    service
        .add_book("Deep Work", "Cal Newport", 2016, "Productivity", true)
        .unwrap();

    for query in ["james", "CLEAR", "cle"] {
        let books = service.search_books(query).unwrap();
        assert_eq!(titles(&books), vec!["Atomic Habits"], "query `{query}`");
    }

    let by_title = service.search_books("deep w").unwrap();
    assert_eq!(titles(&by_title), vec!["Deep Work"]);
}

#[test]
fn search_matches_title_or_author() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service.add_book("Work Clean", "Dan Charnas", 2016, "", false).unwrap();
    service.add_book("Deep Work", "Cal Newport", 2016, "", false).unwrap();
    service
        .add_book("Anna Karenina", "Leo Tolstoy", 1878, "", false)
        .unwrap();

    let books = service.search_books("work").unwrap();
    assert_eq!(titles(&books), vec!["Work Clean", "Deep Work"]);

    let books = service.search_books("an").unwrap();
    assert_eq!(titles(&books), vec!["Work Clean", "Anna Karenina"]);
}

#[test]
fn search_without_match_returns_empty() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service.seed_sample_books().unwrap();

    let books = service.search_books("zzz-nonexistent").unwrap();
    assert!(books.is_empty());
}

#[test]
fn search_treats_pattern_characters_literally() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .add_book("C++ Primer", "Stanley Lippman", 1989, "", false)
        .unwrap();
    service.add_book("Cats", "T. S. Eliot", 1939, "", false).unwrap();

    assert_eq!(titles(&service.search_books("c++").unwrap()), vec!["C++ Primer"]);
    assert!(service.search_books(".*").unwrap().is_empty());
    assert_eq!(titles(&service.search_books("t. s.").unwrap()), vec!["Cats"]);
}

#[test]
fn statistics_on_empty_store_are_zero() {
    let conn = open_db_in_memory().unwrap();
    let stats = service(&conn).statistics().unwrap();

    assert_eq!(stats.total, 0);
    assert_eq!(stats.read, 0);
    assert_eq!(stats.percentage_read, 0.0);
}

#[test]
fn statistics_report_read_percentage() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service.add_book("One", "A", 2001, "", true).unwrap();
    service.add_book("Two", "B", 2002, "", false).unwrap();
    service.add_book("Three", "C", 2003, "", false).unwrap();
    service.add_book("Four", "D", 2004, "", false).unwrap();

    let stats = service.statistics().unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.read, 1);
    assert_eq!(stats.unread(), 3);
    assert_eq!(stats.percentage_read, 25.0);
}

#[test]
fn seed_inserts_sample_books_as_unread() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    assert_eq!(service.seed_sample_books().unwrap(), 3);

    let books = service.list_books().unwrap();
    assert_eq!(
        titles(&books),
        vec!["Atomic Habits", "Deep Work", "The 5 AM Club"]
    );
    assert!(books.iter().all(|book| !book.read && book.genre.is_empty()));
    assert_eq!(service.statistics().unwrap().percentage_read, 0.0);
}

#[test]
fn list_titles_keeps_duplicates_in_store_order() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service.add_book("B", "x", 2000, "", false).unwrap();
    service.add_book("A", "y", 2000, "", false).unwrap();
    service.add_book("B", "z", 2000, "", false).unwrap();

    assert_eq!(service.list_titles().unwrap(), vec!["B", "A", "B"]);
}

#[test]
fn documents_missing_optional_fields_load_with_defaults() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO documents (id, collection, body) VALUES (?1, ?2, ?3);",
        params![
            "legacy-1",
            DEFAULT_BOOK_COLLECTION,
            r#"{"_id":"legacy-1","title":"Deep Work","author":"Cal Newport","year":2016}"#
        ],
    )
    .unwrap();

    let service = service(&conn);
    let books = service.list_books().unwrap();
    assert_eq!(books, vec![Book::new("Deep Work", "Cal Newport", 2016)]);
    assert_eq!(service.statistics().unwrap().read, 0);
}

#[test]
fn documents_that_are_not_books_are_reported() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO documents (id, collection, body) VALUES (?1, ?2, ?3);",
        params![
            "broken-1",
            DEFAULT_BOOK_COLLECTION,
            r#"{"_id":"broken-1","title":"No Year","author":"Nobody","year":-3}"#
        ],
    )
    .unwrap();

    let repo = SqliteBookRepository::open(&conn, DEFAULT_BOOK_COLLECTION);
    let err = repo.list_books().unwrap_err();
    assert!(matches!(err, RepoError::InvalidRecord(_)));
}

#[test]
fn collections_are_isolated() {
    let conn = open_db_in_memory().unwrap();
    let books = LibraryService::new(SqliteBookRepository::open(&conn, "books"));
    let wishlist = LibraryService::new(SqliteBookRepository::open(&conn, "wishlist"));

    books.add_book("Owned", "A", 2000, "", true).unwrap();
    wishlist.add_book("Wanted", "B", 2001, "", false).unwrap();

    assert_eq!(titles(&books.list_books().unwrap()), vec!["Owned"]);
    assert_eq!(titles(&wishlist.list_books().unwrap()), vec!["Wanted"]);
    assert_eq!(wishlist.statistics().unwrap().total, 1);
}

#[test]
fn books_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let uri = format!("sqlite://{}", dir.path().join("library.db").display());

    let conn = open_store(&uri).unwrap();
    service(&conn)
        .add_book("Persistent", "Writer", 2010, "Novel", true)
        .unwrap();
    close_store(conn).unwrap();

    let conn = open_store(&uri).unwrap();
    let books = service(&conn).list_books().unwrap();
    assert_eq!(
        books,
        vec![Book::new("Persistent", "Writer", 2010)
            .with_genre("Novel")
            .with_read(true)]
    );
}
