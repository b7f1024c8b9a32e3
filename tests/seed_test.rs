use contacts_quotes::db::{init_db, Schema};
use contacts_quotes::seed::{self, AUTHORS_FILE, QUOTES_FILE};
use contacts_quotes::Repository;
use tempfile::TempDir;

const AUTHORS: &str = r#"[
  {"fullname": "Albert Einstein", "born_date": "March 14, 1879", "born_location": "in Ulm, Germany", "description": "Physicist"},
  {"fullname": "Jean-Paul Sartre", "born_date": "June 21, 1905", "born_location": "in Paris, France", "description": "Philosopher"}
]"#;

const QUOTES: &str = r#"[
  {"tags": ["change", "world"], "author": "Albert Einstein", "quote": "The world as we have created it is a process of our thinking."},
  {"tags": ["life", "change"], "author": "Albert Einstein", "quote": "Life is like riding a bicycle."},
  {"tags": ["freedom"], "author": "JeanPaul Sartre", "quote": "Man is condemned to be free."},
  {"tags": ["humor"], "author": "Jean-Paul Sartre", "quote": "Hell is other people."},
  {"tags": [], "author": "Nobody Known", "quote": "Unattributed."}
]"#;

async fn setup() -> (Repository, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join(AUTHORS_FILE), AUTHORS).unwrap();
    std::fs::write(temp_dir.path().join(QUOTES_FILE), QUOTES).unwrap();

    let db_path = temp_dir
        .path()
        .join("quotes.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path, Schema::Quotes)
        .await
        .expect("init_db failed");
    (Repository::new(pool), temp_dir)
}

#[tokio::test]
async fn test_seed_inserts_authors_and_resolvable_quotes() {
    let (repo, dir) = setup().await;
    let (authors, quotes) = seed::load_fixtures(dir.path()).unwrap();

    let report = seed::run(&repo, &authors, &quotes).await.unwrap();
    assert_eq!(report.authors_inserted, 2);
    assert_eq!(report.quotes_inserted, 3);
    assert_eq!(report.quotes_skipped, 2);

    // Hyphens are stripped from stored names, so the hyphenated reference misses.
    assert!(repo
        .find_author_by_fullname("JeanPaul Sartre")
        .await
        .unwrap()
        .is_some());
    assert!(repo
        .find_author_by_fullname("Jean-Paul Sartre")
        .await
        .unwrap()
        .is_none());

    let stored = repo.list_quotes(10, 0).await.unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[0].author_name, "Albert Einstein");
    let names: Vec<&str> = stored[0].tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["change", "world"]);

    let top = repo.top_tags(10).await.unwrap();
    assert_eq!(top[0].name, "change");
    assert_eq!(top[0].quote_count, 2);
}

#[tokio::test]
async fn test_seed_is_not_idempotent() {
    let (repo, dir) = setup().await;
    let (authors, quotes) = seed::load_fixtures(dir.path()).unwrap();

    seed::run(&repo, &authors, &quotes).await.unwrap();
    let second = seed::run(&repo, &authors, &quotes).await.unwrap();

    assert_eq!(second.authors_inserted, 2);
    assert_eq!(repo.count_authors().await.unwrap(), 4);
    assert_eq!(repo.count_quotes().await.unwrap(), 6);
    // Tags are reused by name across runs.
    assert_eq!(repo.list_tags().await.unwrap().len(), 4);
}
