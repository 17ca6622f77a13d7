#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use newsreport::config::DatabaseTarget;
use rusqlite::{Connection, params};

pub const NEWS_SCHEMA_SQL: &str = r#"
CREATE TABLE authors (
    name TEXT NOT NULL,
    bio TEXT,
    id INTEGER PRIMARY KEY
);
CREATE TABLE articles (
    author INTEGER NOT NULL REFERENCES authors(id),
    title TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    lead TEXT,
    body TEXT,
    time TEXT,
    id INTEGER PRIMARY KEY
);
CREATE TABLE log (
    path TEXT,
    ip TEXT,
    method TEXT,
    status TEXT,
    time TEXT,
    id INTEGER PRIMARY KEY
);
"#;

static FIXTURE_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn unique_temp_path(label: &str, extension: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time should be after unix epoch")
        .as_nanos();
    let sequence = FIXTURE_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "newsreport-{label}-{}-{nanos}-{sequence}.{extension}",
        std::process::id()
    ))
}

/// A file-backed news database with the article, author, and log tables.
pub struct NewsFixture {
    pub path: PathBuf,
    pub connection: Connection,
}

impl NewsFixture {
    pub fn new(label: &str) -> Self {
        Self::with_schema(label, NEWS_SCHEMA_SQL)
    }

    pub fn with_schema(label: &str, schema_sql: &str) -> Self {
        let path = unique_temp_path(label, "sqlite");
        let connection = Connection::open(&path).expect("fixture database should open");
        connection
            .execute_batch(schema_sql)
            .expect("fixture schema should be creatable");
        Self { path, connection }
    }

    pub fn target(&self) -> DatabaseTarget {
        DatabaseTarget::Path(self.path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn author(&self, id: i64, name: &str) -> &Self {
        self.connection
            .execute(
                "INSERT INTO authors (id, name, bio) VALUES (?1, ?2, ?3)",
                params![id, name, format!("{name} writes for the paper.")],
            )
            .expect("author should be insertable");
        self
    }

    pub fn article(&self, author_id: i64, title: &str, slug: &str) -> &Self {
        self.connection
            .execute(
                "INSERT INTO articles (author, title, slug, lead, body, time)
                 VALUES (?1, ?2, ?3, '', '', '2016-08-15 18:55:10+00:00')",
                params![author_id, title, slug],
            )
            .expect("article should be insertable");
        self
    }

    /// Logs `count` successful reads of `/article/<slug>` on 2016-07-01.
    pub fn views(&self, slug: &str, count: usize) -> &Self {
        let path = format!("/article/{slug}");
        self.log_rows(&path, "200 OK", "2016-07-01 12:00:00+00:00", count)
    }

    /// Logs `total` requests on `day` (YYYY-MM-DD), `not_found` of which
    /// answered `404 NOT FOUND` and the rest `200 OK`.
    pub fn requests(&self, day: &str, total: usize, not_found: usize) -> &Self {
        assert!(not_found <= total, "not_found must not exceed total");
        let time = format!("{day} 08:30:00+00:00");
        self.log_rows("/article/missing-story", "404 NOT FOUND", &time, not_found);
        self.log_rows("/", "200 OK", &time, total - not_found)
    }

    pub fn log_rows(&self, path: &str, status: &str, time: &str, count: usize) -> &Self {
        self.log_rows_with_status(path, Some(status), time, count)
    }

    /// Like `log_rows`, but `None` stores a NULL status.
    pub fn log_rows_with_status(
        &self,
        path: &str,
        status: Option<&str>,
        time: &str,
        count: usize,
    ) -> &Self {
        let tx = self
            .connection
            .unchecked_transaction()
            .expect("fixture transaction should open");
        {
            let mut statement = tx
                .prepare_cached(
                    "INSERT INTO log (path, ip, method, status, time)
                     VALUES (?1, '198.51.100.7', 'GET', ?2, ?3)",
                )
                .expect("log insert should prepare");
            for _ in 0..count {
                statement
                    .execute(params![path, status, time])
                    .expect("log row should be insertable");
            }
        }
        tx.commit().expect("fixture transaction should commit");
        self
    }
}

impl Drop for NewsFixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
