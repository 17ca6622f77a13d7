use std::fmt;

use rusqlite::{Connection, ErrorCode, OpenFlags};
use tracing::{debug, info};

use crate::config::DatabaseTarget;

pub const TOP_ARTICLES_VIEW: &str = "top_articles";

// Plain CREATE VIEW: an existing view must surface as an "already exists"
// error so setup can tell a fresh database from a prepared one.
const CREATE_VIEW_TOP_ARTICLES_SQL: &str = r#"
CREATE VIEW top_articles AS
SELECT
    articles.title,
    articles.author,
    COUNT(log.path) AS views
FROM articles
LEFT JOIN log
    ON log.path = '/article/' || articles.slug
GROUP BY articles.title, articles.author
ORDER BY views DESC;
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewSetup {
    Created,
    AlreadyExists,
}

impl ViewSetup {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::AlreadyExists => "already_exists",
        }
    }
}

/// The database could not be opened at all.
#[derive(Debug)]
pub struct ConnectionFailure {
    pub target: String,
    pub cause: rusqlite::Error,
}

impl fmt::Display for ConnectionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unable to open news database {}: {}",
            self.target, self.cause
        )
    }
}

impl std::error::Error for ConnectionFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

/// Creating `top_articles` failed for a reason other than the view already
/// being present.
#[derive(Debug)]
pub struct SetupFailure {
    pub view: &'static str,
    pub cause: rusqlite::Error,
}

impl fmt::Display for SetupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to create view {}: {}", self.view, self.cause)
    }
}

impl std::error::Error for SetupFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

/// Opens an existing news database. The file is never created: a missing
/// database is a connection failure, not an empty report.
pub fn open_news_database(target: &DatabaseTarget) -> Result<Connection, ConnectionFailure> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let connection =
        Connection::open_with_flags(target.location(), flags).map_err(|cause| ConnectionFailure {
            target: target.to_string(),
            cause,
        })?;

    // SQLite opens lazily; touch the schema so an unreadable file fails here.
    connection
        .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
            row.get::<usize, i64>(0)
        })
        .map_err(|cause| ConnectionFailure {
            target: target.to_string(),
            cause,
        })?;

    debug!(database = %target, "opened news database");
    Ok(connection)
}

pub fn ensure_top_articles_view(connection: &Connection) -> Result<ViewSetup, SetupFailure> {
    let outcome = match connection.execute_batch(CREATE_VIEW_TOP_ARTICLES_SQL) {
        Ok(()) => ViewSetup::Created,
        Err(error) if is_already_exists(&error) => {
            info!(view = TOP_ARTICLES_VIEW, cause = %error, "view already present");
            ViewSetup::AlreadyExists
        }
        Err(cause) => {
            return Err(SetupFailure {
                view: TOP_ARTICLES_VIEW,
                cause,
            });
        }
    };

    debug!(view = TOP_ARTICLES_VIEW, outcome = outcome.as_str(), "view setup finished");
    Ok(outcome)
}

fn is_already_exists(error: &rusqlite::Error) -> bool {
    // Prepare-time errors arrive as SqlInputError, step-time ones as SqliteFailure.
    let (code, message) = match error {
        rusqlite::Error::SqliteFailure(failure, Some(message)) => (failure.code, message),
        rusqlite::Error::SqlInputError { error, msg, .. } => (error.code, msg),
        _ => return false,
    };
    code == ErrorCode::Unknown && message.contains("already exists")
}
