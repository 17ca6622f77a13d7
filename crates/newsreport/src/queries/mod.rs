use std::fmt;

use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, Row, params};
use tracing::debug;

use crate::models::{ArticleViews, AuthorViews, ErrorDay};
use crate::utils::time::parse_log_date;

pub const NOT_FOUND_STATUS: &str = "404 NOT FOUND";

const TOP_ARTICLES_SQL: &str = r#"
SELECT title, views
FROM top_articles
ORDER BY views DESC, title ASC
LIMIT ?1
"#;

const TOP_AUTHORS_SQL: &str = r#"
SELECT
    authors.name,
    SUM(top_articles.views) AS author_views
FROM top_articles
JOIN authors
    ON authors.id = top_articles.author
GROUP BY top_articles.author, authors.name
ORDER BY author_views DESC, authors.name ASC
"#;

const HIGH_ERROR_DAYS_SQL: &str = r#"
WITH daily AS (
    SELECT
        date(time) AS log_date,
        COUNT(status) AS total_requests,
        SUM(CASE WHEN status = ?1 THEN 1 ELSE 0 END) AS not_found_requests
    FROM log
    GROUP BY date(time)
)
SELECT
    log_date,
    total_requests,
    not_found_requests,
    CAST(not_found_requests AS REAL) / total_requests AS error_rate
FROM daily
WHERE log_date IS NOT NULL
  AND CAST(not_found_requests AS REAL) / total_requests > ?2
ORDER BY log_date ASC
"#;

/// One of the analytical queries failed. Carries the operation name so the
/// diagnostic points at the report section that could not be built.
#[derive(Debug)]
pub struct QueryFailure {
    pub operation: &'static str,
    pub cause: anyhow::Error,
}

impl fmt::Display for QueryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "query `{}` failed: {:#}", self.operation, self.cause)
    }
}

impl std::error::Error for QueryFailure {}

/// The `limit` most viewed articles, most views first.
pub fn top_articles(
    connection: &Connection,
    limit: usize,
) -> Result<Vec<ArticleViews>, QueryFailure> {
    run_query("top_articles", || {
        let limit =
            i64::try_from(limit).map_err(|_| anyhow!("limit exceeds sqlite INTEGER range"))?;
        collect_rows(connection, TOP_ARTICLES_SQL, params![limit], |row| {
            Ok(ArticleViews {
                title: row.get(0)?,
                views: count_column(row, 1)?,
            })
        })
    })
}

/// Every author with at least one article, ranked by the views their
/// articles received in total.
pub fn top_authors(connection: &Connection) -> Result<Vec<AuthorViews>, QueryFailure> {
    run_query("top_authors", || {
        collect_rows(connection, TOP_AUTHORS_SQL, [], |row| {
            Ok(AuthorViews {
                name: row.get(0)?,
                views: count_column(row, 1)?,
            })
        })
    })
}

/// Days whose `404 NOT FOUND` share is strictly greater than `threshold`,
/// oldest first.
pub fn high_error_days(
    connection: &Connection,
    threshold: f64,
) -> Result<Vec<ErrorDay>, QueryFailure> {
    run_query("high_error_days", || {
        if threshold.is_nan() || threshold <= 0.0 || threshold >= 1.0 {
            return Err(anyhow!(
                "threshold must be between 0 and 1 (exclusive), got {threshold}"
            ));
        }

        let raw_rows = collect_rows(
            connection,
            HIGH_ERROR_DAYS_SQL,
            params![NOT_FOUND_STATUS, threshold],
            |row| {
                Ok((
                    row.get::<usize, String>(0)?,
                    count_column(row, 1)?,
                    count_column(row, 2)?,
                    row.get::<usize, f64>(3)?,
                ))
            },
        )?;

        raw_rows
            .into_iter()
            .map(|(log_date, total_requests, not_found_requests, error_rate)| -> Result<ErrorDay> {
                Ok(ErrorDay {
                    date: parse_log_date(&log_date)?,
                    total_requests,
                    not_found_requests,
                    error_rate,
                })
            })
            .collect()
    })
}

fn run_query<T>(
    operation: &'static str,
    query: impl FnOnce() -> Result<Vec<T>>,
) -> Result<Vec<T>, QueryFailure> {
    match query() {
        Ok(rows) => {
            debug!(operation, rows = rows.len(), "query finished");
            Ok(rows)
        }
        Err(cause) => Err(QueryFailure { operation, cause }),
    }
}

fn collect_rows<T, P>(
    connection: &Connection,
    sql: &str,
    params: P,
    map_row: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>>
where
    P: rusqlite::Params,
{
    let mut statement = connection
        .prepare(sql)
        .context("failed to prepare report query")?;
    let rows = statement
        .query_map(params, map_row)
        .context("failed to execute report query")?;

    let mut collected = Vec::new();
    for row in rows {
        collected.push(row.context("failed to decode report row")?);
    }
    Ok(collected)
}

fn count_column(row: &Row<'_>, index: usize) -> rusqlite::Result<u64> {
    let value = row.get::<usize, i64>(index)?;
    u64::try_from(value).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(index, value))
}
