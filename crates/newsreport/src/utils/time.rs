use anyhow::{Context, Result};
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const LOG_DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const REPORT_DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[month]/[day]/[year]");

/// Parses the `YYYY-MM-DD` day key produced by SQLite's `date()`.
pub fn parse_log_date(value: &str) -> Result<Date> {
    Date::parse(value, LOG_DATE_FORMAT)
        .with_context(|| format!("invalid log date `{value}`; expected YYYY-MM-DD"))
}

pub fn format_report_date(date: Date) -> Result<String> {
    date.format(REPORT_DATE_FORMAT)
        .with_context(|| format!("failed to format report date {date}"))
}
