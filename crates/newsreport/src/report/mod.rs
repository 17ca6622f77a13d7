use anyhow::Result;

use crate::models::{ArticleViews, AuthorViews, ErrorDay};
use crate::utils::time::format_report_date;

const COUNT_WORDS: [&str; 11] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub header: String,
    pub lines: Vec<String>,
}

impl ReportSection {
    /// Header, `=` underline of the same width, one line per row, then a
    /// blank separator line.
    #[must_use]
    pub fn render(&self) -> String {
        let underline = "=".repeat(self.header.chars().count());
        let mut rendered = format!("{}\n{underline}\n", self.header);
        for line in &self.lines {
            rendered.push_str(line);
            rendered.push('\n');
        }
        rendered.push('\n');
        rendered
    }
}

#[must_use]
pub fn articles_section(rows: &[ArticleViews], limit: usize) -> ReportSection {
    let noun = if limit == 1 { "article" } else { "articles" };
    ReportSection {
        header: format!(
            "The {} most popular {noun} of all time:",
            count_word(limit)
        ),
        lines: rows
            .iter()
            .map(|row| {
                format!(
                    "* \"{}\" -- {} views",
                    row.title,
                    format_thousands(row.views)
                )
            })
            .collect(),
    }
}

#[must_use]
pub fn authors_section(rows: &[AuthorViews]) -> ReportSection {
    ReportSection {
        header: "The most popular article authors of all time:".to_string(),
        lines: rows
            .iter()
            .map(|row| format!("* {} -- {} views", row.name, format_thousands(row.views)))
            .collect(),
    }
}

pub fn error_days_section(rows: &[ErrorDay], threshold: f64) -> Result<ReportSection> {
    let lines = rows
        .iter()
        .map(|row| -> Result<String> {
            Ok(format!(
                "* {} -- {} errors",
                format_report_date(row.date)?,
                format_percent(row.error_rate)
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ReportSection {
        header: format!(
            "Days on which more than {}% of requests lead to errors:",
            format_threshold(threshold)
        ),
        lines,
    })
}

#[must_use]
pub fn render_report(sections: &[ReportSection]) -> String {
    sections.iter().map(ReportSection::render).collect()
}

/// `1234567` becomes `1,234,567`.
#[must_use]
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// A ratio rendered as a percentage with two decimals: `0.0123` is `1.23%`.
#[must_use]
pub fn format_percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// Shortest rendering with at least four decimals that does not collapse a
/// positive threshold to `0`.
fn format_threshold(ratio: f64) -> String {
    let percent = ratio * 100.0;
    (4..=16)
        .map(|decimals| {
            format!("{percent:.decimals$}")
                .trim_end_matches('0')
                .trim_end_matches('.')
                .to_string()
        })
        .find(|rendered| rendered != "0")
        .unwrap_or_else(|| format!("{percent:e}"))
}

fn count_word(count: usize) -> String {
    COUNT_WORDS
        .get(count)
        .map_or_else(|| count.to_string(), |word| (*word).to_string())
}
