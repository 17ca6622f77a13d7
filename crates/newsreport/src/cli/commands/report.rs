use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::config::{ConfigOverrides, ReportConfig, RuntimeEnv, resolve_report_config};
use crate::queries::{high_error_days, top_articles, top_authors};
use crate::report::{articles_section, authors_section, error_days_section, render_report};
use crate::sqlite::{ensure_top_articles_view, open_news_database};

#[derive(Debug, Clone, Default, Args)]
pub struct ReportArgs {
    /// SQLite database path or `file:` URI [env: NEWSREPORT_DATABASE] [default: news.db]
    #[arg(long, value_name = "PATH")]
    pub database: Option<String>,

    /// Number of articles in the popular-articles section [default: 3]
    #[arg(long, value_name = "N")]
    pub article_limit: Option<usize>,

    /// Share of `404 NOT FOUND` responses a day must exceed [default: 0.01]
    #[arg(long, value_name = "RATE")]
    pub error_threshold: Option<f64>,
}

impl ReportArgs {
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            database: self.database.clone(),
            article_limit: self.article_limit,
            error_threshold: self.error_threshold,
        }
    }
}

pub fn run(args: &ReportArgs, env: &RuntimeEnv) -> Result<()> {
    let config = resolve_report_config(&args.overrides(), env)?;
    let rendered = generate_report(&config)?;
    print!("{rendered}");
    Ok(())
}

/// Prepares the database and builds the full report text. The connection is
/// shared by the setup step and all three queries and closes when this
/// returns, on success or failure.
pub fn generate_report(config: &ReportConfig) -> Result<String> {
    let connection = open_news_database(&config.database)?;

    let setup = ensure_top_articles_view(&connection)?;
    info!(database = %config.database, view_setup = setup.as_str(), "database ready");

    let articles = top_articles(&connection, config.article_limit)?;
    let authors = top_authors(&connection)?;
    let error_days = high_error_days(&connection, config.error_threshold)?;

    Ok(render_report(&[
        articles_section(&articles, config.article_limit),
        authors_section(&authors),
        error_days_section(&error_days, config.error_threshold)?,
    ]))
}
