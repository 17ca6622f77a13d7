use clap::Parser;

use super::commands::report::ReportArgs;

#[derive(Debug, Parser)]
#[command(
    name = "newsreport",
    version,
    about = "Popular articles, popular authors, and high-error days from the news database"
)]
pub struct Cli {
    #[command(flatten)]
    pub report: ReportArgs,
}
