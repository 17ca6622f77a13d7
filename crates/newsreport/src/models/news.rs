use time::Date;

/// One row of the popular-articles report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleViews {
    pub title: String,
    pub views: u64,
}

/// One row of the popular-authors report. `views` is the sum over every
/// article attributed to the author, so authors whose articles were never
/// requested carry `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorViews {
    pub name: String,
    pub views: u64,
}

/// A calendar day whose share of `404 NOT FOUND` responses exceeded the
/// requested threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDay {
    pub date: Date,
    pub total_requests: u64,
    pub not_found_requests: u64,
    pub error_rate: f64,
}

