pub mod news;

pub use news::{ArticleViews, AuthorViews, ErrorDay};
