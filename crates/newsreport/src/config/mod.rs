use std::fmt;
use std::path::{Component, Path, PathBuf};

use anyhow::Result;

pub const DEFAULT_DATABASE: &str = "news.db";
pub const DATABASE_ENV_VAR: &str = "NEWSREPORT_DATABASE";
pub const DEFAULT_ARTICLE_LIMIT: usize = 3;
pub const DEFAULT_ERROR_THRESHOLD: f64 = 0.01;

const SQLITE_URI_PREFIX: &str = "file:";

/// Where the news database lives: a filesystem path, or an SQLite `file:`
/// URI passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Path(PathBuf),
    Uri(String),
}

impl DatabaseTarget {
    #[must_use]
    pub fn location(&self) -> &Path {
        match self {
            Self::Path(path) => path,
            Self::Uri(uri) => Path::new(uri),
        }
    }
}

impl fmt::Display for DatabaseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Uri(uri) => f.write_str(uri),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub database: DatabaseTarget,
    pub article_limit: usize,
    pub error_threshold: f64,
}

/// Values taken from the command line; `None` falls through to the
/// environment and then to the defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub database: Option<String>,
    pub article_limit: Option<usize>,
    pub error_threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeEnv {
    pub home_dir: Option<PathBuf>,
    pub cwd: PathBuf,
    pub database: Option<String>,
}

impl RuntimeEnv {
    pub fn from_process() -> Result<Self> {
        Ok(Self {
            home_dir: std::env::var_os("HOME").map(PathBuf::from),
            cwd: std::env::current_dir()?,
            database: std::env::var(DATABASE_ENV_VAR)
                .ok()
                .filter(|value| !value.trim().is_empty()),
        })
    }
}

#[derive(Debug)]
pub struct ConfigFailure {
    pub message: String,
}

impl ConfigFailure {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration: {}", self.message)
    }
}

impl std::error::Error for ConfigFailure {}

pub fn resolve_report_config(
    overrides: &ConfigOverrides,
    env: &RuntimeEnv,
) -> Result<ReportConfig> {
    let article_limit = overrides.article_limit.unwrap_or(DEFAULT_ARTICLE_LIMIT);
    if article_limit == 0 {
        return Err(ConfigFailure::new("article limit must be greater than zero").into());
    }

    let error_threshold = overrides
        .error_threshold
        .unwrap_or(DEFAULT_ERROR_THRESHOLD);
    if error_threshold.is_nan() || error_threshold <= 0.0 || error_threshold >= 1.0 {
        return Err(ConfigFailure::new(format!(
            "error threshold must be between 0 and 1 (exclusive), got {error_threshold}"
        ))
        .into());
    }

    let raw_database = overrides
        .database
        .as_deref()
        .or(env.database.as_deref())
        .unwrap_or(DEFAULT_DATABASE);
    let database = resolve_database_target(raw_database, env)?;

    Ok(ReportConfig {
        database,
        article_limit,
        error_threshold,
    })
}

fn resolve_database_target(raw: &str, env: &RuntimeEnv) -> Result<DatabaseTarget> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConfigFailure::new("database must not be empty").into());
    }
    if raw.starts_with(SQLITE_URI_PREFIX) {
        return Ok(DatabaseTarget::Uri(raw.to_string()));
    }
    if !env.cwd.is_absolute() {
        return Err(ConfigFailure::new(format!(
            "cwd must be absolute: {}",
            env.cwd.display()
        ))
        .into());
    }

    let expanded = expand_tilde(Path::new(raw), env.home_dir.as_deref())?;
    let resolved = if expanded.is_absolute() {
        expanded
    } else {
        env.cwd.join(expanded)
    };

    Ok(DatabaseTarget::Path(normalize_lexical(&resolved)))
}

fn expand_tilde(path: &Path, home_dir: Option<&Path>) -> Result<PathBuf> {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => {
            let Some(home_dir) = home_dir else {
                return Err(ConfigFailure::new(format!(
                    "HOME is not set; cannot expand {}",
                    path.display()
                ))
                .into());
            };
            let mut expanded = home_dir.to_path_buf();
            for component in components {
                expanded.push(component.as_os_str());
            }
            Ok(expanded)
        }
        Some(Component::Normal(first))
            if first
                .to_str()
                .is_some_and(|segment| segment.starts_with('~')) =>
        {
            Err(ConfigFailure::new(format!(
                "unsupported home expansion syntax (only `~` and `~/...` are supported): {}",
                path.display()
            ))
            .into())
        }
        _ => Ok(path.to_path_buf()),
    }
}

fn normalize_lexical(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component.as_os_str());
                }
            }
            _ => normalized.push(component.as_os_str()),
        }
    }

    normalized
}
