use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "banking.db";
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite file holding the `users` table
    pub db_path: PathBuf,
    /// Create the `users` table on startup when it is missing
    pub init_schema: bool,
    /// Fallback filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            init_schema: true,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::resolve(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// The first positional argument wins over `BANK_DB_PATH`.
    pub fn resolve(
        mut args: impl Iterator<Item = String>,
        var: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let defaults = Self::default();

        let db_path = args
            .next()
            .or_else(|| var("BANK_DB_PATH"))
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let init_schema = var("BANK_INIT_SCHEMA")
            .map(|v| parse_flag(&v))
            .unwrap_or(defaults.init_schema);

        let log_filter = var("BANK_LOG").unwrap_or(defaults.log_filter);

        Self {
            db_path,
            init_schema,
            log_filter,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
