// Application configuration, loaded from environment variables.

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database URL (SQLite connection string).
    pub database_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `DATABASE_URL` - SQLite connection string
    ///   (default: `sqlite:padel.db?mode=rwc`)
    pub fn load() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:padel.db?mode=rwc".to_string());
        Config { database_url }
    }
}
