use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Everything has a development default; `DATABASE_URL` may be left unset to run
/// against the in-memory store.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub admin_username: String,
    pub admin_password: String,
    pub uploads_dir: PathBuf,
    /// Largest accepted upload body, in bytes.
    pub max_file_size: usize,
}

pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            admin_username: env_or("ADMIN_USERNAME", "admin"),
            admin_password: env_or("ADMIN_PASSWORD", "changeme"),
            uploads_dir: PathBuf::from(env_or("UPLOADS_DIR", "./uploads")),
            max_file_size: match std::env::var("MAX_FILE_SIZE") {
                Ok(raw) => raw
                    .parse::<usize>()
                    .with_context(|| format!("MAX_FILE_SIZE must be a byte count, got '{raw}'"))?,
                Err(_) => DEFAULT_MAX_FILE_SIZE,
            },
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
impl Config {
    /// Configuration used by router and handler tests.
    pub fn for_tests(uploads_dir: PathBuf) -> Self {
        Config {
            database_url: None,
            port: 0,
            rust_log: "debug".to_string(),
            admin_username: "admin".to_string(),
            admin_password: "secret".to_string(),
            uploads_dir,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}
