use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Database (in-memory store when unset)
    pub database_url: Option<String>,

    // Admin
    pub admin_session_token: Option<String>,

    // Locales
    pub default_locale: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: match std::env::var("PORT") {
                Ok(port) => port.parse().context("PORT must be a valid port number")?,
                Err(_) => 8080,
            },

            database_url: non_empty_var("DATABASE_URL"),

            // Admin - token presented as the admin_session cookie or Bearer header
            admin_session_token: non_empty_var("ADMIN_SESSION_TOKEN"),

            default_locale: std::env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "en".to_string()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: None,
            admin_session_token: None,
            default_locale: "en".to_string(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
