use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_MS: u64 = 45_000;
const DEFAULT_SITE_URL: &str = "http://localhost";
const DEFAULT_APP_NAME: &str = "Candidate Evaluator Service";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub llm: LlmSettings,
}

/// Settings for the chat-completion backend.
///
/// `api_key` may be absent at startup; evaluations then fail with a
/// configuration error instead of the process refusing to boot.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub timeout_ms: u64,
    pub site_url: String,
    pub app_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)
                .context("PORT must be a valid port number")?,
            rust_log: or_default("RUST_LOG", "info"),
            llm: LlmSettings {
                api_key: lookup("OPENROUTER_API_KEY").filter(|k| !k.trim().is_empty()),
                api_url: or_default("OPENROUTER_API_URL", DEFAULT_API_URL),
                model: or_default("OPENROUTER_MODEL", DEFAULT_MODEL),
                timeout_ms: parse_or(&lookup, "OPENROUTER_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)
                    .context("OPENROUTER_TIMEOUT_MS must be a whole number of milliseconds")?,
                site_url: or_default("OPENROUTER_SITE_URL", DEFAULT_SITE_URL),
                app_name: or_default("OPENROUTER_APP_NAME", DEFAULT_APP_NAME),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value '{raw}' for '{key}'")),
        None => Ok(default),
    }
}
