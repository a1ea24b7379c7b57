use crate::app_config::{AppConfig, BrowserBackend, Environment};
use crate::ConfigError;

/// Category listing pages crawled when `TOURS_SOURCE_URLS` is not set.
pub const DEFAULT_SOURCE_URLS: &[&str] = &[
    "https://www.tripadvisor.com/Attractions-g293996-Activities-c42-Bahrain.html",
    "https://www.tripadvisor.com/Attractions-g293996-Activities-c42-t206-Bahrain.html",
    "https://www.tripadvisor.com/Attractions-g293996-Activities-c42-t11913-Bahrain.html",
    "https://www.tripadvisor.com/Attractions-g293996-Activities-c42-t21913-Bahrain.html",
    "https://www.tripadvisor.com/Attractions-g293996-Activities-c63-Bahrain.html",
];

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let store_url = require("SUPABASE_URL")?;
    let store_service_key = require("SUPABASE_SERVICE_ROLE_KEY")?;
    if !is_http_url(&store_url) {
        return Err(ConfigError::InvalidEnvVar {
            var: "SUPABASE_URL".to_string(),
            reason: format!("expected an http(s) URL, got \"{store_url}\""),
        });
    }

    let env = parse_environment(&or_default("TOURS_ENV", "development"))?;
    let log_level = or_default("TOURS_LOG_LEVEL", "info");
    let browser_backend = parse_browser_backend(&or_default("TOURS_BROWSER_BACKEND", "webdriver"))?;
    let webdriver_url = or_default("TOURS_WEBDRIVER_URL", "http://localhost:9515");
    let user_agent = or_default("TOURS_USER_AGENT", DEFAULT_USER_AGENT);

    let viewport_width = parse_u32("TOURS_VIEWPORT_WIDTH", "1920")?;
    let viewport_height = parse_u32("TOURS_VIEWPORT_HEIGHT", "1080")?;
    let navigation_timeout_secs = parse_u64("TOURS_NAVIGATION_TIMEOUT_SECS", "60")?;
    let popup_timeout_ms = parse_u64("TOURS_POPUP_TIMEOUT_MS", "3000")?;
    let card_wait_timeout_secs = parse_u64("TOURS_CARD_WAIT_TIMEOUT_SECS", "10")?;

    let inter_url_delay_min_ms = parse_u64("TOURS_INTER_URL_DELAY_MIN_MS", "3000")?;
    let inter_url_delay_max_ms = parse_u64("TOURS_INTER_URL_DELAY_MAX_MS", "6000")?;
    if inter_url_delay_min_ms > inter_url_delay_max_ms {
        return Err(ConfigError::InvalidEnvVar {
            var: "TOURS_INTER_URL_DELAY_MIN_MS".to_string(),
            reason: format!(
                "minimum delay {inter_url_delay_min_ms}ms exceeds maximum {inter_url_delay_max_ms}ms"
            ),
        });
    }

    let source_urls = match lookup("TOURS_SOURCE_URLS") {
        Ok(raw) => parse_source_urls(&raw)?,
        Err(_) => DEFAULT_SOURCE_URLS.iter().map(|s| (*s).to_string()).collect(),
    };

    let store_timeout_secs = parse_u64("TOURS_STORE_TIMEOUT_SECS", "30")?;
    let http_max_retries = parse_u32("TOURS_HTTP_MAX_RETRIES", "2")?;
    let http_backoff_base_secs = parse_u64("TOURS_HTTP_BACKOFF_BASE_SECS", "2")?;

    Ok(AppConfig {
        store_url: store_url.trim_end_matches('/').to_string(),
        store_service_key,
        env,
        log_level,
        browser_backend,
        webdriver_url,
        user_agent,
        viewport_width,
        viewport_height,
        navigation_timeout_secs,
        popup_timeout_ms,
        card_wait_timeout_secs,
        inter_url_delay_min_ms,
        inter_url_delay_max_ms,
        source_urls,
        store_timeout_secs,
        http_max_retries,
        http_backoff_base_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TOURS_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

fn parse_browser_backend(s: &str) -> Result<BrowserBackend, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "webdriver" => Ok(BrowserBackend::WebDriver),
        "http" => Ok(BrowserBackend::Http),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TOURS_BROWSER_BACKEND".to_string(),
            reason: format!("expected \"webdriver\" or \"http\", got \"{other}\""),
        }),
    }
}

/// Splits a comma-separated URL list, dropping blank entries.
fn parse_source_urls(raw: &str) -> Result<Vec<String>, ConfigError> {
    let urls: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if urls.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "TOURS_SOURCE_URLS".to_string(),
            reason: "no URLs given".to_string(),
        });
    }
    if let Some(bad) = urls.iter().find(|u| !is_http_url(u)) {
        return Err(ConfigError::InvalidEnvVar {
            var: "TOURS_SOURCE_URLS".to_string(),
            reason: format!("not an http(s) URL: \"{bad}\""),
        });
    }
    Ok(urls)
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("https://") || s.starts_with("http://")
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
