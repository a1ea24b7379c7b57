#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// How listing pages are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserBackend {
    /// A headless browser driven over the WebDriver protocol.
    WebDriver,
    /// Plain HTTP GET; only useful for pages rendered server-side.
    Http,
}

impl std::fmt::Display for BrowserBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrowserBackend::WebDriver => write!(f, "webdriver"),
            BrowserBackend::Http => write!(f, "http"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// Base URL of the backing store, e.g. `https://abc.supabase.co`.
    pub store_url: String,
    /// Privileged key used for every store request. Never logged.
    pub store_service_key: String,
    pub env: Environment,
    pub log_level: String,
    pub browser_backend: BrowserBackend,
    pub webdriver_url: String,
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub navigation_timeout_secs: u64,
    pub popup_timeout_ms: u64,
    pub card_wait_timeout_secs: u64,
    pub inter_url_delay_min_ms: u64,
    pub inter_url_delay_max_ms: u64,
    /// Category listing pages, processed in this order.
    pub source_urls: Vec<String>,
    pub store_timeout_secs: u64,
    pub http_max_retries: u32,
    pub http_backoff_base_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("store_url", &self.store_url)
            .field("store_service_key", &"[redacted]")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("browser_backend", &self.browser_backend)
            .field("webdriver_url", &self.webdriver_url)
            .field("user_agent", &self.user_agent)
            .field("viewport_width", &self.viewport_width)
            .field("viewport_height", &self.viewport_height)
            .field("navigation_timeout_secs", &self.navigation_timeout_secs)
            .field("popup_timeout_ms", &self.popup_timeout_ms)
            .field("card_wait_timeout_secs", &self.card_wait_timeout_secs)
            .field("inter_url_delay_min_ms", &self.inter_url_delay_min_ms)
            .field("inter_url_delay_max_ms", &self.inter_url_delay_max_ms)
            .field("source_urls", &self.source_urls)
            .field("store_timeout_secs", &self.store_timeout_secs)
            .field("http_max_retries", &self.http_max_retries)
            .field("http_backoff_base_secs", &self.http_backoff_base_secs)
            .finish()
    }
}
