//! Console Configuration
//!
//! Timing constants and the backend location. The API base URL can be
//! overridden at build time with `SMARTQ_API_URL`.

use leptos_pip::WindowSize;

const DEFAULT_API_URL: &str = "http://localhost:3000/api";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// REST backend root, without trailing slash
    pub api_base_url: String,
    /// Queue refetch period
    pub poll_interval_ms: u32,
    /// Elapsed serving time resolution
    pub tick_interval_ms: u32,
    /// How long a toast stays on screen
    pub toast_ttl_ms: u32,
    pub counter_mirror_size: WindowSize,
    pub monitor_mirror_size: WindowSize,
    /// Page size for the services sidebar
    pub services_page_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            poll_interval_ms: 3000,
            tick_interval_ms: 1000,
            toast_ttl_ms: 3500,
            counter_mirror_size: WindowSize::new(320, 450),
            monitor_mirror_size: WindowSize::new(300, 400),
            services_page_size: 50,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::with_api_url(option_env!("SMARTQ_API_URL"))
    }

    fn with_api_url(url: Option<&str>) -> Self {
        let mut config = Self::default();
        if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        config
    }
}
