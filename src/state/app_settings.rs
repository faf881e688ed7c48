use chesscom_api::Title;
use chesscom_api::client::DEFAULT_BASE_URL;
use log::LevelFilter;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub api_base: String,
    pub title: Title,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            api_base: DEFAULT_BASE_URL.to_string(),
            title: Title::default(),
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an environment-like lookup. Unset, blank or
    /// unparseable values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            full_screen: false,
            log_level: get("GMTUI_LOG").and_then(|v| LevelFilter::from_str(v.trim()).ok()),
            api_base: get("GMTUI_API_BASE")
                .map(|v| v.trim().to_string())
                .unwrap_or(defaults.api_base),
            title: get("GMTUI_TITLE")
                .and_then(|v| Title::parse(&v))
                .unwrap_or(defaults.title),
        }
    }
}
