//! Plain-struct configuration, read from `SEMSEARCH_*` environment
//! variables.

#[derive(Debug, Clone)]
pub struct Config {
    pub updater_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            updater_base_url: "http://localhost:8001".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("SEMSEARCH_UPDATER_BASE_URL") {
            config.updater_base_url = v;
        }
        if let Ok(v) = std::env::var("SEMSEARCH_DISPATCH_TIMEOUT_SECS") {
            if let Ok(secs) = v.parse() {
                config.request_timeout_secs = secs;
            }
        }

        config
    }
}
