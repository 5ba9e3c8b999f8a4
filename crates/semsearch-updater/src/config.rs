//! Plain-struct configuration, read from `SEMSEARCH_*` environment
//! variables. No CLI flags — addresses and ports are configuration values.

use semsearch_adapters::DEFAULT_DIMENSION;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub snapshot_dir: String,
    pub dimension: usize,
    pub search_base_url: String,
    pub notify_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8001,
            snapshot_dir: "./data".to_string(),
            dimension: DEFAULT_DIMENSION,
            search_base_url: "http://localhost:8002".to_string(),
            notify_timeout_secs: 5,
        }
    }
}

impl Config {
    /// Overlays environment variables onto the defaults. Unset variables
    /// keep their default; malformed numeric variables are ignored (the
    /// default wins) rather than failing startup.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("SEMSEARCH_UPDATER_PORT") {
            if let Ok(port) = v.parse() {
                config.port = port;
            }
        }
        if let Ok(v) = std::env::var("SEMSEARCH_SNAPSHOT_DIR") {
            config.snapshot_dir = v;
        }
        if let Ok(v) = std::env::var("SEMSEARCH_DIMENSION") {
            if let Ok(dim) = v.parse() {
                config.dimension = dim;
            }
        }
        if let Ok(v) = std::env::var("SEMSEARCH_SEARCH_BASE_URL") {
            config.search_base_url = v;
        }
        if let Ok(v) = std::env::var("SEMSEARCH_NOTIFY_TIMEOUT_SECS") {
            if let Ok(secs) = v.parse() {
                config.notify_timeout_secs = secs;
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_expected_ports() {
        let config = Config::default();
        assert_eq!(config.port, 8001);
        assert_eq!(config.dimension, DEFAULT_DIMENSION);
    }
}
