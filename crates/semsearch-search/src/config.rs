//! Plain-struct configuration, read from `SEMSEARCH_*` environment
//! variables.

use semsearch_adapters::DEFAULT_DIMENSION;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub snapshot_dir: String,
    pub dimension: usize,
    pub semantic_threshold_default: f32,
    pub hybrid_threshold_default: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8002,
            snapshot_dir: "./data".to_string(),
            dimension: DEFAULT_DIMENSION,
            semantic_threshold_default: 0.3,
            hybrid_threshold_default: 0.45,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("SEMSEARCH_SEARCH_PORT") {
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

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_expected_ports_and_thresholds() {
        let config = Config::default();
        assert_eq!(config.port, 8002);
        assert_eq!(config.semantic_threshold_default, 0.3);
        assert_eq!(config.hybrid_threshold_default, 0.45);
    }
}
