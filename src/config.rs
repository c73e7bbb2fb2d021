use std::env;

use crate::xmlrpc::decoding::{DecodeOptions, DEFAULT_MAX_DEPTH};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:1237";
pub const BACKEND_URL_VAR: &str = "XRB_BACKEND_URL";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub backend_url: String,
    pub max_depth: usize,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            verbose: false,
        }
    }
}

impl Config {
    /// Defaults, with the backend URL taken from `XRB_BACKEND_URL` when set.
    pub fn from_env() -> Config {
        let mut config = Config::default();
        if let Ok(url) = env::var(BACKEND_URL_VAR) {
            if !url.is_empty() {
                config.backend_url = url;
            }
        }
        config
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::new(self.max_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, DEFAULT_BACKEND_URL};

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(DEFAULT_BACKEND_URL, config.backend_url);
        assert_eq!(256, config.decode_options().max_depth);
        assert!(!config.verbose);
    }
}
