use std::time::Duration;

/// Runtime settings, read from the environment (and `.env`) at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub fetch_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
    pub max_download_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            fetch_timeout_secs: 10,
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
            body_limit_bytes: 1024 * 1024,
            max_download_bytes: 20 * 1024 * 1024,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_or("PORT", defaults.port),
            fetch_timeout_secs: env_or("FETCH_TIMEOUT_SECS", defaults.fetch_timeout_secs),
            connect_timeout_secs: env_or("CONNECT_TIMEOUT_SECS", defaults.connect_timeout_secs),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            body_limit_bytes: env_or("BODY_LIMIT_BYTES", defaults.body_limit_bytes),
            max_download_bytes: env_or("MAX_DOWNLOAD_BYTES", defaults.max_download_bytes),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparseable_values_fall_back() {
        std::env::set_var("QRPOSTER_TEST_PORT", "not-a-port");
        assert_eq!(env_or("QRPOSTER_TEST_PORT", 8080u16), 8080);
        std::env::set_var("QRPOSTER_TEST_PORT", "9000");
        assert_eq!(env_or("QRPOSTER_TEST_PORT", 8080u16), 9000);
        assert_eq!(env_or("QRPOSTER_TEST_UNSET", 7u64), 7);
    }
}
