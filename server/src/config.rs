use dotenv::dotenv;

const DEFAULT_MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub host: String,
    pub port: u16,
    pub max_image_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: "bvb_stats.db".into(),
            host: "127.0.0.1".into(),
            port: 8000,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl Config {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> Config {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let database_path = lookup("DATABASE_PATH").unwrap_or(defaults.database_path);
        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parse_or(lookup("PORT"), "PORT", defaults.port);
        let max_image_bytes = parse_or(
            lookup("MAX_IMAGE_BYTES"),
            "MAX_IMAGE_BYTES",
            defaults.max_image_bytes,
        );

        Config {
            database_path,
            host,
            port,
            max_image_bytes,
        }
    }

    /// Request body cap: a base64 image of `max_image_bytes` plus headroom
    /// for the surrounding JSON.
    pub fn body_limit(&self) -> usize {
        self.max_image_bytes / 3 * 4 + 64 * 1024
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr + Copy>(raw: Option<String>, key: &str, default: T) -> T {
    match raw {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            log::warn!("ignoring unparsable {}={:?}", key, value);
            default
        }),
        None => default,
    }
}
