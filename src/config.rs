use thiserror::Error;
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://api.github.com/";
pub const DEFAULT_AVATAR_SIZE: u32 = 160;
/// Largest avatar GitHub serves.
pub const MAX_AVATAR_SIZE: u32 = 460;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GITHUB_API_URL is not a valid URL: {0}")]
    InvalidApiUrl(#[from] url::ParseError),
    #[error("GITHUB_API_URL must use http or https, got `{0}`")]
    UnsupportedScheme(String),
    #[error("GITHUB_AVATAR_SIZE must be an integer from 1 to 460, got `{0}`")]
    InvalidAvatarSize(String),
}

/// Runtime settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base: Url,
    pub token: Option<String>,
    pub avatar_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL"),
            token: None,
            avatar_size: DEFAULT_AVATAR_SIZE,
        }
    }
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let mut config = Config::default();

        if let Some(raw) = get("GITHUB_API_URL") {
            let mut base = Url::parse(&raw)?;
            if !matches!(base.scheme(), "http" | "https") {
                return Err(ConfigError::UnsupportedScheme(base.scheme().to_owned()));
            }
            // `Url::join` drops the last segment unless the path ends in `/`.
            if !base.path().ends_with('/') {
                let path = format!("{}/", base.path());
                base.set_path(&path);
            }
            config.api_base = base;
        }

        config.token = get("GITHUB_TOKEN");

        if let Some(raw) = get("GITHUB_AVATAR_SIZE") {
            config.avatar_size = raw
                .parse::<u32>()
                .ok()
                .filter(|size| (1..=MAX_AVATAR_SIZE).contains(size))
                .ok_or(ConfigError::InvalidAvatarSize(raw))?;
        }

        Ok(config)
    }
}
