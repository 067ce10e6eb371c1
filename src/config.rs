use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// PostgreSQL connection URL; items are kept in memory when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// Redis connection URL; provider replies are not cached when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Perplexity API key; only rule-based suggestions are produced when unset
    #[serde(default)]
    pub perplexity_api_key: Option<String>,

    /// Secret for signing bearer tokens; a random one is generated when unset
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Bearer token lifetime in seconds
    #[serde(default = "default_jwt_ttl_secs")]
    pub jwt_ttl_secs: i64,

    /// Perplexity API base URL
    #[serde(default = "default_perplexity_api_url")]
    pub perplexity_api_url: String,

    /// Model used for suggestion requests
    #[serde(default = "default_perplexity_model")]
    pub perplexity_model: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_jwt_ttl_secs() -> i64 {
    crate::services::auth::DEFAULT_TOKEN_TTL_SECS
}

fn default_perplexity_api_url() -> String {
    "https://api.perplexity.ai".to_string()
}

fn default_perplexity_model() -> String {
    "llama-3.1-sonar-small-128k-online".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_iter(std::env::vars())
    }

    /// Load configuration from explicit key/value pairs
    pub fn from_iter<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(
            vars.into_iter().filter(|(_, value)| !value.trim().is_empty()),
        )
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        Ok(config)
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
