use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub app_secret: String,
    pub port: u16,
    pub host: String,
    pub allowed_origins: Vec<String>,

    // Vote marker cookie
    pub cookie_secure: bool,
    pub cookie_path: String,

    // Anti-forgery tokens
    pub nonce_ttl_hours: i64,

    // Votes per client address per hour, 0 disables the limit
    pub vote_rate_limit: u32,
    // Take the client address from X-Forwarded-For / X-Real-IP. Only safe
    // behind a proxy that overwrites them.
    pub trust_proxy_headers: bool,

    // Prefix used when the widget links back to the vote endpoint
    pub public_base_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").ok(),
            redis_url: env::var("REDIS_URL").ok(),
            app_secret: env::var("APP_SECRET")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            cookie_path: env::var("COOKIE_PATH").unwrap_or_else(|_| "/".to_string()),
            nonce_ttl_hours: env::var("NONCE_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|hours: &i64| *hours > 0)
                .unwrap_or(24),
            vote_rate_limit: env::var("VOTE_RATE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            trust_proxy_headers: env::var("TRUST_PROXY_HEADERS")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            public_base_path: env::var("PUBLIC_BASE_PATH")
                .unwrap_or_default()
                .trim_end_matches('/')
                .to_string(),
        })
    }

    /// Configuration for in-process use: no database, no Redis.
    pub fn in_memory(app_secret: &str) -> Self {
        Self {
            database_url: None,
            redis_url: None,
            app_secret: app_secret.to_string(),
            port: 3000,
            host: "127.0.0.1".to_string(),
            allowed_origins: vec!["http://localhost:3000".to_string()],
            cookie_secure: false,
            cookie_path: "/".to_string(),
            nonce_ttl_hours: 24,
            vote_rate_limit: 0,
            trust_proxy_headers: false,
            public_base_path: String::new(),
        }
    }

    pub fn vote_endpoint(&self) -> String {
        format!("{}/api/votes", self.public_base_path)
    }
}
