use serde::Deserialize;

pub const DEFAULT_ADMIN_KEY: &str = "change-this-admin-key";
pub const DEFAULT_DEMO_OTP: &str = "111111";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Postgres URL. When absent the in-memory store is used.
    pub database_url: Option<String>,
    pub port: u16,
    /// Shared secret expected in the `x-admin-key` header.
    pub admin_key: String,
    /// Code every demo verification accepts.
    pub demo_otp: String,
    /// When false, every lead is stored as verified.
    pub require_otp: bool,
    pub body_limit_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            port: 8080,
            admin_key: DEFAULT_ADMIN_KEY.to_string(),
            demo_otp: DEFAULT_DEMO_OTP.to_string(),
            require_otp: true,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let config = Self {
            database_url: std::env::var("DATABASE_URL")
                .or_else(|_| std::env::var("DB_URL"))
                .ok()
                .filter(|url| !url.trim().is_empty())
                .map(|url| {
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })
                .transpose()?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            admin_key: std::env::var("ADMIN_KEY")
                .unwrap_or(defaults.admin_key)
                .pipe_non_blank("ADMIN_KEY")?,
            demo_otp: std::env::var("DEMO_OTP")
                .unwrap_or(defaults.demo_otp)
                .pipe_non_blank("DEMO_OTP")?,
            require_otp: match std::env::var("REQUIRE_OTP") {
                Ok(raw) => parse_flag(&raw).ok_or_else(|| {
                    anyhow::anyhow!("REQUIRE_OTP must be one of true/false/1/0")
                })?,
                Err(_) => defaults.require_otp,
            },
            body_limit_bytes: std::env::var("BODY_LIMIT_BYTES")
                .map(|raw| {
                    raw.parse::<usize>()
                        .map_err(|_| anyhow::anyhow!("BODY_LIMIT_BYTES must be a byte count"))
                })
                .unwrap_or(Ok(defaults.body_limit_bytes))?,
        };

        // Log configuration without secret values
        tracing::info!("Configuration loaded successfully");
        match config.database_url {
            Some(ref url) => tracing::debug!("Database URL: {}", redact_database_url(url)),
            None => tracing::info!("DATABASE_URL not set, using in-memory store"),
        }
        if config.admin_key == DEFAULT_ADMIN_KEY {
            tracing::warn!("ADMIN_KEY is the built-in default, set it before exposing the service");
        }
        if !config.require_otp {
            tracing::info!("OTP checking disabled, leads are stored as verified");
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

trait NonBlank: Sized {
    fn pipe_non_blank(self, name: &str) -> anyhow::Result<Self>;
}

impl NonBlank for String {
    fn pipe_non_blank(self, name: &str) -> anyhow::Result<Self> {
        if self.trim().is_empty() {
            anyhow::bail!("{} cannot be empty", name);
        }
        Ok(self)
    }
}

/// Drops the `user:password@` part of a connection URL.
fn redact_database_url(url: &str) -> String {
    let (scheme, rest) = url.split_once("://").unwrap_or(("", url));
    let (authority, path) = match rest.find('/') {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

    if scheme.is_empty() {
        format!("{}{}", host, path)
    } else {
        format!("{}://{}{}", scheme, host, path)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
