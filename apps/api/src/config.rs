use anyhow::{bail, Context, Result};

/// Everything the API reads from the process environment, loaded and
/// validated once at boot. A missing or malformed value fails fast here
/// rather than surfacing as a confusing error mid-request.
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,

    pub bearer_secret: Vec<u8>,
    pub bearer_ttl_seconds: i64,

    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,

    pub payment_provider_key_id: String,
    pub payment_provider_secret: String,
    pub webhook_secret: Vec<u8>,
    pub plan_ids: Vec<String>,

    pub frontend_origin: String,
    pub internal_network_name: String,
    pub workspace_image: String,

    pub default_cpu_quota: f64,
    pub default_memory_bytes: i64,

    pub rate_limit_auth_burst: u32,
    pub rate_limit_auth_period_secs: u64,
    pub rate_limit_api_burst: u32,
    pub rate_limit_api_period_secs: u64,
    pub rate_limit_lifecycle_burst: u32,
    pub rate_limit_lifecycle_period_secs: u64,
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} must be set"))
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn optional_parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| anyhow::anyhow!("{key} is not a valid value")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let bearer_secret = required("BEARER_TOKEN_SECRET")?.into_bytes();
        if bearer_secret.len() < 32 {
            bail!("BEARER_TOKEN_SECRET must be at least 32 bytes");
        }

        let webhook_secret = required("PAYMENT_WEBHOOK_SECRET")?.into_bytes();
        if webhook_secret.is_empty() {
            bail!("PAYMENT_WEBHOOK_SECRET must not be empty");
        }

        let plan_ids: Vec<String> = required("PAYMENT_PLAN_IDS")?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if plan_ids.is_empty() {
            bail!("PAYMENT_PLAN_IDS must list at least one plan id");
        }

        let config = Self {
            port: optional_parsed("PORT", 3000)?,
            database_url: required("DATABASE_URL")?,
            database_max_connections: optional_parsed("DATABASE_MAX_CONNECTIONS", 10)?,

            bearer_secret,
            bearer_ttl_seconds: optional_parsed("BEARER_TOKEN_TTL_SECONDS", 3600)?,

            argon2_memory_kib: optional_parsed("ARGON2_MEMORY_KIB", 19 * 1024)?,
            argon2_iterations: optional_parsed("ARGON2_ITERATIONS", 2)?,

            payment_provider_key_id: required("PAYMENT_PROVIDER_KEY_ID")?,
            payment_provider_secret: required("PAYMENT_PROVIDER_SECRET")?,
            webhook_secret,
            plan_ids,

            frontend_origin: required("FRONTEND_ORIGIN")?,
            internal_network_name: optional("INTERNAL_NETWORK_NAME", "control-plane-workspaces"),
            workspace_image: optional(
                "WORKSPACE_IMAGE",
                control_plane_lifecycle::DEFAULT_WORKSPACE_IMAGE,
            ),

            default_cpu_quota: optional_parsed("DEFAULT_CPU_QUOTA", 1.0)?,
            default_memory_bytes: optional_parsed("DEFAULT_MEMORY_BYTES", 512 * 1024 * 1024)?,

            rate_limit_auth_burst: optional_parsed("RATE_LIMIT_AUTH_BURST", 5)?,
            rate_limit_auth_period_secs: optional_parsed("RATE_LIMIT_AUTH_PERIOD_SECS", 900)?,
            rate_limit_api_burst: optional_parsed("RATE_LIMIT_API_BURST", 100)?,
            rate_limit_api_period_secs: optional_parsed("RATE_LIMIT_API_PERIOD_SECS", 900)?,
            rate_limit_lifecycle_burst: optional_parsed("RATE_LIMIT_LIFECYCLE_BURST", 10)?,
            rate_limit_lifecycle_period_secs: optional_parsed("RATE_LIMIT_LIFECYCLE_PERIOD_SECS", 300)?,
        };

        if config.bearer_ttl_seconds <= 0 {
            bail!("BEARER_TOKEN_TTL_SECONDS must be positive");
        }

        Ok(config)
    }
}
