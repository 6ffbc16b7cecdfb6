use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

/// Argon2id work factor.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        // OWASP minimum for argon2id
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    /// Honor the `role` field sent to `/auth/register`.
    pub allow_self_assigned_role: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60 * 24 * 7),
        };
        let defaults = PasswordConfig::default();
        let password = PasswordConfig {
            memory_kib: env_parse("PASSWORD_MEMORY_KIB").unwrap_or(defaults.memory_kib),
            iterations: env_parse("PASSWORD_ITERATIONS").unwrap_or(defaults.iterations),
            parallelism: env_parse("PASSWORD_PARALLELISM").unwrap_or(defaults.parallelism),
        };
        Ok(Self {
            database_url,
            database_max_connections: env_parse("DATABASE_MAX_CONNECTIONS").unwrap_or(10),
            jwt,
            password,
            allow_self_assigned_role: env_parse("ALLOW_SELF_ASSIGNED_ROLE").unwrap_or(false),
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}
