use std::env;
use std::str::FromStr;

pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017/meditation";
pub const SESSION_COOKIE: &str = "meditation_session";
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;
pub const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Where sessions and users are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub storage: StorageBackend,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub session_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Reads configuration from the environment (call `dotenv()` first).
    pub fn from_env() -> Result<Self, String> {
        let storage = match var_or("STORAGE_BACKEND", "mongo").to_lowercase().as_str() {
            "mongo" | "mongodb" => StorageBackend::Mongo,
            "memory" => StorageBackend::Memory,
            other => return Err(format!("Invalid STORAGE_BACKEND: {}. Supported: mongo, memory", other)),
        };

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            log::warn!("⚠️  JWT_SECRET not set, using development secret");
            "default-secret-change-me".to_string()
        });

        let allowed_origins = var_or("ALLOWED_ORIGINS", "http://localhost:3000,http://127.0.0.1:3000")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let config = Self {
            host: var_or("HOST", "0.0.0.0"),
            port: parse_var("PORT", 3000)?,
            mongodb_uri: var_or("MONGODB_URI", DEFAULT_MONGODB_URI),
            storage,
            jwt_secret,
            jwt_issuer: var_or("JWT_ISSUER", "meditation-service"),
            jwt_audience: var_or("JWT_AUDIENCE", "meditation-app"),
            session_ttl_hours: parse_var("SESSION_TTL_HOURS", 24 * 30)?,
            bcrypt_cost: parse_var("BCRYPT_COST", 12)?,
            allowed_origins,
        };
        config.validate()?;
        Ok(config)
    }

    /// Range checks for values that only fail once a request uses them
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.session_ttl_hours) {
            return Err(format!(
                "Invalid SESSION_TTL_HOURS: {}. Expected 1..={}",
                self.session_ttl_hours, MAX_SESSION_TTL_HOURS
            ));
        }
        if !BCRYPT_COST_RANGE.contains(&self.bcrypt_cost) {
            return Err(format!(
                "Invalid BCRYPT_COST: {}. Expected {}..={}",
                self.bcrypt_cost,
                BCRYPT_COST_RANGE.start(),
                BCRYPT_COST_RANGE.end()
            ));
        }
        Ok(())
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("Invalid value for {}: {}", key, raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl AppConfig {
    /// Cheap bcrypt cost so handler tests stay fast
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            mongodb_uri: DEFAULT_MONGODB_URI.to_string(),
            storage: StorageBackend::Memory,
            jwt_secret: "test-secret".to_string(),
            jwt_issuer: "meditation-service".to_string(),
            jwt_audience: "meditation-app".to_string(),
            session_ttl_hours: 1,
            bcrypt_cost: 4,
            allowed_origins: vec![],
        }
    }
}
