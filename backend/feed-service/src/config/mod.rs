/// Configuration management for Feed Service
///
/// Loaded from environment variables (a `.env` file is read first when present).
use feed_ranking::place::DEFAULT_LOCATION;
use feed_ranking::ranker::DEFAULT_OVER_FETCH_FACTOR;
use feed_ranking::{EngineConfig, RankingWeights};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub ranking: RankingConfig,
    pub geocoding: GeocodingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Upper bound for a single store call
    pub query_timeout_ms: u64,
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

/// Nearby ranking parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    pub weights: RankingWeights,
    pub over_fetch_factor: usize,
}

impl From<&RankingConfig> for EngineConfig {
    fn from(config: &RankingConfig) -> Self {
        EngineConfig {
            weights: config.weights,
            over_fetch_factor: config.over_fetch_factor,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Place name given to geotagged posts when no geocoder answers
    pub fallback_location: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();

        let weights = RankingWeights::new(
            parse_env_or_default("RANKING_RECENCY_WEIGHT", 0.5)?,
            parse_env_or_default("RANKING_POPULARITY_WEIGHT", 0.3)?,
            parse_env_or_default("RANKING_PROXIMITY_WEIGHT", 0.2)?,
        )
        .map_err(|e| e.to_string())?;

        let over_fetch_factor =
            parse_env_or_default("RANKING_OVER_FETCH_FACTOR", DEFAULT_OVER_FETCH_FACTOR)?;
        if over_fetch_factor == 0 {
            return Err("RANKING_OVER_FETCH_FACTOR must be >= 1".to_string());
        }

        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) if app_env.eq_ignore_ascii_case("production") => {
                return Err("DATABASE_URL must be set in production".to_string())
            }
            Err(_) => "postgresql://localhost/nova".to_string(),
        };

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: std::env::var("FEED_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("FEED_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8084),
                json_logs: std::env::var("LOG_FORMAT")
                    .map(|v| v.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
                query_timeout_ms: parse_env_or_default("DATABASE_QUERY_TIMEOUT_MS", 2_000)?,
                run_migrations: std::env::var("DATABASE_RUN_MIGRATIONS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(false),
            },
            ranking: RankingConfig {
                weights,
                over_fetch_factor,
            },
            geocoding: GeocodingConfig {
                fallback_location: std::env::var("GEOCODING_FALLBACK_LOCATION")
                    .unwrap_or_else(|_| DEFAULT_LOCATION.to_string()),
            },
        })
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
