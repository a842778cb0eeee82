use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub frontend_url: Option<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub s3_bucket: String,
    pub aws_region: String,
    pub label_rules_path: Option<PathBuf>,
    pub catalog_seed_path: Option<PathBuf>,
    pub detector: DetectorSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectorSettings {
    pub max_labels: i32,
    pub min_confidence: f32,
    pub timeout: Duration,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            max_labels: 10,
            min_confidence: 70.0,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Loads `.env.{ENVIRONMENT}` and then `.env` into the process environment.
/// Variables that are already set are never overridden.
pub fn load_dotenv() {
    let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
    let env_file = format!(".env.{}", environment);
    match dotenv::from_filename(&env_file) {
        Ok(_) => log::info!("Loaded environment file {}", env_file),
        Err(_) => log::debug!("No {} file found", env_file),
    }
    dotenv::dotenv().ok();
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let s3_bucket = get("S3_BUCKET_NAME").ok_or(ConfigError::Missing("S3_BUCKET_NAME"))?;
        let defaults = DetectorSettings::default();

        Ok(Self {
            port: parse_or(get("PORT"), "PORT", 8081)?,
            frontend_url: get("FRONTEND_URL"),
            database_url: get("DATABASE_URL")
                .unwrap_or_else(|| "sqlite:animal_lens.db".to_string()),
            db_max_connections: parse_or(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 5)?,
            s3_bucket,
            aws_region: get("AWS_REGION").unwrap_or_else(|| "ap-northeast-2".to_string()),
            label_rules_path: get("LABEL_RULES_PATH").map(PathBuf::from),
            catalog_seed_path: get("CATALOG_SEED_PATH").map(PathBuf::from),
            detector: DetectorSettings {
                max_labels: parse_or(
                    get("DETECTOR_MAX_LABELS"),
                    "DETECTOR_MAX_LABELS",
                    defaults.max_labels,
                )?,
                min_confidence: parse_or(
                    get("DETECTOR_MIN_CONFIDENCE"),
                    "DETECTOR_MIN_CONFIDENCE",
                    defaults.min_confidence,
                )?,
                timeout: Duration::from_secs(parse_or(
                    get("DETECTOR_TIMEOUT_SECS"),
                    "DETECTOR_TIMEOUT_SECS",
                    defaults.timeout.as_secs(),
                )?),
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
