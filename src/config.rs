use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use crate::constants::{COCKTAILDB_URL, DEEPL_URL, GEMINI_URL, OPENAI_URL};

const DEFAULT_JWT_SECRET: &str = "your_secret_key";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub deepl_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub image_dir: PathBuf,
    pub cocktaildb_url: String,
    pub deepl_url: String,
    pub openai_url: String,
    pub gemini_url: String,
}

#[derive(Debug, PartialEq)]
pub struct ConfigError(pub String);

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::info!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url =
            var("DATABASE_URL").ok_or_else(|| ConfigError(String::from("DATABASE_URL must be set")))?;

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            log::warn!("JWT_SECRET not set, using the insecure default");
            DEFAULT_JWT_SECRET.to_string()
        });

        Ok(Self {
            port: try_load(&var, "PORT", "3001")?,
            database_url,
            redis_url: var("REDIS_URL"),
            jwt_secret,
            deepl_api_key: var("DEEPL_API_KEY"),
            openai_api_key: var("OPENAI_API_KEY"),
            google_api_key: var("GOOGLE_API_KEY"),
            image_dir: PathBuf::from(var("IMAGE_DIR").unwrap_or_else(|| String::from("public/images"))),
            cocktaildb_url: base_url(&var, "COCKTAILDB_URL", COCKTAILDB_URL),
            deepl_url: base_url(&var, "DEEPL_URL", DEEPL_URL),
            openai_url: base_url(&var, "OPENAI_URL", OPENAI_URL),
            gemini_url: base_url(&var, "GEMINI_URL", GEMINI_URL),
        })
    }
}

fn base_url<F>(var: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    var(key)
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

fn try_load<F, T>(var: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|| {
            log::info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| ConfigError(format!("Invalid {key} value: {e}")))
}

/// Logs at `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    if let Err(e) = simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()
    {
        eprintln!("Logger already initialised: {e}");
    }
}
