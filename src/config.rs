use serde::Deserialize;
use std::io::Read;
use std::{
    env,
    fs::File,
    path::{Path, PathBuf},
};
use thiserror::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error {0} when reading config")]
    IoError(#[from] std::io::Error),
    #[error("cannot open config file '{0}' : {1}")]
    OpeningError(PathBuf, std::io::Error),
    #[error("UTF8 format error when reading config")]
    Utf8Error,
    #[error("format error {0} when reading config")]
    FormatError(#[from] serde_yaml::Error),
    #[error("invalid value for {0}: {1}")]
    InvalidEnv(&'static str, String),
}

#[derive(Clone, Deserialize)]
pub struct Listen {
    pub host: Option<String>,
    pub port: u16,
}

#[derive(Clone, Deserialize)]
pub struct StorageConfig {
    pub url: String,
}

#[derive(Clone, Deserialize)]
pub struct HttpConfig {
    pub allowed_origin: String,
}

#[derive(Deserialize)]
pub struct Config {
    pub listen: Listen,
    pub storage: StorageConfig,
    pub http: HttpConfig,
    pub log: Option<crate::log::Log>,
}

impl Config {
    pub fn from_str(s: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(s)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let p = path.as_ref();
        let mut file = File::open(p).map_err(|e| ConfigError::OpeningError(p.to_owned(), e))?;
        let mut contents = vec![];
        file.read_to_end(&mut contents)?;
        let contents = String::from_utf8(contents).map_err(|_| ConfigError::Utf8Error)?;
        let config = Config::from_str(&contents)?;
        Ok(config)
    }

    /// Environment-variable configuration with development convenience
    /// defaults only.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("TASKBOARD_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidEnv("TASKBOARD_PORT", value))?,
            Err(_) => 5000,
        };
        Ok(Self {
            listen: Listen {
                host: env::var("TASKBOARD_HOST").ok(),
                port,
            },
            storage: StorageConfig {
                url: env::var("TASKBOARD_STORAGE_URL")
                    .unwrap_or_else(|_| "sqlite://taskboard.db".to_string()),
            },
            http: HttpConfig {
                allowed_origin: env::var("TASKBOARD_ALLOWED_ORIGIN")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            },
            log: None,
        })
    }

    /// A config file named by TASKBOARD_CONFIG wins over plain environment
    /// variables.
    pub fn load() -> Result<Self, ConfigError> {
        match env::var("TASKBOARD_CONFIG") {
            Ok(path) => Config::from_file(path),
            Err(_) => Config::from_env(),
        }
    }
}

pub mod testdata {
    use super::Config;

    #[allow(dead_code)]
    pub fn test_config() -> Config {
        Config::from_str(
            r#"
        log:
            level: trace
            structured: false
        storage:
            url: "memory://"
        listen:
            port: 5000
        http:
            allowed_origin: "http://localhost:3000"
        "#,
        )
        .unwrap()
    }
}
