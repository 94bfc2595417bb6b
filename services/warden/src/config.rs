//! Service configuration.
//!
//! # Purpose
//! Reads settings from the environment (optionally seeded from a `.env` file)
//! and applies an optional YAML override named by `WARDEN_CONFIG`.
//!
//! # Notes
//! Variables already present in the environment win over `.env` entries.
use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use warden_store::MongoConfig;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MODEL_PATH: &str = "config/model_policy.conf";
pub const DEFAULT_ENV_FILE: &str = ".env";

#[derive(Debug, Parser)]
#[command(name = "warden", version, about = "RBAC-gated HTTP service backed by a MongoDB policy store")]
pub struct Cli {
    /// Also append logs to this file.
    #[arg(long = "log-path", env = "LOG_PATH")]
    pub log_path: Option<PathBuf>,
    /// Load environment defaults from this file instead of `.env`.
    #[arg(long = "env-file")]
    pub env_file: Option<PathBuf>,
}

/// Where the enforcer keeps its rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyBackend {
    MongoDb,
    Memory,
}

impl PolicyBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyBackend::MongoDb => "mongodb",
            PolicyBackend::Memory => "memory",
        }
    }
}

impl fmt::Display for PolicyBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(PolicyBackend::MongoDb),
            "memory" => Ok(PolicyBackend::Memory),
            other => bail!("unknown policy backend: {other}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub mongo: MongoConfig,
    /// `None` selects the embedded model.
    pub model_path: Option<PathBuf>,
    pub backend: PolicyBackend,
    pub metrics_port: Option<u16>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            mongo: MongoConfig::default(),
            model_path: Some(PathBuf::from(DEFAULT_MODEL_PATH)),
            backend: PolicyBackend::MongoDb,
            metrics_port: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AppConfigOverride {
    port: Option<u16>,
    db_url: Option<String>,
    db_name: Option<String>,
    db_collection: Option<String>,
    model_path: Option<String>,
    backend: Option<String>,
    metrics_port: Option<u16>,
}

impl AppConfig {
    /// Load `.env`, read the environment, then apply `WARDEN_CONFIG`.
    ///
    /// # Errors
    /// - A missing explicitly named env file.
    /// - Unparseable values or an unreadable override file.
    pub fn load(env_file: Option<&Path>) -> Result<Self> {
        load_env_file(env_file)?;
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("WARDEN_CONFIG") {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("read WARDEN_CONFIG: {path}"))?;
            config.apply_yaml(&contents)?;
        }
        Ok(config)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(value) = lookup("APP_PORT") {
            config.port = value.trim().parse().with_context(|| "parse APP_PORT")?;
        }
        if let Some(value) = lookup("DB_URL") {
            config.mongo.url = value;
        }
        if let Some(value) = lookup("DB_NAME") {
            config.mongo.database = value;
        }
        if let Some(value) = lookup("DB_COLLECTION") {
            config.mongo.collection = value;
        }
        if let Some(value) = lookup("MODEL_PATH") {
            config.model_path = model_path(&value);
        }
        if let Some(value) = lookup("POLICY_BACKEND") {
            config.backend = value.parse()?;
        }
        if let Some(value) = lookup("METRICS_PORT") {
            config.metrics_port = Some(value.trim().parse().with_context(|| "parse METRICS_PORT")?);
        }
        Ok(config)
    }

    fn apply_yaml(&mut self, contents: &str) -> Result<()> {
        let override_cfg: AppConfigOverride =
            serde_yaml::from_str(contents).with_context(|| "parse warden config yaml")?;
        if let Some(value) = override_cfg.port {
            self.port = value;
        }
        if let Some(value) = override_cfg.db_url {
            self.mongo.url = value;
        }
        if let Some(value) = override_cfg.db_name {
            self.mongo.database = value;
        }
        if let Some(value) = override_cfg.db_collection {
            self.mongo.collection = value;
        }
        if let Some(value) = override_cfg.model_path {
            self.model_path = model_path(&value);
        }
        if let Some(value) = override_cfg.backend {
            self.backend = value.parse()?;
        }
        if let Some(value) = override_cfg.metrics_port {
            self.metrics_port = Some(value);
        }
        Ok(())
    }
}

fn model_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    (!value.is_empty()).then(|| PathBuf::from(value))
}

fn load_env_file(explicit: Option<&Path>) -> Result<()> {
    if let Some(path) = explicit {
        dotenvy::from_path(path).with_context(|| format!("load env file {}", path.display()))?;
        tracing::info!(path = %path.display(), "loaded env file");
        return Ok(());
    }
    match dotenvy::from_path(DEFAULT_ENV_FILE) {
        Ok(()) => {
            tracing::info!(path = DEFAULT_ENV_FILE, "loaded env file");
            Ok(())
        }
        Err(err) if err.not_found() => {
            tracing::info!(path = DEFAULT_ENV_FILE, "no env file, using environment only");
            Ok(())
        }
        Err(err) => Err(err).with_context(|| format!("load env file {DEFAULT_ENV_FILE}")),
    }
}
