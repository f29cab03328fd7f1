use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://safetyos-backend.onrender.com";

/// Main configuration structure for the SafetyOS client
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SafetyOsConfig {
    /// REST backend settings
    pub api: ApiConfig,
    /// Object storage for attachments
    pub storage: StorageConfig,
    /// Where the logged-in user is remembered
    pub session: SessionConfig,
    /// Confined-space board settings
    pub roster: RosterConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Burst capacity
    pub burst: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage service root, e.g. `https://<project>.supabase.co`
    pub url: Option<String>,
    /// Service key sent as a bearer token (can be set via env var)
    pub api_key: Option<String>,
    pub bucket: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RosterConfig {
    pub poll_interval_seconds: u64,
    pub overdue_after_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON lines instead of compact text
    pub json_logs: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 30,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            burst: 20,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            bucket: "permits".to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".safetyos/session.json"),
        }
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 60,
            overdue_after_minutes: 60,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json_logs: false,
        }
    }
}

impl SafetyOsConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (safetyos.toml, .safetyos-rc)
    /// 3. Environment variables (prefixed with SAFETYOS_, sections split by `__`)
    pub fn load() -> Result<Self> {
        let mut files = Vec::new();
        if Path::new("safetyos.toml").exists() {
            files.push(PathBuf::from("safetyos.toml"));
        }
        if Path::new(".safetyos-rc").exists() {
            files.push(PathBuf::from(".safetyos-rc"));
        }
        Self::load_from(&files)
    }

    /// Same layering as [`load`](Self::load) with explicit config files.
    pub fn load_from(files: &[PathBuf]) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        for file in files {
            builder = builder.add_source(File::from(file.as_path()).format(config::FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("SAFETYOS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: SafetyOsConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<SafetyOsConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = SafetyOsConfig::load_env_file();
        SafetyOsConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static SafetyOsConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::debug!("Configuration loaded successfully");
    Ok(())
}
