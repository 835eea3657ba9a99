use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::source::SourceEndpoint;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sources: SourcesConfig,
    pub analysis: AnalysisConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// External record stores. Rider shards are listed in merge priority order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub request_timeout_secs: u64,
    pub auth_token: Option<String>,
    pub rider_shards: Vec<SourceEndpoint>,
    pub operators: Option<SourceEndpoint>,
    pub vehicles: Option<SourceEndpoint>,
    pub routes: Option<SourceEndpoint>,
}

/// Load classification thresholds, as fractions of vehicle capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub default_capacity: u32,
    pub overcrowded_ratio: f64,
    pub underutilized_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub reconcile_on_start: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 15,
            auth_token: None,
            rider_shards: Vec::new(),
            operators: None,
            vehicles: None,
            routes: None,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_capacity: 50,
            overcrowded_ratio: 0.9,
            underutilized_ratio: 0.3,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reconcile_on_start: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional `config` file and environment variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        config = config.add_source(config::File::with_name("config").required(false));

        // e.g. FLEET_SERVER__PORT=8080, FLEET_SOURCES__AUTH_TOKEN=...
        config = config.add_source(
            config::Environment::with_prefix("FLEET")
                .separator("__")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;

        Ok(app_config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.analysis.default_capacity == 0 {
            anyhow::bail!("analysis.default_capacity must be positive");
        }
        if !(0.0..=1.0).contains(&self.analysis.underutilized_ratio)
            || self.analysis.underutilized_ratio > self.analysis.overcrowded_ratio
        {
            anyhow::bail!(
                "analysis ratios must satisfy 0 <= underutilized_ratio <= overcrowded_ratio"
            );
        }
        Ok(())
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl SourcesConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn endpoint_count(&self) -> usize {
        self.rider_shards.len()
            + [&self.operators, &self.vehicles, &self.routes]
                .iter()
                .filter(|endpoint| endpoint.is_some())
                .count()
    }
}
