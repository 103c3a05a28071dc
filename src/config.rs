use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub enable_tracing: bool,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// Simulation cadence. The UI animates on the 4-second default; shorten
/// it only for tests.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SimulationConfig {
    pub tick_interval_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 4_000,
        }
    }
}

/// AI upstream settings. The key itself stays in the environment.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AiConfig {
    pub model: String,
    pub api_key_env: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }
}
