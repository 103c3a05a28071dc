//! perkpulse server entry point.
//!
//! Loads the environment's YAML config, wires the service graph and
//! serves the gateway until shutdown. All state is in-process; a restart
//! starts clean from the seed dataset.

use std::sync::Arc;

use perkpulse::AppState;
use perkpulse::config::AppConfig;
use perkpulse::logging;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--env" && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

#[tokio::main]
async fn main() {
    let env = get_env();
    let config = AppConfig::load(&env);
    let _guard = logging::init_logging(&config);

    println!("🎁 perkpulse v{} ({})", env!("CARGO_PKG_VERSION"), env);
    tracing::info!(env = %env, "starting perkpulse");

    let state = Arc::new(AppState::from_config(&config));
    perkpulse::gateway::run_server(state, &config).await;
}
