mod config;
mod service;

use config::Config;
use service::HookService;
use tracing::error;

#[tokio::main]
async fn main() {
    // A broken config must not block the prompt; fall back to defaults
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("promptlens-hook: ignoring invalid configuration: {e:#}");
        Config::default()
    });

    // Errors are logged, never surfaced as a non-zero exit
    let hook = HookService::new(config);
    if let Err(e) = hook.run().await {
        error!("Hook failed: {:#}", e);
    }
}
