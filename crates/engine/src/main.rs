//! Bowldraw Engine - Main entry point.

use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bowldraw_engine::api;
use bowldraw_engine::infrastructure::settings::EngineSettings;
use bowldraw_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary may run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Logs go to stderr; stdout belongs to the terminal screens
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bowldraw_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Bowldraw Engine");

    let app = App::with_system_ports(EngineSettings::from_env());
    tracing::info!(
        tick_interval_ms = app.settings.timing.tick_interval.as_millis() as u64,
        duration_ms = app.settings.timing.duration.as_millis() as u64,
        league = %app.settings.league_name,
        min_score = %app.settings.min_score,
        "Settings loaded"
    );

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    api::run(&app, stdin, stdout).await?;

    tracing::info!("Bowldraw Engine stopped");
    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
