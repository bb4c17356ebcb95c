use core_config::tracing::{init_tracing, install_color_eyre};
use data_controller::{Config, run};
use tracing::info;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    info!(
        name = config.app.name,
        version = config.app.version,
        "Starting data-controller"
    );

    run(config).await
}
