use clap::Parser;
use limit_order_lifecycle::cli::{Cli, Commands};
use limit_order_lifecycle::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    // Initialize telemetry
    let _telemetry = limit_order_lifecycle::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!(config = %cli.config, "Run command");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!(
                "  Orders: max_wait_bars={}, poll_concurrency={}, cancel_concurrency={}",
                config.orders.default_max_wait_bars,
                config.orders.poll_concurrency,
                config.orders.cancel_concurrency
            );
            println!(
                "  Paper: start={} swing={} precision={}/{}",
                config.paper.initial_price,
                config.paper.swing_pct,
                config.paper.price_precision,
                config.paper.quantity_precision
            );
            println!(
                "  Run: {} {} bars={} every={}",
                config.run.symbol, config.run.strategy, config.run.bars, config.run.place_every_bars
            );
            println!("  Notifier: {:?}", config.notifier.mode);
            println!(
                "  Telemetry: level={} format={:?} metrics_port={:?}",
                config.telemetry.log_level,
                config.telemetry.log_format,
                config.telemetry.metrics_port
            );
        }
    }

    Ok(())
}
