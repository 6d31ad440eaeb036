//! CLI interface for limit-order-lifecycle
//!
//! Provides subcommands for:
//! - `run`: Drive the lifecycle manager against the paper exchange
//! - `config`: Show the effective configuration

mod run;

pub use run::{PricePath, RunArgs};

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "limit-order-lifecycle")]
#[command(about = "Bar-clocked limit order lifecycle manager")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the paper trading driver
    Run(RunArgs),
    /// Show configuration
    Config,
}
