// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cereal - a personality-adaptive conversational chat service.
//!
//! This is the binary entry point for the Cereal CLI.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod shell;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Cereal - a personality-adaptive conversational chat service.
#[derive(Parser, Debug)]
#[command(name = "cereal", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive chat session.
    Shell {
        /// Identity the session runs as (an email address); keys all
        /// per-user state.
        #[arg(long, default_value = "local@cereal")]
        user: String,
    },
    /// Print the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match cereal_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            cereal_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.agent.log_level.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Shell { user }) => {
            if let Err(e) = shell::run_shell(config, &user).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("error: failed to render config: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("cereal: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        // Defaults are valid without any config file present.
        let config = cereal_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.agent.name, "Cereal");
    }
}
