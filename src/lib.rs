pub mod cli;
pub mod core;
pub mod providers;
pub mod server;

use anyhow::Result;
use tracing::{debug, info};

use crate::core::RatesQuery;
use crate::core::config::AppConfig;
use crate::providers::ExchangeRateApiProvider;

pub enum AppCommand {
    Serve {
        listen: Option<String>,
    },
    Rates {
        base: Option<String>,
        currencies: Option<String>,
    },
    Convert {
        amount: f64,
        from: String,
        to: String,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("xrate starting...");

    let config = AppConfig::load(config_path)?;
    debug!("Loaded config: {config:#?}");
    run_with_config(command, config).await
}

pub async fn run_with_config(command: AppCommand, config: AppConfig) -> Result<()> {
    let provider = || ExchangeRateApiProvider::new(&config.provider_base_url, &config.api_key);

    match command {
        AppCommand::Serve { listen } => {
            let config = config.clone().with_listen_addr(listen);
            server::serve(&config).await
        }
        AppCommand::Rates { base, currencies } => {
            let query = RatesQuery::new(base.as_deref(), currencies.as_deref());
            cli::rates::run(&provider()?, &query).await
        }
        AppCommand::Convert { amount, from, to } => {
            cli::convert::run(&provider()?, amount, &from, &to).await
        }
    }
}
