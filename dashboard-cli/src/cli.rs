use std::sync::Arc;

use clap::{Parser, Subcommand};
use dashboard_core::{Config, Runner, Sources};

use crate::{menu, progress::ProgressPrinter};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "dashboard", version, about = "Interactive dashboard over public REST APIs")]
pub struct Cli {
    /// Without a subcommand, starts the interactive menu.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up a GitHub user profile and recent repositories.
    Github {
        /// GitHub username, e.g. "octocat".
        username: String,

        /// Number of repositories to list.
        #[arg(long, default_value_t = 5)]
        repos: u32,
    },

    /// Current weather for a city.
    Weather {
        /// City name, e.g. "São Paulo".
        city: String,

        /// ISO country code narrowing the lookup, e.g. "BR".
        #[arg(long)]
        country: Option<String>,
    },

    /// Resolve a Brazilian postal code (CEP) to an address.
    Cep {
        /// 8-digit CEP, hyphenated or not.
        code: String,
    },

    /// Spot price for one coin.
    Crypto {
        /// CoinGecko coin id, e.g. "bitcoin".
        coin: String,

        /// Reference currency, e.g. "brl" or "usd".
        #[arg(long)]
        currency: Option<String>,
    },

    /// Price table for the well-known coin list, fetched in one request.
    Popular {
        /// Reference currency, e.g. "brl" or "usd".
        #[arg(long)]
        currency: Option<String>,
    },

    /// Fetch details for several coins concurrently and show them in order.
    Compare {
        /// CoinGecko coin ids.
        coins: Vec<String>,
    },

    /// Store credentials and preferences in the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        if matches!(self.command, Some(Command::Configure)) {
            return menu::configure();
        }

        let config = Config::load()?.with_env_fallback();
        let sources = Sources::from_config(&config)?;
        let runner = Runner::new().with_observer(Arc::new(ProgressPrinter));

        match self.command {
            None => menu::run_loop(&config, &sources, &runner).await,
            Some(Command::Github { username, repos }) => {
                menu::github_flow(&sources, &runner, &username, repos).await
            }
            Some(Command::Weather { city, country }) => {
                menu::weather_flow(&sources, &runner, &city, country.as_deref()).await
            }
            Some(Command::Cep { code }) => menu::cep_flow(&sources, &runner, &code).await,
            Some(Command::Crypto { coin, currency }) => {
                let currency = config.currency(currency.as_deref());
                menu::crypto_flow(&sources, &runner, &coin, &currency).await
            }
            Some(Command::Popular { currency }) => {
                let currency = config.currency(currency.as_deref());
                menu::popular_flow(&sources, &runner, &currency).await
            }
            Some(Command::Compare { coins }) => menu::compare_flow(&sources, &runner, &coins).await,
            // Handled before config loading so env fallback never leaks
            // into the saved file.
            Some(Command::Configure) => Ok(()),
        }
    }
}
