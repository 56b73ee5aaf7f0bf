//! Interactive menu loop and the flows behind each menu entry.
//!
//! Flows fetch through the core's [`Runner`] and hand normalized payloads
//! to [`crate::render`]; a failed lookup prints an error line and returns
//! to the menu, never aborting the session.

use std::fmt;

use anyhow::Result;
use inquire::{InquireError, MultiSelect, Select, Text};

use dashboard_core::{
    Config, PriceQuery, Runner, Sources, Task, WeatherQuery, aggregate,
    config::OPENWEATHER_KEY_ENV,
};

use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainChoice {
    Github,
    Weather,
    Cep,
    Crypto,
    About,
    Exit,
}

impl MainChoice {
    const ALL: [MainChoice; 6] = [
        MainChoice::Github,
        MainChoice::Weather,
        MainChoice::Cep,
        MainChoice::Crypto,
        MainChoice::About,
        MainChoice::Exit,
    ];
}

impl fmt::Display for MainChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MainChoice::Github => "👤 GitHub - look up a user profile",
            MainChoice::Weather => "🌤️  Weather - current conditions for a city",
            MainChoice::Cep => "📍 CEP - resolve a Brazilian postal code",
            MainChoice::Crypto => "💰 Crypto - cryptocurrency prices",
            MainChoice::About => "ℹ️  About - what this dashboard is",
            MainChoice::Exit => "🚪 Exit",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CryptoChoice {
    Popular,
    Detail,
    Compare,
    Back,
}

impl CryptoChoice {
    const ALL: [CryptoChoice; 4] =
        [CryptoChoice::Popular, CryptoChoice::Detail, CryptoChoice::Compare, CryptoChoice::Back];
}

impl fmt::Display for CryptoChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CryptoChoice::Popular => "📊 Popular coins",
            CryptoChoice::Detail => "🔍 Look up one coin",
            CryptoChoice::Compare => "🆚 Compare several coins",
            CryptoChoice::Back => "⬅️  Back",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy)]
struct CoinChoice {
    id: &'static str,
    label: &'static str,
}

impl fmt::Display for CoinChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

const COIN_CHOICES: [CoinChoice; 8] = [
    CoinChoice { id: "bitcoin", label: "Bitcoin (BTC)" },
    CoinChoice { id: "ethereum", label: "Ethereum (ETH)" },
    CoinChoice { id: "binancecoin", label: "Binance Coin (BNB)" },
    CoinChoice { id: "cardano", label: "Cardano (ADA)" },
    CoinChoice { id: "solana", label: "Solana (SOL)" },
    CoinChoice { id: "ripple", label: "Ripple (XRP)" },
    CoinChoice { id: "polkadot", label: "Polkadot (DOT)" },
    CoinChoice { id: "dogecoin", label: "Dogecoin (DOGE)" },
];

/// Main interactive loop. Esc at the top level exits; inside a flow it
/// returns to the previous level.
pub async fn run_loop(config: &Config, sources: &Sources, runner: &Runner) -> Result<()> {
    render::banner();

    loop {
        println!();
        let choice = match Select::new("Choose an option:", MainChoice::ALL.to_vec()).prompt() {
            Ok(choice) => choice,
            Err(err) if cancelled(&err) => break,
            Err(err) => return Err(err.into()),
        };

        match choice {
            MainChoice::Github => {
                render::header("👤 GitHub lookup");
                let Some(username) = ask("GitHub username:", "octocat")? else { continue };
                github_flow(sources, runner, &username, 5).await?;
            }
            MainChoice::Weather => {
                render::header("🌤️ Weather lookup");
                if !sources.weather.configured() {
                    render::warning("OpenWeatherMap API key is not configured!");
                    println!("  Set {OPENWEATHER_KEY_ENV} in your environment or .env file.");
                    println!("  Get a key at https://openweathermap.org/api");
                    continue;
                }
                let Some(city) = ask("City name:", "São Paulo")? else { continue };
                weather_flow(sources, runner, &city, Some("BR")).await?;
            }
            MainChoice::Cep => {
                render::header("📍 CEP lookup");
                let Some(code) = ask("CEP (digits only):", "01310100")? else { continue };
                cep_flow(sources, runner, &code).await?;
            }
            MainChoice::Crypto => crypto_menu(config, sources, runner).await?,
            MainChoice::About => about(),
            MainChoice::Exit => {
                render::farewell();
                break;
            }
        }
    }

    Ok(())
}

pub async fn github_flow(
    sources: &Sources,
    runner: &Runner,
    username: &str,
    repo_limit: u32,
) -> Result<()> {
    match runner.run_fetch(&sources.github, username.to_string()).await {
        Ok(profile) => {
            render::profile(&profile);

            // Repositories are only worth fetching for an existing user.
            let github = sources.github.clone();
            let owner = username.to_string();
            let repos = runner
                .run(Task::new("github repositories", async move {
                    github.repositories(&owner, repo_limit).await
                }))
                .await;

            match repos {
                Ok(repos) => render::repos(&repos),
                Err(err) => render::error(&err),
            }
        }
        Err(err) => render::error(&err),
    }

    Ok(())
}

pub async fn weather_flow(
    sources: &Sources,
    runner: &Runner,
    city: &str,
    country: Option<&str>,
) -> Result<()> {
    let mut query = WeatherQuery::new(city);
    if let Some(country) = country {
        query = query.with_country(country);
    }

    match runner.run_fetch(&sources.weather, query).await {
        Ok(weather) => render::weather(&weather),
        Err(err) => render::error(&err),
    }

    Ok(())
}

pub async fn cep_flow(sources: &Sources, runner: &Runner, code: &str) -> Result<()> {
    match runner.run_fetch(&sources.viacep, code.to_string()).await {
        Ok(address) => render::address(&address),
        Err(err) => render::error(&err),
    }

    Ok(())
}

pub async fn crypto_flow(
    sources: &Sources,
    runner: &Runner,
    coin: &str,
    currency: &str,
) -> Result<()> {
    let query = PriceQuery::new(coin).with_currency(currency);

    match runner.run_fetch(&sources.coingecko, query).await {
        Ok(price) => render::price(&price),
        Err(err) => render::error(&err),
    }

    Ok(())
}

/// The popular list is one upstream request; the per-coin breakdown is
/// split into successes and failures by the aggregator.
pub async fn popular_flow(sources: &Sources, runner: &Runner, currency: &str) -> Result<()> {
    let coingecko = sources.coingecko.clone();
    let reference = currency.to_string();
    let batch = runner
        .run(Task::new("popular coin prices", async move {
            coingecko.popular(&reference).await
        }))
        .await;

    match batch {
        Ok(breakdown) => {
            let (coins, failures) = aggregate::collect_with_failures(breakdown);
            render::price_table(&coins, &failures);
        }
        Err(err) => render::error(&err),
    }

    Ok(())
}

/// Fetch every selected coin's detail concurrently; results render in
/// selection order regardless of which fetch finished first.
pub async fn compare_flow(sources: &Sources, runner: &Runner, coins: &[String]) -> Result<()> {
    if coins.is_empty() {
        render::warning("No coins selected.");
        return Ok(());
    }

    let tasks: Vec<_> = coins
        .iter()
        .map(|coin| {
            let coingecko = sources.coingecko.clone();
            let id = coin.clone();
            Task::new(coin.clone(), async move { coingecko.coin_detail(&id).await })
        })
        .collect();

    for result in runner.run_batch(tasks).await {
        match result {
            Ok(detail) => render::coin_detail(&detail),
            Err(err) => render::error(&err),
        }
    }

    Ok(())
}

async fn detail_flow(sources: &Sources, runner: &Runner, coin: &str) -> Result<()> {
    let coingecko = sources.coingecko.clone();
    let id = coin.to_string();
    let detail = runner
        .run(Task::new(coin.to_string(), async move { coingecko.coin_detail(&id).await }))
        .await;

    match detail {
        Ok(detail) => render::coin_detail(&detail),
        Err(err) => render::error(&err),
    }

    Ok(())
}

async fn crypto_menu(config: &Config, sources: &Sources, runner: &Runner) -> Result<()> {
    render::header("💰 Cryptocurrency prices");
    let currency = config.currency(None);

    loop {
        let choice =
            match Select::new("What would you like to do?", CryptoChoice::ALL.to_vec()).prompt() {
                Ok(choice) => choice,
                Err(err) if cancelled(&err) => return Ok(()),
                Err(err) => return Err(err.into()),
            };

        match choice {
            CryptoChoice::Popular => popular_flow(sources, runner, &currency).await?,
            CryptoChoice::Detail => {
                let Some(coin) = select_coin()? else { continue };
                detail_flow(sources, runner, &coin).await?;
            }
            CryptoChoice::Compare => {
                let Some(coins) = select_coins()? else { continue };
                compare_flow(sources, runner, &coins).await?;
            }
            CryptoChoice::Back => return Ok(()),
        }
    }
}

/// Interactive credential/preference editor backing `dashboard configure`.
///
/// Works on the raw config file, without environment fallback, so values
/// from the environment are never baked into the saved file.
pub fn configure() -> Result<()> {
    let mut config = Config::load()?;
    render::header("⚙️ Configuration");

    let github_token = Text::new("GitHub token (blank to unset):")
        .with_initial_value(config.github_token.as_deref().unwrap_or(""))
        .prompt()?;
    let openweather_key = Text::new("OpenWeatherMap API key (blank to unset):")
        .with_initial_value(config.openweather_api_key.as_deref().unwrap_or(""))
        .prompt()?;
    let default_currency = Text::new("Default currency (e.g. brl, usd):")
        .with_initial_value(config.default_currency.as_deref().unwrap_or("brl"))
        .prompt()?;

    config.github_token = presence(github_token);
    config.openweather_api_key = presence(openweather_key);
    config.default_currency = presence(default_currency);
    config.save()?;

    println!("Saved to {}", Config::config_file_path()?.display());
    Ok(())
}

fn about() {
    render::header("ℹ️ About this dashboard");
    println!("  An interactive terminal dashboard integrating several public APIs:");
    println!();
    println!("  📌 Sources:");
    println!("     • GitHub - user profiles and repositories");
    println!("     • OpenWeatherMap - current weather conditions");
    println!("     • ViaCEP - Brazilian postal-code lookups");
    println!("     • CoinGecko - cryptocurrency prices");
    println!();
    println!("  Every lookup runs through the same fetch engine: one uniform");
    println!("  result contract, independent failure domains, and concurrent");
    println!("  batches that keep their submission order.");
    println!();
    render::separator();
}

fn ask(message: &str, default: &str) -> Result<Option<String>> {
    match Text::new(message).with_default(default).prompt() {
        Ok(value) => Ok(Some(value)),
        Err(err) if cancelled(&err) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn select_coin() -> Result<Option<String>> {
    match Select::new("Pick a coin:", COIN_CHOICES.to_vec()).prompt() {
        Ok(choice) => Ok(Some(choice.id.to_string())),
        Err(err) if cancelled(&err) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn select_coins() -> Result<Option<Vec<String>>> {
    match MultiSelect::new("Pick coins to compare:", COIN_CHOICES.to_vec()).prompt() {
        Ok(choices) => Ok(Some(choices.into_iter().map(|c| c.id.to_string()).collect())),
        Err(err) if cancelled(&err) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn cancelled(err: &InquireError) -> bool {
    matches!(err, InquireError::OperationCanceled | InquireError::OperationInterrupted)
}

fn presence(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_choices_cover_the_popular_list() {
        use dashboard_core::source::coingecko::POPULAR_COINS;

        let ids: Vec<&str> = COIN_CHOICES.iter().map(|c| c.id).collect();
        for coin in POPULAR_COINS {
            assert!(ids.contains(&coin), "missing choice for {coin}");
        }
    }

    #[test]
    fn presence_folds_blank_into_none() {
        assert_eq!(presence("  ".to_string()), None);
        assert_eq!(presence(" brl ".to_string()).as_deref(), Some("brl"));
    }
}
