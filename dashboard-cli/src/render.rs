//! Terminal rendering for normalized payloads.
//!
//! Unknown fields (`None`) print as "N/A", keeping "unavailable" visually
//! distinct from a legitimate zero.

use chrono::{DateTime, Utc};
use dashboard_core::{
    FetchError,
    aggregate::Failure,
    model::{AddressInfo, PriceDetail, PriceInfo, ProfileInfo, RepoInfo, WeatherInfo},
};

const TERMINAL_WIDTH: usize = 80;
const DESCRIPTION_CAP: usize = 500;

pub fn header(title: &str) {
    let bar = "═".repeat(TERMINAL_WIDTH);
    let pad = TERMINAL_WIDTH.saturating_sub(title.chars().count()) / 2;
    println!();
    println!("{bar}");
    println!("{}{title}", " ".repeat(pad));
    println!("{bar}");
    println!();
}

pub fn separator() {
    println!("{}", "─".repeat(TERMINAL_WIDTH));
}

pub fn info(label: &str, value: impl AsRef<str>) {
    println!("  {}: {}", label, value.as_ref());
}

pub fn error(err: &FetchError) {
    println!("❌ {err}");
}

pub fn warning(message: &str) {
    println!("⚠️  {message}");
}

pub fn banner() {
    let bar = "═".repeat(TERMINAL_WIDTH);
    println!();
    println!("{bar}");
    println!("{}", center("🚀 DASHBOARD 🚀"));
    println!("{}", center("GitHub · Weather · CEP · Crypto"));
    println!("{bar}");
}

pub fn farewell() {
    println!();
    println!("{}", "═".repeat(TERMINAL_WIDTH));
    println!("{}", center("👋 Thanks for using the dashboard. See you! 🚀"));
    println!("{}", "═".repeat(TERMINAL_WIDTH));
    println!();
}

pub fn profile(profile: &ProfileInfo) {
    header("👤 GitHub profile");
    info("Login", &profile.login);
    info("Name", text(&profile.name));
    info("Bio", text(&profile.bio));
    info("Public repos", count(profile.public_repos));
    info("Followers", count(profile.followers));
    info("Following", count(profile.following));
    info("Member since", date(profile.created_at));
    info("URL", text(&profile.html_url));
    separator();
}

pub fn repos(repos: &[RepoInfo]) {
    println!();
    println!("📦 Recent repositories:");
    separator();

    for (index, repo) in repos.iter().enumerate() {
        println!("  {}. {}", index + 1, repo.name);
        println!("     {}", repo.description.as_deref().unwrap_or("No description"));
        println!(
            "     ⭐ {} | 🍴 {} | 💻 {}",
            count(repo.stars),
            count(repo.forks),
            repo.language.as_deref().unwrap_or("N/A"),
        );
        println!();
    }
}

pub fn weather(weather: &WeatherInfo) {
    let place = match &weather.country {
        Some(country) => format!("{}, {}", weather.city, country),
        None => weather.city.clone(),
    };
    header(&format!("{} Weather in {place}", weather.icon));

    info("Temperature", unit(weather.temperature_c, "°C"));
    info("Feels like", unit(weather.feels_like_c, "°C"));
    info("Condition", weather.description.as_deref().map_or_else(not_available, capitalize));
    info("Humidity", unit_u64(weather.humidity_pct, "%"));
    info("Pressure", unit_u64(weather.pressure_hpa, " hPa"));
    info("Wind", unit(weather.wind_speed_mps, " m/s"));
    info("Clouds", unit_u64(weather.clouds_pct, "%"));
    separator();
}

pub fn address(address: &AddressInfo) {
    header("📍 CEP details");
    info("CEP", &address.cep);
    info("Street", text(&address.street));
    info("Neighborhood", text(&address.neighborhood));
    info("City", text(&address.city));
    info("State", text(&address.state));
    info("Area code", text(&address.ddd));
    info("IBGE code", text(&address.ibge));
    separator();
}

pub fn price(price: &PriceInfo) {
    header(&format!("💰 {}", capitalize(&price.coin)));
    info("Price", currency(price.price, &price.currency));
    info(
        "24h change",
        format!("{} {}", trend_glyph(price.change_24h), percentage(price.change_24h)),
    );
    if price.market_cap.is_some() {
        info("Market cap", currency(price.market_cap, &price.currency));
    }
    separator();
}

pub fn price_table(coins: &[PriceInfo], failures: &[Failure]) {
    header("💎 Popular coins");

    for coin in coins {
        println!(
            "  {:<12} {:>15}  {} {}",
            capitalize(&coin.coin),
            currency(coin.price, &coin.currency),
            arrow(coin.change_24h),
            percentage(coin.change_24h),
        );
    }

    if !failures.is_empty() {
        separator();
        warning(&format!("{} lookup(s) failed:", failures.len()));
        for failure in failures {
            println!("  - {}", failure.error);
        }
    }

    separator();
}

pub fn coin_detail(detail: &PriceDetail) {
    let title = match &detail.name {
        Some(name) => match &detail.symbol {
            Some(symbol) => format!("💰 {name} ({symbol})"),
            None => format!("💰 {name}"),
        },
        None => format!("💰 {}", capitalize(&detail.id)),
    };
    header(&title);

    info("Ranking", detail.market_cap_rank.map_or_else(not_available, |r| format!("#{r}")));
    info("Price BRL", currency(detail.price_brl, "BRL"));
    info("Price USD", currency(detail.price_usd, "USD"));
    info(
        "24h change",
        format!("{} {}", trend_glyph(detail.change_24h), percentage(detail.change_24h)),
    );
    info("24h high", currency(detail.high_24h_brl, "BRL"));
    info("24h low", currency(detail.low_24h_brl, "BRL"));
    separator();

    if let Some(description) = &detail.description {
        println!();
        println!("📝 Description:");
        println!("{}", wrapped_description(description));
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(not_available)
}

fn count(value: Option<u64>) -> String {
    value.map_or_else(not_available, |v| v.to_string())
}

fn date(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(not_available, |d| d.format("%d/%m/%Y").to_string())
}

fn unit(value: Option<f64>, suffix: &str) -> String {
    value.map_or_else(not_available, |v| format!("{v}{suffix}"))
}

fn unit_u64(value: Option<u64>, suffix: &str) -> String {
    value.map_or_else(not_available, |v| format!("{v}{suffix}"))
}

fn currency(value: Option<f64>, code: &str) -> String {
    let Some(value) = value else { return not_available() };

    match code.to_uppercase().as_str() {
        "BRL" => format!("R$ {}", number(value)),
        "USD" => format!("$ {}", number(value)),
        other => format!("{} {}", number(value), other),
    }
}

fn number(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.2}K", value / 1_000.0)
    } else if value < 1.0 {
        format!("{value:.6}")
    } else {
        format!("{value:.2}")
    }
}

fn percentage(value: Option<f64>) -> String {
    value.map_or_else(not_available, |v| format!("{v:.2}%"))
}

fn trend_glyph(change: Option<f64>) -> &'static str {
    if change.unwrap_or(0.0) >= 0.0 { "📈" } else { "📉" }
}

fn arrow(change: Option<f64>) -> &'static str {
    if change.unwrap_or(0.0) >= 0.0 { "▲" } else { "▼" }
}

fn not_available() -> String {
    "N/A".to_string()
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn center(line: &str) -> String {
    let pad = TERMINAL_WIDTH.saturating_sub(line.chars().count()) / 2;
    format!("{}{line}", " ".repeat(pad))
}

/// Strip HTML tags, cap at [`DESCRIPTION_CAP`] characters and word-wrap
/// to the terminal width.
fn wrapped_description(description: &str) -> String {
    let plain = strip_html(description);
    let capped: String = plain.chars().take(DESCRIPTION_CAP).collect();
    let truncated = plain.chars().count() > DESCRIPTION_CAP;

    let mut wrapped = word_wrap(&capped, TERMINAL_WIDTH - 4);
    if truncated {
        wrapped.push_str("\n  ...");
    }
    wrapped
}

fn strip_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn word_wrap(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }

    lines.iter().map(|l| format!("  {l}")).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_abbreviate_by_magnitude() {
        assert_eq!(number(6_900_000.0), "6.90M");
        assert_eq!(number(350_000.0), "350.00K");
        assert_eq!(number(350.5), "350.50");
        assert_eq!(number(0.123456789), "0.123457");
    }

    #[test]
    fn currency_prefixes_brl_and_usd() {
        assert_eq!(currency(Some(350_000.0), "BRL"), "R$ 350.00K");
        assert_eq!(currency(Some(65_000.0), "usd"), "$ 65.00K");
        assert_eq!(currency(Some(2.0), "EUR"), "2.00 EUR");
        assert_eq!(currency(None, "BRL"), "N/A");
    }

    #[test]
    fn dates_render_day_month_year() {
        let date_time = "2011-01-25T18:44:36Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(date(Some(date_time)), "25/01/2011");
        assert_eq!(date(None), "N/A");
    }

    #[test]
    fn trend_markers_follow_the_sign() {
        assert_eq!(trend_glyph(Some(2.5)), "📈");
        assert_eq!(trend_glyph(Some(-0.1)), "📉");
        assert_eq!(arrow(None), "▲");
    }

    #[test]
    fn descriptions_lose_their_html_tags() {
        let wrapped = wrapped_description("Bitcoin is <a href=\"x\">digital</a> gold.");
        assert_eq!(wrapped, "  Bitcoin is digital gold.");
    }

    #[test]
    fn long_descriptions_are_capped() {
        let long = "word ".repeat(200);
        let wrapped = wrapped_description(&long);
        assert!(wrapped.ends_with("..."));
    }

    #[test]
    fn word_wrap_respects_width() {
        let wrapped = word_wrap("alpha beta gamma delta", 11);
        assert_eq!(wrapped, "  alpha beta\n  gamma delta");
    }
}
