//! matka command-line client.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! and drives the bet slip or the weekly chart against the backend.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{error, info};

use matka::api::http::HttpBackend;
use matka::api::MatkaBackend;
use matka::auth::{CredentialProvider, EnvCredentials};
use matka::config::AppConfig;
use matka::engine::chart::{LoadOutcome, MarketChart};
use matka::engine::slip::BetSlip;
use matka::engine::wager::WagerDraft;
use matka::types::{weekday_name, GameKind, NumberShape, Session, WEEK_ORDER};

#[derive(Parser, Debug)]
#[command(name = "matka", version, about = "Matka bet slip and market chart client")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the wallet balance.
    Balance {
        #[arg(long)]
        market: String,
        #[arg(long)]
        game: GameKind,
    },
    /// Show the wallet balance and pending bets for a game screen.
    Bets {
        #[arg(long)]
        market: String,
        #[arg(long)]
        game: GameKind,
    },
    /// Show the weekly result chart for a market.
    Chart {
        #[arg(long)]
        market: String,
    },
    /// Build a slip and submit it.
    ///
    /// Each `--bet` is NUMBER:POINTS. Half Sangam numbers are ANK-PANA.
    Place {
        #[arg(long)]
        market: String,
        #[arg(long)]
        game: GameKind,
        #[arg(long, default_value = "open")]
        session: Session,
        #[arg(long = "bet", required = true)]
        bets: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    let cfg = AppConfig::load(&cli.config)?;

    init_logging();

    let backend: Arc<dyn MatkaBackend> =
        Arc::new(HttpBackend::new(&cfg.backend.base_url, cfg.backend.timeout())?);
    let credentials: Arc<dyn CredentialProvider> =
        Arc::new(EnvCredentials::new(cfg.auth.token_env.clone()));

    info!(base_url = %cfg.backend.base_url, "matka client starting");

    match cli.command {
        Command::Balance { market, game } => {
            let mut slip = BetSlip::new(backend, credentials, &market, cfg.game(game));
            slip.load().await?;
            println!("Coins: {}", slip.balance());
        }
        Command::Bets { market, game } => {
            let mut slip = BetSlip::new(backend, credentials, &market, cfg.game(game));
            slip.load().await?;
            print_ledger(&slip);
        }
        Command::Chart { market } => {
            let mut chart = MarketChart::new(backend, credentials, &market);
            match chart.refresh().await {
                LoadOutcome::Loaded(_) => print_chart(&chart),
                LoadOutcome::NoMarket => println!("Market not found: {market}"),
                LoadOutcome::LoginRequired => {
                    println!("Please log in: set ${} to your token.", cfg.auth.token_env)
                }
                LoadOutcome::Failed => println!("No results found for this market."),
            }
        }
        Command::Place {
            market,
            game,
            session,
            bets,
        } => {
            let mut slip = BetSlip::new(backend, credentials, &market, cfg.game(game));
            slip.select_session(session);
            slip.load().await?;

            for raw in &bets {
                let mut draft = parse_bet(game, raw)?;
                if let Err(e) = slip.add_wager(&mut draft, slip.selected_session()) {
                    error!(bet = %raw, code = e.code(), "Wager rejected");
                    anyhow::bail!("{}: {}", raw, slip.last_error().unwrap_or("invalid bet"));
                }
            }

            match slip.submit_slip().await {
                Ok(receipt) => {
                    println!(
                        "Submitted successfully! {} bets, {} coins. Balance: {}",
                        receipt.placed, receipt.total_points, receipt.balance_after
                    );
                    print_ledger(&slip);
                }
                Err(e) => {
                    anyhow::bail!("{} ({})", slip.last_error().unwrap_or("Failed submitting!"), e);
                }
            }
        }
    }

    Ok(())
}

/// Parse `NUMBER:POINTS` into a draft for `game`.
fn parse_bet(game: GameKind, raw: &str) -> Result<WagerDraft> {
    let (number, points) = raw
        .split_once(':')
        .with_context(|| format!("bet must be NUMBER:POINTS, got {raw}"))?;
    let draft = match game.shape() {
        NumberShape::Ank => WagerDraft::ank(number, points),
        NumberShape::Pana => WagerDraft::pana(number, points),
        NumberShape::AnkPana => {
            let (ank, pana) = number
                .split_once('-')
                .with_context(|| format!("{game} number must be ANK-PANA, got {number}"))?;
            WagerDraft::ank_pana(ank, pana, points)
        }
    };
    Ok(draft)
}

fn print_ledger(slip: &BetSlip) {
    println!(
        "{} / {} | Coins: {}",
        slip.market_name(),
        slip.game().kind,
        slip.balance()
    );
    if slip.ledger().is_empty() {
        println!("  no placed bets");
    }
    for bet in slip.ledger() {
        println!("  {bet}");
    }
}

fn print_chart(chart: &MarketChart) {
    let weeks = &chart.chart().weeks;
    if weeks.is_empty() {
        println!("No results found for this market.");
        return;
    }

    let header: Vec<&str> = WEEK_ORDER.iter().map(|d| &weekday_name(*d)[..3]).collect();
    println!("{:<26} {}", "Date Range", header.join("         "));
    for week in weeks {
        let cells: Vec<String> = week
            .days()
            .map(|(_, day)| match day {
                Some(d) => format!(
                    "{}|{:^2}|{}",
                    d.open_digits.iter().collect::<String>(),
                    d.jodi,
                    d.close_digits.iter().collect::<String>()
                ),
                None => "---|- |---".to_string(),
            })
            .collect();
        println!("{:<26} {}", week.week_key, cells.join("  "));
    }
}

/// Initialise the tracing subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("matka=info"));

    let json_logging = std::env::var("MATKA_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
