//! Polymarket Opportunity Scanner
//!
//! Ranks active Polymarket markets and keeps a local trade log behind a safety gate.

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use polymarket_scanner::{
    client::GammaClient,
    config::Config,
    safety::{JsonFileStateStore, SafetyGate, TradeGuard},
    scanner::{breakdown, expand_events, ExpiryWindow, OpportunityPipeline, ScanFilters},
    types::{Category, Opportunity, OrderIntent, Outcome, Side},
};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "polymarket-scanner")]
#[command(about = "Find interesting Polymarket markets and gate trades through safety limits")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank markets by opportunity score
    Scan {
        /// Read raw market JSON (an array) from a file instead of the Gamma API
        #[arg(short, long)]
        input: Option<String>,

        /// Treat the input as events with nested markets
        #[arg(long)]
        events: bool,

        /// Number of opportunities to show
        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(long)]
        min_volume: Option<Decimal>,

        #[arg(long)]
        min_liquidity: Option<Decimal>,

        #[arg(long)]
        min_odds: Option<Decimal>,

        #[arg(long)]
        max_odds: Option<Decimal>,

        /// Only these categories (repeatable)
        #[arg(long = "category")]
        categories: Vec<Category>,

        /// Skip these categories (repeatable)
        #[arg(long = "exclude-category")]
        exclude_categories: Vec<Category>,

        /// Every word must appear in the question or event title
        #[arg(short, long)]
        query: Option<String>,

        /// Only markets ending within this many days (and at least 6 hours out)
        #[arg(long)]
        expiring_within_days: Option<i64>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Look up one event or market by slug or id and score it
    Detail {
        id_or_slug: String,

        #[arg(long)]
        json: bool,
    },
    /// Check whether a trade of the given size would be allowed now
    Check {
        #[arg(long)]
        usd: Decimal,
    },
    /// Record an executed trade in the local state file
    Record {
        token_id: String,

        #[arg(long)]
        usd: Decimal,

        /// Limit price; omit for a market order
        #[arg(long)]
        price: Option<Decimal>,

        #[arg(long, value_enum, default_value = "buy")]
        side: SideArg,

        #[arg(long, value_enum, default_value = "yes")]
        outcome: OutcomeArg,

        #[arg(long, default_value = "")]
        market_id: String,

        /// Exchange order id, if any
        #[arg(long)]
        order_id: Option<String>,
    },
    /// Show safety state and today's trades
    Status {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    Buy,
    Sell,
}

impl From<SideArg> for Side {
    fn from(arg: SideArg) -> Self {
        match arg {
            SideArg::Buy => Side::Buy,
            SideArg::Sell => Side::Sell,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutcomeArg {
    Yes,
    No,
}

impl From<OutcomeArg> for Outcome {
    fn from(arg: OutcomeArg) -> Self {
        match arg {
            OutcomeArg::Yes => Outcome::Yes,
            OutcomeArg::No => Outcome::No,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Scan {
            input,
            events,
            limit,
            min_volume,
            min_liquidity,
            min_odds,
            max_odds,
            categories,
            exclude_categories,
            query,
            expiring_within_days,
            json,
        } => {
            let mut filters = config.scanner.to_filters();
            if let Some(v) = min_volume {
                filters.min_volume = v;
            }
            if let Some(v) = min_liquidity {
                filters.min_liquidity = v;
            }
            if let Some(v) = min_odds {
                filters.odds_range.0 = v;
            }
            if let Some(v) = max_odds {
                filters.odds_range.1 = v;
            }
            if !categories.is_empty() {
                filters.allowed_categories = categories.into_iter().collect();
            }
            filters.excluded_categories.extend(exclude_categories);
            filters.query = query;
            if let Some(days) = expiring_within_days {
                filters.expiry_window = Some(ExpiryWindow {
                    max_days: days,
                    ..ExpiryWindow::default()
                });
            }

            let raw = load_records(&config, input.as_deref(), events).await?;
            let pipeline = OpportunityPipeline::new(config.scanner.price_policy);
            let limit = limit.unwrap_or(config.scanner.limit);
            let (ranked, stats) = pipeline.rank_with_stats(&raw, &filters, limit, Utc::now());

            if json {
                println!("{}", serde_json::to_string_pretty(&ranked)?);
            } else {
                print_opportunities(&ranked);
                println!(
                    "\n{} records, {} unusable, {} filtered out, {} matched",
                    stats.total,
                    stats.malformed,
                    stats.filtered + stats.category_filtered,
                    stats.matched
                );
            }
            Ok(())
        }
        Commands::Detail { id_or_slug, json } => {
            let client = GammaClient::new(&config.gamma)?;
            let found = client
                .fetch_market(&id_or_slug)
                .await?
                .ok_or_else(|| anyhow::anyhow!("no event or market found for {}", id_or_slug))?;

            let records = expand_events(std::slice::from_ref(&found));
            let now = Utc::now();
            let pipeline = OpportunityPipeline::new(config.scanner.price_policy);
            let ranked = pipeline.rank(&records, &ScanFilters::permissive(), records.len(), now);

            if json {
                println!("{}", serde_json::to_string_pretty(&ranked)?);
                return Ok(());
            }

            if let Some(title) = found.get("title").and_then(Value::as_str) {
                println!("\n📈 {}\n", title);
            }
            for opp in &ranked {
                let terms = breakdown(opp, now);
                println!("Question: {}", opp.question);
                println!("  Category: {}", opp.category);
                println!(
                    "  Yes {:.1}% / No {:.1}%",
                    opp.yes_price * Decimal::ONE_HUNDRED,
                    opp.no_price * Decimal::ONE_HUNDRED
                );
                println!("  Volume: ${:.0} (24h ${:.0})", opp.volume_total, opp.volume_24h);
                println!("  Liquidity: ${:.0}", opp.liquidity);
                if let Some(end) = opp.end_time {
                    println!("  Ends: {}", end.to_rfc3339());
                }
                println!(
                    "  Score: {:.1} (odds {:.1}, volume {:.1}, activity {:.1}, liquidity {:.1}, time {:.1})",
                    terms.total(),
                    terms.odds,
                    terms.volume,
                    terms.activity,
                    terms.liquidity,
                    terms.time
                );
                if !opp.slug.is_empty() {
                    println!("  {}", opp.url());
                }
                println!();
            }
            if ranked.is_empty() {
                println!("No priced markets in {}", id_or_slug);
            }
            Ok(())
        }
        Commands::Check { usd } => {
            let guard = open_guard(&config);
            let decision = guard.check(usd, Utc::now()).await?;
            if decision.allowed {
                println!("✅ {}", decision.reason);
            } else {
                println!("⛔ {}", decision.reason);
            }
            Ok(())
        }
        Commands::Record {
            token_id,
            usd,
            price,
            side,
            outcome,
            market_id,
            order_id,
        } => {
            let intent = OrderIntent {
                token_id,
                side: side.into(),
                outcome: outcome.into(),
                price,
                size_usd: usd,
            };
            intent.validate()?;

            let now = Utc::now();
            let record = intent.into_record(&market_id, order_id, now);
            let trade_id = record.id.clone();

            let guard = open_guard(&config);
            let decision = guard.record(record, now).await?;
            if !decision.allowed {
                anyhow::bail!("trade not recorded: {}", decision.reason);
            }
            println!("✅ Recorded trade {}", trade_id);
            Ok(())
        }
        Commands::Status { json } => {
            let guard = open_guard(&config);
            let state = guard.state(Utc::now()).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&state)?);
                return Ok(());
            }

            let limits = guard.gate().config();
            println!("\n🛡️  Safety Status ({})\n", guard.store().path().display());
            println!(
                "Trades today: {}/{}",
                state.trades_today, limits.max_trades_per_day
            );
            match state.last_trade_time {
                Some(t) => println!("Last trade: {}", t.to_rfc3339()),
                None => println!("Last trade: never"),
            }
            println!("Cooldown: {} minutes", limits.cooldown_minutes_between_trades);
            println!(
                "Approval required above: ${}",
                limits.require_human_approval_above_usd
            );
            println!("Total invested: ${:.2}", state.total_invested);
            println!(
                "Trades logged: {} ({} today)",
                state.trades.len(),
                state.logged_trades_today()
            );
            Ok(())
        }
    }
}

fn open_guard(config: &Config) -> TradeGuard<JsonFileStateStore> {
    TradeGuard::new(
        JsonFileStateStore::new(config.state.resolved_path()),
        SafetyGate::new(config.safety.clone()),
    )
}

async fn load_records(config: &Config, input: Option<&str>, events: bool) -> anyhow::Result<Vec<Value>> {
    let raw: Vec<Value> = match input {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path))?;
            serde_json::from_str(&text).with_context(|| format!("{} is not a JSON array", path))?
        }
        None => {
            let client = GammaClient::new(&config.gamma)?;
            if events {
                client.fetch_events(config.gamma.max_markets).await?
            } else {
                client.fetch_active_markets(config.gamma.max_markets).await?
            }
        }
    };

    Ok(if events { expand_events(&raw) } else { raw })
}

fn print_opportunities(opportunities: &[Opportunity]) {
    println!("\n📊 Top {} Opportunities:\n", opportunities.len());
    println!(
        "{:<50} {:>6} {:>6} {:>12} {:>6} {:<13}",
        "Question", "Yes", "No", "Volume", "Score", "Category"
    );
    println!("{}", "-".repeat(98));

    for opp in opportunities {
        let question = if opp.question.chars().count() > 47 {
            format!("{}...", opp.question.chars().take(47).collect::<String>())
        } else {
            opp.question.clone()
        };

        println!(
            "{:<50} {:>5.0}% {:>5.0}% ${:>11.0} {:>6.1} {:<13}",
            question,
            opp.yes_price * Decimal::ONE_HUNDRED,
            opp.no_price * Decimal::ONE_HUNDRED,
            opp.volume_total,
            opp.score_or_min(),
            opp.category.as_str()
        );
    }
}
