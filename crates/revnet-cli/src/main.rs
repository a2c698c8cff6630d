//! Revnet CLI
//!
//! Prices issuance, cash-outs and cross-chain surplus from a snapshot of
//! chain reads.

mod config;
mod snapshot;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use revnet_bridge::{
    aggregate, aggregate_converted, best_quotes, chain_info, cross_chain_cash_out_quote,
    fetch_pool_quotes, fetch_surplus_records, ChainReading, GroupClass, SurplusAggregate,
};
use revnet_core::prelude::*;
use revnet_core::TOKEN_DECIMALS;
use revnet_economics::{
    amount_for_payer_tokens, cash_out_from_record, issuance_price, issuance_quote, next_cut_at,
    periods_elapsed, weight_at, weight_at_time, weight_schedule, IssuanceParams,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::CliConfig;
use crate::snapshot::Snapshot;

#[derive(Parser)]
#[command(name = "revnet")]
#[command(version)]
#[command(
    about = "Revnet pricing - issuance, cash-outs and cross-chain surplus",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "revnet.toml")]
    config: PathBuf,

    /// Snapshot of chain reads
    #[arg(short, long, global = true, default_value = "revnet.json")]
    snapshot: PathBuf,

    /// Chain to price on (defaults to pricing.caller_chain_id)
    #[arg(long, global = true)]
    chain: Option<u64>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the weight curve around the current period
    Weight {
        /// Weight this many periods from the ruleset's own period
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<i64>,

        /// Unix time to evaluate at (defaults to now)
        #[arg(long)]
        at: Option<u64>,
    },

    /// Quote tokens minted for a payment
    Issue {
        /// Amount of base asset, e.g. 0.5
        amount: String,

        /// Find the payment needed for this many payer tokens instead
        #[arg(long)]
        target: bool,

        /// Unix time to evaluate at (defaults to now)
        #[arg(long)]
        at: Option<u64>,
    },

    /// Quote base asset reclaimed by cashing out tokens
    CashOut {
        /// Project tokens, e.g. 1000
        tokens: String,

        /// Quote against the pooled surplus of every chain
        #[arg(long)]
        all_chains: bool,
    },

    /// Aggregate surplus across the chain-group
    Aggregate,

    /// Compare issuance with pool quotes on every chain
    Compare {
        /// Amount of base asset, e.g. 0.5
        amount: String,

        /// Unix time to evaluate at (defaults to now)
        #[arg(long)]
        at: Option<u64>,
    },

    /// Print the effective configuration
    Config,
}

fn init_logging(verbose: bool, config: &CliConfig) {
    let env_filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level))
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn now() -> anyhow::Result<u64> {
    u64::try_from(chrono::Utc::now().timestamp()).context("system clock before 1970")
}

fn chain_label(chain_id: ChainId) -> String {
    match chain_info(chain_id) {
        Some(info) => format!("{} ({})", info.name, chain_id),
        None => format!("chain {}", chain_id),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(&cli.config)?;
    init_logging(cli.verbose, &config);

    let chain = cli.chain.map(ChainId).unwrap_or_else(|| config.caller_chain());

    match cli.command {
        Commands::Weight { offset, at } => {
            let snapshot = Snapshot::load(&cli.snapshot)?;
            let ruleset = snapshot.ruleset(chain)?;
            let timestamp = at.map(Ok).unwrap_or_else(now)?;

            println!("Ruleset {} on {}", ruleset.id, chain_label(chain));
            if let Some(offset) = offset {
                println!("Weight at offset {}: {}", offset, weight_at(&ruleset, offset)?);
                return Ok(());
            }

            let schedule = weight_schedule(&ruleset)?;
            println!("Previous:   {}", schedule.previous);
            println!("Current:    {}", schedule.current);
            println!("Next:       {}", schedule.next);
            println!("Next after: {}", schedule.next_after);
            println!();
            let weight_now = weight_at_time(&ruleset, timestamp)?;
            println!("Periods elapsed: {}", periods_elapsed(&ruleset, timestamp));
            println!("Weight now:      {}", weight_now);
            if ruleset.with_weight(weight_now).is_paused() {
                println!("Issuance paused");
                return Ok(());
            }
            match next_cut_at(&ruleset, timestamp) {
                Some(at) => println!("Next cut at:     {}", format_time(at)),
                None => println!("Next cut at:     never"),
            }
        }

        Commands::Issue { amount, target, at } => {
            let snapshot = Snapshot::load(&cli.snapshot)?;
            let base_decimals = snapshot.token_config(chain)?.decimals;
            let ruleset = snapshot.ruleset(chain)?;
            let timestamp = at.map(Ok).unwrap_or_else(now)?;
            let current = ruleset.with_weight(weight_at_time(&ruleset, timestamp)?);
            let params = IssuanceParams::from(&current);

            if target {
                let tokens = FixedAmount::parse(&amount, TOKEN_DECIMALS)?;
                match amount_for_payer_tokens(tokens.value(), base_decimals, &params)? {
                    Some(pay) => println!(
                        "Pay {} to receive at least {} tokens",
                        FixedAmount::new(pay, base_decimals),
                        tokens
                    ),
                    None => {
                        println!("No payment reaches {} tokens under the current ruleset", tokens)
                    }
                }
                return Ok(());
            }

            let amount_in = FixedAmount::parse(&amount, base_decimals)?;
            let quote = issuance_quote(amount_in.value(), base_decimals, &params)?;
            println!("Paying {} on {}", amount_in, chain_label(chain));
            println!("  Total minted:  {}", quote.total_tokens);
            println!("  Reserved:      {} ({})", quote.reserved_tokens, params.reserved_percent);
            println!("  You receive:   {}", quote.payer_tokens);
            match issuance_price(&params.weight, base_decimals)? {
                Some(price) => println!("  Price / token: {}", price),
                None => println!("  Issuance paused"),
            }
        }

        Commands::CashOut { tokens, all_chains } => {
            let snapshot = Snapshot::load(&cli.snapshot)?;
            let tax = snapshot.ruleset(chain)?.cash_out_tax_rate;
            let tokens = FixedAmount::parse(&tokens, TOKEN_DECIMALS)?;

            let payout = if all_chains {
                let records = fetch_surplus_records(
                    &snapshot,
                    &snapshot.token_configs,
                    &config.fetch_options(),
                )
                .await;
                let agg = aggregate(&records, &snapshot.token_configs)?;
                if agg.partial {
                    tracing::warn!("some chains are unavailable; quote covers the rest");
                }
                cross_chain_cash_out_quote(&tokens, &agg, &records, tax)?
            } else {
                let token_config = snapshot.token_config(chain)?.clone();
                let records =
                    fetch_surplus_records(&snapshot, &[token_config], &config.fetch_options())
                        .await;
                cash_out_from_record(&tokens, &records[0], tax)?
            };

            println!("Cashing out {} tokens (tax {})", tokens, tax);
            println!("  You receive: {}", payout);
        }

        Commands::Aggregate => {
            let snapshot = Snapshot::load(&cli.snapshot)?;
            let records =
                fetch_surplus_records(&snapshot, &snapshot.token_configs, &config.fetch_options())
                    .await;
            let mut agg = aggregate(&records, &snapshot.token_configs)?;
            if agg.classification == GroupClass::Mixed {
                if let Some(rates) = &snapshot.rates {
                    agg = aggregate_converted(&records, &snapshot.token_configs, rates)?;
                }
            }
            println!("Project {}", snapshot.project_id);
            print_aggregate(&agg, &config)?;
        }

        Commands::Compare { amount, at } => {
            let snapshot = Snapshot::load(&cli.snapshot)?;
            let base_decimals = snapshot.token_config(chain)?.decimals;
            let amount_in = FixedAmount::parse(&amount, base_decimals)?;
            let timestamp = at.map(Ok).unwrap_or_else(now)?;

            let issuance = match snapshot.ruleset(chain) {
                Ok(ruleset) => {
                    let current = ruleset.with_weight(weight_at_time(&ruleset, timestamp)?);
                    let params = IssuanceParams::from(&current);
                    let quote = issuance_quote(amount_in.value(), base_decimals, &params)?;
                    Some(quote.to_quote(chain, amount_in))
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!(error = %e, "no issuance quote");
                    None
                }
                Err(e) => return Err(e.into()),
            };
            let chains = snapshot.chains();
            let lookups =
                fetch_pool_quotes(&snapshot, &chains, &amount_in, &config.fetch_options()).await;
            let comparison = best_quotes(issuance, &lookups, chain)?;

            println!("Paying {} from {}", amount_in, chain_label(chain));
            for quote in &comparison.all {
                println!(
                    "  {:<8} {:<24} {}",
                    format!("{:?}", quote.kind).to_lowercase(),
                    chain_label(quote.chain_id),
                    quote.payer_tokens
                );
            }
            if comparison.all.is_empty() {
                println!("  No quotes available");
            }
            if comparison.better_price_elsewhere() {
                if let Some(there) = &comparison.best_on_other_chain {
                    println!();
                    println!(
                        "Better price on {}: {} tokens",
                        chain_label(there.chain_id),
                        there.payer_tokens
                    );
                }
            }
        }

        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn print_aggregate(agg: &SurplusAggregate, config: &CliConfig) -> anyhow::Result<()> {
    println!("Surplus across {} chains ({:?})", agg.per_chain.len(), agg.classification);
    for chain in &agg.per_chain {
        let asset = format!("{:?}", chain.asset).to_lowercase();
        match &chain.reading {
            ChainReading::Available(amount) => {
                println!("  {:<28} {:<7} {}", chain_label(chain.chain_id), asset, amount)
            }
            ChainReading::Unavailable => {
                println!("  {:<28} {:<7} unavailable", chain_label(chain.chain_id), asset)
            }
        }
    }

    match &agg.total {
        Some(total) => println!("Total: {}", total),
        None => println!("Total: not available, chains hold different assets"),
    }
    if let Some(display) = display_total(agg, config)? {
        println!("       {} {}", display, config.pricing.display_symbol);
    }
    if agg.converted {
        println!("Converted with the snapshot's rates; display_rate not applied.");
    }
    if agg.partial {
        println!("Some chains are left out of the total; it covers the rest.");
    }
    if agg.imprecise {
        println!("Imprecise: add conversion rates to the snapshot to total mixed assets.");
    }
    Ok(())
}

/// Total in the configured display currency
///
/// None without a display rate, and for totals already converted by the
/// snapshot's rates.
fn display_total(
    agg: &SurplusAggregate,
    config: &CliConfig,
) -> anyhow::Result<Option<FixedAmount>> {
    if agg.converted {
        return Ok(None);
    }
    match config.display_rate()? {
        Some(rate) => Ok(agg.in_display_currency(&rate)?),
        None => Ok(None),
    }
}

fn format_time(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|t| chrono::DateTime::<chrono::Utc>::from_timestamp(t, 0))
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use revnet_bridge::{AssetClass, ConversionRates};
    use revnet_core::{NATIVE_CURRENCY, NATIVE_TOKEN};

    fn native(chain: u64) -> ChainTokenConfig {
        ChainTokenConfig {
            chain_id: ChainId(chain),
            project_id: 3,
            token: NATIVE_TOKEN,
            currency: NATIVE_CURRENCY,
            decimals: 18,
        }
    }

    fn usdc(chain: u64) -> ChainTokenConfig {
        let token = chain_info(ChainId(chain)).unwrap().usdc;
        ChainTokenConfig {
            chain_id: ChainId(chain),
            project_id: 3,
            token,
            currency: token.currency_id(),
            decimals: 6,
        }
    }

    fn record(config: &ChainTokenConfig, surplus: &str) -> SurplusRecord {
        SurplusRecord {
            chain_id: config.chain_id,
            project_id: 3,
            surplus: Some(FixedAmount::parse(surplus, config.decimals).unwrap()),
            total_supply: FixedAmount::from_whole(1_000, 18).unwrap(),
            reserved_tokens: FixedAmount::zero(18),
        }
    }

    fn with_rate(rate: &str) -> CliConfig {
        let mut config = CliConfig::default();
        config.pricing.display_rate = Some(rate.into());
        config
    }

    #[test]
    fn test_display_total_native_group() {
        let configs = [native(1), native(10)];
        let records = [record(&configs[0], "1"), record(&configs[1], "2")];
        let agg = aggregate(&records, &configs).unwrap();

        let display = display_total(&agg, &with_rate("2000")).unwrap().unwrap();
        assert_eq!(display.to_string(), "6000");
        assert!(display_total(&agg, &CliConfig::default()).unwrap().is_none());
    }

    #[test]
    fn test_display_total_skips_converted_total() {
        let configs = [native(1), usdc(10)];
        let records = [record(&configs[0], "1"), record(&configs[1], "500")];
        let rates = ConversionRates::new(6)
            .with_class_rate(AssetClass::Native, FixedAmount::from_whole(2_000, 0).unwrap())
            .with_class_rate(AssetClass::Stable, FixedAmount::from_whole(1, 0).unwrap());
        let agg = aggregate_converted(&records, &configs, &rates).unwrap();
        assert_eq!(agg.total.unwrap().to_string(), "2500");

        assert!(display_total(&agg, &with_rate("2000")).unwrap().is_none());
    }

    #[test]
    fn test_display_total_bad_rate() {
        let configs = [native(1)];
        let records = [record(&configs[0], "1")];
        let agg = aggregate(&records, &configs).unwrap();
        assert!(display_total(&agg, &with_rate("abc")).is_err());
    }
}
