use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;

use vela_core::classify;
use vela_core::config::Configuration;
use vela_pricing::report::CostReport;
use vela_pricing::{CostEstimator, PriceCache, PriceChain, RetailPriceClient};

#[derive(Parser)]
#[command(name = "vela")]
#[command(about = "Parse infrastructure configurations and compare cloud costs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a configuration file and show the resource model
    Parse {
        /// Path to the configuration file
        file: PathBuf,

        /// Emit the model as JSON
        #[arg(long)]
        json: bool,
    },
    /// Estimate monthly costs across providers
    Cost {
        /// Path to the configuration file
        file: PathBuf,

        /// Skip live price lookups, use cache and static tables only
        #[arg(long)]
        offline: bool,

        /// Directory for the persistent price cache
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reconstruct configuration source from the parsed model
    Render {
        /// Path to the configuration file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("VELA_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Parse { file, json } => parse_command(&file, json),
        Commands::Cost {
            file,
            offline,
            cache_dir,
            json,
        } => cost_command(&file, offline, cache_dir, json).await,
        Commands::Render { file } => render_command(&file),
    }
}

fn load(file: &PathBuf) -> anyhow::Result<Configuration> {
    let content = fs::read_to_string(file)?;
    Ok(vela_core::parse(&content))
}

fn parse_command(file: &PathBuf, json: bool) -> anyhow::Result<()> {
    let config = load(file)?;
    let classified = classify::classify_configuration(&config);

    if json {
        let model = serde_json::json!({
            "blocks": config.blocks,
            "dominant_provider": classify::dominant_provider(&config),
            "resources": classified.specs,
            "skipped": classified.skipped,
        });
        println!("{}", serde_json::to_string_pretty(&model)?);
        return Ok(());
    }

    if let Some(provider) = classify::dominant_provider(&config) {
        println!("{} {}", "Provider:".bold(), provider);
    }
    println!(
        "{} {} blocks, {} priceable resources",
        "Parsed:".bold(),
        config.blocks.len(),
        classified.specs.len()
    );
    println!();

    for spec in &classified.specs {
        println!(
            "  {} [{}/{}]",
            spec.address().cyan(),
            spec.provider,
            spec.category
        );
        if let Some(instance) = &spec.instance_id {
            println!("      size:   {}", instance);
        }
        if let Some(region) = &spec.region {
            println!("      region: {}", region);
        }
        if spec.count > 1 {
            println!("      count:  {}", spec.count);
        }
    }

    for skipped in &classified.skipped {
        println!(
            "  {} {} ({})",
            "skipped".yellow(),
            skipped.address,
            skipped.reason
        );
    }

    Ok(())
}

async fn cost_command(
    file: &PathBuf,
    offline: bool,
    cache_dir: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let config = load(file)?;

    let cache = match cache_dir {
        Some(dir) => {
            fs::create_dir_all(&dir)?;
            PriceCache::with_file(dir.join("prices.json"))
        }
        None => PriceCache::new(),
    };

    let mut chain = PriceChain::new(cache);
    if !offline {
        match RetailPriceClient::new() {
            Ok(client) => chain = chain.with_live(Box::new(client)),
            Err(e) => tracing::warn!(error = %e, "live pricing unavailable, continuing offline"),
        }
    }

    let estimator = CostEstimator::from_configuration(&config);
    let report = estimator.estimate(Arc::new(chain)).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn render_command(file: &PathBuf) -> anyhow::Result<()> {
    let config = load(file)?;
    print!("{}", config.to_source());
    Ok(())
}

fn print_report(report: &CostReport) {
    println!("{}", "Monthly cost comparison".bold());
    for (provider, total) in &report.per_provider_totals {
        let line = format!("  {:<8} ${:>10.2}", provider.to_string(), total);
        if *provider == report.cheapest_provider {
            println!("{}  {}", line.green(), "(cheapest)".green());
        } else {
            println!("{}", line);
        }
    }

    if !report.breakdown.is_empty() {
        println!();
        println!("{}", "Resources".bold());
        for entry in &report.breakdown {
            println!(
                "  {:<40} ${:>10.2}  [{}]  {}",
                entry.resource,
                entry.monthly_cost,
                entry.source_tier,
                entry.description.dimmed()
            );
        }
    }

    if !report.skipped.is_empty() {
        println!();
        println!("{}", "Skipped".bold());
        for skipped in &report.skipped {
            println!("  {} ({})", skipped.address.yellow(), skipped.reason);
        }
    }

    if !report.savings_vs_cheapest.is_empty() {
        println!();
        println!("{}", "Savings vs cheapest".bold());
        for (provider, savings) in &report.savings_vs_cheapest {
            println!(
                "  {:<8} ${:.2}/month (${:.2}/year, {:.1}%)",
                provider.to_string(),
                savings.monthly_savings,
                savings.annual_savings,
                savings.percent_difference
            );
        }
    }
}
