use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use quoteflow_api::services::{
    cost_effects::{compile_cost_effects, CostModel, MethodNode, OperationInput},
    pricing::{self, AdditionalCharges, PriceRow, StoredPrice},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

/// A quote line as read from disk.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineFile {
    /// Root of the method tree; omitted for lines priced at `unitCost`.
    #[serde(default)]
    tree: Option<MethodNode>,
    #[serde(default)]
    operations: Vec<OperationInput>,
    #[serde(default)]
    unit_cost: Decimal,
    #[serde(default)]
    quantities: Vec<Decimal>,
    #[serde(default)]
    prices: Vec<StoredPrice>,
    #[serde(default)]
    additional_charges: AdditionalCharges,
}

#[derive(Parser)]
#[command(name = "quoteflow", about = "Offline cost and price rollups for quote lines", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the price table of a line
    Price(PriceArgs),
    /// Print unit prices at cost plus a markup
    Recalculate(RecalculateArgs),
    /// Print the cost breakdown at one quantity
    Costs(CostsArgs),
}

#[derive(Args)]
struct LineArgs {
    /// JSON file describing the line
    #[arg(value_name = "FILE")]
    file: PathBuf,
    /// Quantity tier; repeat to price several. Defaults to the file's tiers
    #[arg(short, long = "quantity", value_name = "QTY")]
    quantities: Vec<Decimal>,
}

#[derive(Args)]
struct PriceArgs {
    #[command(flatten)]
    line: LineArgs,
}

#[derive(Args)]
struct RecalculateArgs {
    #[command(flatten)]
    line: LineArgs,
    /// Markup as a fraction, 0.25 for 25%
    #[arg(short, long, default_value = "0")]
    markup: Decimal,
}

#[derive(Args)]
struct CostsArgs {
    /// JSON file describing the line
    #[arg(value_name = "FILE")]
    file: PathBuf,
    #[arg(short, long)]
    quantity: Decimal,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    quoteflow_api::config::init_tracing("warn", false);

    match cli.command {
        Commands::Price(args) => {
            let (line, model) = load_line(&args.line.file)?;
            let quantities = quantities(&args.line, &line)?;
            let rows = pricing::price_table(
                &quantities,
                &model,
                &line.prices,
                &line.additional_charges,
            );
            if cli.json {
                print_json(&rows)?;
            } else {
                print_price_table(&rows);
            }
        }
        Commands::Recalculate(args) => {
            let (line, model) = load_line(&args.line.file)?;
            let quantities = quantities(&args.line, &line)?;
            let tiers = pricing::recalculate(&quantities, &model, args.markup);
            if cli.json {
                print_json(&tiers)?;
            } else {
                for tier in tiers {
                    println!("{:>12}  {:>14}", tier.quantity, tier.unit_price.round_dp(4));
                }
            }
        }
        Commands::Costs(args) => {
            let (_, model) = load_line(&args.file)?;
            let Some(costs) = model.costs(args.quantity) else {
                bail!("quantity {} is too large to cost", args.quantity);
            };
            if cli.json {
                print_json(&costs)?;
            } else {
                println!("{}", serde_json::to_string_pretty(&costs)?);
                println!("total: {}", placeholder(costs.total_cost()));
            }
        }
    }

    Ok(())
}

fn load_line(path: &Path) -> Result<(LineFile, CostModel)> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let line: LineFile = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let model = compile_cost_effects(line.tree.as_ref(), &line.operations, line.unit_cost);
    debug!(effects = model.effects().len(), "Compiled cost model");
    Ok((line, model))
}

fn quantities(args: &LineArgs, line: &LineFile) -> Result<Vec<Decimal>> {
    let quantities = if args.quantities.is_empty() {
        line.quantities.clone()
    } else {
        args.quantities.clone()
    };
    if quantities.is_empty() {
        bail!("no quantities given; pass --quantity or list them in the file");
    }
    Ok(quantities)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_price_table(rows: &[PriceRow]) {
    println!(
        "{:>10}  {:>12}  {:>12}  {:>12}  {:>14}  {:>10}",
        "qty", "unit cost", "unit price", "net price", "total", "markup"
    );
    for row in rows {
        println!(
            "{:>10}  {:>12}  {:>12}  {:>12}  {:>14}  {:>10}",
            row.quantity,
            placeholder(row.unit_cost),
            row.unit_price.round_dp(4),
            placeholder(row.net_unit_price),
            placeholder(row.total_price),
            placeholder(
                row.markup_percent
                    .and_then(|m| m.checked_mul(Decimal::ONE_HUNDRED))
            )
        );
    }
}

fn placeholder(value: Option<Decimal>) -> String {
    value
        .map(|v| v.round_dp(4).to_string())
        .unwrap_or_else(|| "-".to_string())
}
