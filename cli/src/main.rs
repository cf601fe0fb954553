use anchor_lang::prelude::Pubkey;
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use performance_fee::constants::*;
use performance_fee::engine::*;
use performance_fee::state::{FeeParams, SettlementType};
use performance_fee::utils::{bps_to_rate, derive_fee_record_pda, fixed_mul};

const FEE_UNIT_DECIMALS: usize = 18;

type Cycle = SettlementCycle<InMemoryFeeRecordStore, InMemoryShareLedger, FixedValuation>;

#[derive(Parser, Debug)]
#[command(name = "performance-fee-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a share price path through settle and update, one continuous cycle per price
    Simulate(SimulateArgs),
    /// Derive the fee record address of a fund
    Pda {
        #[arg(long)]
        fund: Pubkey,
        #[arg(long, default_value_t = performance_fee::ID)]
        program_id: Pubkey,
    },
}

#[derive(clap::Args, Debug)]
struct SimulateArgs {
    #[arg(long, default_value_t = 1000)]
    rate_bps: u16,
    #[arg(long, default_value_t = 365)]
    period_days: i64,
    /// Opening investor shares, in whole units
    #[arg(long, default_value = "1")]
    supply: String,
    /// Comma separated share prices, activation happens at 1.0
    #[arg(long, value_delimiter = ',', required = true)]
    prices: Vec<String>,
    /// Days between two consecutive prices
    #[arg(long, default_value_t = 30)]
    step_days: i64,
    /// Pay out whenever the gate opens, starting this many days after activation
    #[arg(long)]
    payout_after_days: Option<i64>,
    #[arg(long, value_enum, default_value_t = Basis::Include)]
    supply_basis: Basis,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Basis {
    Include,
    Exclude,
}

impl From<Basis> for SupplyBasis {
    fn from(basis: Basis) -> Self {
        match basis {
            Basis::Include => SupplyBasis::IncludeClaimShares,
            Basis::Exclude => SupplyBasis::ExcludeClaimShares,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Simulate(args) => simulate(args),
        Command::Pda { fund, program_id } => {
            let (fee_record, bump) = derive_fee_record_pda(&fund, &program_id);
            println!("fee_record: {fee_record}");
            println!("bump: {bump}");
            Ok(())
        }
    }
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let supply = parse_fixed(&args.supply).context("invalid --supply")?;
    if supply == 0 {
        bail!("--supply must be positive");
    }
    let prices = args
        .prices
        .iter()
        .map(|price| parse_fixed(price).with_context(|| format!("invalid price {price}")))
        .collect::<Result<Vec<_>>>()?;

    let params = FeeParams {
        rate: bps_to_rate(args.rate_bps)?,
        period: args
            .period_days
            .checked_mul(SECONDS_PER_DAY)
            .ok_or_else(|| anyhow!("--period-days out of range"))?,
    };
    let step = args
        .step_days
        .checked_mul(SECONDS_PER_DAY)
        .ok_or_else(|| anyhow!("--step-days out of range"))?;
    let payout_from = args
        .payout_after_days
        .map(|days| days.checked_mul(SECONDS_PER_DAY))
        .map(|seconds| seconds.ok_or_else(|| anyhow!("--payout-after-days out of range")))
        .transpose()?;

    let fund = Pubkey::new_unique();
    let mut cycle = Cycle {
        supply_basis: args.supply_basis.into(),
        ..Cycle::default()
    };
    cycle.ledger.issue(&fund, supply)?;
    cycle.oracle.set_gav(fund, supply);
    cycle.store.create(fund, &params)?;
    let initial_price = cycle.activate(&fund, 0)?;
    println!(
        "activated rate={} period={}s price={}",
        format_fixed(params.rate),
        params.period,
        format_fixed(initial_price)
    );

    let mut now = 0i64;
    for (step_index, price) in prices.into_iter().enumerate() {
        now = now.checked_add(step).ok_or_else(|| anyhow!("timeline out of range"))?;
        let gav = fixed_mul(price, cycle.ledger.total_supply(&fund)?)?;
        cycle.oracle.set_gav(fund, gav);

        let outcome = cycle.continuous(&fund)?;
        print_cycle(step_index, now, &outcome, cycle.ledger.claim_balance(&fund)?);

        let Some(from) = payout_from else { continue };
        if now < from || !PayoutController::new(&mut cycle.store).payout_allowed(&fund, now)? {
            continue;
        }
        let paid = cycle.payout(&fund, now)?;
        println!(
            "  payout hwm {} -> {} realized={} released_shares={}",
            format_fixed(paid.report.prev_high_water_mark),
            format_fixed(paid.report.next_high_water_mark),
            format_fixed(paid.report.value_realized),
            format_fixed(paid.claim_shares_released)
        );
    }

    let record = cycle.store.get(&fund)?;
    println!(
        "final hwm={} last_price={} due={} claim_shares={}",
        format_fixed(record.high_water_mark),
        format_fixed(record.last_share_price),
        format_fixed(record.aggregate_value_due),
        format_fixed(cycle.ledger.claim_balance(&fund)?)
    );
    Ok(())
}

fn print_cycle(step_index: usize, now: i64, outcome: &CycleOutcome, claim_shares: u128) {
    let settlement = &outcome.settlement;
    let kind = match settlement.settlement_type {
        SettlementType::None => "none",
        SettlementType::MintClaimShares => "mint",
        SettlementType::BurnClaimShares => "burn",
    };
    println!(
        "#{step_index} t={now} price={} due={} {kind} {} claim_shares={} last_price={}",
        format_fixed(settlement.next_share_price),
        format_fixed(settlement.next_aggregate_value_due),
        format_fixed(settlement.shares_due),
        format_fixed(claim_shares),
        format_fixed(outcome.update.next_share_price)
    );
}

/// Parse a decimal such as `1.25` into an 18 decimal fixed-point value
fn parse_fixed(input: &str) -> Result<u128> {
    let input = input.trim();
    let (whole, fraction) = input.split_once('.').unwrap_or((input, ""));
    if whole.is_empty() && fraction.is_empty() {
        bail!("empty number");
    }
    if fraction.len() > FEE_UNIT_DECIMALS {
        bail!("more than {FEE_UNIT_DECIMALS} decimals in {input}");
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse()? };
    let fraction: u128 = if fraction.is_empty() {
        0
    } else {
        format!("{fraction:0<width$}", width = FEE_UNIT_DECIMALS).parse()?
    };

    whole
        .checked_mul(FEE_UNIT)
        .and_then(|scaled| scaled.checked_add(fraction))
        .ok_or_else(|| anyhow!("{input} out of range"))
}

fn format_fixed(value: u128) -> String {
    format!(
        "{}.{:0width$}",
        value / FEE_UNIT,
        value % FEE_UNIT,
        width = FEE_UNIT_DECIMALS
    )
}
