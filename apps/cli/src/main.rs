#![deny(warnings)]

//! Headless quoting CLI: price a selection against a rate card and show
//! payment plans and issue dates.

use adrate_core::{
    AdSizeId, Area, AreaId, DurationId, IssueKey, LeafletAreaId, LeafletDurationId,
    PricingBreakdown, PricingModel, RateCard,
};
use adrate_pricing::{
    calculate_leafleting_price, calculate_with_design_fee, payment_plans, round_money, with_vat,
    AdvertisingSelection, LeafletSelection, PaymentQuote,
};
use adrate_schedule::{bogof_issue_plan, upcoming_issues, AreaIssuePlan};
use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Args {
    rates: PathBuf,
    model: PricingModel,
    areas: Vec<String>,
    free: Vec<String>,
    size: Option<String>,
    duration: Option<String>,
    agency: Decimal,
    design_fee: bool,
    start: Option<IssueKey>,
    today: Option<NaiveDate>,
    json: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            rates: PathBuf::from("data/rate-card.yaml"),
            model: PricingModel::Fixed,
            areas: vec![],
            free: vec![],
            size: None,
            duration: None,
            agency: Decimal::ZERO,
            design_fee: false,
            start: None,
            today: None,
            json: false,
        }
    }
}

fn split_ids(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut out = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        let mut value = |flag: &str| it.next().ok_or_else(|| anyhow!("{flag} needs a value"));
        match arg.as_str() {
            "--rates" => out.rates = PathBuf::from(value("--rates")?),
            "--model" => {
                out.model = match value("--model")?.as_str() {
                    "fixed" => PricingModel::Fixed,
                    "subscription" | "bogof" => PricingModel::Subscription,
                    "leaflet" => PricingModel::Leaflet,
                    other => bail!("unknown model: {other}"),
                }
            }
            "--areas" => out.areas = split_ids(&value("--areas")?),
            "--free" => out.free = split_ids(&value("--free")?),
            "--size" => out.size = Some(value("--size")?),
            "--duration" => out.duration = Some(value("--duration")?),
            "--agency" => {
                out.agency = value("--agency")?
                    .parse()
                    .context("--agency must be a percentage")?
            }
            "--design-fee" => out.design_fee = true,
            "--start" => {
                out.start = Some(
                    value("--start")?
                        .parse()
                        .context("--start must be YYYY-MM")?,
                )
            }
            "--today" => {
                out.today = Some(
                    NaiveDate::parse_from_str(&value("--today")?, "%Y-%m-%d")
                        .context("--today must be YYYY-MM-DD")?,
                )
            }
            "--json" => out.json = true,
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(out)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Quote {
    breakdown: PricingBreakdown,
    total_with_vat: Decimal,
    payment_plans: Vec<PaymentQuote>,
    issues: Vec<AreaIssuePlan>,
}

fn fixed_plan(area_id: String, issues: Vec<adrate_core::ScheduleEntry>) -> AreaIssuePlan {
    AreaIssuePlan {
        area_id,
        offset: 0,
        issues,
        continuation: None,
    }
}

/// Paid and free areas alternate so free areas take the offset slots.
fn interleave<'a>(paid: Vec<&'a Area>, free: Vec<&'a Area>) -> Vec<&'a Area> {
    let mut out = Vec::with_capacity(paid.len() + free.len());
    let mut free = free.into_iter();
    for p in paid {
        out.push(p);
        if let Some(f) = free.next() {
            out.push(f);
        }
    }
    out.extend(free);
    out
}

fn build_quote(args: &Args, rates: &RateCard, today: NaiveDate) -> Result<Quote> {
    let duration = args.duration.clone().context("--duration is required")?;
    let (breakdown, issues) = match args.model {
        PricingModel::Leaflet => {
            let selection = LeafletSelection {
                area_ids: args.areas.iter().map(|a| LeafletAreaId(a.clone())).collect(),
                duration_id: LeafletDurationId(duration),
            };
            let breakdown = calculate_leafleting_price(&selection, rates)
                .context("leaflet selection could not be priced; check area and duration ids")?;
            let count = breakdown.duration_multiplier as usize;
            let issues = selection
                .area_ids
                .iter()
                .filter_map(|id| rates.leaflet_area(id))
                .map(|a| {
                    fixed_plan(
                        a.id.to_string(),
                        upcoming_issues(&a.schedule, args.start, count, today),
                    )
                })
                .collect();
            (breakdown, issues)
        }
        model => {
            let selection = AdvertisingSelection {
                area_ids: args.areas.iter().map(|a| AreaId(a.clone())).collect(),
                free_area_ids: args.free.iter().map(|a| AreaId(a.clone())).collect(),
                ad_size_id: AdSizeId(args.size.clone().context("--size is required")?),
                duration_id: DurationId(duration),
                model,
                agency_discount_percent: args.agency,
            };
            let breakdown = calculate_with_design_fee(&selection, rates, args.design_fee)
                .context("selection could not be priced; check area, size and duration ids")?;
            let paid: Vec<&Area> = selection
                .area_ids
                .iter()
                .filter_map(|id| rates.area(id))
                .collect();
            let issues = if model == PricingModel::Subscription {
                let free = selection
                    .free_area_ids
                    .iter()
                    .filter_map(|id| rates.area(id))
                    .collect();
                bogof_issue_plan(&interleave(paid, free), args.start, today, &rates.config)
            } else {
                let count = breakdown.duration_multiplier as usize;
                paid.into_iter()
                    .map(|a| {
                        fixed_plan(
                            a.id.to_string(),
                            upcoming_issues(&a.schedule, args.start, count, today),
                        )
                    })
                    .collect()
            };
            (breakdown, issues)
        }
    };
    Ok(Quote {
        total_with_vat: with_vat(breakdown.final_total, rates.config.vat_percent),
        payment_plans: payment_plans(&breakdown, &rates.payment_options),
        breakdown,
        issues,
    })
}

fn gbp(amount: Decimal) -> String {
    format!("£{:.2}", round_money(amount))
}

fn print_quote(q: &Quote, vat_percent: Decimal) {
    let b = &q.breakdown;
    println!(
        "Quote | model: {} | areas: {} (+{} free) | issues: {}",
        b.model,
        b.paid_area_count(),
        b.free_area_count,
        b.duration_multiplier
    );
    for line in &b.area_breakdown {
        println!(
            "  {:<24} {} -> {}",
            line.area_name,
            gbp(line.base_price),
            gbp(line.multiplied_price)
        );
    }
    println!("Subtotal: {}", gbp(b.subtotal));
    for (label, pct, amount) in [
        ("Volume", b.volume_discount_percent, b.volume_discount),
        ("Duration", b.duration_discount_percent, b.duration_discount),
        ("Agency", b.agency_discount_percent, b.agency_discount),
    ] {
        if amount > Decimal::ZERO {
            println!("{label} discount ({}%): -{}", pct.normalize(), gbp(amount));
        }
    }
    if b.design_fee > Decimal::ZERO {
        println!("Design fee: {}", gbp(b.design_fee));
    }
    println!(
        "Total (ex VAT): {} | inc VAT {}%: {}",
        gbp(b.final_total),
        vat_percent.normalize(),
        gbp(q.total_with_vat)
    );
    println!("Circulation: {} | CPM: {}", b.total_circulation, gbp(b.cpm));
    if !q.payment_plans.is_empty() {
        println!("Payment options:");
    }
    for p in &q.payment_plans {
        let mut line = format!(
            "  {:<10} {} x {} = {}",
            p.option_type.to_string(),
            p.installments,
            gbp(p.amount),
            gbp(p.total_payable)
        );
        if p.savings > Decimal::ZERO {
            line.push_str(&format!(" (save {})", gbp(p.savings)));
        }
        if p.surcharge > Decimal::ZERO {
            line.push_str(&format!(" (fee {})", gbp(p.surcharge)));
        }
        println!("{line}");
    }
    println!("Issues:");
    for plan in &q.issues {
        if plan.issues.is_empty() {
            println!("  {}: no upcoming issues scheduled, contact us", plan.area_id);
            continue;
        }
        let dates: Vec<String> = plan
            .issues
            .iter()
            .map(|e| match e.copy_deadline {
                Some(d) => format!("{} (copy by {d})", e.key),
                None => e.key.to_string(),
            })
            .collect();
        print!("  {}: {}", plan.area_id, dates.join(", "));
        match &plan.continuation {
            Some(c) => println!(" | continues {}", c.key),
            None => println!(),
        }
    }
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    info!(
        git_sha = env!("GIT_SHA"),
        build_date = env!("BUILD_DATE"),
        rates = %args.rates.display(),
        model = %args.model,
        "starting quote"
    );

    let rates = RateCard::load(&args.rates)
        .with_context(|| format!("loading rate card {}", args.rates.display()))?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let quote = build_quote(&args, &rates, today)?;
    info!(total = %quote.breakdown.final_total, circulation = quote.breakdown.total_circulation, "quote priced");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&quote)?);
    } else {
        print_quote(&quote, rates.config.vat_percent);
    }
    Ok(())
}
