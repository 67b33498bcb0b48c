use etfwatch::{
    api::{HoldingsAnalyzer, HoldingsQueryBuilder},
    models::{CollectorConfig, MonthKey, WeightClass, STABLE_DISPLAY_LIMIT},
    services::HoldingsCollector,
    utils::{
        format_number, format_percentage, format_signed_number, format_signed_percentage,
        init_logger, parse_trading_date, today_in, DEFAULT_TOP_HOLDINGS,
    },
};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "etfwatch")]
#[command(about = "A CLI for tracking daily constituents of an active ETF and their monthly changes")]
pub struct Cli {
    /// Folder holding the monthly holdings_YYYY-MM.csv files
    #[arg(long, global = true, default_value = "docs/data")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch daily holdings from the issuer API into the monthly files
    Collect {
        /// First date to collect (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// Last date to collect (YYYY-MM-DD), defaults to today in Asia/Taipei
        #[arg(long)]
        end: Option<String>,
        /// Fund identifier
        #[arg(long)]
        fund_id: Option<String>,
    },
    /// List loaded months with change counts
    Months,
    /// Show additions, removals and weight changes for a month
    Changes {
        /// Month to analyze (YYYY-MM); defaults to the latest loaded month
        #[arg(short, long)]
        month: Option<String>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the filterable holdings table
    Table {
        /// Exact trading date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Code or name substring
        #[arg(long)]
        stock: Option<String>,
        /// Minimum weight in percent
        #[arg(long, default_value_t = 0.0)]
        min_weight: f64,
        /// Sort field (date, code, name, shares, weight). Defaults to date, newest first
        #[arg(long)]
        sort: Option<String>,
        /// Sort direction (asc, desc). A field given without one sorts ascending
        #[arg(long)]
        direction: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show one stock's history, or search the stock list
    Lookup {
        /// Stock code
        #[arg(long, conflicts_with = "search")]
        stock: Option<String>,
        /// Case-insensitive search over code and name
        #[arg(long)]
        search: Option<String>,
    },
    /// Dataset summary and latest top holdings
    Overview,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logger()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Collect { start, end, fund_id } => {
            let mut config = CollectorConfig {
                data_dir: cli.data_dir,
                ..Default::default()
            };
            if let Some(fund_id) = fund_id {
                config.fund_id = fund_id;
            }

            let start = parse_trading_date(start.as_deref().unwrap_or(&config.default_start_date))?;
            let end = match end {
                Some(end) => parse_trading_date(&end)?,
                None => today_in(&config.timezone),
            };

            println!("=== ETF holdings collector ===");
            println!("Fund: {}", config.fund_id);
            println!("Source: {}", config.api_url);

            let collector = HoldingsCollector::from_config(&config)?;
            let summary = collector.collect_range(start, end).await?;

            println!(
                "✅ Collected {} records over {}/{} weekdays, {} months saved",
                summary.records_collected,
                summary.days_with_data,
                summary.days_requested,
                summary.months_saved.len()
            );
        }
        Commands::Months => {
            let analyzer = HoldingsAnalyzer::load(&cli.data_dir)?;
            let previews = analyzer.month_previews();
            if previews.is_empty() {
                println!("No holdings data in {}", cli.data_dir.display());
            }
            for preview in previews {
                println!(
                    "{}  +{:<3} -{:<3} ={:<3}",
                    preview.month, preview.added, preview.removed, preview.stable
                );
            }
        }
        Commands::Changes { month, json } => {
            let analyzer = HoldingsAnalyzer::load(&cli.data_dir)?;
            let month = match month {
                Some(month) => MonthKey::parse(&month)?,
                None => analyzer
                    .months()
                    .pop()
                    .ok_or_else(|| anyhow::anyhow!("No holdings data in {}", cli.data_dir.display()))?,
            };
            let report = analyzer.analyze_month(&month)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!("=== {} constituent changes ===", report.month);
            if let (Some(anchor), Some(end)) = (&report.anchor_date, &report.month_end_date) {
                println!("Baseline {} -> month end {}", anchor, end);
            }
            println!("Holdings at month end: {}", report.total_holdings_at_month_end);

            let changed_days: Vec<_> = report.daily.iter().filter(|d| !d.is_unchanged()).collect();
            if !changed_days.is_empty() {
                println!("\n📅 Days with changes");
                for day in changed_days {
                    println!(
                        "  {} vs {}: {} -> {} holdings, +[{}] -[{}]",
                        day.date,
                        day.previous_date,
                        day.previous_count,
                        day.current_count,
                        day.added.join(", "),
                        day.removed.join(", ")
                    );
                }
            }

            println!("\n🟢 Added ({})", report.added.len());
            for event in &report.added {
                println!(
                    "  {}  {:<8} {:<12} {:>8}  {}",
                    event.change_date,
                    event.record.stock_code,
                    event.record.stock_name,
                    format_percentage(event.record.weight),
                    format_number(event.record.shares as i64)
                );
            }

            println!("\n🔴 Removed ({})", report.removed.len());
            for event in &report.removed {
                println!(
                    "  {}  {:<8} {:<12} last {}",
                    event.change_date,
                    event.record.stock_code,
                    event.record.stock_name,
                    format_percentage(event.record.weight)
                );
            }

            let (shown, hidden) = report.top_stable(STABLE_DISPLAY_LIMIT);
            println!("\n⚪ Stable ({})", report.stable.len());
            for holding in shown {
                println!(
                    "  {:<8} {:<12} {:>8} -> {:>8}  {}",
                    holding.stock_code,
                    holding.stock_name,
                    format_percentage(holding.previous_weight),
                    format_percentage(holding.weight),
                    holding.weight_change_text
                );
            }
            if hidden > 0 {
                println!("  ... and {} more", hidden);
            }
        }
        Commands::Table { date, stock, min_weight, sort, direction, page } => {
            let analyzer = HoldingsAnalyzer::load(&cli.data_dir)?;

            let mut builder = HoldingsQueryBuilder::new()
                .with_min_weight(min_weight)
                .with_sort_params(sort.as_deref(), direction.as_deref())
                .map_err(anyhow::Error::msg)?
                .with_page(page);
            if let Some(date) = date {
                builder = builder.with_date(date);
            }
            if let Some(stock) = stock {
                builder = builder.with_stock(stock);
            }

            let result = analyzer.query_holdings(&builder.build());
            for record in &result.records {
                let marker = match WeightClass::of(record.weight) {
                    WeightClass::High => "▲",
                    WeightClass::Medium => "•",
                    WeightClass::Low => " ",
                };
                println!(
                    "{}  {:<8} {:<12} {:>14} {:>8} {}",
                    record.date,
                    record.stock_code,
                    record.stock_name,
                    format_number(record.shares as i64),
                    format_percentage(record.weight),
                    marker
                );
            }
            println!(
                "\n{}Page {}/{} ({} records) pages: {:?}{}",
                if result.has_previous() { "‹ " } else { "" },
                result.page,
                result.total_pages,
                result.total_records,
                result.page_numbers,
                if result.has_next() { " ›" } else { "" }
            );
        }
        Commands::Lookup { stock, search } => {
            let analyzer = HoldingsAnalyzer::load(&cli.data_dir)?;

            if let Some(code) = stock {
                let history = analyzer.stock_history(&code)?;
                let s = &history.summary;
                println!("=== {} {} ===", s.code, s.name);
                println!("Held {} -> {} ({} days)", s.first_date, s.last_date, s.record_count);
                println!(
                    "Weight min {} / max {} / avg {}",
                    format_percentage(s.min_weight),
                    format_percentage(s.max_weight),
                    format_percentage(s.avg_weight)
                );
                println!(
                    "Shares min {} / max {}\n",
                    format_number(s.min_shares as i64),
                    format_number(s.max_shares as i64)
                );
                for row in &history.rows {
                    println!(
                        "  {}  {:>14} {:>10}  {:>8} {:>8}",
                        row.record.date,
                        format_number(row.record.shares as i64),
                        format_signed_number(row.shares_change),
                        format_percentage(row.record.weight),
                        format_signed_percentage(row.weight_change)
                    );
                }
            } else {
                let options = analyzer.search_stocks(search.as_deref().unwrap_or(""));
                for option in &options {
                    println!("{}", option.label());
                }
                println!("\n{} stocks", options.len());
            }
        }
        Commands::Overview => {
            let analyzer = HoldingsAnalyzer::load(&cli.data_dir)?;
            let stats = analyzer.overview()?;
            println!("=== Overview ===");
            println!("Period: {} -> {}", stats.start_date, stats.end_date);
            println!("Trading days: {}", stats.trading_days);
            println!("Records: {}", format_number(stats.total_records as i64));
            println!("Average holdings per day: {}", stats.avg_holdings);

            println!("\nTop holdings on {}", stats.end_date);
            for (rank, record) in analyzer.top_holdings(DEFAULT_TOP_HOLDINGS)?.iter().enumerate() {
                println!(
                    "  {:>2}. {:<8} {:<12} {:>8}",
                    rank + 1,
                    record.stock_code,
                    record.stock_name,
                    format_percentage(record.weight)
                );
            }
        }
    }

    Ok(())
}
